//! PredictIt market data.
//!
//! The `marketdata/all` endpoint returns every open market. Only the
//! per-state 2020 presidential markets are kept, and their state labels are
//! rewritten into FiveThirtyEight's spelling so the two feeds line up.
//!
//! URL: https://www.predictit.org/api/marketdata/all/
//! Auth: none.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{build_http_client, fetch_bytes, ForecastSource};
use crate::config::SourcesConfig;
use crate::types::{FeedError, SourceMap};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const SOURCE_NAME: &str = "predictit";

const MARKET_PREFIX: &str = "Which party will win ";
const STATE_TERMINATOR: &str = " in the";
const ELECTION_SUFFIX: &str = "2020 presidential election";

/// Contract whose price is compared against the forecast.
const REPUBLICAN_CONTRACT: &str = "Republican";

/// PredictIt's label for the federal district.
const DISTRICT_ABBREVIATION: &str = "DC";

// ---------------------------------------------------------------------------
// API response types (PredictIt JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MarketData {
    markets: Vec<PredictItMarket>,
}

#[derive(Debug, Deserialize)]
struct PredictItMarket {
    name: String,
    contracts: Vec<PredictItContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictItContract {
    name: String,
    /// Published as a number, occasionally as a decimal string.
    #[serde(default)]
    last_trade_price: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Market name handling
// ---------------------------------------------------------------------------

/// State label exactly as it appears in a market name, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedState<'a>(&'a str);

impl<'a> CapturedState<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

/// Pull the state label out of a market name of the form
/// `Which party will win <STATE> in the 2020 presidential election...`.
///
/// Case-sensitive. Any number of spaces (at least one) may sit between
/// "the" and "2020", and anything may follow "election". Returns `None`
/// for every other market.
///
/// The state ends at the first `" in the"` that leads into the election
/// phrase, not at the last `" in"` of the name, so a trailing
/// "... election in November?" still yields just the state.
pub fn capture_state(market_name: &str) -> Option<CapturedState<'_>> {
    let rest = market_name.strip_prefix(MARKET_PREFIX)?;

    rest.match_indices(STATE_TERMINATOR)
        .filter(|(idx, _)| *idx > 0)
        .find(|(idx, _)| {
            let after = &rest[idx + STATE_TERMINATOR.len()..];
            let trimmed = after.trim_start_matches(' ');
            trimmed.len() < after.len() && trimmed.starts_with(ELECTION_SUFFIX)
        })
        .map(|(idx, _)| CapturedState(&rest[..idx]))
}

/// Rewrite a captured label into FiveThirtyEight's vocabulary.
///
/// - Congressional districts lose the zero padding: `CA-01` → `CA-1`.
/// - `DC` becomes `district_label`.
/// - Everything else is returned unchanged.
pub fn normalize_state(captured: CapturedState<'_>, district_label: &str) -> String {
    let raw = captured.as_str();
    let b = raw.as_bytes();

    let zero_padded_district = b.len() >= 5
        && b[0].is_ascii_uppercase()
        && b[1].is_ascii_uppercase()
        && b[2] == b'-'
        && b[3] == b'0'
        && b[4].is_ascii_digit();

    if zero_padded_district {
        // First five bytes are ASCII, so slicing at 3 and 4 is on char boundaries.
        return format!("{}{}", &raw[..3], &raw[4..]);
    }

    if raw == DISTRICT_ABBREVIATION {
        return district_label.to_string();
    }

    raw.to_string()
}

fn parse_price(value: &serde_json::Value, state: &str) -> Result<f64, FeedError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        FeedError::parse(
            SOURCE_NAME,
            format!("lastTradePrice for {state:?} is not a number: {value}"),
        )
    })
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `marketdata/all` JSON into state → Republican last trade price.
///
/// Markets that aren't per-state presidential markets are skipped, as are
/// state markets without a Republican contract. When two markets normalize
/// to the same state the later one wins.
pub fn parse_markets(bytes: &[u8], district_label: &str) -> Result<SourceMap, FeedError> {
    let data: MarketData = serde_json::from_slice(bytes)
        .map_err(|e| FeedError::parse(SOURCE_NAME, format!("invalid market data: {e}")))?;

    let total = data.markets.len();
    let mut states = SourceMap::new();
    let mut skipped = 0usize;

    for market in &data.markets {
        let Some(captured) = capture_state(&market.name) else {
            skipped += 1;
            continue;
        };
        let state = normalize_state(captured, district_label);

        let mut price = None;
        for contract in &market.contracts {
            if contract.name == REPUBLICAN_CONTRACT {
                price = Some(parse_price(&contract.last_trade_price, &state)?);
            }
        }

        match price {
            Some(p) => {
                states.insert(state, p);
            }
            None => {
                debug!(market = %market.name, state = %state, "No Republican contract, skipping");
            }
        }
    }

    debug!(total, skipped, kept = states.len(), "PredictIt markets filtered");
    Ok(states)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// PredictIt market data client.
pub struct PredictItClient {
    http: Client,
    url: String,
    district_label: String,
}

impl PredictItClient {
    pub fn new(cfg: &SourcesConfig, district_label: impl Into<String>) -> Result<Self> {
        let http = build_http_client(cfg, SOURCE_NAME)?;
        Ok(Self {
            http,
            url: cfg.predictit_url.clone(),
            district_label: district_label.into(),
        })
    }
}

#[async_trait]
impl ForecastSource for PredictItClient {
    async fn fetch_probabilities(&self) -> Result<SourceMap> {
        let bytes = fetch_bytes(&self.http, &self.url, SOURCE_NAME).await?;
        let states = parse_markets(&bytes, &self.district_label)
            .context("Failed to parse PredictIt market data")?;

        info!(states = states.len(), "PredictIt markets loaded");
        debug!(?states, "PredictIt prices");
        Ok(states)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
