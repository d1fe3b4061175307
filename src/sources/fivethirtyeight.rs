//! FiveThirtyEight presidential state toplines.
//!
//! The CSV is the authoritative key set for the diff: every state it lists
//! gets a row in the report, whatever the market feed says.
//!
//! URL: https://projects.fivethirtyeight.com/2020-general-data/presidential_state_toplines_2020.csv
//! Auth: none.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::{build_http_client, fetch_bytes, ForecastSource};
use crate::config::SourcesConfig;
use crate::types::{FeedError, SourceMap};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const SOURCE_NAME: &str = "fivethirtyeight";

/// 0-based column holding the state name.
const STATE_COLUMN: usize = 7;
/// 0-based column holding the incumbent's win probability.
const PROBABILITY_COLUMN: usize = 10;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the toplines CSV into state → win probability.
///
/// The first row is always treated as a header and skipped. If a state
/// appears on several rows the last one wins. A blank or short row, or a
/// non-numeric probability, fails the whole parse.
pub fn parse_toplines(bytes: &[u8]) -> Result<SourceMap, FeedError> {
    if let Some(line) = find_blank_line(bytes) {
        return Err(FeedError::parse(SOURCE_NAME, format!("line {line}: blank row")));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut states = SourceMap::new();

    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| FeedError::parse(SOURCE_NAME, format!("CSV error: {e}")))?;
        if i == 0 {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() <= PROBABILITY_COLUMN {
            return Err(FeedError::parse(
                SOURCE_NAME,
                format!(
                    "line {line}: expected at least {} columns, found {}",
                    PROBABILITY_COLUMN + 1,
                    record.len()
                ),
            ));
        }

        let state = &record[STATE_COLUMN];
        let raw = &record[PROBABILITY_COLUMN];
        let probability: f64 = raw.trim().parse().map_err(|_| {
            FeedError::parse(
                SOURCE_NAME,
                format!("line {line}: probability for {state:?} is not a number: {raw:?}"),
            )
        })?;

        states.insert(state.to_string(), probability);
    }

    Ok(states)
}

/// 1-based number of the first empty line outside a quoted cell.
///
/// The csv reader drops empty lines silently, so they are found up front.
fn find_blank_line(bytes: &[u8]) -> Option<u64> {
    let mut line = 1u64;
    let mut in_quotes = false;
    let mut line_empty = true;

    for &b in bytes {
        match b {
            b'"' => {
                in_quotes = !in_quotes;
                line_empty = false;
            }
            b'\n' if in_quotes => line += 1,
            b'\n' => {
                if line_empty {
                    return Some(line);
                }
                line += 1;
                line_empty = true;
            }
            b'\r' => {}
            _ => line_empty = false,
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// FiveThirtyEight toplines client.
pub struct FiveThirtyEightClient {
    http: Client,
    url: String,
}

impl FiveThirtyEightClient {
    pub fn new(cfg: &SourcesConfig) -> Result<Self> {
        let http = build_http_client(cfg, SOURCE_NAME)?;
        Ok(Self {
            http,
            url: cfg.fivethirtyeight_url.clone(),
        })
    }
}

#[async_trait]
impl ForecastSource for FiveThirtyEightClient {
    async fn fetch_probabilities(&self) -> Result<SourceMap> {
        let bytes = fetch_bytes(&self.http, &self.url, SOURCE_NAME).await?;
        let states = parse_toplines(&bytes).context("Failed to parse FiveThirtyEight toplines")?;

        info!(states = states.len(), "FiveThirtyEight toplines loaded");
        debug!(?states, "FiveThirtyEight probabilities");
        Ok(states)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
