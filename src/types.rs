//! Shared types for the forecast diff.
//!
//! Both feed clients produce a `SourceMap`; the diff engine consumes two of
//! them and produces a `DiffReport`. Nothing here outlives a single run.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Source maps
// ---------------------------------------------------------------------------

/// Normalized state name → probability-like value for one feed.
///
/// Ordered by name so listings come out the same on every run.
pub type SourceMap = BTreeMap<String, f64>;

// ---------------------------------------------------------------------------
// Diff output
// ---------------------------------------------------------------------------

/// One state's divergence between the two feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub state: String,
    /// `forecast - market`, with a missing market value counted as 0.
    pub signed_diff: f64,
    pub abs_diff: f64,
}

impl DiffEntry {
    pub fn new(state: impl Into<String>, signed_diff: f64) -> Self {
        Self {
            state: state.into(),
            signed_diff,
            abs_diff: signed_diff.abs(),
        }
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"{}\": {}}}", self.state, self.signed_diff)
    }
}

/// Result of diffing the forecast feed against the market feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffReport {
    /// Signed diff for every state in the forecast feed.
    pub all: BTreeMap<String, f64>,
    /// Largest absolute divergences first.
    pub ranked: Vec<DiffEntry>,
    /// Forecast states that also had a market price.
    pub matched: usize,
    /// Forecast states with no market price (diffed against 0).
    pub unmatched_forecast: Vec<String>,
    /// Market states the forecast feed doesn't know about.
    pub ignored_market: Vec<String>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures while retrieving or decoding a feed. All of them end the run.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Fetch error ({source_name}): {message}")]
    Fetch { source_name: String, message: String },

    #[error("Fetch error ({source_name}): HTTP {status}: {body}")]
    Status {
        source_name: String,
        status: u16,
        body: String,
    },

    #[error("Parse error ({source_name}): {message}")]
    Parse { source_name: String, message: String },
}

impl FeedError {
    pub fn parse(source_name: &str, message: impl Into<String>) -> Self {
        FeedError::Parse {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn fetch(source_name: &str, message: impl Into<String>) -> Self {
        FeedError::Fetch {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
