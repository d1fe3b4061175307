//! Forecast vs. market divergence.
//!
//! The forecast feed is the authoritative key set: every state it lists is
//! diffed, a state with no market price is diffed against 0, and states only
//! the market knows about are left out.

use tracing::debug;

use crate::types::{DiffEntry, DiffReport, SourceMap};

/// Number of divergences reported when nothing else is configured.
pub const DEFAULT_TOP_N: usize = 5;

/// Diff `forecast` against `market` and rank the `top_n` largest gaps.
///
/// Ranking is by absolute difference, largest first; equal gaps are ordered
/// by ascending state name. Ranked entries keep the signed difference.
pub fn diff(forecast: &SourceMap, market: &SourceMap, top_n: usize) -> DiffReport {
    let mut report = DiffReport::default();
    let mut entries = Vec::with_capacity(forecast.len());

    for (state, &predicted) in forecast {
        let price = match market.get(state) {
            Some(&p) => {
                report.matched += 1;
                p
            }
            None => {
                report.unmatched_forecast.push(state.clone());
                0.0
            }
        };

        let entry = DiffEntry::new(state.as_str(), predicted - price);
        report.all.insert(state.clone(), entry.signed_diff);
        entries.push(entry);
    }

    report.ignored_market = market
        .keys()
        .filter(|k| !forecast.contains_key(*k))
        .cloned()
        .collect();

    report.ranked = rank(entries, top_n);

    debug!(
        states = report.all.len(),
        matched = report.matched,
        unmatched = ?report.unmatched_forecast,
        ignored = ?report.ignored_market,
        "Diff computed"
    );

    report
}

/// Sort by absolute difference descending, then state name ascending, and
/// keep the first `top_n`. `total_cmp` keeps NaN from breaking the order.
pub fn rank(mut entries: Vec<DiffEntry>, top_n: usize) -> Vec<DiffEntry> {
    entries.sort_by(|a, b| {
        b.abs_diff
            .total_cmp(&a.abs_diff)
            .then_with(|| a.state.cmp(&b.state))
    });
    entries.truncate(top_n);
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
