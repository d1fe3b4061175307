//! Core pipeline: fetch both feeds → diff → rank.

pub mod diff;
pub mod report;

use anyhow::{Context, Result};
use tracing::info;

use crate::sources::ForecastSource;
use crate::types::DiffReport;

/// Fetch the forecast feed, then the market feed, and diff them.
///
/// The fetches run one after the other. The first failure ends the run and
/// no report is produced.
pub async fn run_pipeline(
    forecast: &dyn ForecastSource,
    market: &dyn ForecastSource,
    top_n: usize,
) -> Result<DiffReport> {
    let forecast_map = forecast
        .fetch_probabilities()
        .await
        .with_context(|| format!("Failed to load {} feed", forecast.name()))?;

    let market_map = market
        .fetch_probabilities()
        .await
        .with_context(|| format!("Failed to load {} feed", market.name()))?;

    let report = diff::diff(&forecast_map, &market_map, top_n);

    info!(
        forecast = forecast.name(),
        market = market.name(),
        states = report.all.len(),
        matched = report.matched,
        unmatched = report.unmatched_forecast.len(),
        ignored = report.ignored_market.len(),
        "Diff complete"
    );

    Ok(report)
}
