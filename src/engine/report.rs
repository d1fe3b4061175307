//! Plain-text rendering of a `DiffReport`.

use std::fmt::Write;

use crate::types::DiffReport;

/// Every state's signed diff, in state-name order, printed the same way as
/// the ranked records.
pub fn render_all(report: &DiffReport) -> String {
    let mut out = String::from("All Diffs:\n");
    if report.all.is_empty() {
        out.push_str("  (none)\n");
    }
    for (state, diff) in &report.all {
        let _ = writeln!(out, "  {state}: {diff}");
    }
    out
}

/// The ranked divergences as single-entry `{state: diff}` records, largest
/// gap first.
pub fn render_ranked(report: &DiffReport) -> String {
    let mut out = format!("Highest {}:\n", report.ranked.len());
    if report.ranked.is_empty() {
        out.push_str("  (none)\n");
    }
    for entry in &report.ranked {
        let _ = writeln!(out, "  {entry}");
    }
    out
}

/// Full listing, blank line, ranked listing.
pub fn render(report: &DiffReport) -> String {
    format!("{}\n{}", render_all(report), render_ranked(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diff::{diff, DEFAULT_TOP_N};
    use crate::types::SourceMap;

    fn sample() -> DiffReport {
        let forecast: SourceMap = [("Ohio", 0.75), ("Texas", 0.625)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let market: SourceMap = [("Ohio", 0.5), ("Texas", 0.875)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        diff(&forecast, &market, DEFAULT_TOP_N)
    }

    #[test]
    fn test_render_all() {
        assert_eq!(
            render_all(&sample()),
            "All Diffs:\n  Ohio: 0.25\n  Texas: -0.25\n"
        );
    }

    #[test]
    fn test_render_ranked_in_rank_order() {
        // Equal gaps: Ohio sorts before Texas.
        assert_eq!(
            render_ranked(&sample()),
            "Highest 2:\n  {\"Ohio\": 0.25}\n  {\"Texas\": -0.25}\n"
        );
    }

    #[test]
    fn test_both_blocks_show_the_same_value() {
        let forecast: SourceMap = [("Ohio".to_string(), 0.50002)].into_iter().collect();
        let market: SourceMap = [("Ohio".to_string(), 0.5)].into_iter().collect();
        let report = diff(&forecast, &market, DEFAULT_TOP_N);
        let value = report.all["Ohio"];
        assert!(value > 0.0 && value < 5e-5);

        assert!(render_all(&report).contains(&format!("  Ohio: {value}\n")));
        assert!(render_ranked(&report).contains(&format!("  {{\"Ohio\": {value}}}\n")));
    }

    #[test]
    fn test_render_empty() {
        let out = render(&DiffReport::default());
        assert_eq!(out, "All Diffs:\n  (none)\n\nHighest 0:\n  (none)\n");
    }

    #[test]
    fn test_render_has_both_blocks() {
        let out = render(&sample());
        let all_at = out.find("All Diffs:").unwrap();
        let top_at = out.find("Highest 2:").unwrap();
        assert!(all_at < top_at);
    }
}
