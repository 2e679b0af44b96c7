//! Per-run results table printed after the scenarios finish.

use colored::Colorize;

use crate::runner::{RunReport, TestResult};

pub fn print_summary(report: &RunReport) {
    let width = column_width(&report.results);

    println!();
    println!("{}", "Test Results".bold());
    println!("{}", "-".repeat(width + 20).dimmed());
    println!(
        "  {:<width$}  {:<6}  {:>8}  {}",
        "Test",
        "Status",
        "Duration",
        "Error",
        width = width
    );

    for result in &report.results {
        // Colored text throws off format-width padding; both statuses
        // are four characters so the columns line up by hand.
        let status = if result.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        let duration = format!("{}ms", result.duration_ms);
        let error = result.error.as_deref().unwrap_or("");
        println!(
            "  {:<width$}  {}    {:>8}  {}",
            result.name,
            status,
            duration,
            error.dimmed(),
            width = width
        );
    }

    println!();
    if report.failed == 0 {
        println!(
            "Summary: {} passed, {} failed",
            report.passed.to_string().green(),
            report.failed
        );
    } else {
        println!(
            "Summary: {} passed, {} failed",
            report.passed,
            report.failed.to_string().red()
        );
    }
}

fn column_width(results: &[TestResult]) -> usize {
    results
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("Test".len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_width_tracks_longest_name() {
        let results = vec![
            TestResult::pass("ok", 1),
            TestResult::fail("pack-tool-log-search-alpha", 2, "boom"),
        ];
        assert_eq!(column_width(&results), "pack-tool-log-search-alpha".len());
    }

    #[test]
    fn test_column_width_floors_at_header() {
        assert_eq!(column_width(&[]), "Test".len());
    }

    #[test]
    fn test_print_summary_handles_empty_and_mixed_runs() {
        print_summary(&RunReport::from_results(vec![]));
        print_summary(&RunReport::from_results(vec![
            TestResult::pass("gateway-health", 120),
            TestResult::fail("agent-list", 340, "Status code: 500"),
        ]));
    }
}
