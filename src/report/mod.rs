pub mod console;
pub mod json;
pub mod junit;

use anyhow::{Context, Result};
use std::path::Path;

use crate::runner::RunReport;

/// Regenerate a report from a previously written results file.
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let raw = std::fs::read_to_string(results_path)
        .with_context(|| format!("could not read results from {}", results_path.display()))?;
    let report: RunReport =
        serde_json::from_str(&raw).context("results file did not parse as a run report")?;

    match format {
        "json" => json::generate(&report, output).await,
        "junit" => junit::generate(&report, output).await,
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TestResult;

    fn sample() -> RunReport {
        RunReport::from_results(vec![
            TestResult::pass("gateway-health", 120),
            TestResult::fail("simple-message-alpha", 2400, "No response received"),
        ])
    }

    #[tokio::test]
    async fn test_generate_report_round_trips_json() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.json");
        let output = dir.path().join("report.json");
        std::fs::write(&results, serde_json::to_string(&sample()).unwrap()).unwrap();

        generate_report(&results, "json", Some(&output)).await.unwrap();

        let report: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_generate_report_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.json");
        std::fs::write(&results, serde_json::to_string(&sample()).unwrap()).unwrap();

        let err = generate_report(&results, "yaml", None).await.unwrap_err();
        assert!(err.to_string().contains("Unknown format"));
    }

    #[tokio::test]
    async fn test_generate_report_rejects_missing_file() {
        let err = generate_report(Path::new("/nonexistent/results.json"), "json", None)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("could not read results"));
    }
}
