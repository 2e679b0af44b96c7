use serde::{Deserialize, Serialize};

/// Outcome of a single scenario.
///
/// The four fields are the contract for the results file: `error`
/// serializes as null on passing entries, never as a missing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl TestResult {
    pub fn pass(name: &str, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            duration_ms,
            error: None,
        }
    }

    pub fn fail(name: &str, duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            duration_ms,
            error: Some(error.into()),
        }
    }
}

/// Aggregated outcome of a whole run, in results-file shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub passed: u32,
    pub failed: u32,
    pub results: Vec<TestResult>,
}

impl RunReport {
    pub fn from_results(results: Vec<TestResult>) -> Self {
        let (passed, failed) = results.iter().fold((0, 0), |(p, f), r| {
            if r.passed {
                (p + 1, f)
            } else {
                (p, f + 1)
            }
        });

        Self {
            passed,
            failed,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_match_results() {
        let report = RunReport::from_results(vec![
            TestResult::pass("a", 10),
            TestResult::fail("b", 20, "boom"),
            TestResult::pass("c", 0),
        ]);

        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(
            (report.passed + report.failed) as usize,
            report.results.len()
        );
        assert!(!report.all_passed());
    }

    #[test]
    fn test_empty_run_passes() {
        let report = RunReport::from_results(vec![]);
        assert!(report.all_passed());
        assert_eq!(report.passed, 0);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_result_serialization_contract() {
        let passing = serde_json::to_value(TestResult::pass("gateway-health", 12)).unwrap();
        assert_eq!(
            passing,
            serde_json::json!({
                "name": "gateway-health",
                "passed": true,
                "duration_ms": 12,
                "error": null,
            })
        );

        let failing = serde_json::to_value(TestResult::fail("agent-list", 5, "Status code: 500"))
            .unwrap();
        assert_eq!(failing["error"], "Status code: 500");
        assert_eq!(failing["passed"], false);
    }

    #[test]
    fn test_report_round_trip() {
        let report = RunReport::from_results(vec![
            TestResult::pass("a", 1),
            TestResult::fail("b", 2, "nope"),
        ]);
        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.passed, 1);
        assert_eq!(back.failed, 1);
        assert_eq!(back.results, report.results);
    }
}
