pub mod reporter;
pub mod results;

use anyhow::Result;
use std::future::Future;
use std::time::Instant;

pub use reporter::Reporter;
pub use results::{RunReport, TestResult};

/// What a scenario concluded about the target.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Passed,
    /// Passed with a caveat worth showing next to the checkmark, e.g.
    /// a round trip that timed out but validated the protocol shape.
    PassedWithNote(String),
    Failed(String),
}

/// Drives scenarios in declared order and collects their results.
///
/// Every call to [`Suite::run`] ends in exactly one [`TestResult`]:
/// scenario errors are caught at this boundary and recorded, never
/// rethrown, so one broken scenario cannot take down the run.
pub struct Suite<'a> {
    reporter: &'a Reporter,
    results: Vec<TestResult>,
}

impl<'a> Suite<'a> {
    pub fn new(reporter: &'a Reporter) -> Self {
        Self {
            reporter,
            results: Vec::new(),
        }
    }

    pub async fn run<F, Fut>(&mut self, name: &str, scenario: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Verdict>>,
    {
        let pb = self.reporter.scenario_started(name);
        let start = Instant::now();
        let verdict = scenario().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match verdict {
            Ok(Verdict::Passed) => {
                self.reporter.scenario_passed(pb, name, duration_ms, None);
                TestResult::pass(name, duration_ms)
            }
            Ok(Verdict::PassedWithNote(note)) => {
                self.reporter
                    .scenario_passed(pb, name, duration_ms, Some(&note));
                TestResult::pass(name, duration_ms)
            }
            Ok(Verdict::Failed(error)) => {
                self.reporter.scenario_failed(pb, name, duration_ms);
                TestResult::fail(name, duration_ms, error)
            }
            Err(e) => {
                // {:#} flattens the context chain onto one line
                let error = format!("{:#}", e);
                self.reporter.scenario_failed(pb, name, duration_ms);
                TestResult::fail(name, duration_ms, error)
            }
        };

        self.results.push(result);
    }

    pub fn finish(self) -> RunReport {
        RunReport::from_results(self.results)
    }
}
