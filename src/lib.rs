pub mod config;
pub mod gateway;
pub mod jail;
pub mod probe;
pub mod report;
pub mod runner;

// Re-export common items
pub use report::generate_report;
pub use runner::{RunReport, TestResult};
