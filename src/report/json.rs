use anyhow::{Context, Result};
use std::path::Path;

use crate::runner::{Reporter, RunReport};

/// Persist the report at `path` if its parent directory exists.
///
/// The results directory is a mount the harness may or may not provide;
/// a missing parent means nobody asked for a file, not an error.
pub fn write_if_parent_exists(
    report: &RunReport,
    path: &Path,
    reporter: &Reporter,
) -> Result<()> {
    // A bare filename has an empty parent, which means the cwd.
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Ok(()),
    };
    if !parent.exists() {
        return Ok(());
    }

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("could not write results to {}", path.display()))?;
    reporter.note(&format!("Results written to {}", path.display()));
    Ok(())
}

/// Generate JSON report
pub async fn generate(report: &RunReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
