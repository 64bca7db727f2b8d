//! Benchmark report persistence.

use std::path::PathBuf;

use chrono::Local;

use keyfly_core::BenchmarkReport;

use crate::error::CliError;

/// Write the report as pretty JSON to a timestamped file in the current
/// directory and return the path.
pub fn write_report(report: &BenchmarkReport) -> Result<PathBuf, CliError> {
    let path = PathBuf::from(format!(
        "keyfly_benchmark_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}
