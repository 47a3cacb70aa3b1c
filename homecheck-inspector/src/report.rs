//! Writing and rendering the inspection report.

use crate::error::{InspectError, InspectResult};
use homecheck_core::InspectionReport;
use std::fs;
use std::path::Path;

/// Pretty-printed JSON for a report.
pub fn render_report(report: &InspectionReport) -> InspectResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the report to `path`, creating parent directories as needed.
pub fn write_report(path: &Path, report: &InspectionReport) -> InspectResult<()> {
    let io_err = |source| InspectError::ReportIo {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let json = render_report(report)?;
    fs::write(path, json).map_err(io_err)?;
    tracing::debug!(path = %path.display(), "Report written");
    Ok(())
}

/// Read a report back from disk.
pub fn read_report(path: &Path) -> InspectResult<InspectionReport> {
    let contents = fs::read_to_string(path).map_err(|source| InspectError::ReportIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}
