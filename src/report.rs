use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SecurityStatus;
use crate::threat::Threat;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Point-in-time copy of the scan session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub status: SecurityStatus,
    pub files_scanned: u64,
    pub last_scan: String,
    pub threats_found: usize,
    pub active_threats: Vec<Threat>,
}

impl SessionReport {
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn summary_lines(report: &SessionReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .active_threats
        .iter()
        .map(|t| format!("[{}] {} ({})", t.severity, t.name, t.path))
        .collect();

    let verdict = match report.status {
        SecurityStatus::Scanning => "Scan in progress.".to_string(),
        _ if report.active_threats.is_empty() => "System is PROTECTED.".to_string(),
        _ => {
            let n = report.active_threats.len();
            format!("{n} threat{} require attention.", if n != 1 { "s" } else { "" })
        }
    };
    lines.push(verdict);
    lines
}

pub fn log_summary(report: &SessionReport) {
    for line in summary_lines(report) {
        tracing::info!(
            status = report.status.as_str(),
            files = report.files_scanned,
            "{line}"
        );
    }
}
