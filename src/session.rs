//! Scan session controller: owns the dashboard state and applies the
//! scan-start, scan-complete and quarantine events.

use serde::{Deserialize, Serialize};

use crate::report::SessionReport;
use crate::scanner::{CannedFeed, ThreatFeed};
use crate::threat::Threat;

pub const JUST_NOW: &str = "Just now";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityStatus {
    Protected,
    Scanning,
    Threats,
}

impl SecurityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Scanning => "scanning",
            Self::Threats => "threats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant: NotificationVariant::Info,
        }
    }

    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

pub struct ScanSession {
    status: SecurityStatus,
    threats_found: usize,
    files_scanned: u64,
    last_scan: String,
    active_threats: Vec<Threat>,
    /// Status and threats as they were when the running scan started.
    pre_scan: Option<(SecurityStatus, Vec<Threat>)>,
    feed: Box<dyn ThreatFeed>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(12547, "2 hours ago")
    }
}

impl ScanSession {
    pub fn new(files_scanned: u64, last_scan: &str) -> Self {
        Self::with_feed(files_scanned, last_scan, Box::new(CannedFeed::default()))
    }

    pub fn with_feed(files_scanned: u64, last_scan: &str, feed: Box<dyn ThreatFeed>) -> Self {
        Self {
            status: SecurityStatus::Protected,
            threats_found: 0,
            files_scanned,
            last_scan: last_scan.to_string(),
            active_threats: Vec::new(),
            pre_scan: None,
            feed,
        }
    }

    pub fn status(&self) -> SecurityStatus {
        self.status
    }

    pub fn threats_found(&self) -> usize {
        self.threats_found
    }

    pub fn files_scanned(&self) -> u64 {
        self.files_scanned
    }

    pub fn last_scan(&self) -> &str {
        &self.last_scan
    }

    pub fn active_threats(&self) -> &[Threat] {
        &self.active_threats
    }

    pub fn is_scanning(&self) -> bool {
        self.status == SecurityStatus::Scanning
    }

    /// Returns false when a scan is already running.
    pub fn start_scan(&mut self) -> bool {
        if self.is_scanning() {
            tracing::debug!("scan already in progress, ignoring start");
            return false;
        }
        let previous = std::mem::take(&mut self.active_threats);
        self.pre_scan = Some((self.status, previous));
        self.status = SecurityStatus::Scanning;
        self.threats_found = 0;
        tracing::info!("scan started");
        true
    }

    pub fn complete_scan(&mut self, threat_count: usize, scanned_files: u64) -> Notification {
        self.pre_scan = None;
        self.files_scanned = self.files_scanned.saturating_add(scanned_files);
        self.last_scan = JUST_NOW.to_string();

        let capacity = self.feed.capacity();
        if threat_count > capacity {
            tracing::warn!(
                requested = threat_count,
                capacity,
                "threat count exceeds feed capacity, clamping"
            );
        }
        self.active_threats = self.feed.detect(threat_count.min(capacity));
        self.threats_found = self.active_threats.len();

        if self.threats_found > 0 {
            self.status = SecurityStatus::Threats;
            tracing::info!(
                threats = self.threats_found,
                files = self.files_scanned,
                "scan complete with detections"
            );
            let n = self.threats_found;
            Notification::destructive(
                "Scan Complete",
                format!(
                    "Found {n} threat{}. Please review and quarantine.",
                    if n != 1 { "s" } else { "" }
                ),
            )
        } else {
            self.status = SecurityStatus::Protected;
            tracing::info!(files = self.files_scanned, "scan complete, system clean");
            Notification::info("Scan Complete", "No threats detected. Your system is secure.")
        }
    }

    /// Abandons a scan that never produced a result and restores the state
    /// it replaced. Counters and the last-scan label are left untouched.
    pub fn abort_scan(&mut self) -> Option<Notification> {
        if !self.is_scanning() {
            return None;
        }
        let (status, threats) = self
            .pre_scan
            .take()
            .unwrap_or((SecurityStatus::Protected, Vec::new()));
        self.active_threats = threats;
        self.threats_found = self.active_threats.len();
        self.status = if self.active_threats.is_empty() {
            SecurityStatus::Protected
        } else {
            status
        };
        tracing::warn!(status = self.status.as_str(), "scan aborted, previous state restored");
        Some(Notification::destructive(
            "Scan Failed",
            "The scan stopped before finishing. No results were recorded.",
        ))
    }

    /// Removes the threat with `threat_id`. Unknown ids leave the session
    /// untouched and produce no notification.
    pub fn quarantine(&mut self, threat_id: &str) -> Option<Notification> {
        let pos = self.active_threats.iter().position(|t| t.id == threat_id);
        let Some(pos) = pos else {
            tracing::debug!(threat_id, "quarantine of unknown threat ignored");
            return None;
        };

        let removed = self.active_threats.remove(pos);
        self.threats_found = self.threats_found.saturating_sub(1);
        tracing::info!(
            threat_id,
            name = %removed.name,
            remaining = self.active_threats.len(),
            "threat quarantined"
        );

        if self.active_threats.is_empty() && self.status == SecurityStatus::Threats {
            self.status = SecurityStatus::Protected;
        }

        Some(Notification::info(
            "Threat Quarantined",
            "The threat has been successfully isolated and removed.",
        ))
    }

    pub fn snapshot(&self) -> SessionReport {
        SessionReport {
            status: self.status,
            files_scanned: self.files_scanned,
            last_scan: self.last_scan.clone(),
            threats_found: self.threats_found,
            active_threats: self.active_threats.clone(),
        }
    }
}
