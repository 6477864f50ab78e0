use crate::threat::{Severity, Threat};

/// Source of threat records for a finished scan.
pub trait ThreatFeed {
    /// Upper bound on how many records a single scan can report.
    fn capacity(&self) -> usize;

    /// Returns at most `requested` threats, in detection order.
    fn detect(&self, requested: usize) -> Vec<Threat>;
}

/// The scripted detections shown by the simulated scanner.
pub struct CannedFeed {
    records: Vec<Threat>,
}

impl Default for CannedFeed {
    fn default() -> Self {
        Self {
            records: vec![
                Threat::new(
                    "1",
                    "Trojan.Win32.Generic",
                    "C:\\Program Files\\Common\\malware.exe",
                    Severity::High,
                    "Trojan Horse",
                ),
                Threat::new(
                    "2",
                    "Adware.PUP.Optional",
                    "C:\\Users\\Downloads\\crack_software.zip",
                    Severity::Medium,
                    "Potentially Unwanted Program",
                ),
                Threat::new(
                    "3",
                    "Ransomware.Detected",
                    "C:\\Users\\Documents\\invoice.pdf.exe",
                    Severity::High,
                    "Ransomware",
                ),
            ],
        }
    }
}

impl ThreatFeed for CannedFeed {
    fn capacity(&self) -> usize {
        self.records.len()
    }

    fn detect(&self, requested: usize) -> Vec<Threat> {
        self.records.iter().take(requested).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_feed_returns_records_in_order() {
        let feed = CannedFeed::default();
        let names: Vec<_> = feed.detect(2).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Trojan.Win32.Generic", "Adware.PUP.Optional"]);
    }

    #[test]
    fn canned_feed_never_exceeds_capacity() {
        let feed = CannedFeed::default();
        assert_eq!(feed.capacity(), 3);
        assert_eq!(feed.detect(10).len(), 3);
        assert!(feed.detect(0).is_empty());
    }

    #[test]
    fn canned_ids_are_unique() {
        let threats = CannedFeed::default().detect(3);
        let mut ids: Vec<_> = threats.iter().map(|t| t.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
