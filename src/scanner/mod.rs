//! Simulated scan driver. Nothing here touches the filesystem: a worker
//! thread walks a fixed list of stages and reports a scripted outcome.

pub mod feed;

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use feed::{CannedFeed, ThreatFeed};

pub const SCAN_STAGES: &[&str] = &[
    "System memory",
    "Startup items",
    "Running processes",
    "Program Files",
    "User documents",
    "Downloads",
    "Temporary files",
    "Browser extensions",
];

/// Scripted result of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub threats: usize,
    pub files: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub current: usize,
    pub total: usize,
    pub stage: String,
    pub files: u64,
}

impl ScanProgress {
    pub fn starting() -> Self {
        Self {
            current: 0,
            total: SCAN_STAGES.len(),
            stage: "Starting...".to_string(),
            files: 0,
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.total > 0 {
            self.current as f32 / self.total as f32
        } else {
            0.0
        }
    }
}

pub enum ScanStatus {
    Progress(ScanProgress),
    Done(ScanOutcome),
}

/// Rotates through the configured outcomes, one per scan.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    outcomes: Vec<ScanOutcome>,
    next: usize,
}

impl ScanPlan {
    pub fn new(outcomes: Vec<ScanOutcome>) -> Self {
        Self { outcomes, next: 0 }
    }

    pub fn next_outcome(&mut self) -> ScanOutcome {
        let Some(outcome) = self.outcomes.get(self.next).copied() else {
            return ScanOutcome { threats: 0, files: 0 };
        };
        self.next = (self.next + 1) % self.outcomes.len();
        outcome
    }
}

pub fn spawn_scan(outcome: ScanOutcome, duration: Duration, tx: Sender<ScanStatus>) {
    thread::spawn(move || run_scan(outcome, duration, tx));
}

fn run_scan(outcome: ScanOutcome, duration: Duration, tx: Sender<ScanStatus>) {
    let total = SCAN_STAGES.len();
    let pause = duration / total as u32;
    tracing::debug!(threats = outcome.threats, files = outcome.files, "scan worker started");

    for (i, stage) in SCAN_STAGES.iter().enumerate() {
        thread::sleep(pause);
        let sent = tx.send(ScanStatus::Progress(ScanProgress {
            current: i + 1,
            total,
            stage: stage.to_string(),
            files: files_through_stage(outcome.files, i + 1, total),
        }));
        if sent.is_err() {
            tracing::warn!("scan receiver dropped, aborting scan worker");
            return;
        }
    }

    if tx.send(ScanStatus::Done(outcome)).is_err() {
        tracing::warn!("scan receiver dropped before completion");
    }
}

/// Share of `files` checked once `done` of `total` stages have run.
fn files_through_stage(files: u64, done: usize, total: usize) -> u64 {
    (u128::from(files) * done as u128 / total as u128) as u64
}

/// "Scanning" followed by zero to three dots, cycling with `tick`.
pub fn scanning_label(tick: u64) -> String {
    format!("Scanning{}", ".".repeat((tick % 4) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn plan_rotates_and_wraps() {
        let mut plan = ScanPlan::new(vec![
            ScanOutcome { threats: 2, files: 500 },
            ScanOutcome { threats: 0, files: 100 },
        ]);
        assert_eq!(plan.next_outcome().threats, 2);
        assert_eq!(plan.next_outcome().threats, 0);
        assert_eq!(plan.next_outcome().files, 500);
    }

    #[test]
    fn empty_plan_yields_clean_outcome() {
        let mut plan = ScanPlan::new(Vec::new());
        assert_eq!(plan.next_outcome(), ScanOutcome { threats: 0, files: 0 });
    }

    #[test]
    fn worker_reports_each_stage_then_done() {
        let (tx, rx) = mpsc::channel();
        let outcome = ScanOutcome { threats: 1, files: 800 };
        run_scan(outcome, Duration::ZERO, tx);

        let messages: Vec<_> = rx.iter().collect();
        assert_eq!(messages.len(), SCAN_STAGES.len() + 1);

        match &messages[0] {
            ScanStatus::Progress(progress) => {
                assert_eq!(progress.current, 1);
                assert_eq!(progress.total, SCAN_STAGES.len());
                assert_eq!(progress.stage, "System memory");
            }
            ScanStatus::Done(_) => panic!("expected progress first"),
        }
        match &messages[SCAN_STAGES.len() - 1] {
            ScanStatus::Progress(progress) => assert_eq!(progress.files, 800),
            ScanStatus::Done(_) => panic!("expected final progress"),
        }
        match messages.last() {
            Some(ScanStatus::Done(done)) => assert_eq!(*done, outcome),
            _ => panic!("expected done last"),
        }
    }

    #[test]
    fn huge_file_counts_do_not_overflow_progress() {
        let (tx, rx) = mpsc::channel();
        let outcome = ScanOutcome { threats: 2, files: u64::MAX / 4 };
        run_scan(outcome, Duration::ZERO, tx);

        let files: Vec<u64> = rx
            .iter()
            .filter_map(|status| match status {
                ScanStatus::Progress(progress) => Some(progress.files),
                ScanStatus::Done(_) => None,
            })
            .collect();
        assert_eq!(files.len(), SCAN_STAGES.len());
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(files.last().copied(), Some(u64::MAX / 4));
    }

    #[test]
    fn progress_fraction_handles_empty_total() {
        let mut progress = ScanProgress::starting();
        assert_eq!(progress.fraction(), 0.0);
        progress.current = progress.total;
        assert_eq!(progress.fraction(), 1.0);
        progress.total = 0;
        assert_eq!(progress.fraction(), 0.0);
    }

    #[test]
    fn scanning_label_cycles_dots() {
        assert_eq!(scanning_label(0), "Scanning");
        assert_eq!(scanning_label(3), "Scanning...");
        assert_eq!(scanning_label(4), "Scanning");
    }
}
