use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::AppConfig;
use crate::report;
use crate::scanner::{self, ScanPlan, ScanProgress, ScanStatus};
use crate::session::{Notification, NotificationVariant, ScanSession, SecurityStatus};
use crate::threat::Severity;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(19, 28, 36);
const CARD: egui::Color32 = egui::Color32::from_rgb(28, 40, 52);
const ACCENT: egui::Color32 = egui::Color32::from_rgb(60, 180, 255);
const GOOD: egui::Color32 = egui::Color32::from_rgb(44, 167, 97);
const BUSY: egui::Color32 = egui::Color32::from_rgb(44, 97, 167);
const BAD: egui::Color32 = egui::Color32::from_rgb(110, 30, 30);

struct Toast {
    note: Notification,
    shown_at: Instant,
}

pub struct MainApp {
    session: ScanSession,
    plan: ScanPlan,
    scan_duration: Duration,
    toast_ttl: Duration,
    scan_rx: Option<Receiver<ScanStatus>>,
    scan_progress: Option<ScanProgress>,
    scan_started: Option<Instant>,
    toasts: Vec<Toast>,
}

impl MainApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            session: ScanSession::new(config.initial_files_scanned, &config.initial_last_scan),
            plan: ScanPlan::new(config.outcomes.clone()),
            scan_duration: config.scan_duration(),
            toast_ttl: config.toast_ttl(),
            scan_rx: None,
            scan_progress: None,
            scan_started: None,
            toasts: Vec::new(),
        }
    }

    fn begin_scan(&mut self) {
        if !self.session.start_scan() {
            return;
        }
        let outcome = self.plan.next_outcome();
        let (tx, rx) = mpsc::channel();
        self.scan_rx = Some(rx);
        self.scan_progress = Some(ScanProgress::starting());
        self.scan_started = Some(Instant::now());
        scanner::spawn_scan(outcome, self.scan_duration, tx);
    }

    /// Drains worker messages. Returns true once the scan has ended, either
    /// applied to the session or aborted because the worker went away.
    fn poll_scan(&mut self) -> bool {
        let Some(rx) = &self.scan_rx else {
            return false;
        };

        let mut finished = None;
        let mut lost_worker = false;
        loop {
            match rx.try_recv() {
                Ok(ScanStatus::Progress(progress)) => {
                    self.scan_progress = Some(progress);
                }
                Ok(ScanStatus::Done(outcome)) => {
                    finished = Some(outcome);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    lost_worker = true;
                    break;
                }
            }
        }

        if finished.is_none() && !lost_worker {
            return false;
        }
        self.scan_rx = None;
        self.scan_progress = None;
        self.scan_started = None;

        match finished {
            Some(outcome) => {
                let note = self.session.complete_scan(outcome.threats, outcome.files);
                self.push_toast(note);
                report::log_summary(&self.session.snapshot());
            }
            None => {
                tracing::error!("scan worker disconnected without a result");
                if let Some(note) = self.session.abort_scan() {
                    self.push_toast(note);
                }
            }
        }
        true
    }

    fn quarantine(&mut self, threat_id: &str) {
        if let Some(note) = self.session.quarantine(threat_id) {
            self.push_toast(note);
        }
    }

    fn push_toast(&mut self, note: Notification) {
        self.toasts.push(Toast {
            note,
            shown_at: Instant::now(),
        });
    }

    fn prune_toasts(&mut self, now: Instant) {
        let ttl = self.toast_ttl;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < ttl);
    }

    fn copy_report(&mut self, ctx: &egui::Context) {
        match self.session.snapshot().to_json_pretty() {
            Ok(json) => {
                ctx.output_mut(|o| o.copied_text = json);
                self.push_toast(Notification {
                    title: "Report Copied".to_string(),
                    description: "Session report copied to the clipboard.".to_string(),
                    variant: NotificationVariant::Info,
                });
            }
            Err(err) => tracing::error!("{err}"),
        }
    }

    fn header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::default().fill(CARD).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("🛡").size(32.0).color(ACCENT));
                    ui.vertical(|ui| {
                        ui.heading(
                            egui::RichText::new("SecureGuard Antivirus")
                                .size(24.0)
                                .strong()
                                .color(egui::Color32::WHITE),
                        );
                        ui.label(
                            egui::RichText::new("Real-time protection & threat detection")
                                .size(13.0)
                                .color(egui::Color32::LIGHT_GRAY),
                        );
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📋 Copy Report").clicked() {
                            self.copy_report(ctx);
                        }
                    });
                });
            });
    }

    fn footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::default().fill(BACKGROUND).inner_margin(10.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(
                            "SecureGuard Antivirus • Version 2.0 • Real-time Protection Active",
                        )
                        .size(12.0)
                        .color(egui::Color32::GRAY),
                    );
                });
            });
    }

    fn dashboard(&self, ui: &mut egui::Ui) {
        let (title, detail, color) = match self.session.status() {
            SecurityStatus::Protected => ("✔ Protected", "Your system is secure.", GOOD),
            SecurityStatus::Scanning => ("🔍 Scanning", "Scan in progress...", BUSY),
            SecurityStatus::Threats => ("⚠ Threats Detected", "Action required.", BAD),
        };

        ui.horizontal(|ui| {
            egui::Frame::default()
                .fill(color)
                .rounding(8.0)
                .inner_margin(14.0)
                .show(ui, |ui| {
                    ui.set_min_width(220.0);
                    ui.label(egui::RichText::new(title).size(20.0).strong().color(egui::Color32::WHITE));
                    ui.label(egui::RichText::new(detail).color(egui::Color32::WHITE));
                });

            stat_card(ui, "Threats Found", &self.session.threats_found().to_string());
            stat_card(ui, "Files Scanned", &with_thousands(self.session.files_scanned()));
            stat_card(ui, "Last Scan", self.session.last_scan());
        });
    }

    fn scanner_panel(&mut self, ui: &mut egui::Ui) {
        egui::Frame::default()
            .fill(CARD)
            .rounding(8.0)
            .inner_margin(14.0)
            .show(ui, |ui| {
                ui.label(egui::RichText::new("System Scanner").size(18.0).strong());
                ui.add_space(6.0);

                let idle = !self.session.is_scanning();
                let button = egui::Button::new("🔍 Start Full Scan")
                    .fill(BUSY)
                    .min_size(egui::vec2(210.0, 40.0));
                if ui.add_enabled(idle, button).clicked() {
                    self.begin_scan();
                }

                if let Some(progress) = &self.scan_progress {
                    let tick = self
                        .scan_started
                        .map(|t| (t.elapsed().as_millis() / 400) as u64)
                        .unwrap_or(0);
                    ui.add_space(6.0);
                    ui.label(egui::RichText::new(scanner::scanning_label(tick)).strong());
                    ui.add(egui::ProgressBar::new(progress.fraction()).show_percentage());
                    ui.label(format!(
                        "{} • {} files checked",
                        progress.stage,
                        with_thousands(progress.files)
                    ));
                }
            });
    }

    fn threat_list(&mut self, ui: &mut egui::Ui) {
        let mut to_quarantine = None;

        egui::Frame::default()
            .fill(CARD)
            .rounding(8.0)
            .inner_margin(14.0)
            .show(ui, |ui| {
                ui.label(egui::RichText::new("Detected Threats").size(18.0).strong());
                ui.add_space(6.0);

                let threats = self.session.active_threats();
                if threats.is_empty() {
                    ui.label(
                        egui::RichText::new("No active threats. Your system is clean.")
                            .color(egui::Color32::GRAY),
                    );
                    return;
                }

                egui::Grid::new("threat_table")
                    .striped(true)
                    .num_columns(5)
                    .spacing([18.0, 8.0])
                    .show(ui, |ui| {
                        for heading in ["Name", "Type", "Location", "Severity", ""] {
                            ui.label(egui::RichText::new(heading).strong());
                        }
                        ui.end_row();

                        for threat in threats {
                            ui.label(&threat.name);
                            ui.label(&threat.kind);
                            ui.label(egui::RichText::new(&threat.path).monospace().size(12.0));
                            ui.label(
                                egui::RichText::new(threat.severity.as_str().to_uppercase())
                                    .strong()
                                    .color(severity_color(threat.severity)),
                            );
                            let button = egui::Button::new("Quarantine")
                                .fill(BAD)
                                .rounding(5.0);
                            if ui.add(button).clicked() {
                                to_quarantine = Some(threat.id.clone());
                            }
                            ui.end_row();
                        }
                    });
            });

        if let Some(id) = to_quarantine {
            self.quarantine(&id);
        }
    }

    fn toasts(&self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -48.0])
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let fill = match toast.note.variant {
                        NotificationVariant::Info => CARD,
                        NotificationVariant::Destructive => BAD,
                    };
                    egui::Frame::default()
                        .fill(fill)
                        .rounding(6.0)
                        .inner_margin(10.0)
                        .stroke(egui::Stroke::new(1.0, egui::Color32::DARK_GRAY))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.label(egui::RichText::new(&toast.note.title).strong());
                            ui.label(&toast.note.description);
                        });
                    ui.add_space(6.0);
                }
            });
    }
}

impl eframe::App for MainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_scan();
        self.prune_toasts(Instant::now());

        self.header(ctx);
        self.footer(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(BACKGROUND).inner_margin(16.0))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    self.dashboard(ui);
                    ui.add_space(16.0);
                    self.scanner_panel(ui);
                    ui.add_space(16.0);
                    self.threat_list(ui);
                });
            });

        self.toasts(ctx);

        if self.scan_rx.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

fn stat_card(ui: &mut egui::Ui, label: &str, value: &str) {
    egui::Frame::default()
        .fill(CARD)
        .rounding(8.0)
        .inner_margin(14.0)
        .show(ui, |ui| {
            ui.set_min_width(150.0);
            ui.label(egui::RichText::new(label).size(13.0).color(egui::Color32::LIGHT_GRAY));
            ui.label(egui::RichText::new(value).size(22.0).strong().color(egui::Color32::WHITE));
        });
}

fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::High => egui::Color32::from_rgb(231, 76, 60),
        Severity::Medium => egui::Color32::from_rgb(255, 178, 107),
        Severity::Low => egui::Color32::YELLOW,
    }
}

fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanOutcome;
    use std::thread;

    fn quick_config(outcomes: Vec<ScanOutcome>) -> AppConfig {
        AppConfig {
            scan_duration_ms: 0,
            outcomes,
            ..AppConfig::default()
        }
    }

    fn run_to_completion(app: &mut MainApp) {
        for _ in 0..200 {
            if app.poll_scan() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("scan did not complete");
    }

    #[test]
    fn formats_counts_with_thousands_separators() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(12547), "12,547");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn scan_round_trip_applies_scripted_outcome() {
        let mut app = MainApp::new(quick_config(vec![ScanOutcome { threats: 2, files: 500 }]));
        app.begin_scan();
        assert_eq!(app.session.status(), SecurityStatus::Scanning);

        run_to_completion(&mut app);
        assert_eq!(app.session.status(), SecurityStatus::Threats);
        assert_eq!(app.session.files_scanned(), 13047);
        assert!(app.scan_rx.is_none());
        assert_eq!(app.toasts.len(), 1);
        assert_eq!(app.toasts[0].note.variant, NotificationVariant::Destructive);

        app.quarantine("1");
        app.quarantine("2");
        assert_eq!(app.session.status(), SecurityStatus::Protected);
        assert_eq!(app.toasts.len(), 3);
    }

    #[test]
    fn second_start_while_scanning_is_ignored() {
        let mut app = MainApp::new(quick_config(vec![
            ScanOutcome { threats: 2, files: 10 },
            ScanOutcome { threats: 0, files: 20 },
        ]));
        app.begin_scan();
        app.begin_scan();
        // Only the first outcome was consumed from the plan.
        assert_eq!(app.plan.next_outcome().threats, 0);
        run_to_completion(&mut app);
    }

    #[test]
    fn huge_file_count_still_reports_scripted_threats() {
        let mut app = MainApp::new(quick_config(vec![ScanOutcome {
            threats: 2,
            files: u64::MAX / 4,
        }]));
        app.begin_scan();
        run_to_completion(&mut app);

        assert_eq!(app.session.status(), SecurityStatus::Threats);
        assert_eq!(app.session.threats_found(), 2);
        assert_eq!(app.session.files_scanned(), 12547 + u64::MAX / 4);
    }

    #[test]
    fn lost_worker_aborts_instead_of_reporting_clean() {
        let mut app = MainApp::new(quick_config(vec![ScanOutcome { threats: 0, files: 1 }]));
        assert!(app.session.start_scan());
        let (tx, rx) = mpsc::channel::<ScanStatus>();
        drop(tx);
        app.scan_rx = Some(rx);
        app.scan_progress = Some(ScanProgress::starting());

        assert!(app.poll_scan());
        assert!(app.scan_rx.is_none());
        assert!(app.scan_progress.is_none());
        assert_eq!(app.session.status(), SecurityStatus::Protected);
        assert_eq!(app.session.files_scanned(), 12547);
        assert_eq!(app.session.last_scan(), "2 hours ago");
        assert_eq!(app.toasts.len(), 1);
        assert_eq!(app.toasts[0].note.title, "Scan Failed");
        assert_eq!(app.toasts[0].note.variant, NotificationVariant::Destructive);
        assert_ne!(
            app.toasts[0].note.description,
            "No threats detected. Your system is secure."
        );
    }

    #[test]
    fn lost_worker_keeps_earlier_detections() {
        let mut app = MainApp::new(quick_config(vec![ScanOutcome { threats: 2, files: 500 }]));
        app.begin_scan();
        run_to_completion(&mut app);

        assert!(app.session.start_scan());
        let (tx, rx) = mpsc::channel::<ScanStatus>();
        drop(tx);
        app.scan_rx = Some(rx);

        assert!(app.poll_scan());
        assert_eq!(app.session.status(), SecurityStatus::Threats);
        assert_eq!(app.session.threats_found(), 2);
        assert_eq!(app.session.files_scanned(), 13047);
    }

    #[test]
    fn expired_toasts_are_pruned() {
        let mut app = MainApp::new(quick_config(vec![ScanOutcome { threats: 0, files: 1 }]));
        app.quarantine("missing");
        assert!(app.toasts.is_empty());

        app.push_toast(Notification {
            title: "t".to_string(),
            description: "d".to_string(),
            variant: NotificationVariant::Info,
        });
        app.prune_toasts(Instant::now());
        assert_eq!(app.toasts.len(), 1);
        app.prune_toasts(Instant::now() + app.toast_ttl);
        assert!(app.toasts.is_empty());
    }
}
