//! E-Commerce Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::data::{Dataset, DateRange};
use crate::export::ReportExporter;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, MenuPage};
use crate::stats::{DashboardReport, DatasetSummary, ReportCalculator};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Calculation result from background thread
enum CalcResult {
    Progress(f32, String),
    Complete(Box<DashboardReport>),
    Error(String),
}

/// Keeps at most one report calculation running. Requests made while one
/// runs collapse into a single pending range, the latest one.
#[derive(Debug, Default)]
struct RecomputeQueue {
    running: bool,
    pending: Option<DateRange>,
}

impl RecomputeQueue {
    /// Range to start now, or `None` if it has to wait for the running one.
    fn request(&mut self, range: DateRange) -> Option<DateRange> {
        if self.running {
            self.pending = Some(range);
            None
        } else {
            self.running = true;
            Some(range)
        }
    }

    /// Mark the running calculation done and hand out the next range, if any.
    fn finish(&mut self) -> Option<DateRange> {
        let next = self.pending.take();
        self.running = next.is_some();
        next
    }

    fn is_busy(&self) -> bool {
        self.running
    }
}

/// Main application window.
pub struct DashboardApp {
    dataset: Arc<Dataset>,
    top_n: usize,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async calculation
    calc_tx: Sender<CalcResult>,
    calc_rx: Receiver<CalcResult>,
    queue: RecomputeQueue,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dataset: Arc<Dataset>,
        summary: DatasetSummary,
        data_dir: PathBuf,
        top_n: usize,
    ) -> Self {
        let (calc_tx, calc_rx) = channel();
        Self {
            control_panel: ControlPanel::new(
                dataset.date_bounds(),
                data_dir.display().to_string(),
            ),
            chart_viewer: ChartViewer::new(summary),
            dataset,
            top_n,
            calc_tx,
            calc_rx,
            queue: RecomputeQueue::default(),
        }
    }

    /// Queue a recalculation; starts right away unless one is running
    fn request_calculation(&mut self, range: DateRange) {
        self.control_panel.export_enabled = false;
        match self.queue.request(range) {
            Some(range) => self.start_calculation(range),
            None => {
                debug!(%range, "Calculation running, range queued");
                self.control_panel
                    .set_progress(5.0, &format!("Queued {}...", range));
            }
        }
    }

    /// Start calculation in background thread
    fn start_calculation(&mut self, range: DateRange) {
        let dataset = Arc::clone(&self.dataset);
        let top_n = self.top_n;
        let tx = self.calc_tx.clone();

        self.control_panel
            .set_progress(5.0, &format!("Filtering {}...", range));

        thread::spawn(move || {
            let _ = tx.send(CalcResult::Progress(30.0, "Aggregating...".to_string()));
            let result = match ReportCalculator::compute_report(&dataset, range, top_n) {
                Ok(report) => CalcResult::Complete(Box::new(report)),
                Err(e) => CalcResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for calculation results; a queued range replaces the one just finished
    fn check_calculation_results(&mut self) {
        while let Ok(result) = self.calc_rx.try_recv() {
            match result {
                CalcResult::Progress(progress, status) => {
                    self.control_panel.set_progress(progress, &status);
                }
                CalcResult::Complete(report) => {
                    if let Some(next) = self.queue.finish() {
                        debug!(superseded = %report.range, %next, "Skipping superseded report");
                        self.start_calculation(next);
                        continue;
                    }
                    let status = if report.is_empty() {
                        "Complete! No orders in range".to_string()
                    } else {
                        format!("Complete! {} orders", report.order_count)
                    };
                    self.chart_viewer.set_report(*report);
                    self.control_panel.set_progress(100.0, &status);
                    self.control_panel.export_enabled = true;
                }
                CalcResult::Error(message) => {
                    error!(%message, "Report calculation failed");
                    if let Some(next) = self.queue.finish() {
                        self.start_calculation(next);
                        continue;
                    }
                    self.control_panel
                        .set_progress(0.0, &format!("Error: {}", message));
                    self.control_panel.export_enabled = self.chart_viewer.report.is_some();
                }
            }
        }
    }

    /// Handle report export - render charts and JSON into a chosen folder
    fn handle_export_report(&mut self) {
        let Some(report) = self.chart_viewer.report.clone() else {
            self.control_panel.set_progress(0.0, "No report to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_title("Export report to folder")
            .pick_folder()
        else {
            return; // User cancelled
        };

        self.control_panel.set_progress(50.0, "Exporting report...");
        match ReportExporter::export(&report, &dir) {
            Ok(files) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! Exported {} files", files.len()),
                );
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, dir = %dir.display(), "Could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "Export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_calculation_results();

        // Request repaint while calculating
        if self.queue.is_busy() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::PageChanged(MenuPage::FilterData) => {
                            info!("Filter Data page opened");
                            if self.chart_viewer.report.is_none() {
                                self.request_calculation(self.control_panel.selection.range());
                            }
                        }
                        ControlPanelAction::PageChanged(MenuPage::Home) => {}
                        ControlPanelAction::DateRangeChanged(range) => {
                            self.request_calculation(range);
                        }
                        ControlPanelAction::ExportReport => self.handle_export_report(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - selected page
        egui::CentralPanel::default().show(ctx, |ui| match self.control_panel.page {
            MenuPage::Home => self.chart_viewer.show_home(ui),
            MenuPage::FilterData => self.chart_viewer.show_report(ui),
        });
    }
}
