//! Control Panel Widget
//! Left side panel with the page menu, the date-range picker and export.

use crate::data::DateRange;
use chrono::{Days, NaiveDate};
use egui::{Color32, RichText};

/// Dashboard page selected in the sidebar menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuPage {
    #[default]
    Home,
    FilterData,
}

/// Start and end of the selected range as day offsets from the first
/// purchase date, kept within `0..=span` and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSelection {
    bounds: DateRange,
    start_offset: u64,
    end_offset: u64,
}

impl DateSelection {
    /// Select the whole dataset span.
    pub fn full(bounds: DateRange) -> Self {
        Self {
            bounds,
            start_offset: 0,
            end_offset: bounds.span_days().max(0) as u64,
        }
    }

    pub fn span(&self) -> u64 {
        self.bounds.span_days().max(0) as u64
    }

    pub fn date_at(&self, offset: u64) -> NaiveDate {
        self.bounds
            .start()
            .checked_add_days(Days::new(offset.min(self.span())))
            .unwrap_or(self.bounds.end())
    }

    pub fn range(&self) -> DateRange {
        DateRange::spanning(self.date_at(self.start_offset), self.date_at(self.end_offset))
    }

    /// Move the start; drags the end along when it would cross it.
    pub fn set_start(&mut self, offset: u64) {
        self.start_offset = offset.min(self.span());
        if self.end_offset < self.start_offset {
            self.end_offset = self.start_offset;
        }
    }

    /// Move the end; drags the start along when it would cross it.
    pub fn set_end(&mut self, offset: u64) {
        self.end_offset = offset.min(self.span());
        if self.start_offset > self.end_offset {
            self.start_offset = self.end_offset;
        }
    }

    pub fn is_full(&self) -> bool {
        self.start_offset == 0 && self.end_offset == self.span()
    }
}

/// Left side control panel with navigation and filter controls.
pub struct ControlPanel {
    pub page: MenuPage,
    pub selection: DateSelection,
    /// Range last handed to the app for recalculation.
    committed: DateRange,
    pub data_dir: String,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(bounds: DateRange, data_dir: String) -> Self {
        Self {
            page: MenuPage::Home,
            selection: DateSelection::full(bounds),
            committed: bounds,
            data_dir,
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🛍 E-Commerce Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Sales analysis of e-commerce transactions")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Menu Section =====
        ui.label(RichText::new("📋 Menu").size(14.0).strong());
        ui.add_space(5.0);

        let previous = self.page;
        ui.radio_value(&mut self.page, MenuPage::Home, "Home");
        ui.radio_value(&mut self.page, MenuPage::FilterData, "Filter Data");
        if self.page != previous {
            action = ControlPanelAction::PageChanged(self.page);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        if self.page == MenuPage::FilterData {
            ui.label(RichText::new("📅 Date Range").size(14.0).strong());
            ui.add_space(8.0);

            let dragging = self.show_date_range(ui);
            if let Some(range) = self.settled_range(dragging) {
                action = ControlPanelAction::DateRangeChanged(range);
            }

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            ui.vertical_centered(|ui| {
                ui.add_enabled_ui(self.export_enabled, |ui| {
                    let button = egui::Button::new(RichText::new("📄 Export Report").size(14.0))
                        .min_size(egui::vec2(180.0, 30.0));
                    if ui.add(button).clicked() {
                        action = ControlPanelAction::ExportReport;
                    }
                });
            });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
        }

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.data_dir).size(12.0));
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Start/end sliders bounded by the dataset span. Returns true while
    /// either slider is being dragged.
    fn show_date_range(&mut self, ui: &mut egui::Ui) -> bool {
        let span = self.selection.span();
        let before = self.selection;
        let mut start = self.selection.start_offset;
        let mut end = self.selection.end_offset;

        let selection = self.selection;
        let format_offset = move |v: f64, _: std::ops::RangeInclusive<usize>| {
            selection.date_at(v.max(0.0) as u64).format("%Y-%m-%d").to_string()
        };

        let from = ui
            .horizontal(|ui| {
                ui.add_sized([40.0, 20.0], egui::Label::new("From:"));
                ui.add(
                    egui::Slider::new(&mut start, 0..=span)
                        .custom_formatter(format_offset)
                        .custom_parser(move |s| parse_offset(selection, s)),
                )
            })
            .inner;
        let to = ui
            .horizontal(|ui| {
                ui.add_sized([40.0, 20.0], egui::Label::new("To:"));
                ui.add(
                    egui::Slider::new(&mut end, 0..=span)
                        .custom_formatter(format_offset)
                        .custom_parser(move |s| parse_offset(selection, s)),
                )
            })
            .inner;

        if start != before.start_offset {
            self.selection.set_start(start);
        }
        if end != before.end_offset {
            self.selection.set_end(end);
        }

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            let range = self.selection.range();
            ui.label(
                RichText::new(format!("{} days selected", range.span_days() + 1))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.selection.is_full(), egui::Button::new("Reset"))
                    .clicked()
                {
                    self.selection = DateSelection::full(self.selection.bounds);
                }
            });
        });

        from.dragged() || to.dragged()
    }

    /// The selected range once it differs from the last committed one and no
    /// slider is mid-drag. Keyboard, typed and reset edits settle at once.
    fn settled_range(&mut self, dragging: bool) -> Option<DateRange> {
        let range = self.selection.range();
        if dragging || range == self.committed {
            return None;
        }
        self.committed = range;
        Some(range)
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Typed `YYYY-MM-DD` text back to a slider offset.
fn parse_offset(selection: DateSelection, text: &str) -> Option<f64> {
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()?;
    let offset = (date - selection.bounds.start()).num_days();
    Some(offset.clamp(0, selection.span() as i64) as f64)
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    PageChanged(MenuPage),
    DateRangeChanged(DateRange),
    ExportReport,
}
