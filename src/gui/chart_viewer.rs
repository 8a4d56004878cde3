//! Chart Viewer Widget
//! Central scrollable panel: the home page summary and the filtered
//! report cards and charts.

use crate::charts::ChartPlotter;
use crate::stats::{DashboardReport, DatasetSummary};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 15.0;
const CARD_ACCENT: Color32 = Color32::from_rgb(100, 149, 237);

/// Central display area for the selected page.
pub struct ChartViewer {
    pub summary: DatasetSummary,
    pub report: Option<DashboardReport>,
}

impl ChartViewer {
    pub fn new(summary: DatasetSummary) -> Self {
        Self {
            summary,
            report: None,
        }
    }

    pub fn set_report(&mut self, report: DashboardReport) {
        self.report = Some(report);
    }

    /// Draw the welcome text and whole-dataset counters.
    pub fn show_home(&self, ui: &mut egui::Ui) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("👋 Welcome to the E-Commerce Dashboard!").size(24.0));
                ui.add_space(8.0);
                ui.label("This dashboard visualises and analyses e-commerce transaction data:");
                ui.label("  • 📈 Monthly sales trend");
                ui.label("  • 🔥 Most popular products");
                ui.label("  • 💳 Most used payment methods");
                ui.add_space(10.0);

                egui::Frame::none()
                    .fill(Color32::from_rgb(30, 60, 90))
                    .rounding(5.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new("Tip: open 'Filter Data' in the menu to start exploring.")
                                .color(Color32::WHITE),
                        );
                    });

                ui.add_space(20.0);
                ui.label(RichText::new("📌 Dataset Summary").size(18.0).strong());
                ui.add_space(10.0);

                let summary = self.summary;
                ui.columns(3, |cols| {
                    Self::metric_card(&mut cols[0], "Total Orders", summary.total_orders);
                    Self::metric_card(&mut cols[1], "Products", summary.total_products);
                    Self::metric_card(&mut cols[2], "Customers", summary.total_customers);
                });
            });
    }

    /// Draw the metric cards and the three charts of the current report.
    pub fn show_report(&self, ui: &mut egui::Ui) {
        let Some(report) = &self.report else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Calculating...").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("Filter E-Commerce Data").size(24.0));
                ui.label(
                    RichText::new(format!("Range: {}", report.range))
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(10.0);

                ui.columns(3, |cols| {
                    Self::metric_card(&mut cols[0], "Orders", report.order_count);
                    Self::metric_card(&mut cols[1], "Items", report.item_count);
                    Self::metric_card(&mut cols[2], "Payments", report.payment_count);
                });

                ui.add_space(CARD_SPACING);
                Self::chart_card(ui, "📈 Monthly Sales Trend", |ui| {
                    ChartPlotter::draw_monthly_trend(ui, &report.monthly_trend);
                });

                ui.add_space(CARD_SPACING);
                Self::chart_card(ui, "🔥 Monthly Trend of Top Products", |ui| {
                    if !report.top_products.ranking.is_empty() {
                        let ranking: Vec<String> = report
                            .top_products
                            .ranking
                            .iter()
                            .map(|p| format!("{} ({}, {})", p.category, p.product_id, p.purchases))
                            .collect();
                        ui.label(
                            RichText::new(format!("Top products: {}", ranking.join(" · ")))
                                .size(11.0)
                                .color(Color32::GRAY),
                        );
                    }
                    ChartPlotter::draw_top_products(ui, &report.top_products);
                });

                ui.add_space(CARD_SPACING);
                Self::chart_card(ui, "💳 Payment Method Distribution", |ui| {
                    ChartPlotter::draw_payment_methods(ui, &report.payment_methods);
                });
            });
    }

    fn metric_card(ui: &mut egui::Ui, title: &str, value: usize) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, CARD_ACCENT))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(13.0).color(Color32::GRAY));
                ui.label(RichText::new(format_thousands(value)).size(26.0).strong());
            });
    }

    fn chart_card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(18.0).strong().color(CARD_ACCENT));
                ui.add_space(8.0);
                add_contents(ui);
            });
    }
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
