//! Chart Plotter Module
//! Creates interactive bar charts using egui_plot.

use crate::stats::{MonthlyCount, PaymentCount, ProductTrend};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

pub const PRIMARY_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Single-series color of the payment method chart.
pub const PAYMENT_COLOR: Color32 = PALETTE[3];

const CHART_HEIGHT: f32 = 320.0;

/// One named bar series; `values[i]` belongs to category `i`.
pub struct BarSeries<'a> {
    pub name: &'a str,
    pub values: &'a [u64],
    pub color: Color32,
}

/// Draws the dashboard charts with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th series of a grouped chart.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Offset of series `index` inside a group of `count` bars of `bar_width`.
    pub fn group_offset(index: usize, count: usize, bar_width: f64) -> f64 {
        (index as f64 - (count as f64 - 1.0) / 2.0) * bar_width
    }

    pub fn draw_monthly_trend(ui: &mut egui::Ui, trend: &[MonthlyCount]) {
        let months: Vec<String> = trend.iter().map(|m| m.month.clone()).collect();
        let counts: Vec<u64> = trend.iter().map(|m| m.orders).collect();

        Self::draw_bar_chart(
            ui,
            "monthly_trend",
            "Month",
            "Orders",
            &months,
            &[BarSeries {
                name: "Orders",
                values: &counts,
                color: PRIMARY_COLOR,
            }],
        );
    }

    pub fn draw_top_products(ui: &mut egui::Ui, trend: &ProductTrend) {
        let series: Vec<BarSeries<'_>> = trend
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| BarSeries {
                name: &s.label,
                values: &s.counts,
                color: Self::series_color(i),
            })
            .collect();

        Self::draw_bar_chart(ui, "top_products", "Month", "Purchases", &trend.months, &series);
    }

    pub fn draw_payment_methods(ui: &mut egui::Ui, payments: &[PaymentCount]) {
        let types: Vec<String> = payments.iter().map(|p| p.payment_type.clone()).collect();
        let counts: Vec<u64> = payments.iter().map(|p| p.count).collect();

        Self::draw_bar_chart(
            ui,
            "payment_methods",
            "Payment Method",
            "Transactions",
            &types,
            &[BarSeries {
                name: "Transactions",
                values: &counts,
                color: PAYMENT_COLOR,
            }],
        );
    }

    /// Grouped vertical bar chart with one tick per category.
    pub fn draw_bar_chart(
        ui: &mut egui::Ui,
        id: &str,
        x_label: &str,
        y_label: &str,
        categories: &[String],
        series: &[BarSeries<'_>],
    ) {
        if categories.is_empty() {
            ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No data in range").size(16.0).color(Color32::GRAY));
                });
            });
            return;
        }

        let labels = categories.to_vec();
        let tick_count = categories.len();
        let group_width = 0.8;
        let bar_width = group_width / series.len().max(1) as f64;

        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .include_y(0.0)
            .include_x(-0.5)
            .include_x(tick_count as f64 - 0.5)
            .x_grid_spacer(move |_input| {
                (0..tick_count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, s) in series.iter().enumerate() {
                    let offset = Self::group_offset(i, series.len(), bar_width);
                    let bars: Vec<Bar> = s
                        .values
                        .iter()
                        .enumerate()
                        .map(|(x, &v)| {
                            Bar::new(x as f64 + offset, v as f64)
                                .width(bar_width * 0.95)
                                .name(format!("{}: {}", categories[x], v))
                        })
                        .collect();

                    plot_ui.bar_chart(BarChart::new(bars).color(s.color).name(s.name));
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_offsets_are_centered() {
        assert_eq!(ChartPlotter::group_offset(0, 1, 0.8), 0.0);

        let offsets: Vec<f64> = (0..3).map(|i| ChartPlotter::group_offset(i, 3, 0.25)).collect();
        assert_eq!(offsets, vec![-0.25, 0.0, 0.25]);
    }

    #[test]
    fn series_colors_wrap_around_the_palette() {
        assert_eq!(ChartPlotter::series_color(0), ChartPlotter::series_color(PALETTE.len()));
    }
}
