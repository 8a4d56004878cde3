//! Static Chart Renderer
//! Renders the dashboard bar charts to PNG files with plotters.
//!
//! Layout: caption on top, grouped bars with one slot per category, and a
//! legend in the upper right corner when more than one series is drawn.

use super::plotter::{ChartPlotter, PAYMENT_COLOR, PRIMARY_COLOR};
use crate::stats::{MonthlyCount, PaymentCount, ProductTrend};
use egui::Color32;
use plotters::prelude::*;
use std::path::Path;

const BAR_GROUP_WIDTH: f64 = 0.8;

/// PNG charts reuse the on-screen colors.
fn rgb(color: Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

/// A named series of bar heights, one per category.
pub struct StaticSeries<'a> {
    pub name: &'a str,
    pub values: &'a [u64],
    pub color: RGBColor,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    pub fn render_monthly_trend(
        trend: &[MonthlyCount],
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), String> {
        let months: Vec<String> = trend.iter().map(|m| m.month.clone()).collect();
        let counts: Vec<u64> = trend.iter().map(|m| m.orders).collect();
        Self::render_bar_chart(
            path,
            size,
            "Monthly Order Trend",
            ("Month", "Orders"),
            &months,
            &[StaticSeries {
                name: "Orders",
                values: &counts,
                color: rgb(PRIMARY_COLOR),
            }],
        )
    }

    pub fn render_top_products(
        trend: &ProductTrend,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), String> {
        let series: Vec<StaticSeries<'_>> = trend
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| StaticSeries {
                name: &s.label,
                values: &s.counts,
                color: rgb(ChartPlotter::series_color(i)),
            })
            .collect();
        Self::render_bar_chart(
            path,
            size,
            "Monthly Purchases of Top Products",
            ("Month", "Purchases"),
            &trend.months,
            &series,
        )
    }

    pub fn render_payment_methods(
        payments: &[PaymentCount],
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), String> {
        let types: Vec<String> = payments.iter().map(|p| p.payment_type.clone()).collect();
        let counts: Vec<u64> = payments.iter().map(|p| p.count).collect();
        Self::render_bar_chart(
            path,
            size,
            "Payment Method Distribution",
            ("Payment Method", "Transactions"),
            &types,
            &[StaticSeries {
                name: "Transactions",
                values: &counts,
                color: rgb(PAYMENT_COLOR),
            }],
        )
    }

    /// Draw a grouped bar chart into a PNG file.
    pub fn render_bar_chart(
        path: &Path,
        size: (u32, u32),
        title: &str,
        (x_desc, y_desc): (&str, &str),
        categories: &[String],
        series: &[StaticSeries<'_>],
    ) -> Result<(), String> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let y_max = series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let x_max = categories.len().max(1) as f64 - 0.5;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..x_max, 0f64..y_max * 1.1)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_labels(categories.len().max(1))
            .x_label_formatter(&|x| Self::category_label(categories, *x))
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()
            .map_err(|e| e.to_string())?;

        let bar_width = BAR_GROUP_WIDTH / series.len().max(1) as f64;
        for (i, s) in series.iter().enumerate() {
            let offset = (i as f64 - (series.len() as f64 - 1.0) / 2.0) * bar_width;
            let color = s.color;
            chart
                .draw_series(s.values.iter().enumerate().map(|(x, &v)| {
                    let left = x as f64 + offset - bar_width / 2.0;
                    Rectangle::new([(left, 0.0), (left + bar_width, v as f64)], color.filled())
                }))
                .map_err(|e| e.to_string())?
                .label(s.name)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Category name for an axis position; non-integral positions get no label.
    fn category_label(categories: &[String], x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        categories.get(idx as usize).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::plotter::PALETTE;

    fn channels(color: RGBColor) -> (u8, u8, u8) {
        (color.0, color.1, color.2)
    }

    #[test]
    fn png_colors_match_the_on_screen_palette() {
        assert_eq!(channels(rgb(PRIMARY_COLOR)), (52, 152, 219));
        assert_eq!(channels(rgb(PAYMENT_COLOR)), (243, 156, 18));
        for (i, color) in PALETTE.iter().enumerate() {
            let png = rgb(ChartPlotter::series_color(i));
            assert_eq!(channels(png), (color.r(), color.g(), color.b()));
        }
        // past the end the palette wraps, same as the interactive chart
        assert_eq!(
            channels(rgb(ChartPlotter::series_color(PALETTE.len() + 6))),
            channels(rgb(PALETTE[6]))
        );
    }

    #[test]
    fn category_labels_only_on_integral_ticks() {
        let cats = vec!["2024-01".to_string(), "2024-02".to_string()];
        assert_eq!(StaticChartRenderer::category_label(&cats, 0.0), "2024-01");
        assert_eq!(StaticChartRenderer::category_label(&cats, 1.0), "2024-02");
        assert_eq!(StaticChartRenderer::category_label(&cats, 0.5), "");
        assert_eq!(StaticChartRenderer::category_label(&cats, -0.5), "");
        assert_eq!(StaticChartRenderer::category_label(&cats, 2.0), "");
    }
}
