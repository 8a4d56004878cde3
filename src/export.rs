//! Report Export Module
//! Writes the current dashboard report to a directory: one PNG per chart
//! plus a JSON document with the underlying numbers.

use crate::charts::StaticChartRenderer;
use crate::stats::DashboardReport;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const MONTHLY_TREND_PNG: &str = "monthly_trend.png";
pub const TOP_PRODUCTS_PNG: &str = "top_products.png";
pub const PAYMENT_METHODS_PNG: &str = "payment_methods.png";
pub const REPORT_JSON: &str = "report.json";

const CHART_SIZE: (u32, u32) = (1200, 700);

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to render {chart}: {message}")]
    Render { chart: &'static str, message: String },
}

/// Exports dashboard reports as PNG charts and JSON.
pub struct ReportExporter;

impl ReportExporter {
    /// Write charts and JSON into `dir`, returning the written paths.
    pub fn export(report: &DashboardReport, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir)?;

        let monthly = dir.join(MONTHLY_TREND_PNG);
        StaticChartRenderer::render_monthly_trend(&report.monthly_trend, &monthly, CHART_SIZE)
            .map_err(|message| ExportError::Render {
                chart: MONTHLY_TREND_PNG,
                message,
            })?;

        let products = dir.join(TOP_PRODUCTS_PNG);
        StaticChartRenderer::render_top_products(&report.top_products, &products, CHART_SIZE)
            .map_err(|message| ExportError::Render {
                chart: TOP_PRODUCTS_PNG,
                message,
            })?;

        let payments = dir.join(PAYMENT_METHODS_PNG);
        StaticChartRenderer::render_payment_methods(&report.payment_methods, &payments, CHART_SIZE)
            .map_err(|message| ExportError::Render {
                chart: PAYMENT_METHODS_PNG,
                message,
            })?;

        let json = Self::write_json(report, dir)?;

        info!(dir = %dir.display(), range = %report.range, "Report exported");
        Ok(vec![monthly, products, payments, json])
    }

    /// Write `report.json` into `dir`.
    pub fn write_json(report: &DashboardReport, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_JSON);
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, report)?;
        Ok(path)
    }

    /// Read a report previously written by `write_json`.
    pub fn read_json(path: &Path) -> Result<DashboardReport, ExportError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DateRange;
    use crate::stats::{MonthlyCount, PaymentCount, ProductTrend};
    use chrono::NaiveDate;

    #[test]
    fn json_round_trips_report_fields() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap();
        let report = DashboardReport {
            range,
            order_count: 2,
            item_count: 3,
            payment_count: 2,
            monthly_trend: vec![MonthlyCount {
                month: "2024-01".into(),
                orders: 2,
            }],
            top_products: ProductTrend::default(),
            payment_methods: vec![PaymentCount {
                payment_type: "credit_card".into(),
                count: 2,
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = ReportExporter::write_json(&report, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), REPORT_JSON);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["range"]["start"], "2024-01-01");
        assert_eq!(raw["monthly_trend"][0]["month"], "2024-01");

        assert_eq!(ReportExporter::read_json(&path).unwrap(), report);
    }
}
