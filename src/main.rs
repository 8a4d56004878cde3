//! E-Commerce Dashboard - Monthly trends, top products and payment methods
//!
//! Loads the cleaned transaction CSVs once, then serves an interactive
//! dashboard over the immutable snapshot.

use anyhow::{anyhow, Context};
use ecommerce_dashboard::config::AppConfig;
use ecommerce_dashboard::data::{DataLoader, DataProcessor};
use ecommerce_dashboard::gui::DashboardApp;
use ecommerce_dashboard::logging;
use ecommerce_dashboard::stats::ReportCalculator;
use eframe::egui;
use std::sync::Arc;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.log_filter);

    // Load the snapshot before any window opens; failures are fatal
    let loader = DataLoader::new(&config.data_dir);
    let dataset = loader
        .load()
        .inspect_err(|e| error!(error = %e, "Failed to load dataset"))
        .with_context(|| format!("loading data from {}", config.data_dir.display()))?;
    let summary = ReportCalculator::summarize(&dataset).context("summarizing dataset")?;
    let untranslated =
        DataProcessor::untranslated_products(&dataset).context("listing untranslated products")?;
    info!(
        orders = summary.total_orders,
        products = summary.total_products,
        customers = summary.total_customers,
        untranslated_products = untranslated.len(),
        "Starting dashboard"
    );

    let dataset = Arc::new(dataset);
    let data_dir = config.data_dir.clone();
    let top_n = config.top_n;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("E-Commerce Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "E-Commerce Dashboard",
        options,
        Box::new(move |cc| {
            Ok(Box::new(DashboardApp::new(
                cc, dataset, summary, data_dir, top_n,
            )))
        }),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
