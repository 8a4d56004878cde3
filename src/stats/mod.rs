//! Stats module - dashboard aggregations

mod calculator;

pub use calculator::{
    DashboardReport, DatasetSummary, MonthlyCount, PaymentCount, ProductSeries, ProductTrend,
    RankedProduct, ReportCalculator, DEFAULT_TOP_N, UNDEFINED_PAYMENT,
};
