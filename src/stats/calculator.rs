//! Report Calculator Module
//! Group-by aggregations behind the dashboard: monthly trend, top products
//! and payment method distribution.

use crate::data::loader::{
    Dataset, CATEGORY_EN, CUSTOMER_ID, ORDER_ID, PAYMENT_TYPE, PRODUCT_ID, PURCHASE_TS,
};
use crate::data::processor::{DataProcessor, DateRange, FilteredData, ReportError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info};

/// Default number of products in the top-product trend.
pub const DEFAULT_TOP_N: usize = 3;

/// Label used for payments without a type.
pub const UNDEFINED_PAYMENT: &str = "not_defined";

const MONTH: &str = "month";
const COUNT: &str = "count";

/// Whole-dataset counters shown on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_orders: usize,
    pub total_products: usize,
    pub total_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedProduct {
    pub product_id: String,
    pub category: String,
    pub purchases: u64,
}

/// One bar series of the top-product chart, aligned with `ProductTrend::months`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSeries {
    pub label: String,
    pub counts: Vec<u64>,
}

/// Month x category matrix for the most purchased products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTrend {
    pub ranking: Vec<RankedProduct>,
    pub months: Vec<String>,
    pub series: Vec<ProductSeries>,
}

impl ProductTrend {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCount {
    pub payment_type: String,
    pub count: u64,
}

/// Everything the "Filter Data" page shows for one date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub order_count: usize,
    pub item_count: usize,
    pub payment_count: usize,
    pub monthly_trend: Vec<MonthlyCount>,
    pub top_products: ProductTrend,
    pub payment_methods: Vec<PaymentCount>,
}

impl DashboardReport {
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }
}

/// Computes the dashboard views from the snapshot.
pub struct ReportCalculator;

impl ReportCalculator {
    /// Count orders, distinct products and distinct customers.
    pub fn summarize(dataset: &Dataset) -> Result<DatasetSummary, ReportError> {
        let total_products = dataset
            .products
            .column(PRODUCT_ID)?
            .as_materialized_series()
            .n_unique()?;
        let total_customers = dataset
            .orders
            .column(CUSTOMER_ID)?
            .as_materialized_series()
            .n_unique()?;

        Ok(DatasetSummary {
            total_orders: dataset.orders.height(),
            total_products,
            total_customers,
        })
    }

    /// Orders per calendar month, ascending; empty months are absent.
    pub fn monthly_trend(filtered: &FilteredData) -> Result<Vec<MonthlyCount>, ReportError> {
        let df = filtered
            .orders
            .clone()
            .lazy()
            .group_by([month_expr()])
            .agg([len().alias(COUNT)])
            .sort([MONTH], SortMultipleOptions::default())
            .collect()?;

        let months = string_values(&df, MONTH)?;
        let counts = count_values(&df, COUNT)?;
        Ok(months
            .into_iter()
            .zip(counts)
            .map(|(month, orders)| MonthlyCount { month, orders })
            .collect())
    }

    /// Monthly purchase counts of the `top_n` most purchased products.
    ///
    /// Products are ranked by purchases over the whole range, ties broken by
    /// product id. Series are keyed by English category name, so products in
    /// the same category share one series.
    pub fn top_product_trend(
        dataset: &Dataset,
        filtered: &FilteredData,
        top_n: usize,
    ) -> Result<ProductTrend, ReportError> {
        let purchases = filtered
            .order_items
            .clone()
            .lazy()
            .select([col(ORDER_ID), col(PRODUCT_ID)])
            .join(
                filtered
                    .orders
                    .clone()
                    .lazy()
                    .select([col(ORDER_ID), col(PURCHASE_TS)]),
                [col(ORDER_ID)],
                [col(ORDER_ID)],
                JoinArgs::new(JoinType::Left),
            )
            .join(
                dataset
                    .enriched_products
                    .clone()
                    .lazy()
                    .select([col(PRODUCT_ID), col(CATEGORY_EN)]),
                [col(PRODUCT_ID)],
                [col(PRODUCT_ID)],
                JoinArgs::new(JoinType::Left),
            )
            .filter(col(CATEGORY_EN).is_not_null())
            .with_column(month_expr());

        let ranking_df = purchases
            .clone()
            .group_by([col(PRODUCT_ID)])
            .agg([len().alias(COUNT), col(CATEGORY_EN).first()])
            .sort_by_exprs(
                [col(COUNT), col(PRODUCT_ID)],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            // IdxSize can be narrower than usize; saturate instead of wrapping
            .limit(IdxSize::try_from(top_n).unwrap_or(IdxSize::MAX))
            .collect()?;

        let ranking: Vec<RankedProduct> = string_values(&ranking_df, PRODUCT_ID)?
            .into_iter()
            .zip(string_values(&ranking_df, CATEGORY_EN)?)
            .zip(count_values(&ranking_df, COUNT)?)
            .map(|((product_id, category), purchases)| RankedProduct {
                product_id,
                category,
                purchases,
            })
            .collect();

        let monthly = purchases
            .join(
                ranking_df.lazy().select([col(PRODUCT_ID)]),
                [col(PRODUCT_ID)],
                [col(PRODUCT_ID)],
                JoinArgs::new(JoinType::Semi),
            )
            .group_by([col(CATEGORY_EN), col(MONTH)])
            .agg([len().alias(COUNT)])
            .collect()?;

        debug!(
            ranked = ranking.len(),
            cells = monthly.height(),
            "Top product aggregation"
        );

        let cells = string_values(&monthly, CATEGORY_EN)?
            .into_iter()
            .zip(string_values(&monthly, MONTH)?)
            .zip(count_values(&monthly, COUNT)?)
            .map(|((label, month), count)| (label, month, count));

        let (months, series) = pivot(cells);
        Ok(ProductTrend {
            ranking,
            months,
            series,
        })
    }

    /// Payments per payment type, largest first, ties broken by type name.
    pub fn payment_distribution(
        dataset: &Dataset,
        filtered: &FilteredData,
    ) -> Result<Vec<PaymentCount>, ReportError> {
        let df = filtered
            .payments
            .clone()
            .lazy()
            .select([col(ORDER_ID), col(PAYMENT_TYPE)])
            .join(
                dataset
                    .orders
                    .clone()
                    .lazy()
                    .select([col(ORDER_ID), col(PURCHASE_TS)]),
                [col(ORDER_ID)],
                [col(ORDER_ID)],
                JoinArgs::new(JoinType::Left),
            )
            .filter(filtered.range.purchase_predicate())
            .with_column(col(PAYMENT_TYPE).fill_null(lit(UNDEFINED_PAYMENT)))
            .group_by([col(PAYMENT_TYPE)])
            .agg([len().alias(COUNT)])
            .sort_by_exprs(
                [col(COUNT), col(PAYMENT_TYPE)],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;

        Ok(string_values(&df, PAYMENT_TYPE)?
            .into_iter()
            .zip(count_values(&df, COUNT)?)
            .map(|(payment_type, count)| PaymentCount {
                payment_type,
                count,
            })
            .collect())
    }

    /// Filter the snapshot and compute every view for one date range.
    pub fn compute_report(
        dataset: &Dataset,
        range: DateRange,
        top_n: usize,
    ) -> Result<DashboardReport, ReportError> {
        let started = Instant::now();
        let filtered = DataProcessor::filter_by_date_range(dataset, range)?;

        let report = DashboardReport {
            range,
            order_count: filtered.orders.height(),
            item_count: filtered.order_items.height(),
            payment_count: filtered.payments.height(),
            monthly_trend: Self::monthly_trend(&filtered)?,
            top_products: Self::top_product_trend(dataset, &filtered, top_n)?,
            payment_methods: Self::payment_distribution(dataset, &filtered)?,
        };

        info!(
            %range,
            orders = report.order_count,
            items = report.item_count,
            payments = report.payment_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Report computed"
        );
        Ok(report)
    }
}

fn month_expr() -> Expr {
    col(PURCHASE_TS).dt().strftime("%Y-%m").alias(MONTH)
}

/// Build the month x label matrix, filling missing cells with zero.
fn pivot(cells: impl Iterator<Item = (String, String, u64)>) -> (Vec<String>, Vec<ProductSeries>) {
    let mut months = BTreeSet::new();
    let mut by_label: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for (label, month, count) in cells {
        months.insert(month.clone());
        *by_label.entry(label).or_default().entry(month).or_default() += count;
    }

    let months: Vec<String> = months.into_iter().collect();
    let series = by_label
        .into_iter()
        .map(|(label, counts)| ProductSeries {
            counts: months
                .iter()
                .map(|m| counts.get(m).copied().unwrap_or(0))
                .collect(),
            label,
        })
        .collect();

    (months, series)
}

fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let series = df.column(name)?.as_materialized_series();
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

fn count_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<u64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    Ok(series.u64()?.into_iter().map(|v| v.unwrap_or(0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::CATEGORY;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    /// Three orders: two in January 2024, one in February 2024.
    fn three_orders() -> Dataset {
        let orders = df!(
            ORDER_ID => ["o1", "o2", "o3"],
            CUSTOMER_ID => ["c1", "c2", "c2"],
            PURCHASE_TS => ["2024-01-05 09:00:00", "2024-01-20 15:00:00", "2024-02-10 11:00:00"]
        )
        .unwrap();
        let items = df!(
            ORDER_ID => ["o1", "o2", "o3"],
            PRODUCT_ID => ["p1", "p1", "p2"]
        )
        .unwrap();
        let products = df!(
            PRODUCT_ID => ["p1", "p2"],
            CATEGORY => ["beleza_saude", "esporte_lazer"]
        )
        .unwrap();
        let translations = df!(
            CATEGORY => ["beleza_saude", "esporte_lazer"],
            CATEGORY_EN => ["health_beauty", "sports_leisure"]
        )
        .unwrap();
        let payments = df!(
            ORDER_ID => ["o1", "o2", "o3"],
            PAYMENT_TYPE => ["credit_card", "boleto", "credit_card"]
        )
        .unwrap();
        Dataset::from_frames(orders, items, products, translations, payments).unwrap()
    }

    /// Richer fixture for ranking: ties, shared categories and a product
    /// without a translation that would otherwise rank first.
    fn catalog() -> Dataset {
        let orders = df!(
            ORDER_ID => ["o1", "o2", "o3", "o4"],
            CUSTOMER_ID => ["c1", "c2", "c3", "c4"],
            PURCHASE_TS => [
                "2024-01-02 10:00:00",
                "2024-01-15 10:00:00",
                "2024-02-03 10:00:00",
                "2024-03-30 10:00:00"
            ]
        )
        .unwrap();
        let items = df!(
            ORDER_ID => [
                "o1", "o1", "o1", "o2", "o2", "o3", "o3", "o3", "o4", "o4", "o4", "o4"
            ],
            PRODUCT_ID => [
                "px", "px", "pb", "pa", "px", "pb", "pc", "pd", "px", "pa", "pd", "pc"
            ]
        )
        .unwrap();
        let products = df!(
            PRODUCT_ID => ["pa", "pb", "pc", "pd", "px"],
            CATEGORY => ["cama_mesa_banho", "cama_mesa_banho", "informatica", "brinquedos", "desconhecida"]
        )
        .unwrap();
        let translations = df!(
            CATEGORY => ["cama_mesa_banho", "informatica", "brinquedos"],
            CATEGORY_EN => ["bed_bath_table", "computers", "toys"]
        )
        .unwrap();
        let payments = df!(
            ORDER_ID => ["o1", "o2", "o3", "o4", "o4"],
            PAYMENT_TYPE => [Some("voucher"), Some("boleto"), Some("voucher"), None, Some("boleto")]
        )
        .unwrap();
        Dataset::from_frames(orders, items, products, translations, payments).unwrap()
    }

    fn filtered(ds: &Dataset, r: DateRange) -> FilteredData {
        DataProcessor::filter_by_date_range(ds, r).unwrap()
    }

    #[test]
    fn monthly_trend_for_january_only() {
        let ds = three_orders();
        let f = filtered(&ds, range(date(2024, 1, 1), date(2024, 1, 31)));

        let trend = ReportCalculator::monthly_trend(&f).unwrap();
        assert_eq!(
            trend,
            vec![MonthlyCount {
                month: "2024-01".into(),
                orders: 2
            }]
        );
    }

    #[test]
    fn monthly_trend_across_two_months() {
        let ds = three_orders();
        let f = filtered(&ds, range(date(2024, 1, 1), date(2024, 2, 29)));

        let trend = ReportCalculator::monthly_trend(&f).unwrap();
        let pairs: Vec<(&str, u64)> = trend.iter().map(|m| (m.month.as_str(), m.orders)).collect();
        assert_eq!(pairs, vec![("2024-01", 2), ("2024-02", 1)]);
    }

    #[test]
    fn monthly_trend_skips_empty_months() {
        let ds = catalog();
        let f = filtered(&ds, ds.date_bounds());

        let trend = ReportCalculator::monthly_trend(&f).unwrap();
        let months: Vec<&str> = trend.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
        let total: u64 = trend.iter().map(|m| m.orders).sum();
        assert_eq!(total as usize, f.orders.height());
    }

    #[test]
    fn ranking_drops_untranslated_and_breaks_ties_by_id() {
        let ds = catalog();
        let f = filtered(&ds, ds.date_bounds());

        let trend = ReportCalculator::top_product_trend(&ds, &f, DEFAULT_TOP_N).unwrap();
        // px has the most purchases but no English category
        let ids: Vec<&str> = trend.ranking.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["pa", "pb", "pc"]);
        assert!(trend.ranking.iter().all(|p| p.purchases == 2));
        assert!(trend.series.iter().all(|s| !s.label.is_empty()));
    }

    #[test]
    fn oversized_top_n_keeps_every_ranked_product() {
        let ds = catalog();

        for top_n in [(u32::MAX as usize).saturating_add(2), usize::MAX] {
            let report = ReportCalculator::compute_report(&ds, ds.date_bounds(), top_n).unwrap();
            let ids: Vec<&str> = report
                .top_products
                .ranking
                .iter()
                .map(|p| p.product_id.as_str())
                .collect();
            assert_eq!(ids, vec!["pa", "pb", "pc", "pd"]);
        }
    }

    #[test]
    fn products_sharing_a_category_collapse_into_one_series() {
        let ds = catalog();
        let f = filtered(&ds, ds.date_bounds());

        let trend = ReportCalculator::top_product_trend(&ds, &f, DEFAULT_TOP_N).unwrap();
        assert_eq!(trend.months, vec!["2024-01", "2024-02", "2024-03"]);

        let labels: Vec<&str> = trend.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["bed_bath_table", "computers"]);

        // pa (Jan, Mar) + pb (Jan, Feb)
        assert_eq!(trend.series[0].counts, vec![2, 1, 1]);
        // pc (Feb, Mar); January is zero-filled
        assert_eq!(trend.series[1].counts, vec![0, 1, 1]);
    }

    #[test]
    fn payment_distribution_orders_by_count_then_name() {
        let ds = catalog();
        let f = filtered(&ds, ds.date_bounds());

        let payments = ReportCalculator::payment_distribution(&ds, &f).unwrap();
        let pairs: Vec<(&str, u64)> = payments
            .iter()
            .map(|p| (p.payment_type.as_str(), p.count))
            .collect();
        assert_eq!(
            pairs,
            vec![("boleto", 2), ("voucher", 2), (UNDEFINED_PAYMENT, 1)]
        );
        let total: u64 = payments.iter().map(|p| p.count).sum();
        assert_eq!(total as usize, f.payments.height());
    }

    #[test]
    fn summary_counts_distinct_products_and_customers() {
        let ds = three_orders();
        let summary = ReportCalculator::summarize(&ds).unwrap();
        assert_eq!(
            summary,
            DatasetSummary {
                total_orders: 3,
                total_products: 2,
                total_customers: 2
            }
        );
    }

    #[test]
    fn full_range_report_covers_every_order() {
        let ds = catalog();
        let report = ReportCalculator::compute_report(&ds, ds.date_bounds(), DEFAULT_TOP_N).unwrap();

        assert_eq!(report.order_count, ds.orders.height());
        let monthly: u64 = report.monthly_trend.iter().map(|m| m.orders).sum();
        assert_eq!(monthly as usize, report.order_count);
        let paid: u64 = report.payment_methods.iter().map(|p| p.count).sum();
        assert_eq!(paid as usize, report.payment_count);
    }

    #[test]
    fn ranges_outside_the_span_produce_empty_views() {
        let ds = catalog();
        let before = range(date(2023, 1, 1), date(2023, 12, 31));
        let after = range(date(2024, 4, 1), date(2024, 12, 31));

        for r in [before, after] {
            let report = ReportCalculator::compute_report(&ds, r, DEFAULT_TOP_N).unwrap();
            assert!(report.is_empty());
            assert!(report.monthly_trend.is_empty());
            assert!(report.top_products.is_empty());
            assert!(report.top_products.ranking.is_empty());
            assert!(report.payment_methods.is_empty());
        }
    }

    #[test]
    fn pivot_fills_missing_cells() {
        let cells = vec![
            ("b".to_string(), "2024-02".to_string(), 4),
            ("a".to_string(), "2024-01".to_string(), 1),
        ];
        let (months, series) = pivot(cells.into_iter());
        assert_eq!(months, vec!["2024-01", "2024-02"]);
        assert_eq!(series[0].label, "a");
        assert_eq!(series[0].counts, vec![1, 0]);
        assert_eq!(series[1].counts, vec![0, 4]);
    }
}
