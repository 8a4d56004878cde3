//! Data Processor Module
//! Category enrichment and date-range filtering of the snapshot.

use crate::data::loader::{Dataset, CATEGORY, CATEGORY_EN, ORDER_ID, PRODUCT_ID, PURCHASE_TS};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering both dates, whichever order they come in.
    pub fn spanning(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days between start and end.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Predicate selecting rows whose purchase date lies in the range.
    pub fn purchase_predicate(&self) -> Expr {
        let date = col(PURCHASE_TS).dt().date();
        date.clone()
            .gt_eq(lit(self.start))
            .and(date.lt_eq(lit(self.end)))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Orders in a date range plus the items and payments that belong to them.
#[derive(Debug, Clone)]
pub struct FilteredData {
    pub range: DateRange,
    pub orders: DataFrame,
    pub order_items: DataFrame,
    pub payments: DataFrame,
}

/// Handles joins and filtering on the snapshot tables.
pub struct DataProcessor;

impl DataProcessor {
    /// Left-join products with their English category name.
    ///
    /// Products without a translation keep a null `product_category_name_english`.
    pub fn enrich_products(
        products: &DataFrame,
        translations: &DataFrame,
    ) -> PolarsResult<DataFrame> {
        products
            .clone()
            .lazy()
            .join(
                translations
                    .clone()
                    .lazy()
                    .select([col(CATEGORY), col(CATEGORY_EN)]),
                [col(CATEGORY)],
                [col(CATEGORY)],
                JoinArgs::new(JoinType::Left),
            )
            .collect()
    }

    /// Filter orders by purchase date and keep only the items and payments
    /// whose order survived.
    pub fn filter_by_date_range(
        dataset: &Dataset,
        range: DateRange,
    ) -> Result<FilteredData, ReportError> {
        let orders = dataset
            .orders
            .clone()
            .lazy()
            .filter(range.purchase_predicate())
            .collect()?;

        let order_items = Self::restrict_to_orders(&dataset.order_items, &orders)?;
        let payments = Self::restrict_to_orders(&dataset.payments, &orders)?;

        Ok(FilteredData {
            range,
            orders,
            order_items,
            payments,
        })
    }

    /// Keep rows of `df` whose order_id appears in `orders`.
    fn restrict_to_orders(df: &DataFrame, orders: &DataFrame) -> PolarsResult<DataFrame> {
        df.clone()
            .lazy()
            .join(
                orders.clone().lazy().select([col(ORDER_ID)]),
                [col(ORDER_ID)],
                [col(ORDER_ID)],
                JoinArgs::new(JoinType::Semi),
            )
            .collect()
    }

    /// Distinct values of a string column, sorted.
    pub fn unique_strings(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
        let unique = df.column(column)?.unique()?;
        let mut values: Vec<String> = unique
            .as_materialized_series()
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        values.sort();
        Ok(values)
    }

    /// Products whose category has no English translation.
    pub fn untranslated_products(dataset: &Dataset) -> PolarsResult<Vec<String>> {
        let untranslated = dataset
            .enriched_products
            .clone()
            .lazy()
            .filter(col(CATEGORY_EN).is_null())
            .select([col(PRODUCT_ID)])
            .collect()?;
        Self::unique_strings(&untranslated, PRODUCT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{CUSTOMER_ID, PAYMENT_TYPE};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let orders = df!(
            ORDER_ID => ["o1", "o2", "o3"],
            CUSTOMER_ID => ["c1", "c2", "c1"],
            PURCHASE_TS => ["2024-01-05 08:00:00", "2024-01-20 12:30:00", "2024-02-10 23:59:59"]
        )
        .unwrap();
        let items = df!(
            ORDER_ID => ["o1", "o1", "o2", "o3", "ghost"],
            PRODUCT_ID => ["p1", "p2", "p1", "p3", "p1"]
        )
        .unwrap();
        let products = df!(
            PRODUCT_ID => ["p1", "p2", "p3"],
            CATEGORY => ["beleza_saude", "esporte_lazer", "sem_traducao"]
        )
        .unwrap();
        let translations = df!(
            CATEGORY => ["beleza_saude", "esporte_lazer"],
            CATEGORY_EN => ["health_beauty", "sports_leisure"]
        )
        .unwrap();
        let payments = df!(
            ORDER_ID => ["o1", "o2", "o2", "o3"],
            PAYMENT_TYPE => ["credit_card", "voucher", "credit_card", "boleto"]
        )
        .unwrap();
        Dataset::from_frames(orders, items, products, translations, payments).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ReportError::InvertedRange { .. }));
        assert!(DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn spanning_orders_its_endpoints() {
        let range = DateRange::spanning(date(2024, 3, 1), date(2024, 1, 1));
        assert_eq!(range.start(), date(2024, 1, 1));
        assert_eq!(range.span_days(), 60);
        assert_eq!(range.end(), date(2024, 3, 1));
    }

    #[test]
    fn enrichment_keeps_untranslated_products() {
        let ds = dataset();
        assert_eq!(ds.enriched_products.height(), 3);
        assert_eq!(ds.enriched_products.column(CATEGORY_EN).unwrap().null_count(), 1);
        assert_eq!(
            DataProcessor::untranslated_products(&ds).unwrap(),
            vec!["p3".to_string()]
        );
    }

    #[test]
    fn unique_strings_reports_bad_columns() {
        let ds = dataset();
        assert!(DataProcessor::unique_strings(&ds.orders, "no_such_column").is_err());
        // timestamps are not strings
        assert!(DataProcessor::unique_strings(&ds.orders, PURCHASE_TS).is_err());
    }

    #[test]
    fn full_span_keeps_every_order() {
        let ds = dataset();
        let filtered = DataProcessor::filter_by_date_range(&ds, ds.date_bounds()).unwrap();
        assert_eq!(filtered.orders.height(), ds.orders.height());
        // "ghost" references no order and is dropped
        assert_eq!(filtered.order_items.height(), 4);
        assert_eq!(filtered.payments.height(), 4);
    }

    #[test]
    fn range_bounds_are_inclusive_on_dates() {
        let ds = dataset();
        let range = DateRange::new(date(2024, 1, 20), date(2024, 2, 10)).unwrap();
        let filtered = DataProcessor::filter_by_date_range(&ds, range).unwrap();

        assert_eq!(
            DataProcessor::unique_strings(&filtered.orders, ORDER_ID).unwrap(),
            vec!["o2".to_string(), "o3".to_string()]
        );
        assert_eq!(
            DataProcessor::unique_strings(&filtered.order_items, ORDER_ID).unwrap(),
            vec!["o2".to_string(), "o3".to_string()]
        );
        assert_eq!(filtered.payments.height(), 3);
    }

    #[test]
    fn range_outside_span_is_empty() {
        let ds = dataset();
        let range = DateRange::new(date(2023, 1, 1), date(2023, 12, 31)).unwrap();
        let filtered = DataProcessor::filter_by_date_range(&ds, range).unwrap();

        assert_eq!(filtered.orders.height(), 0);
        assert_eq!(filtered.order_items.height(), 0);
        assert_eq!(filtered.payments.height(), 0);
    }
}
