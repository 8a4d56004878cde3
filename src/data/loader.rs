//! CSV Data Loader Module
//! Reads the five cleaned transaction tables with Polars and freezes them
//! into an immutable `Dataset` snapshot.

use crate::data::processor::{DataProcessor, DateRange};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

pub const ORDER_ID: &str = "order_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const PURCHASE_TS: &str = "order_purchase_timestamp";
pub const PRODUCT_ID: &str = "product_id";
pub const CATEGORY: &str = "product_category_name";
pub const CATEGORY_EN: &str = "product_category_name_english";
pub const PAYMENT_TYPE: &str = "payment_type";

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: &'static str, column: &'static str },
    #[error("order_purchase_timestamp has unsupported type {0}")]
    InvalidTimestamp(DataType),
    #[error("Orders table contains no purchase dates")]
    NoOrders,
}

/// One of the five input tables, with the columns the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Orders,
    OrderItems,
    Products,
    CategoryTranslation,
    Payments,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Orders,
        Table::OrderItems,
        Table::Products,
        Table::CategoryTranslation,
        Table::Payments,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            Table::Orders => "orders_cleaned",
            Table::OrderItems => "order_items_cleaned",
            Table::Products => "products_cleaned",
            Table::CategoryTranslation => "product_category_cleaned",
            Table::Payments => "order_payments_cleaned",
        }
    }

    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Table::Orders => &[ORDER_ID, CUSTOMER_ID, PURCHASE_TS],
            Table::OrderItems => &[ORDER_ID, PRODUCT_ID],
            Table::Products => &[PRODUCT_ID, CATEGORY],
            Table::CategoryTranslation => &[CATEGORY, CATEGORY_EN],
            Table::Payments => &[ORDER_ID, PAYMENT_TYPE],
        }
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.csv", self.file_stem()))
    }
}

/// Immutable snapshot of every table, built once per process.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub orders: DataFrame,
    pub order_items: DataFrame,
    pub products: DataFrame,
    pub payments: DataFrame,
    /// Products left-joined with their English category name.
    pub enriched_products: DataFrame,
    bounds: DateRange,
}

impl Dataset {
    /// Validate raw frames and build the snapshot.
    ///
    /// The translation table is only needed to build `enriched_products`.
    pub fn from_frames(
        orders: DataFrame,
        order_items: DataFrame,
        products: DataFrame,
        translations: DataFrame,
        payments: DataFrame,
    ) -> Result<Self, LoaderError> {
        let orders = normalize(orders, Table::Orders)?;
        let order_items = normalize(order_items, Table::OrderItems)?;
        let products = normalize(products, Table::Products)?;
        let translations = normalize(translations, Table::CategoryTranslation)?;
        let payments = normalize(payments, Table::Payments)?;

        let orders = parse_purchase_timestamp(orders)?;
        let bounds = purchase_date_bounds(&orders)?.ok_or(LoaderError::NoOrders)?;
        let enriched_products = DataProcessor::enrich_products(&products, &translations)?;

        debug!(
            products = products.height(),
            enriched = enriched_products.height(),
            "Enriched product categories"
        );

        Ok(Self {
            orders,
            order_items,
            products,
            payments,
            enriched_products,
            bounds,
        })
    }

    /// Earliest and latest purchase date in the orders table.
    pub fn date_bounds(&self) -> DateRange {
        self.bounds
    }
}

/// Loads the cleaned CSV files from a data directory.
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load a single CSV file using Polars.
    pub fn load_csv(&self, table: Table) -> Result<DataFrame, LoaderError> {
        let path = table.path_in(&self.data_dir);
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path));
        }

        let df = LazyCsvReader::new(&path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        info!(path = %path.display(), rows = df.height(), "Loaded CSV");
        Ok(df)
    }

    /// Read all five tables (in parallel) and build the snapshot.
    pub fn load(&self) -> Result<Dataset, LoaderError> {
        let started = Instant::now();

        let ((orders, order_items), (products, (translations, payments))) = rayon::join(
            || {
                rayon::join(
                    || self.load_csv(Table::Orders),
                    || self.load_csv(Table::OrderItems),
                )
            },
            || {
                rayon::join(
                    || self.load_csv(Table::Products),
                    || {
                        rayon::join(
                            || self.load_csv(Table::CategoryTranslation),
                            || self.load_csv(Table::Payments),
                        )
                    },
                )
            },
        );

        let dataset =
            Dataset::from_frames(orders?, order_items?, products?, translations?, payments?)?;

        let bounds = dataset.date_bounds();
        info!(
            dir = %self.data_dir.display(),
            orders = dataset.orders.height(),
            first = %bounds.start(),
            last = %bounds.end(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dataset snapshot ready"
        );
        Ok(dataset)
    }
}

/// Check required columns and cast them to strings (timestamp excluded).
fn normalize(df: DataFrame, table: Table) -> Result<DataFrame, LoaderError> {
    for &column in table.required_columns() {
        if df.get_column_index(column).is_none() {
            return Err(LoaderError::MissingColumn {
                file: table.file_stem(),
                column,
            });
        }
    }

    let casts: Vec<Expr> = table
        .required_columns()
        .iter()
        .filter(|&&c| c != PURCHASE_TS)
        .map(|&c| col(c).cast(DataType::String))
        .collect();

    Ok(df.lazy().with_columns(casts).collect()?)
}

fn parse_purchase_timestamp(orders: DataFrame) -> Result<DataFrame, LoaderError> {
    let dtype = orders.column(PURCHASE_TS)?.dtype().clone();
    match dtype {
        DataType::Datetime(_, _) => Ok(orders),
        DataType::String => {
            let parsed = orders
                .lazy()
                .with_column(col(PURCHASE_TS).str().to_datetime(
                    Some(TimeUnit::Microseconds),
                    None,
                    StrptimeOptions::default(),
                    lit("raise"),
                ))
                .collect()?;
            Ok(parsed)
        }
        other => Err(LoaderError::InvalidTimestamp(other)),
    }
}

fn purchase_date_bounds(orders: &DataFrame) -> Result<Option<DateRange>, LoaderError> {
    let bounds = orders
        .clone()
        .lazy()
        .select([
            col(PURCHASE_TS).dt().date().min().alias("first"),
            col(PURCHASE_TS).dt().date().max().alias("last"),
        ])
        .collect()?;

    let first = date_value(&bounds, "first")?;
    let last = date_value(&bounds, "last")?;
    Ok(first.zip(last).map(|(start, end)| DateRange::spanning(start, end)))
}

/// Read the first value of a `Date` column as a `NaiveDate`.
fn date_value(df: &DataFrame, name: &str) -> Result<Option<NaiveDate>, LoaderError> {
    let days = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .get(0)
        .and_then(|d| NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)))
}
