//! E-Commerce Dashboard - transaction CSV analysis with interactive charts.
//!
//! The library holds the data pipeline (load, filter, aggregate, export)
//! and the egui front end; `main.rs` wires them together.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod gui;
pub mod logging;
pub mod stats;
