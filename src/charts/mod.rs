//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{BarSeries, ChartPlotter};
pub use renderer::{StaticChartRenderer, StaticSeries};
