//! Charts module - SVG rendering of the dashboard panels

mod plotter;
mod renderer;

pub use plotter::{ChartKind, ChartPlotter, NO_DATA, PALETTE};
pub use renderer::{ChartError, StaticChartRenderer};
