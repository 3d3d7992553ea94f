//! Charts module - Chart rendering

mod renderer;

pub use renderer::{
    BarColors, StaticChartRenderer, CORRELATION_CHART, CORRELATION_TABLE, IMPORTANCE_CHART,
    IMPROVE_CHART,
};
