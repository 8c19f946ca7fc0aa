//! Renderers
//!
//! Pure functions from fetched data to HTML markup. Nothing here touches
//! controller state or performs I/O; the same input always yields the same
//! markup.

pub mod chart;
pub mod format;
pub mod tables;
pub mod widgets;

pub use chart::{ChartConfig, ChartHandle, ChartHost, ChartRegistry, ChartSlot, MemoryChartHost};
pub use format::{escape, format_date, format_number, UNKNOWN};
pub use widgets::ActivityFilter;
