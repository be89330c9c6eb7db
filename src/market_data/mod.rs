pub mod bar;
pub mod chart;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Series`).
pub use bar::{Bar, Series};
pub use chart::ChartClient;
