//! Concrete adapter implementations for ports.

#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
pub mod csv_adapter;
pub mod equity_csv;
pub mod file_config_adapter;
pub mod svg_chart;
pub mod text_report;
