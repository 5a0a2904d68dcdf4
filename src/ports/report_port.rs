//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use std::path::Path;

/// Port for writing a finished backtest to a file (equity export, chart).
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError>;
}
