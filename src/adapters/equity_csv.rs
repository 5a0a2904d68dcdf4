//! Equity curve CSV export.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::ports::report_port::ReportPort;

pub const HEADER: [&str; 8] = [
    "date",
    "equity",
    "benchmark_equity",
    "position",
    "open_return",
    "strategy_return",
    "close",
    "sma",
];

pub struct EquityCsvExporter;

impl ReportPort for EquityCsvExporter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError> {
        let export_err = |reason: String| BacktestError::Export {
            path: output_path.display().to_string(),
            reason,
        };

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| export_err(e.to_string()))?;
        }

        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| export_err(e.to_string()))?;
        wtr.write_record(HEADER)
            .map_err(|e| export_err(e.to_string()))?;

        for p in result.equity_curve() {
            wtr.write_record([
                p.date.to_string(),
                p.equity.to_string(),
                p.benchmark_equity.to_string(),
                p.position.to_string(),
                p.open_return.to_string(),
                p.strategy_return.to_string(),
                p.close.to_string(),
                p.sma.to_string(),
            ])
            .map_err(|e| export_err(e.to_string()))?;
        }

        wtr.flush().map_err(|e| export_err(e.to_string()))?;
        Ok(())
    }
}
