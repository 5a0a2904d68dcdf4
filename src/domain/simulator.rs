//! Return/equity simulation over the trailing backtest window.

use chrono::NaiveDate;

use crate::domain::error::BacktestError;
use crate::domain::price::years_before;
use crate::domain::signal::SignalRow;

/// Fewest rows with a defined moving average that still yield meaningful
/// metrics.
pub const MIN_WINDOW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub benchmark_equity: f64,
    pub position: u8,
    pub open_return: f64,
    pub strategy_return: f64,
    pub close: f64,
    pub sma: f64,
}

/// Rows dated within `years` of the last row that have a moving average.
pub fn restrict_to_window(
    symbol: &str,
    rows: &[SignalRow],
    years: u32,
) -> Result<Vec<SignalRow>, BacktestError> {
    let window: Vec<SignalRow> = match rows.last() {
        Some(last) => {
            let start = years_before(last.date, years);
            rows.iter()
                .filter(|r| r.date >= start && r.sma.is_some())
                .cloned()
                .collect()
        }
        None => Vec::new(),
    };

    if window.len() < MIN_WINDOW_ROWS {
        return Err(BacktestError::InsufficientData {
            symbol: symbol.to_string(),
            rows: window.len(),
            minimum: MIN_WINDOW_ROWS,
        });
    }
    Ok(window)
}

/// Compound `position * open_return` and the unconditional benchmark from
/// `initial_cash`. Rows without a next open are skipped, so both curves
/// share one date set.
pub fn simulate(window: &[SignalRow], initial_cash: f64) -> Vec<EquityPoint> {
    let mut growth = 1.0_f64;
    let mut benchmark_growth = 1.0_f64;

    window
        .iter()
        .filter_map(|row| {
            let open_return = row.open_return?;
            let strategy_return = f64::from(row.position) * open_return;
            growth *= 1.0 + strategy_return;
            benchmark_growth *= 1.0 + open_return;
            Some(EquityPoint {
                date: row.date,
                equity: initial_cash * growth,
                benchmark_equity: initial_cash * benchmark_growth,
                position: row.position,
                open_return,
                strategy_return,
                close: row.close,
                sma: row.sma.unwrap_or(f64::NAN),
            })
        })
        .collect()
}
