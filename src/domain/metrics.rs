//! Performance metrics derived from the equity curve.

use super::simulator::EquityPoint;

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub period_days: i64,
    pub elapsed_years: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub trades: u32,
}

impl Metrics {
    /// `positions` is the full position column of the backtest window,
    /// including the final row that has no return.
    pub fn compute(equity_curve: &[EquityPoint], positions: &[u8]) -> Self {
        let (total_return, period_days) = match (equity_curve.first(), equity_curve.last()) {
            (Some(first), Some(last)) => (
                last.equity / first.equity - 1.0,
                (last.date - first.date).num_days(),
            ),
            _ => (0.0, 0),
        };
        let elapsed_years = period_days as f64 / DAYS_PER_YEAR;
        let equity: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();

        Metrics {
            total_return,
            period_days,
            elapsed_years,
            cagr: cagr(total_return, elapsed_years),
            max_drawdown: max_drawdown(&equity),
            trades: count_trades(positions),
        }
    }
}

/// Compound annual growth rate; 0 for a degenerate window.
pub fn cagr(total_return: f64, elapsed_years: f64) -> f64 {
    if elapsed_years > 0.0 {
        (1.0 + total_return).powf(1.0 / elapsed_years) - 1.0
    } else {
        0.0
    }
}

/// Deepest fall from a running peak, as a non-positive fraction.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &value in equity {
        peak = peak.max(value);
        worst = worst.min(value / peak - 1.0);
    }
    worst
}

/// Each 0→1 or 1→0 change counts as one trade.
pub fn count_trades(positions: &[u8]) -> u32 {
    positions
        .windows(2)
        .map(|w| u32::from(w[0].abs_diff(w[1])))
        .sum()
}
