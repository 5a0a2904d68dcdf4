//! Backtest orchestration: loader → signals → window → simulator → metrics.
//!
//! BacktestConfig carries the run parameters; BacktestResult is the immutable
//! record handed to reporters.

use chrono::NaiveDate;
use tracing::info;

use crate::domain::error::BacktestError;
use crate::domain::metrics::Metrics;
use crate::domain::price::{load_price_series, PriceSeries};
use crate::domain::signal::{compute_signals, Strategy, DEFAULT_MA_PERIOD};
use crate::domain::simulator::{restrict_to_window, simulate, EquityPoint};
use crate::ports::data_port::DataPort;

pub const DEFAULT_SYMBOL: &str = "SPY";
pub const DEFAULT_YEARS: u32 = 5;
pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub years: u32,
    pub initial_cash: f64,
    pub ma_period: usize,
    pub strategy: Strategy,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            years: DEFAULT_YEARS,
            initial_cash: DEFAULT_INITIAL_CASH,
            ma_period: DEFAULT_MA_PERIOD,
            strategy: Strategy::Ma200,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.symbol.trim().is_empty() {
            return Err(BacktestError::invalid("symbol", "symbol must not be empty"));
        }
        if self.years < 1 {
            return Err(BacktestError::invalid("years", "years must be >= 1"));
        }
        if !(self.initial_cash.is_finite() && self.initial_cash > 0.0) {
            return Err(BacktestError::invalid(
                "initial_cash",
                "initial_cash must be > 0",
            ));
        }
        if self.ma_period < 1 {
            return Err(BacktestError::invalid("ma_period", "ma_period must be >= 1"));
        }
        if matches!(self.strategy, Strategy::Buyback { wait_days } if wait_days < 1) {
            return Err(BacktestError::invalid("wait_days", "wait_days must be >= 1"));
        }
        Ok(())
    }
}

/// Outcome of one backtest run. Fields are private so the record cannot be
/// altered once built.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    symbol: String,
    strategy: Strategy,
    ma_period: usize,
    start: NaiveDate,
    end: NaiveDate,
    initial_cash: f64,
    final_value: f64,
    benchmark_final: f64,
    metrics: Metrics,
    equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn ma_period(&self) -> usize {
        self.ma_period
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn final_value(&self) -> f64 {
        self.final_value
    }

    pub fn benchmark_final(&self) -> f64 {
        self.benchmark_final
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }
}

/// Run the pure simulation core over an already-loaded series.
pub fn backtest_series(
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;

    let rows = compute_signals(series.bars(), config.ma_period, config.strategy);
    let window = restrict_to_window(&series.symbol, &rows, config.years)?;
    let equity_curve = simulate(&window, config.initial_cash);

    let (first, last) = match (equity_curve.first(), equity_curve.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return Err(BacktestError::InsufficientData {
                symbol: series.symbol.clone(),
                rows: 0,
                minimum: crate::domain::simulator::MIN_WINDOW_ROWS,
            });
        }
    };

    let positions: Vec<u8> = window.iter().map(|r| r.position).collect();
    let metrics = Metrics::compute(&equity_curve, &positions);

    Ok(BacktestResult {
        symbol: series.symbol.clone(),
        strategy: config.strategy,
        ma_period: config.ma_period,
        start: first.date,
        end: last.date,
        initial_cash: config.initial_cash,
        final_value: last.equity,
        benchmark_final: last.benchmark_equity,
        metrics,
        equity_curve,
    })
}

/// Full pipeline: validate, fetch through `data_port`, simulate.
pub fn run_backtest(
    data_port: &dyn DataPort,
    config: &BacktestConfig,
    today: NaiveDate,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;

    let series = load_price_series(data_port, &config.symbol, config.years, today)?;
    info!(
        symbol = %series.symbol,
        bars = series.len(),
        strategy = config.strategy.name(),
        label = %config.strategy,
        "running backtest"
    );

    let result = backtest_series(&series, config)?;
    info!(
        start = %result.start,
        end = %result.end,
        points = result.equity_curve.len(),
        trades = result.metrics.trades,
        "backtest complete"
    );
    Ok(result)
}
