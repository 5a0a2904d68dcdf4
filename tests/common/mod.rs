#![allow(dead_code)]

use chrono::NaiveDate;
use ma200::domain::backtest::BacktestConfig;
use ma200::domain::error::BacktestError;
pub use ma200::domain::price::PriceBar;
use ma200::domain::signal::Strategy;
use ma200::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory `DataPort`. Returns the stored bars inside the requested range
/// and records every request it receives.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), start, end));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day from `start`, open equal to close.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(start + chrono::Duration::days(i as i64), c, c))
        .collect()
}

/// `n` daily bars drifting by `step` per day with a small zig-zag so the
/// price crosses its average from time to time.
pub fn generate_bars(start: NaiveDate, n: usize, base: f64, step: f64) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let wobble = if (i / 7) % 2 == 0 { 3.0 } else { -3.0 };
            let close = base + step * i as f64 + wobble;
            let open = close - 0.5;
            PriceBar::new(start + chrono::Duration::days(i as i64), open, close)
        })
        .collect()
}

/// Flat at `low`, then `high` from day `jump_at` on.
pub fn flat_then_jump(start: NaiveDate, n: usize, jump_at: usize, low: f64, high: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..n).map(|i| if i < jump_at { low } else { high }).collect();
    bars_from_closes(start, &closes)
}

pub fn last_date(bars: &[PriceBar]) -> NaiveDate {
    bars.last().map(|b| b.date).unwrap()
}

pub fn sample_config(strategy: Strategy) -> BacktestConfig {
    BacktestConfig {
        symbol: "SPY".into(),
        years: 1,
        initial_cash: 10_000.0,
        ma_period: 20,
        strategy,
    }
}
