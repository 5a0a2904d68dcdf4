//! Daily price bars and the data loader stage.
//!
//! A [`PriceSeries`] is the only input to the signal engine. Its invariant is
//! that dates are strictly increasing and every price is finite; adapters
//! may hand back anything, normalization happens here.

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::domain::error::BacktestError;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self { date, open, close }
    }

    fn is_complete(&self) -> bool {
        self.open.is_finite() && self.close.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from raw adapter output: incomplete rows are dropped,
    /// bars sorted ascending, and later duplicates of a date discarded.
    pub fn from_raw(symbol: &str, mut bars: Vec<PriceBar>) -> Self {
        bars.retain(PriceBar::is_complete);
        // stable sort keeps the first occurrence of a date ahead of later ones
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.to_string(),
            bars,
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Number of calendar years fetched for a backtest of `years`: one extra
/// year warms up the moving average, and never less than two.
pub fn fetch_span_years(years: u32) -> u32 {
    years.saturating_add(1).max(2)
}

/// `date` shifted back by whole calendar years. Feb 29 clamps to Feb 28.
pub fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

/// Data loader stage: fetch enough history for `years` of backtest ending at
/// `today` and normalize it.
pub fn load_price_series(
    port: &dyn DataPort,
    symbol: &str,
    years: u32,
    today: NaiveDate,
) -> Result<PriceSeries, BacktestError> {
    let start = years_before(today, fetch_span_years(years));
    debug!(symbol, %start, %today, "fetching daily bars");

    let raw = port.fetch_daily_bars(symbol, start, today)?;
    let fetched = raw.len();
    let series = PriceSeries::from_raw(symbol, raw);

    if series.is_empty() {
        return Err(BacktestError::unavailable(
            symbol,
            format!("no usable rows between {start} and {today}"),
        ));
    }

    debug!(
        symbol,
        fetched,
        kept = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "normalized price series"
    );
    Ok(series)
}
