//! Price data access port trait.

use crate::domain::error::BacktestError;
use crate::domain::price::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily Open/Close bars for `symbol` dated within `[start, end]`.
    /// Order and completeness are not guaranteed; the loader normalizes.
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError>;
}
