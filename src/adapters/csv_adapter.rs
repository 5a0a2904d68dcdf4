//! CSV file data adapter.
//!
//! Reads `<SYMBOL>.csv` from a directory. Header names are matched
//! case-insensitively (`Date`/`date`, `Open`/`OPEN`, ...) and extra columns
//! are ignored, so exports from most data vendors load unchanged. Rows whose
//! date does not parse (vendor `null` rows) are skipped.

use crate::domain::error::BacktestError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    close: usize,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn locate_columns(symbol: &str, headers: &csv::StringRecord) -> Result<Columns, BacktestError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    BacktestError::unavailable(symbol, format!("missing {} column", name))
                })
        };
        Ok(Columns {
            date: find("date")?,
            open: find("open")?,
            close: find("close")?,
        })
    }
}

/// Accepts `2024-01-02`, `2024-01-02 00:00:00` and `2024-01-02T00:00:00Z`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Blank or unparseable prices become NaN and are dropped by the loader.
fn parse_price(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

impl DataPort for CsvAdapter {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, BacktestError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            BacktestError::unavailable(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| BacktestError::unavailable(symbol, format!("CSV header error: {}", e)))?
            .clone();
        let cols = Self::locate_columns(symbol, &headers)?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| {
                BacktestError::unavailable(symbol, format!("CSV parse error: {}", e))
            })?;

            let date_str = record.get(cols.date).unwrap_or_default();
            let Some(date) = parse_date(date_str) else {
                skipped += 1;
                debug!(
                    symbol,
                    line = ?record.position().map(|p| p.line()),
                    date = date_str,
                    "skipping row with unparseable date"
                );
                continue;
            };

            if date < start || date > end {
                continue;
            }

            bars.push(PriceBar::new(
                date,
                parse_price(record.get(cols.open)),
                parse_price(record.get(cols.close)),
            ));
        }

        debug!(symbol, path = %path.display(), rows = bars.len(), skipped, "read CSV bars");
        Ok(bars)
    }
}
