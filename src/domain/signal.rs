//! Signal engine: moving-average flags, per-day position, open-to-open returns.
//!
//! A signal computed from day t's close is acted on at day t+1's open, so
//! `open_return[t]` is the return earned by holding `position[t]` from
//! Open[t] to Open[t+1]. The last row has no next open and no return.

use std::fmt;

use crate::domain::indicator::calculate_sma;
use crate::domain::price::PriceBar;

pub const DEFAULT_MA_PERIOD: usize = 200;
pub const DEFAULT_WAIT_DAYS: u32 = 10;

/// Which rotation rule drives the position column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Long the day after a close above the moving average.
    Ma200,
    /// Sell on a cross below, buy back on a cross above or after `wait_days`
    /// in cash.
    Buyback { wait_days: u32 },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Ma200 => "ma200",
            Strategy::Buyback { .. } => "buyback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Ma200 => write!(f, "MA200"),
            Strategy::Buyback { wait_days } => write!(f, "Buyback-{}", wait_days),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub date: chrono::NaiveDate,
    pub open: f64,
    pub close: f64,
    pub sma: Option<f64>,
    pub above_ma: bool,
    pub position: u8,
    pub next_open: Option<f64>,
    pub open_return: Option<f64>,
}

/// Holding state of the buyback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Holding {
    Cash,
    Long,
}

impl Holding {
    fn position(self) -> u8 {
        match self {
            Holding::Cash => 0,
            Holding::Long => 1,
        }
    }
}

pub fn compute_signals(bars: &[PriceBar], ma_period: usize, strategy: Strategy) -> Vec<SignalRow> {
    let sma = calculate_sma(bars, ma_period);
    let above: Vec<bool> = bars
        .iter()
        .zip(&sma)
        .map(|(bar, ma)| ma.is_some_and(|m| bar.close > m))
        .collect();

    let positions = match strategy {
        Strategy::Ma200 => lagged_positions(&above),
        Strategy::Buyback { wait_days } => buyback_positions(&above, wait_days),
    };

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let next_open = bars.get(i + 1).map(|b| b.open);
            SignalRow {
                date: bar.date,
                open: bar.open,
                close: bar.close,
                sma: sma[i],
                above_ma: above[i],
                position: positions[i],
                next_open,
                open_return: next_open.map(|n| n / bar.open - 1.0),
            }
        })
        .collect()
}

/// Position is yesterday's flag; the first day has none and stays in cash.
fn lagged_positions(above: &[bool]) -> Vec<u8> {
    let mut positions = Vec::with_capacity(above.len());
    if !above.is_empty() {
        positions.push(0);
    }
    positions.extend(above.windows(2).map(|w| u8::from(w[0])));
    positions
}

fn buyback_positions(above: &[bool], wait_days: u32) -> Vec<u8> {
    let mut positions = Vec::with_capacity(above.len());
    let mut holding = Holding::Cash;
    let mut days_since_sell = 0u32;

    for (i, &now_above) in above.iter().enumerate() {
        if i == 0 {
            positions.push(holding.position());
            continue;
        }
        let was_above = above[i - 1];
        let cross_up = now_above && !was_above;
        let cross_down = !now_above && was_above;

        match holding {
            Holding::Cash if cross_up || days_since_sell >= wait_days => {
                holding = Holding::Long;
                days_since_sell = 0;
            }
            Holding::Cash => days_since_sell += 1,
            Holding::Long if cross_down => {
                holding = Holding::Cash;
                days_since_sell = 1;
            }
            Holding::Long => days_since_sell = 0,
        }
        positions.push(holding.position());
    }
    positions
}
