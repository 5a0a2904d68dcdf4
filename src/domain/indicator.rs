//! Simple moving average over closing prices.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: the first (n-1) bars have no value.

use crate::domain::price::PriceBar;

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; bars.len()];
    }

    let warmup = period - 1;
    (0..bars.len())
        .map(|i| {
            if i < warmup {
                return None;
            }
            // Summing each window afresh keeps flat inputs exact.
            let window = &bars[i + 1 - period..=i];
            Some(window.iter().map(|b| b.close).sum::<f64>() / period as f64)
        })
        .collect()
}
