//! Plain-text backtest summary.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::signal::Strategy;

/// `$1,234,567.89`; negative values keep the sign ahead of the symbol.
pub fn format_currency(value: f64) -> String {
    let cents = format!("{:.2}", value.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}

pub fn format_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn title(result: &BacktestResult) -> String {
    match result.strategy() {
        Strategy::Ma200 => format!("MA{} Backtest", result.ma_period()),
        Strategy::Buyback { wait_days } => {
            format!("Buyback-{} Strategy (MA{})", wait_days, result.ma_period())
        }
    }
}

/// Confirmation line printed after an output file is written.
pub fn format_saved(what: &str, path: &Path) -> String {
    format!("{} saved to {}", what, path.display())
}

pub fn format_summary(result: &BacktestResult) -> String {
    let m = result.metrics();
    let months = (m.elapsed_years * 12.0).floor() as i64;

    let mut lines = vec![format!("=== {} Summary ===", title(result))];
    lines.push(format!("Symbol:           {}", result.symbol()));
    lines.push(format!("MA Period:        {}", result.ma_period()));
    if let Strategy::Buyback { wait_days } = result.strategy() {
        lines.push(format!("Wait Days:        {}", wait_days));
    }
    lines.push(format!(
        "Period:           {} to {} (~{} months)",
        result.start(),
        result.end(),
        months
    ));
    lines.push(format!(
        "Initial:          {}",
        format_currency(result.initial_cash())
    ));
    lines.push(format!(
        "Final:            {}",
        format_currency(result.final_value())
    ));
    lines.push(format!("Total Return:     {}", format_pct(m.total_return)));
    lines.push(format!("CAGR:             {}", format_pct(m.cagr)));
    lines.push(format!("Max Drawdown:     {}", format_pct(m.max_drawdown)));
    lines.push(format!("Trades:           {}", m.trades));
    lines.push(format!(
        "Benchmark Final:  {}",
        format_currency(result.benchmark_final())
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
