//! Three-panel SVG chart: equity vs benchmark, close vs SMA, position.

use std::fs;
use std::path::Path;

use crate::adapters::text_report::title;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::domain::simulator::EquityPoint;
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 1000.0;
const PADDING: f64 = 50.0;
const PANEL_GAP: f64 = 30.0;
// 3:2:1 height ratio
const PANEL_HEIGHTS: [f64; 3] = [300.0, 200.0, 100.0];

const EQUITY_COLOR: &str = "#2E86DE";
const BENCHMARK_COLOR: &str = "#7F8C8D";
const CLOSE_COLOR: &str = "#3498DB";
const SMA_COLOR: &str = "#E74C3C";
const POSITION_COLOR: &str = "#27AE60";

struct Panel {
    top: f64,
    height: f64,
}

impl Panel {
    fn plot_width() -> f64 {
        WIDTH - 2.0 * PADDING
    }

    fn x(&self, i: usize, n: usize) -> f64 {
        if n > 1 {
            PADDING + i as f64 * Self::plot_width() / (n - 1) as f64
        } else {
            PADDING
        }
    }

    fn y(&self, value: f64, min: f64, max: f64) -> f64 {
        let range = max - min;
        let frac = if range > 0.0 { (value - min) / range } else { 0.5 };
        self.top + self.height - frac * self.height
    }

    fn frame(&self, label: &str) -> String {
        format!(
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#cccccc"/>
<text x="{:.1}" y="{:.1}" font-size="12" fill="#333333">{}</text>
"##,
            PADDING,
            self.top,
            Self::plot_width(),
            self.height,
            PADDING,
            self.top - 6.0,
            escape(label)
        )
    }

    fn polyline(&self, values: &[f64], min: f64, max: f64, color: &str, dashed: bool) -> String {
        let n = values.len();
        let points: Vec<String> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| format!("{:.1},{:.1}", self.x(i, n), self.y(v, min, max)))
            .collect();
        let dash = if dashed { r#" stroke-dasharray="6,4""# } else { "" };
        format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{} points="{}"/>
"#,
            color,
            dash,
            points.join(" ")
        )
    }

    fn step_path(&self, values: &[f64], color: &str) -> String {
        let n = values.len();
        let mut d = String::new();
        for (i, &v) in values.iter().enumerate() {
            let x = self.x(i, n);
            let y = self.y(v, -0.1, 1.1);
            if i == 0 {
                d.push_str(&format!("M{:.1},{:.1}", x, y));
            } else {
                // horizontal then vertical: the value holds until the next day
                d.push_str(&format!(" H{:.1} V{:.1}", x, y));
            }
        }
        format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="2"/>
"#,
            d, color
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn bounds<'a>(series: impl IntoIterator<Item = &'a [f64]>) -> (f64, f64) {
    series
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn legend(x: f64, y: f64, entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, (label, color))| {
            let ly = y + 14.0 * i as f64;
            format!(
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="2"/>
<text x="{:.1}" y="{:.1}" font-size="11">{}</text>
"#,
                x,
                ly,
                x + 18.0,
                ly,
                color,
                x + 24.0,
                ly + 4.0,
                escape(label)
            )
        })
        .collect()
}

/// Render the chart as a standalone SVG document.
pub fn render_svg(result: &BacktestResult) -> Result<String, BacktestError> {
    let curve: &[EquityPoint] = result.equity_curve();
    if curve.is_empty() {
        return Err(BacktestError::RenderingUnavailable {
            reason: "no equity data to plot".to_string(),
        });
    }

    let equity: Vec<f64> = curve.iter().map(|p| p.equity).collect();
    let benchmark: Vec<f64> = curve.iter().map(|p| p.benchmark_equity).collect();
    let close: Vec<f64> = curve.iter().map(|p| p.close).collect();
    let sma: Vec<f64> = curve.iter().map(|p| p.sma).collect();
    let position: Vec<f64> = curve.iter().map(|p| f64::from(p.position)).collect();

    let mut top = PADDING;
    let panels: Vec<Panel> = PANEL_HEIGHTS
        .iter()
        .map(|&height| {
            let panel = Panel { top, height };
            top += height + PANEL_GAP;
            panel
        })
        .collect();
    let total_height = top - PANEL_GAP + PADDING;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" font-family="sans-serif">
<rect width="100%" height="100%" fill="white"/>
<text x="{:.1}" y="24" font-size="16" font-weight="bold">{} - {}: {} to {}</text>
"#,
        WIDTH,
        total_height,
        WIDTH,
        total_height,
        PADDING,
        escape(&title(result)),
        escape(result.symbol()),
        result.start(),
        result.end()
    );

    let (lo, hi) = bounds([equity.as_slice(), benchmark.as_slice()]);
    svg.push_str(&panels[0].frame("Equity ($)"));
    svg.push_str(&panels[0].polyline(&benchmark, lo, hi, BENCHMARK_COLOR, false));
    svg.push_str(&panels[0].polyline(&equity, lo, hi, EQUITY_COLOR, false));
    svg.push_str(&legend(
        PADDING + 10.0,
        panels[0].top + 14.0,
        &[
            ("Strategy Equity", EQUITY_COLOR),
            ("Benchmark (Buy&Hold)", BENCHMARK_COLOR),
        ],
    ));

    let (lo, hi) = bounds([close.as_slice(), sma.as_slice()]);
    let sma_label = format!("SMA{}", result.ma_period());
    svg.push_str(&panels[1].frame("Price ($)"));
    svg.push_str(&panels[1].polyline(&close, lo, hi, CLOSE_COLOR, false));
    svg.push_str(&panels[1].polyline(&sma, lo, hi, SMA_COLOR, true));
    svg.push_str(&legend(
        PADDING + 10.0,
        panels[1].top + 14.0,
        &[("Close Price", CLOSE_COLOR), (sma_label.as_str(), SMA_COLOR)],
    ));

    svg.push_str(&panels[2].frame("Position"));
    svg.push_str(&panels[2].step_path(&position, POSITION_COLOR));

    svg.push_str("</svg>\n");
    Ok(svg)
}

pub struct SvgChartAdapter;

impl ReportPort for SvgChartAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError> {
        let svg = render_svg(result)?;
        let unavailable = |e: std::io::Error| BacktestError::RenderingUnavailable {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        };
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }
        fs::write(output_path, svg).map_err(unavailable)
    }
}
