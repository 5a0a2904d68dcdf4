//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::equity_csv::EquityCsvExporter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart::SvgChartAdapter;
use crate::adapters::text_report::{format_saved, format_summary};
use crate::domain::backtest::{
    self as backtest_engine, BacktestConfig, DEFAULT_INITIAL_CASH, DEFAULT_SYMBOL, DEFAULT_YEARS,
};
use crate::domain::config_validation::validate_config;
use crate::domain::error::BacktestError;
use crate::domain::signal::{Strategy, DEFAULT_MA_PERIOD, DEFAULT_WAIT_DAYS};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "ma200", about = "Moving-average long/cash rotation backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and print the summary
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
        /// Read `<SYMBOL>.csv` from this directory instead of Yahoo
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Write the equity curve as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write a three-panel SVG chart
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    #[arg(long, value_parser = ["ma200", "buyback"])]
    pub strategy: Option<String>,
    #[arg(long)]
    pub symbol: Option<String>,
    #[arg(long)]
    pub years: Option<u32>,
    #[arg(long)]
    pub initial_cash: Option<f64>,
    #[arg(long)]
    pub ma_period: Option<usize>,
    #[arg(long)]
    pub wait_days: Option<u32>,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            overrides,
            data_dir,
            csv,
            chart,
        } => run_backtest(
            config.as_ref(),
            &overrides,
            data_dir.as_ref(),
            csv.as_deref(),
            chart.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    overrides: &Overrides,
    data_dir: Option<&PathBuf>,
    csv_path: Option<&Path>,
    chart_path: Option<&Path>,
) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match config_path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            }
        }
        None => FileConfigAdapter::empty(),
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Resolve parameters
    let bt_config = match build_backtest_config(&adapter, overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Resolve data source and report outputs
    let data_port = match select_data_port(&adapter, data_dir) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let csv_path = csv_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "csv_path").map(PathBuf::from));
    let chart_path = chart_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "chart_path").map(PathBuf::from));

    let today = chrono::Local::now().date_naive();
    run_backtest_pipeline(
        data_port.as_ref(),
        &bt_config,
        today,
        csv_path.as_deref(),
        chart_path.as_deref(),
    )
}

/// Merge defaults, config file values, and command-line overrides (in
/// increasing precedence) into a validated [`BacktestConfig`].
pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<BacktestConfig, BacktestError> {
    let symbol = overrides
        .symbol
        .clone()
        .or_else(|| adapter.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

    let years = match overrides.years {
        Some(y) => y,
        None => config_int(adapter, "backtest", "years", i64::from(DEFAULT_YEARS))?,
    };
    let initial_cash = overrides
        .initial_cash
        .unwrap_or_else(|| adapter.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH));
    let ma_period = match overrides.ma_period {
        Some(p) => p,
        None => config_int(adapter, "strategy", "ma_period", DEFAULT_MA_PERIOD as i64)?,
    };
    let wait_days = match overrides.wait_days {
        Some(w) => w,
        None => config_int(adapter, "strategy", "wait_days", i64::from(DEFAULT_WAIT_DAYS))?,
    };

    let strategy_name = overrides
        .strategy
        .clone()
        .or_else(|| adapter.get_string("backtest", "strategy"))
        .unwrap_or_else(|| "ma200".to_string());
    let strategy = match strategy_name.trim().to_lowercase().as_str() {
        "ma200" => Strategy::Ma200,
        "buyback" => Strategy::Buyback { wait_days },
        other => {
            return Err(BacktestError::InvalidParameter {
                name: "strategy".into(),
                reason: format!("unknown strategy '{}'", other),
            });
        }
    };

    let config = BacktestConfig {
        symbol,
        years,
        initial_cash,
        ma_period,
        strategy,
    };
    config.validate()?;
    Ok(config)
}

fn config_int<T: TryFrom<i64>>(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<T, BacktestError> {
    let value = adapter.get_int(section, key, default);
    T::try_from(value).map_err(|_| BacktestError::InvalidParameter {
        name: format!("[{}] {}", section, key),
        reason: format!("{} is out of range: {}", key, value),
    })
}

/// A `--data-dir` flag wins; otherwise `[data] source` picks CSV or Yahoo.
pub fn select_data_port(
    adapter: &dyn ConfigPort,
    data_dir: Option<&PathBuf>,
) -> Result<Box<dyn DataPort>, BacktestError> {
    if let Some(dir) = data_dir {
        return Ok(Box::new(CsvAdapter::new(dir.clone())));
    }

    let source = adapter
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "yahoo".to_string());

    match source.as_str() {
        "csv" => {
            let dir = adapter
                .get_string("data", "dir")
                .ok_or_else(|| BacktestError::InvalidParameter {
                    name: "[data] dir".into(),
                    reason: "dir is required when source = csv".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        _ => yahoo_port(),
    }
}

#[cfg(feature = "yahoo")]
fn yahoo_port() -> Result<Box<dyn DataPort>, BacktestError> {
    let adapter = crate::adapters::yahoo_adapter::YahooAdapter::new()?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "yahoo"))]
fn yahoo_port() -> Result<Box<dyn DataPort>, BacktestError> {
    Err(BacktestError::InvalidParameter {
        name: "[data] source".into(),
        reason: "built without the `yahoo` feature; use --data-dir or source = csv".into(),
    })
}

/// Run the backtest, print the summary, then write the optional CSV and
/// chart. A chart failure is reported but does not fail the run.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    today: NaiveDate,
    csv_path: Option<&Path>,
    chart_path: Option<&Path>,
) -> ExitCode {
    let result = match backtest_engine::run_backtest(data_port, bt_config, today) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print!("{}", format_summary(&result));

    if let Some(path) = csv_path {
        if let Err(e) = EquityCsvExporter.write(&result, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        println!("{}", format_saved("Equity curve", path));
    }

    if let Some(path) = chart_path {
        match SvgChartAdapter.write(&result, path) {
            Ok(()) => println!("{}", format_saved("Chart", path)),
            Err(e) => {
                warn!(error = %e, "chart skipped");
                eprintln!("Chart rendering failed: {e}");
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    for section in adapter.unknown_sections() {
        warn!(section = %section, "ignoring unknown config section");
    }

    match build_backtest_config(&adapter, &Overrides::default()) {
        Ok(c) => {
            eprintln!(
                "Config OK: {} ({}) on {}, {} years, initial {:.2}, MA{}",
                c.strategy.name(),
                c.strategy,
                c.symbol,
                c.years,
                c.initial_cash,
                c.ma_period
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
