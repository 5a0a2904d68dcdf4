//! Configuration validation.
//!
//! Validates every config field before a backtest runs. Missing keys are
//! fine (defaults apply); present keys must parse and be in range.

use crate::domain::error::BacktestError;
use crate::ports::config_port::ConfigPort;

pub const STRATEGIES: [&str; 2] = ["ma200", "buyback"];
pub const DATA_SOURCES: [&str; 2] = ["yahoo", "csv"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_symbol(config)?;
    validate_positive_int(config, "backtest", "years")?;
    validate_initial_cash(config)?;
    validate_choice(config, "backtest", "strategy", &STRATEGIES)?;
    validate_positive_int(config, "strategy", "ma_period")?;
    validate_positive_int(config, "strategy", "wait_days")?;
    validate_data_source(config)?;
    Ok(())
}

fn key_name(section: &str, key: &str) -> String {
    format!("[{}] {}", section, key)
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if s.trim().is_empty() => Err(BacktestError::InvalidParameter {
            name: key_name("backtest", "symbol"),
            reason: "symbol must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), BacktestError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 1 => Ok(()),
        Ok(_) => Err(BacktestError::InvalidParameter {
            name: key_name(section, key),
            reason: format!("{} must be >= 1", key),
        }),
        Err(_) => Err(BacktestError::InvalidParameter {
            name: key_name(section, key),
            reason: format!("{} must be an integer, got '{}'", key, raw),
        }),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let Some(raw) = config.get_string("backtest", "initial_cash") else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(BacktestError::InvalidParameter {
            name: key_name("backtest", "initial_cash"),
            reason: format!("initial_cash must be a positive number, got '{}'", raw),
        }),
    }
}

fn validate_choice(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    choices: &[&str],
) -> Result<(), BacktestError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    let value = raw.trim().to_lowercase();
    if choices.contains(&value.as_str()) {
        Ok(())
    } else {
        Err(BacktestError::InvalidParameter {
            name: key_name(section, key),
            reason: format!("expected one of {}, got '{}'", choices.join(", "), raw),
        })
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_choice(config, "data", "source", &DATA_SOURCES)?;
    let is_csv = config
        .get_string("data", "source")
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("csv"));
    let has_dir = config
        .get_string("data", "dir")
        .is_some_and(|d| !d.trim().is_empty());
    if is_csv && !has_dir {
        return Err(BacktestError::InvalidParameter {
            name: key_name("data", "dir"),
            reason: "dir is required when source = csv".to_string(),
        });
    }
    Ok(())
}
