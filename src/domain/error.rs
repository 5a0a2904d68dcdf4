//! Domain error types.

/// Top-level error type for a backtest run. Every variant is terminal for
/// the current run; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("no data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("insufficient data for {symbol}: have {rows} rows after warm-up, need {minimum}")]
    InsufficientData {
        symbol: String,
        rows: usize,
        minimum: usize,
    },

    #[error("chart rendering unavailable: {reason}")]
    RenderingUnavailable { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("failed to export equity curve to {path}: {reason}")]
    Export { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        BacktestError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        BacktestError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. } | BacktestError::InvalidParameter { .. } => 2,
            BacktestError::DataUnavailable { .. } | BacktestError::InsufficientData { .. } => 5,
            BacktestError::Export { .. } | BacktestError::RenderingUnavailable { .. } => 6,
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
