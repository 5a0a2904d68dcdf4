//! INI file configuration adapter.
//!
//! Recognised sections are listed in [`SECTIONS`]; anything else is reported
//! by [`FileConfigAdapter::unknown_sections`] and otherwise ignored.

use std::path::Path;

use configparser::ini::Ini;

use crate::domain::error::BacktestError;
use crate::ports::config_port::ConfigPort;

pub const SECTIONS: [&str; 4] = ["backtest", "strategy", "data", "report"];

pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BacktestError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| BacktestError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, BacktestError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| BacktestError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }

    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { ini: Ini::new() }
    }

    /// Sections present in the file that no part of the backtest reads,
    /// sorted by name.
    pub fn unknown_sections(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .ini
            .sections()
            .into_iter()
            .filter(|s| !SECTIONS.contains(&s.as_str()))
            .collect();
        unknown.sort();
        unknown
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.value(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
symbol = QQQ
years = 10
initial_cash = 25000.0
strategy = buyback

[strategy]
ma_period = 150
wait_days = 7
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbol"),
            Some("QQQ".to_string())
        );
        assert_eq!(adapter.get_int("backtest", "years", 0), 10);
        assert_eq!(adapter.get_double("backtest", "initial_cash", 0.0), 25000.0);
        assert_eq!(adapter.get_int("strategy", "wait_days", 0), 7);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nyears = 5\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nma_period = abc\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "ma_period", 200), 200);
        assert_eq!(adapter.get_int("strategy", "wait_days", 10), 10);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_cash = lots\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_cash", 99.9), 99.9);
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol =\nyears = 3\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "symbol"), None);
        assert_eq!(adapter.get_int("backtest", "years", 5), 3);
    }

    #[test]
    fn unknown_sections_are_listed() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nyears = 3\n[zeta]\na = 1\n[database]\nurl = x\n[report]\ncsv_path = a.csv\n",
        )
        .unwrap();
        assert_eq!(adapter.unknown_sections(), vec!["database", "zeta"]);
    }

    #[test]
    fn empty_adapter_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("backtest", "symbol"), None);
        assert_eq!(adapter.get_int("backtest", "years", 5), 5);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\nchart_path = out/chart.svg\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "chart_path"),
            Some("out/chart.svg".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini")
            .err()
            .unwrap();
        assert!(matches!(err, BacktestError::ConfigParse { ref file, .. } if file.contains("config.ini")));
        assert_eq!(err.exit_status(), 2);
    }
}
