//! Configuration management for salesq
//!
//! Settings come from several layers, each overriding the last: built-in
//! defaults, the first configuration file found in the standard locations,
//! `SALESQ_*` environment variables, an explicit `--config` file and finally
//! command-line flags.

use crate::cli::CliConfig;
use salesq_core::error::{Error, Result};
use salesq_core::{LoadOptions, ReportOptions};
use salesq_render::{DashboardOptions, ExportOptions};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 4] = ["salesq.toml", ".salesq.toml", "salesq.yaml", ".salesq.yaml"];

/// Main configuration structure for salesq
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset location and parsing
    pub input: InputConfig,
    /// Text report listing sizes
    pub report: ReportConfig,
    /// Dashboard view listing sizes
    pub dashboard: DashboardConfig,
    /// Chart export settings
    pub export: ExportConfig,
    /// Debug and diagnostic configuration
    pub debug: DebugConfig,
}

/// Dataset location and parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// CSV file read when `--input` is not given
    pub path: PathBuf,
    /// Field separator, a single character
    pub separator: String,
    /// `chrono` format of Order Date and Ship Date
    pub date_format: String,
    /// Refuse inputs with more data rows than this
    pub max_rows: Option<usize>,
}

/// Text report listing sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_subcategories: usize,
    pub top_states: usize,
    pub top_months: usize,
    pub top_customers: usize,
    pub top_products: usize,
    pub overview_top: usize,
    pub label_width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub top_products: usize,
    pub top_rankings: usize,
}

/// Chart export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the SVG grids are written to
    pub out_dir: PathBuf,
    pub histogram_bins: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

/// Debug and diagnostic configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// 0 = warnings, 1 = info, 2 = debug, 3+ = trace
    pub verbosity: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        let load = LoadOptions::default();
        Self {
            path: PathBuf::from("train.csv"),
            separator: char::from(load.separator).to_string(),
            date_format: load.date_format,
            max_rows: load.max_rows,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        let report = ReportOptions::default();
        Self {
            top_subcategories: report.top_subcategories,
            top_states: report.top_states,
            top_months: report.top_months,
            top_customers: report.top_customers,
            top_products: report.top_products,
            overview_top: report.overview_top,
            label_width: report.label_width,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let dashboard = DashboardOptions::default();
        Self {
            top_products: dashboard.top_products,
            top_rankings: dashboard.top_rankings,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        let export = ExportOptions::default();
        Self {
            out_dir: export.out_dir,
            histogram_bins: export.histogram_bins,
            chart_width: export.chart_width,
            chart_height: export.chart_height,
        }
    }
}

impl Config {
    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    /// Load configuration from the standard file locations and the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        let current_dir = std::env::current_dir().ok();
        if let Some(path) = Self::find_config_file(current_dir.as_deref(), dirs::home_dir()) {
            log::debug!("Using config file {}", path.display());
            config.merge_file(&path)?;
        }

        config.merge_env()?;
        Ok(config)
    }

    /// Find a configuration file: current directory, then home, then `/etc/salesq`
    pub(crate) fn find_config_file(
        current_dir: Option<&Path>,
        home: Option<PathBuf>,
    ) -> Option<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = current_dir {
            candidates.push(dir.to_path_buf());
        }
        if let Some(home) = home {
            candidates.push(home.join(".config").join("salesq"));
            candidates.push(home);
        }
        candidates.push(PathBuf::from("/etc/salesq"));

        candidates
            .iter()
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
            .find(|path| path.is_file())
    }

    /// Merge configuration from a TOML or YAML file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        if content.trim().is_empty() && matches!(extension, "toml" | "yaml" | "yml") {
            return Ok(());
        }

        let layer: Value = match extension {
            "toml" => toml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid TOML config: {e}")))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid YAML config: {e}")))?,
            _ => return Err(Error::config("Unsupported config file format")),
        };
        self.merge(layer)
    }

    fn merge_env(&mut self) -> Result<()> {
        self.merge_env_with_reader(|key| std::env::var(key).ok())
    }

    /// Merge `SALESQ_*` environment variables read through `env_reader`
    fn merge_env_with_reader<F>(&mut self, env_reader: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env_reader("SALESQ_INPUT") {
            self.input.path = PathBuf::from(val);
        }
        if let Some(val) = env_reader("SALESQ_SEPARATOR") {
            self.input.separator = val;
        }
        if let Some(val) = env_reader("SALESQ_DATE_FORMAT") {
            self.input.date_format = val;
        }
        if let Some(val) = env_reader("SALESQ_MAX_ROWS") {
            self.input.max_rows = Some(parse_number("SALESQ_MAX_ROWS", &val)?);
        }
        if let Some(val) = env_reader("SALESQ_LABEL_WIDTH") {
            self.report.label_width = parse_number("SALESQ_LABEL_WIDTH", &val)?;
        }
        if let Some(val) = env_reader("SALESQ_OUT_DIR") {
            self.export.out_dir = PathBuf::from(val);
        }
        if let Some(val) = env_reader("SALESQ_HISTOGRAM_BINS") {
            self.export.histogram_bins = parse_number("SALESQ_HISTOGRAM_BINS", &val)?;
        }

        // An unparseable verbosity falls back to the default
        if let Some(val) = env_reader("SALESQ_VERBOSITY") {
            self.debug.verbosity = val.parse().unwrap_or(DebugConfig::default().verbosity);
        }

        Ok(())
    }

    /// Lay a parsed file over this config
    ///
    /// Every key present in `layer` wins, including one that repeats the
    /// built-in default; keys it leaves out keep their current value.
    fn merge(&mut self, layer: Value) -> Result<()> {
        // A YAML document holding only `~` or `null`
        if layer.is_null() {
            return Ok(());
        }

        let mut merged = serde_json::to_value(&*self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;
        merge_value(&mut merged, layer);
        *self = serde_json::from_value(merged)
            .map_err(|e| Error::config(format!("Invalid config value: {e}")))?;
        Ok(())
    }

    /// Apply command-line flags, the highest-priority layer
    pub fn apply_cli(&mut self, cli_config: &CliConfig) {
        if let Some(input) = &cli_config.input {
            self.input.path.clone_from(input);
        }
        if let Some(sep) = &cli_config.separator {
            self.input.separator.clone_from(sep);
        }
        if let Some(format) = &cli_config.date_format {
            self.input.date_format.clone_from(format);
        }
        if cli_config.max_rows.is_some() {
            self.input.max_rows = cli_config.max_rows;
        }

        // --top resizes every listing of the key insights report
        if let Some(top) = cli_config.top {
            self.report.top_subcategories = top;
            self.report.top_states = top;
            self.report.top_months = top;
            self.report.top_customers = top;
            self.report.top_products = top;
        }
        if let Some(width) = cli_config.label_width {
            self.report.label_width = width;
        }

        if let Some(dir) = &cli_config.out_dir {
            self.export.out_dir.clone_from(dir);
        }
        if let Some(bins) = cli_config.histogram_bins {
            self.export.histogram_bins = bins;
        }

        if cli_config.verbose > 0 {
            self.debug.verbosity = cli_config.verbose;
        }
    }

    /// Loader options; the separator must be a single byte
    pub fn to_load_options(&self) -> Result<LoadOptions> {
        let separator = match self.input.separator.as_bytes() {
            [byte] => *byte,
            _ if self.input.separator == "\\t" => b'\t',
            _ => {
                return Err(Error::config(format!(
                    "CSV separator must be a single character, got {:?}",
                    self.input.separator
                )))
            }
        };
        Ok(LoadOptions {
            separator,
            date_format: self.input.date_format.clone(),
            max_rows: self.input.max_rows,
        })
    }

    pub fn to_report_options(&self) -> ReportOptions {
        ReportOptions {
            top_subcategories: self.report.top_subcategories,
            top_states: self.report.top_states,
            top_months: self.report.top_months,
            top_customers: self.report.top_customers,
            top_products: self.report.top_products,
            overview_top: self.report.overview_top,
            label_width: self.report.label_width,
        }
    }

    pub fn to_dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            top_products: self.dashboard.top_products,
            top_rankings: self.dashboard.top_rankings,
        }
    }

    pub fn to_export_options(&self) -> ExportOptions {
        ExportOptions {
            out_dir: self.export.out_dir.clone(),
            histogram_bins: self.export.histogram_bins,
            chart_width: self.export.chart_width,
            chart_height: self.export.chart_height,
        }
    }

    /// Save configuration as TOML or YAML, chosen by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml");

        let content = match extension {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?,
            _ => return Err(Error::config("Unsupported config file format")),
        };

        fs::write(path, content)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;
        Ok(())
    }
}

fn merge_value(target: &mut Value, layer: Value) {
    match (target, layer) {
        (Value::Object(target), Value::Object(layer)) => {
            for (key, value) in layer {
                match target.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, layer) => *target = layer,
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{name} must be a non-negative integer, got {value:?}")))
}

/// Create a default config file template
pub fn create_default_config_file(path: &Path) -> Result<()> {
    Config::default().save(path)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    config.to_load_options()?;

    if config.input.date_format.is_empty() {
        return Err(Error::config("Date format must not be empty"));
    }

    let report = &config.report;
    let listings = [
        ("report.top_subcategories", report.top_subcategories),
        ("report.top_states", report.top_states),
        ("report.top_months", report.top_months),
        ("report.top_customers", report.top_customers),
        ("report.top_products", report.top_products),
        ("report.overview_top", report.overview_top),
        ("dashboard.top_products", config.dashboard.top_products),
        ("dashboard.top_rankings", config.dashboard.top_rankings),
        ("export.histogram_bins", config.export.histogram_bins),
    ];
    for (name, value) in listings {
        if value == 0 {
            return Err(Error::config(format!("{name} must be greater than 0")));
        }
    }

    if report.label_width < 4 {
        return Err(Error::config("report.label_width must be at least 4"));
    }

    if config.export.chart_width == 0 || config.export.chart_height == 0 {
        return Err(Error::config("Chart dimensions must be greater than 0"));
    }

    if !config.input.path.exists() {
        eprintln!(
            "Warning: Input file does not exist: {}",
            config.input.path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.path, PathBuf::from("train.csv"));
        assert_eq!(config.input.separator, ",");
        assert_eq!(config.input.date_format, "%d/%m/%Y");
        assert_eq!(config.input.max_rows, None);
        assert_eq!(config.report.overview_top, 10);
        assert_eq!(config.report.top_states, 5);
        assert_eq!(config.dashboard.top_products, 10);
        assert_eq!(config.export.histogram_bins, 50);
        assert_eq!(config.debug.verbosity, 0);

        assert_eq!(config.to_report_options(), ReportOptions::default());
        assert_eq!(config.to_dashboard_options(), DashboardOptions::default());
        assert_eq!(config.to_export_options(), ExportOptions::default());
        assert_eq!(config.to_load_options().unwrap(), LoadOptions::default());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_find_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path().join("cwd");
        let home = temp_dir.path().join("home");
        fs::create_dir_all(&cwd).unwrap();
        fs::create_dir_all(home.join(".config").join("salesq")).unwrap();

        assert!(Config::find_config_file(Some(&cwd), Some(home.clone())).is_none());

        fs::write(home.join(".salesq.yaml"), "").unwrap();
        assert_eq!(
            Config::find_config_file(Some(&cwd), Some(home.clone())).unwrap(),
            home.join(".salesq.yaml")
        );

        fs::write(home.join(".config/salesq/salesq.toml"), "").unwrap();
        assert_eq!(
            Config::find_config_file(Some(&cwd), Some(home.clone())).unwrap(),
            home.join(".config/salesq/salesq.toml")
        );

        // Current directory wins, toml before yaml
        fs::write(cwd.join("salesq.yaml"), "").unwrap();
        fs::write(cwd.join(".salesq.toml"), "").unwrap();
        assert_eq!(
            Config::find_config_file(Some(&cwd), Some(home.clone())).unwrap(),
            cwd.join(".salesq.toml")
        );
        fs::write(cwd.join("salesq.toml"), "").unwrap();
        assert_eq!(
            Config::find_config_file(Some(&cwd), Some(home)).unwrap(),
            cwd.join("salesq.toml")
        );
    }

    #[test]
    fn test_merge_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("salesq.toml");
        fs::write(
            &path,
            r#"
[input]
path = "data/superstore.csv"
separator = ";"

[report]
label_width = 30

[export]
histogram_bins = 20
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.input.path, PathBuf::from("data/superstore.csv"));
        assert_eq!(config.input.separator, ";");
        assert_eq!(config.input.date_format, "%d/%m/%Y");
        assert_eq!(config.report.label_width, 30);
        assert_eq!(config.report.top_states, 5);
        assert_eq!(config.export.histogram_bins, 20);
        assert_eq!(config.to_load_options().unwrap().separator, b';');
    }

    #[test]
    fn test_merge_file_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("salesq.yml");
        fs::write(
            &path,
            "input:\n  date_format: \"%Y-%m-%d\"\n  max_rows: 1000\ndashboard:\n  top_rankings: 3\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.input.date_format, "%Y-%m-%d");
        assert_eq!(config.input.max_rows, Some(1000));
        assert_eq!(config.dashboard.top_rankings, 3);
        assert_eq!(config.dashboard.top_products, 10);
    }

    #[test]
    fn test_merge_file_errors() {
        let temp_dir = TempDir::new().unwrap();

        let json = temp_dir.path().join("salesq.json");
        fs::write(&json, "{}").unwrap();
        assert!(matches!(
            Config::load_from_file(&json),
            Err(Error::Config(msg)) if msg.contains("Unsupported")
        ));

        let bad = temp_dir.path().join("bad.toml");
        fs::write(&bad, "[input\npath = 1").unwrap();
        assert!(matches!(
            Config::load_from_file(&bad),
            Err(Error::Config(msg)) if msg.contains("Invalid TOML")
        ));

        assert!(Config::load_from_file(&temp_dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_later_file_keeps_earlier_non_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.toml");
        let second = temp_dir.path().join("second.toml");
        fs::write(&first, "[report]\nlabel_width = 30\n").unwrap();
        fs::write(&second, "[export]\nchart_width = 640\n").unwrap();

        let mut config = Config::load_from_file(&first).unwrap();
        config.merge_file(&second).unwrap();
        assert_eq!(config.report.label_width, 30);
        assert_eq!(config.export.chart_width, 640);
    }

    #[test]
    fn test_later_file_can_restore_a_default() {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().join("home.toml");
        let explicit = temp_dir.path().join("explicit.yaml");
        fs::write(&home, "[report]\nlabel_width = 30\n[input]\nmax_rows = 100\n").unwrap();
        fs::write(&explicit, "report:\n  label_width: 50\ninput:\n  max_rows: null\n").unwrap();

        let mut config = Config::load_from_file(&home).unwrap();
        config.merge_file(&explicit).unwrap();
        assert_eq!(config.report.label_width, ReportConfig::default().label_width);
        assert_eq!(config.input.max_rows, None);

        let empty = temp_dir.path().join("empty.yaml");
        fs::write(&empty, "").unwrap();
        config.merge_file(&empty).unwrap();
        assert_eq!(config.report.label_width, 50);

        let wrong_type = temp_dir.path().join("wrong.toml");
        fs::write(&wrong_type, "[report]\nlabel_width = \"wide\"\n").unwrap();
        assert!(matches!(
            config.merge_file(&wrong_type),
            Err(Error::Config(msg)) if msg.contains("Invalid config value")
        ));
    }

    #[test]
    fn test_merge_env() {
        let vars: HashMap<&str, &str> = [
            ("SALESQ_INPUT", "/data/train.csv"),
            ("SALESQ_SEPARATOR", "\\t"),
            ("SALESQ_MAX_ROWS", "500"),
            ("SALESQ_LABEL_WIDTH", "25"),
            ("SALESQ_OUT_DIR", "charts"),
            ("SALESQ_HISTOGRAM_BINS", "10"),
            ("SALESQ_VERBOSITY", "loud"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .merge_env_with_reader(|key| vars.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.input.path, PathBuf::from("/data/train.csv"));
        assert_eq!(config.to_load_options().unwrap().separator, b'\t');
        assert_eq!(config.input.max_rows, Some(500));
        assert_eq!(config.report.label_width, 25);
        assert_eq!(config.export.out_dir, PathBuf::from("charts"));
        assert_eq!(config.export.histogram_bins, 10);
        assert_eq!(config.debug.verbosity, 0);
    }

    #[test]
    fn test_merge_env_rejects_bad_numbers() {
        let mut config = Config::default();
        let result = config.merge_env_with_reader(|key| {
            (key == "SALESQ_MAX_ROWS").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("SALESQ_MAX_ROWS")));
    }

    #[test]
    fn test_apply_cli() {
        let mut config = Config::default();
        config.report.label_width = 30;

        let cli = CliConfig {
            input: Some(PathBuf::from("sales.csv")),
            separator: Some("|".to_string()),
            max_rows: Some(10),
            top: Some(3),
            histogram_bins: Some(8),
            verbose: 2,
            ..CliConfig::default()
        };
        config.apply_cli(&cli);

        assert_eq!(config.input.path, PathBuf::from("sales.csv"));
        assert_eq!(config.input.separator, "|");
        assert_eq!(config.input.max_rows, Some(10));
        assert_eq!(config.report.label_width, 30);
        let report = config.to_report_options();
        assert_eq!(report.top_subcategories, 3);
        assert_eq!(report.top_products, 3);
        assert_eq!(report.overview_top, 10);
        assert_eq!(config.export.histogram_bins, 8);
        assert_eq!(config.debug.verbosity, 2);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.input.separator = ";".to_string();
        config.export.chart_height = 300;

        for name in ["saved.toml", "saved.yaml"] {
            let path = temp_dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::load_from_file(&path).unwrap(), config);
        }

        assert!(config.save(&temp_dir.path().join("saved.ini")).is_err());
    }

    #[test]
    fn test_create_default_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("salesq.toml");
        create_default_config_file(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[input]"));
        assert!(content.contains("date_format = \"%d/%m/%Y\""));
        assert_eq!(Config::load_from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.input.separator = ";;".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.report.overview_top = 0;
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(msg)) if msg.contains("report.overview_top")
        ));

        let mut config = Config::default();
        config.export.chart_width = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.report.label_width = 2;
        assert!(validate_config(&config).is_err());
    }
}
