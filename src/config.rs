use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "app_performance.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "imagens_analise";
pub const DEFAULT_CHART_FILE: &str = "distribuicao_servicos.png";
pub const DEFAULT_EXPECTED_RECORDS: usize = 10;

/// What happens to the chart once it's saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// File only; nothing is shown.
    Headless,
    /// Open the saved image in the platform viewer and wait for it.
    Interactive,
}

/// Run configuration. `Default` gives the historical fixed paths, relative to
/// the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub chart_file: String,
    /// Exact number of records the input must yield; `None` disables the check.
    pub expected_records: Option<usize>,
    pub display: DisplayMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            chart_file: DEFAULT_CHART_FILE.to_string(),
            expected_records: Some(DEFAULT_EXPECTED_RECORDS),
            display: DisplayMode::Interactive,
        }
    }
}

impl Config {
    /// Defaults overridden by `APP_PERF_*` environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let mut config = Self::default();
        if let Some(input) = var("APP_PERF_INPUT") {
            config.input = input.into();
        }
        if let Some(dir) = var("APP_PERF_OUTPUT_DIR") {
            config.output_dir = dir.into();
        }
        if let Some(file) = var("APP_PERF_CHART") {
            config.chart_file = file;
        }
        if let Some(expected) = var("APP_PERF_EXPECTED_RECORDS") {
            config.expected_records = match expected.trim() {
                "any" => None,
                n => Some(n.parse().map_err(|e| {
                    anyhow::anyhow!("APP_PERF_EXPECTED_RECORDS={n:?} is not a count: {e}")
                })?),
            };
        }
        if let Some(headless) = var("APP_PERF_HEADLESS") {
            if matches!(headless.trim(), "1" | "true" | "yes") {
                config.display = DisplayMode::Headless;
            }
        }
        Ok(config)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.chart_file)
    }
}
