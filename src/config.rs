use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "analyzer.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub log: LogFormatConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub charts: ChartsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AnalyzerConfig {
    /// Load `analyzer.toml` from `root`, falling back to defaults when absent.
    /// Relative paths in the file are resolved against `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let mut cfg = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str::<AnalyzerConfig>(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::info!(
                "No config file found at {}. Using AnalyzerConfig::default().",
                path.display()
            );
            AnalyzerConfig::default()
        };
        cfg.resolve_paths(root);
        Ok(cfg)
    }

    fn resolve_paths(&mut self, root: &Path) {
        if let Some(template) = self.report.template.as_mut() {
            *template = absolutize(root, template);
        }
        self.database.path = absolutize(root, &self.database.path);
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            log: LogFormatConfig::default(),
            report: ReportConfig::default(),
            charts: ChartsConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

/// Field names of the simulation's structured JSONL logger.
#[derive(Debug, Clone, Deserialize)]
pub struct LogFormatConfig {
    #[serde(default = "LogFormatConfig::default_event_field")]
    pub event_field: String,
    #[serde(default = "LogFormatConfig::default_post_event")]
    pub post_event: String,
    #[serde(default = "LogFormatConfig::default_timestamp_field")]
    pub timestamp_field: String,
    #[serde(default = "LogFormatConfig::default_bot_field")]
    pub bot_field: String,
    #[serde(default = "LogFormatConfig::default_content_field")]
    pub content_field: String,
    #[serde(default = "LogFormatConfig::default_model_field")]
    pub model_field: String,
}

impl LogFormatConfig {
    fn default_event_field() -> String {
        "event".to_string()
    }

    fn default_post_event() -> String {
        "post.generated".to_string()
    }

    fn default_timestamp_field() -> String {
        "asctime".to_string()
    }

    fn default_bot_field() -> String {
        "bot_name".to_string()
    }

    fn default_content_field() -> String {
        "post_content".to_string()
    }

    fn default_model_field() -> String {
        "bot_model".to_string()
    }
}

impl Default for LogFormatConfig {
    fn default() -> Self {
        Self {
            event_field: Self::default_event_field(),
            post_event: Self::default_post_event(),
            timestamp_field: Self::default_timestamp_field(),
            bot_field: Self::default_bot_field(),
            content_field: Self::default_content_field(),
            model_field: Self::default_model_field(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "ReportConfig::default_output")]
    pub output: String,
    /// Replaces the embedded template when set.
    #[serde(default)]
    pub template: Option<PathBuf>,
}

impl ReportConfig {
    fn default_output() -> String {
        "analysis_report.html".to_string()
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: Self::default_output(),
            template: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "ChartsConfig::default_graph_width")]
    pub graph_width: u32,
    #[serde(default = "ChartsConfig::default_graph_height")]
    pub graph_height: u32,
    #[serde(default = "ChartsConfig::default_plot_width")]
    pub plot_width: u32,
    #[serde(default = "ChartsConfig::default_plot_height")]
    pub plot_height: u32,
    #[serde(default = "ChartsConfig::default_layout_iterations")]
    pub layout_iterations: usize,
    #[serde(default = "ChartsConfig::default_layout_k")]
    pub layout_k: f64,
    #[serde(default = "ChartsConfig::default_layout_seed")]
    pub layout_seed: u64,
}

impl ChartsConfig {
    fn default_graph_width() -> u32 {
        1000
    }

    fn default_graph_height() -> u32 {
        800
    }

    fn default_plot_width() -> u32 {
        1200
    }

    fn default_plot_height() -> u32 {
        600
    }

    fn default_layout_iterations() -> usize {
        50
    }

    fn default_layout_k() -> f64 {
        0.5
    }

    fn default_layout_seed() -> u64 {
        42
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            graph_width: Self::default_graph_width(),
            graph_height: Self::default_graph_height(),
            plot_width: Self::default_plot_width(),
            plot_height: Self::default_plot_height(),
            layout_iterations: Self::default_layout_iterations(),
            layout_k: Self::default_layout_k(),
            layout_seed: Self::default_layout_seed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: PathBuf,
}

impl DatabaseConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("bots.db")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

fn absolutize(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}
