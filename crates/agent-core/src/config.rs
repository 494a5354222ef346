use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Success rate below which framing advice is emitted.
pub const LOW_SUCCESS_RATE: f64 = 0.70;
/// Success rate at or above which the current approach is praised.
pub const HIGH_SUCCESS_RATE: f64 = 0.85;
/// Average cost per completed agent above which cost advice is emitted.
pub const HIGH_AVG_COST_USD: f64 = 0.50;
/// Average resumes per session above which specificity advice is emitted.
pub const HIGH_AVG_RESUMES: f64 = 2.0;
/// Number of distinct executed agent types above which a template is suggested.
pub const MAX_AGENT_TYPES: usize = 3;
/// Record count below which patterns are considered unreliable.
pub const MIN_HISTORY_RECORDS: usize = 5;
/// Upper (inclusive) bound of the `simple` cost category.
pub const SIMPLE_COST_MAX_USD: f64 = 0.15;
/// Upper (inclusive) bound of the `medium` cost category.
pub const MEDIUM_COST_MAX_USD: f64 = 0.40;
/// Lower edge printed in the `simple` category label. Cheaper runs still
/// count as simple; the label keeps the established `$0.05-$0.15` wording.
pub const SIMPLE_COST_LABEL_FLOOR_USD: f64 = 0.05;

/// Conventional project-relative location of the sessions log.
pub const DEFAULT_SESSIONS_FILE: &str = ".claude-lab/sessions.jsonl";

/// Top-level configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history: HistoryConfig,
    pub report: ReportConfig,
    pub thresholds: Thresholds,
    pub cost_categories: CostCategoryBounds,
}

impl AppConfig {
    /// Load configuration from the default path,
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalyzerError::ConfigNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agent-experience")
            .join("config.toml")
    }

    /// Reject values that would make the analysis meaningless.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, rate) in [
            ("low_success_rate", t.low_success_rate),
            ("high_success_rate", t.high_success_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(AnalyzerError::Config(format!(
                    "thresholds.{} must be between 0 and 1, got {}",
                    name, rate
                )));
            }
        }
        if t.low_success_rate > t.high_success_rate {
            return Err(AnalyzerError::Config(
                "thresholds.low_success_rate must not exceed high_success_rate".into(),
            ));
        }

        let c = &self.cost_categories;
        if c.simple_max_usd < 0.0 || c.simple_max_usd >= c.medium_max_usd {
            return Err(AnalyzerError::Config(format!(
                "cost_categories bounds must satisfy 0 <= simple_max_usd < medium_max_usd, got {} and {}",
                c.simple_max_usd, c.medium_max_usd
            )));
        }
        Ok(())
    }
}

/// Where the sessions log lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Sessions log used when no path is given on the command line.
    pub sessions_file: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            sessions_file: PathBuf::from(DEFAULT_SESSIONS_FILE),
        }
    }
}

/// Report rendering defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON document for machine consumption.
    #[default]
    Json,
    /// Multi-section text for a terminal.
    Text,
}

/// Recommendation thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub low_success_rate: f64,
    pub high_success_rate: f64,
    pub high_avg_cost_usd: f64,
    pub high_avg_resumes: f64,
    pub max_agent_types: usize,
    pub min_history_records: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_success_rate: LOW_SUCCESS_RATE,
            high_success_rate: HIGH_SUCCESS_RATE,
            high_avg_cost_usd: HIGH_AVG_COST_USD,
            high_avg_resumes: HIGH_AVG_RESUMES,
            max_agent_types: MAX_AGENT_TYPES,
            min_history_records: MIN_HISTORY_RECORDS,
        }
    }
}

/// Boundaries of the simple/medium/complex cost categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostCategoryBounds {
    pub simple_max_usd: f64,
    pub medium_max_usd: f64,
}

impl Default for CostCategoryBounds {
    fn default() -> Self {
        Self {
            simple_max_usd: SIMPLE_COST_MAX_USD,
            medium_max_usd: MEDIUM_COST_MAX_USD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains(".claude-lab/sessions.jsonl"));
        assert!(toml_str.contains("format = \"json\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.thresholds, config.thresholds);
        assert_eq!(parsed.cost_categories, config.cost_categories);
        assert_eq!(parsed.report.format, OutputFormat::Json);
    }

    #[test]
    fn test_defaults_match_constants() {
        let t = Thresholds::default();
        assert_eq!(t.low_success_rate, LOW_SUCCESS_RATE);
        assert_eq!(t.high_success_rate, HIGH_SUCCESS_RATE);
        assert_eq!(t.high_avg_cost_usd, HIGH_AVG_COST_USD);
        assert_eq!(t.high_avg_resumes, HIGH_AVG_RESUMES);
        assert_eq!(t.max_agent_types, MAX_AGENT_TYPES);
        assert_eq!(t.min_history_records, MIN_HISTORY_RECORDS);

        let c = CostCategoryBounds::default();
        assert_eq!(c.simple_max_usd, 0.15);
        assert_eq!(c.medium_max_usd, 0.40);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[report]\nformat = \"text\"\n\n[thresholds]\nmin_history_records = 10\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.report.format, OutputFormat::Text);
        assert_eq!(config.thresholds.min_history_records, 10);
        assert_eq!(config.thresholds.low_success_rate, LOW_SUCCESS_RATE);
        assert_eq!(
            config.history.sessions_file,
            PathBuf::from(DEFAULT_SESSIONS_FILE)
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.thresholds, Thresholds::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigNotFound(_)));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[report\nformat = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::TomlParse(_)));
    }

    #[test]
    fn test_validation_rejects_inverted_buckets() {
        let mut config = AppConfig::default();
        config.cost_categories.simple_max_usd = 0.5;
        assert!(matches!(config.validate(), Err(AnalyzerError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_rate_out_of_range() {
        let mut config = AppConfig::default();
        config.thresholds.high_success_rate = 1.5;
        assert!(matches!(config.validate(), Err(AnalyzerError::Config(_))));
    }

    #[test]
    fn test_save_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        AppConfig::default().save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.cost_categories, CostCategoryBounds::default());
    }
}
