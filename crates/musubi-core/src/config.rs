use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use musubi_parse::{ExtractorOptions, Limits, Locale};
use serde::{Deserialize, Serialize};

use crate::error::MusubiError;
use crate::matcher::MatcherOptions;
use crate::metric::properties::Tolerance;
use crate::series_name::SeriesOptions;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub extractor: ExtractorConfig,
    pub dates: DatesConfig,
    pub matcher: MatcherConfig,
    pub series: SeriesConfig,
    pub properties: PropertiesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub strict: bool,
    pub max_season: u32,
    pub max_episode: u32,
    pub max_range_span: u32,
    pub locales: Vec<Locale>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatesConfig {
    pub min_year: i32,
    pub max_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub confident_threshold: f32,
    pub many_to_one: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub frequency_threshold: f32,
    pub min_chars: usize,
    pub min_tokens: usize,
    pub max_start_index: usize,
    pub folder_similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertiesConfig {
    pub frame_rate_tolerance: f64,
    pub duration_tolerance: f64,
}

impl Config {
    /// Load config: user file (if exists) merged over built-in defaults.
    pub fn load() -> Result<Self, MusubiError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            tracing::debug!(path = %user_path.display(), "loading user config");
            Self::from_path(&user_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicit config file, merged over built-in defaults.
    pub fn from_path(path: &Path) -> Result<Self, MusubiError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text. Keys it leaves out keep their default values.
    pub fn from_toml_str(content: &str) -> Result<Self, MusubiError> {
        let mut merged: toml::Table = toml::from_str(DEFAULT_CONFIG).map_err(config_error)?;
        let user: toml::Table = toml::from_str(content).map_err(config_error)?;
        merge(&mut merged, user);
        let config: Config = toml::Value::Table(merged)
            .try_into()
            .map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "musubi")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn validate(&self) -> Result<(), MusubiError> {
        let invalid = |msg: String| Err(MusubiError::Config(msg));
        if self.dates.min_year > self.dates.max_year {
            return invalid(format!(
                "dates.min_year ({}) is after dates.max_year ({})",
                self.dates.min_year, self.dates.max_year
            ));
        }
        let threshold = self.matcher.confident_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return invalid(format!(
                "matcher.confident_threshold must be in [0, 1), got {threshold}"
            ));
        }
        let frequency = self.series.frequency_threshold;
        if !(frequency > 0.0 && frequency <= 1.0) {
            return invalid(format!(
                "series.frequency_threshold must be in (0, 1], got {frequency}"
            ));
        }
        if !(0.0..=1.0).contains(&self.series.folder_similarity) {
            return invalid(format!(
                "series.folder_similarity must be in [0, 1], got {}",
                self.series.folder_similarity
            ));
        }
        for (name, value) in [
            ("frame_rate_tolerance", self.properties.frame_rate_tolerance),
            ("duration_tolerance", self.properties.duration_tolerance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("properties.{name} must be non-negative, got {value}"));
            }
        }
        Ok(())
    }

    pub fn extractor_options(&self) -> ExtractorOptions {
        ExtractorOptions {
            strict: self.extractor.strict,
            limits: Limits {
                max_season: self.extractor.max_season,
                max_episode: self.extractor.max_episode,
                max_range_span: self.extractor.max_range_span,
            },
            locales: self.extractor.locales.clone(),
            min_year: self.dates.min_year,
            max_year: self.dates.max_year,
        }
    }

    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            confident_threshold: self.matcher.confident_threshold,
            many_to_one: self.matcher.many_to_one,
        }
    }

    pub fn series_options(&self) -> SeriesOptions {
        SeriesOptions {
            frequency_threshold: self.series.frequency_threshold,
            min_chars: self.series.min_chars,
            min_tokens: self.series.min_tokens,
            max_start_index: self.series.max_start_index,
            folder_similarity: self.series.folder_similarity,
        }
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            frame_rate: self.properties.frame_rate_tolerance,
            duration: self.properties.duration_tolerance,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

fn config_error(e: impl std::fmt::Display) -> MusubiError {
    MusubiError::Config(e.to_string())
}

/// Overlay `user` onto `base`, descending into tables.
fn merge(base: &mut toml::Table, user: toml::Table) {
    for (key, value) in user {
        if let toml::Value::Table(user_table) = value {
            if let Some(toml::Value::Table(base_table)) = base.get_mut(&key) {
                merge(base_table, user_table);
                continue;
            }
            base.insert(key, toml::Value::Table(user_table));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::default();
        assert!(!config.extractor.strict);
        assert_eq!(config.extractor.locales, vec![Locale::English]);
        assert_eq!(config.dates.min_year, 1920);
        assert_eq!(config.dates.max_year, 2050);
        assert_eq!(config.series.max_start_index, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [extractor]
            strict = true
            locales = ["en", "de"]
            "#,
        )
        .unwrap();
        assert!(config.extractor.strict);
        assert_eq!(config.extractor.locales, vec![Locale::English, Locale::German]);
        assert_eq!(config.extractor.max_episode, 1999);
        assert_eq!(config.matcher, Config::default().matcher);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_toml_str("[dates]\nmin_year = 2060").unwrap_err();
        assert!(matches!(err, MusubiError::Config(_)));
        let err = Config::from_toml_str("[matcher]\nconfident_threshold = 1.0").unwrap_err();
        assert!(matches!(err, MusubiError::Config(_)));
        let err = Config::from_toml_str("[extractor]\nlocales = [\"xx\"]").unwrap_err();
        assert!(matches!(err, MusubiError::Config(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[series]\nfrequency_threshold = 0.8").unwrap();
        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.series.frequency_threshold, 0.8);
        assert_eq!(config.series.min_chars, 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::from_path(Path::new("/nonexistent/musubi.toml")).unwrap_err();
        assert!(matches!(err, MusubiError::Io(_)));
    }

    #[test]
    fn test_options_follow_config() {
        let config = Config::default();
        let options = config.extractor_options();
        assert_eq!(options.limits, Limits::default());
        assert_eq!(options.min_year, 1920);
        assert_eq!(config.matcher_options(), MatcherOptions::default());
    }
}
