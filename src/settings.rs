//! Report settings
//!
//! Optional YAML file controlling the dashboard. Every key is optional:
//!
//! ```yaml
//! title: My quarter
//! today: 2024-01-07
//! heatmap: false
//! ```
//!
//! Command-line flags override values loaded from the file.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::io::{IoError, IoResult};

/// Settings for report generation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Dashboard heading; the board name is used when unset
    pub title: Option<String>,

    /// Date the statistics are computed for; the local date when unset
    pub today: Option<NaiveDate>,

    /// Render habit heat-maps
    pub heatmap: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: None,
            today: None,
            heatmap: true,
        }
    }
}

impl ReportSettings {
    /// Parse settings from YAML text. An empty document yields the defaults.
    pub fn parse(content: &str) -> IoResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| IoError::Parse(e.to_string()))
    }

    /// Load settings from a YAML file
    pub fn load(path: &Path) -> IoResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, title: Option<String>, today: Option<NaiveDate>) -> Self {
        if title.is_some() {
            self.title = title;
        }
        if today.is_some() {
            self.today = today;
        }
        self
    }

    /// The configured date, or today's local date
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_heatmap() {
        let settings = ReportSettings::default();
        assert!(settings.heatmap);
        assert!(settings.title.is_none());
        assert_eq!(ReportSettings::parse("").unwrap(), settings);
    }

    #[test]
    fn parses_all_keys() {
        let yaml = "title: Focus\ntoday: 2024-01-07\nheatmap: false\n";
        let settings = ReportSettings::parse(yaml).unwrap();
        assert_eq!(settings.title.as_deref(), Some("Focus"));
        assert_eq!(settings.today, NaiveDate::from_ymd_opt(2024, 1, 7));
        assert!(!settings.heatmap);
        assert_eq!(settings.today(), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_dates() {
        assert!(matches!(
            ReportSettings::parse("colour: red\n"),
            Err(IoError::Parse(_))
        ));
        assert!(matches!(
            ReportSettings::parse("today: yesterday\n"),
            Err(IoError::Parse(_))
        ));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = ReportSettings::parse("title: From file\nheatmap: false\n").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1);

        let merged = file.clone().with_overrides(Some("From flag".to_string()), date);
        assert_eq!(merged.title.as_deref(), Some("From flag"));
        assert_eq!(merged.today, date);
        assert!(!merged.heatmap);

        let untouched = file.clone().with_overrides(None, None);
        assert_eq!(untouched, file);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "title: Saved\n").unwrap();

        let settings = ReportSettings::load(&path).unwrap();
        assert_eq!(settings.title.as_deref(), Some("Saved"));
        assert!(settings.heatmap);
    }
}
