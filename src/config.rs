//! User-facing configuration. The host persists and edits these settings;
//! this module only defines their shape, defaults, and change semantics.
//!
//! Settings documents are JSON with camelCase keys, matching the host's
//! settings format. Unknown keys are ignored and missing keys fall back to
//! their defaults, so a partial document is always valid.

use std::path::Path;

use glob::Pattern;
use serde::Deserialize;

use crate::error::Result;
use crate::mode::DetailMode;

pub const DEFAULT_SEARCH_CRITERIA: &str = "coverage/lcov*.info";
pub const DEFAULT_COVERAGE_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Show coverage as soon as the session starts.
    pub enable_on_startup: bool,
    /// Glob, relative to the project root, locating report files to watch.
    pub search_criteria: String,
    /// Files below this line-coverage percentage get an explorer badge.
    pub coverage_threshold: u8,
    /// Render gutter decorations in addition to diagnostics.
    pub enable_decorations: bool,
    /// Which documents show per-line detail versus a rolled-up summary.
    pub detail_coverage_mode: DetailMode,
    /// Summary annotations span to the last uncovered line; when off they
    /// collapse to a point at the first uncovered line.
    pub summary_with_curly: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_on_startup: true,
            search_criteria: DEFAULT_SEARCH_CRITERIA.to_string(),
            coverage_threshold: DEFAULT_COVERAGE_THRESHOLD,
            enable_decorations: false,
            detail_coverage_mode: DetailMode::All,
            summary_with_curly: true,
        }
    }
}

/// One configurable option; used to report which options changed between
/// two configuration snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOption {
    EnableOnStartup,
    SearchCriteria,
    CoverageThreshold,
    EnableDecorations,
    DetailCoverageMode,
    SummaryWithCurly,
}

impl Config {
    /// Parse a JSON settings document. The threshold is clamped to 0–100.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(text)?;
        config.coverage_threshold = config.coverage_threshold.min(100);
        Ok(config)
    }

    /// Compiled glob for `search_criteria`.
    pub fn search_pattern(&self) -> Result<Pattern> {
        Ok(Pattern::new(&self.search_criteria)?)
    }

    /// Whether a project-root-relative path names a watched report file.
    pub fn matches_search_criteria(&self, relative_path: &Path) -> Result<bool> {
        Ok(self.search_pattern()?.matches_path(relative_path))
    }

    /// Which options differ between `self` and `newer`. The session reacts
    /// to each changed option individually, mirroring the host's per-option
    /// configuration-change events.
    #[must_use]
    pub fn diff(&self, newer: &Config) -> Vec<ConfigOption> {
        let mut changed = Vec::new();
        if self.enable_on_startup != newer.enable_on_startup {
            changed.push(ConfigOption::EnableOnStartup);
        }
        if self.search_criteria != newer.search_criteria {
            changed.push(ConfigOption::SearchCriteria);
        }
        if self.coverage_threshold != newer.coverage_threshold {
            changed.push(ConfigOption::CoverageThreshold);
        }
        if self.enable_decorations != newer.enable_decorations {
            changed.push(ConfigOption::EnableDecorations);
        }
        if self.detail_coverage_mode != newer.detail_coverage_mode {
            changed.push(ConfigOption::DetailCoverageMode);
        }
        if self.summary_with_curly != newer.summary_with_curly {
            changed.push(ConfigOption::SummaryWithCurly);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.enable_on_startup);
        assert_eq!(config.search_criteria, "coverage/lcov*.info");
        assert_eq!(config.coverage_threshold, 80);
        assert!(!config.enable_decorations);
        assert_eq!(config.detail_coverage_mode, DetailMode::All);
        assert!(config.summary_with_curly);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = Config::from_json(r#"{"coverageThreshold": 60}"#).unwrap();
        assert_eq!(config.coverage_threshold, 60);
        assert_eq!(config.search_criteria, "coverage/lcov*.info");
        assert_eq!(config.detail_coverage_mode, DetailMode::All);
    }

    #[test]
    fn test_full_json_document() {
        let config = Config::from_json(
            r#"{
                "enableOnStartup": false,
                "searchCriteria": "build/*.info",
                "coverageThreshold": 90,
                "enableDecorations": true,
                "detailCoverageMode": "active",
                "summaryWithCurly": false
            }"#,
        )
        .unwrap();

        assert!(!config.enable_on_startup);
        assert_eq!(config.search_criteria, "build/*.info");
        assert_eq!(config.coverage_threshold, 90);
        assert!(config.enable_decorations);
        assert_eq!(config.detail_coverage_mode, DetailMode::Active);
        assert!(!config.summary_with_curly);
    }

    #[test]
    fn test_threshold_clamped_to_100() {
        let config = Config::from_json(r#"{"coverageThreshold": 150}"#).unwrap();
        assert_eq!(config.coverage_threshold, 100);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::from_json(r#"{"futureOption": true}"#).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_mode_is_an_error() {
        assert!(Config::from_json(r#"{"detailCoverageMode": "sometimes"}"#).is_err());
    }

    #[test]
    fn test_search_criteria_matching() {
        let config = Config::default();
        assert!(config
            .matches_search_criteria(Path::new("coverage/lcov.info"))
            .unwrap());
        assert!(config
            .matches_search_criteria(Path::new("coverage/lcov-unit.info"))
            .unwrap());
        assert!(!config
            .matches_search_criteria(Path::new("coverage/cobertura.xml"))
            .unwrap());
        assert!(!config
            .matches_search_criteria(Path::new("other/lcov.info"))
            .unwrap());
    }

    #[test]
    fn test_diff_reports_changed_options() {
        let old = Config::default();
        let mut new = Config::default();
        new.coverage_threshold = 50;
        new.detail_coverage_mode = DetailMode::Open;

        let changed = old.diff(&new);
        assert_eq!(
            changed,
            vec![ConfigOption::CoverageThreshold, ConfigOption::DetailCoverageMode]
        );

        assert!(old.diff(&old).is_empty());
    }
}
