//! File-explorer badges for files whose line coverage sits below the
//! configured threshold.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::CoverageRecord;

pub const BADGE_LABEL: &str = "<%";

/// A compact indicator attached to a file (not a line) in the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub tooltip: String,
    pub percent: u64,
    pub threshold: u8,
}

/// Decides whether a file carries a below-threshold badge.
///
/// The provider itself is pure per call; recomputation is driven by the
/// session (threshold configuration changes and full refreshes after each
/// parse cycle). The global enable switch short-circuits every file to
/// "no badge".
#[derive(Debug)]
pub struct BadgeProvider {
    threshold: u8,
    enabled: bool,
}

impl BadgeProvider {
    #[must_use]
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            enabled: true,
        }
    }

    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Update the threshold, returning whether it actually changed so the
    /// caller knows to refresh existing badges.
    pub fn set_threshold(&mut self, threshold: u8) -> bool {
        if self.threshold == threshold {
            return false;
        }
        self.threshold = threshold;
        true
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Badge for one file, or `None` when the file is at or above the
    /// threshold, has no coverage, or reports zero found lines.
    #[must_use]
    pub fn provide(
        &self,
        path: &Path,
        coverage_by_file: &HashMap<PathBuf, CoverageRecord>,
    ) -> Option<Badge> {
        if !self.enabled {
            return None;
        }

        let record = coverage_by_file.get(path)?;
        // line_percent is None when found == 0: no badge, never a NaN.
        let percent = record.line_percent()?;

        if percent < u64::from(self.threshold) {
            Some(Badge {
                label: BADGE_LABEL,
                tooltip: format!(
                    "Insufficient Code Coverage: {percent}% vs. {threshold}%.",
                    threshold = self.threshold
                ),
                percent,
                threshold: self.threshold,
            })
        } else {
            None
        }
    }
}
