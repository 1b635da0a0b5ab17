//! Uniform in-memory representation of coverage data. The parser produces a
//! `CoverageCollection` which the session re-keys by absolute source path;
//! every downstream signal (annotations, status text, badges) is a projection
//! of these records.

use serde::Serialize;

/// Compute a whole-number coverage percentage, rounded down.
/// Returns `None` when `found` is zero so callers never divide by zero.
#[must_use]
pub fn percent_covered(hit: u64, found: u64) -> Option<u64> {
    if found == 0 {
        None
    } else {
        Some(hit * 100 / found)
    }
}

/// One metric family (lines, functions or branches) of a coverage record.
///
/// `found` and `hit` are set directly from the report's count records
/// (`LF`/`LH` and friends), never derived by counting `details`. A report
/// that omits count lines leaves them at zero regardless of how many
/// detail entries were accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricGroup<T> {
    pub found: u64,
    pub hit: u64,
    pub details: Vec<T>,
}

// Not derived: that would bound `T: Default`, and detail entries have no
// meaningful default value.
impl<T> Default for MetricGroup<T> {
    fn default() -> Self {
        Self {
            found: 0,
            hit: 0,
            details: Vec::new(),
        }
    }
}

impl<T> MetricGroup<T> {
    fn is_empty(&self) -> bool {
        self.found == 0 && self.hit == 0 && self.details.is_empty()
    }
}

/// A single instrumentable line. `hit == 0` means uncovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineHit {
    /// 1-based line number as written in the report.
    pub line: u32,
    pub hit: u64,
}

/// A function definition from an `FN` record. `hit` starts out unset and is
/// filled in by a matching `FNDA` record; the first definition with a
/// matching name and an unset hit wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionHit {
    pub line: u32,
    pub name: String,
    pub hit: Option<u64>,
}

/// A single branch arm. A `"-"` taken-count in the report normalizes to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchHit {
    pub line: u32,
    pub block: u32,
    pub branch: u32,
    pub hit: u64,
}

/// Coverage data for one source file, i.e. one `end_of_record` section.
///
/// `lines.found`/`lines.hit` are the authoritative totals even when
/// `details` does not mention every line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageRecord {
    /// Path as written in the report; may be relative to the project root.
    pub source_file: String,
    /// Free-text test-name label from a `TN` record.
    pub title: String,
    pub lines: MetricGroup<LineHit>,
    pub functions: MetricGroup<FunctionHit>,
    pub branches: MetricGroup<BranchHit>,
}

impl CoverageRecord {
    /// True when no record field has been set. The parser never emits an
    /// entirely empty record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source_file.is_empty()
            && self.title.is_empty()
            && self.lines.is_empty()
            && self.functions.is_empty()
            && self.branches.is_empty()
    }

    /// Line coverage percentage, rounded down; `None` when no lines found.
    #[must_use]
    pub fn line_percent(&self) -> Option<u64> {
        percent_covered(self.lines.hit, self.lines.found)
    }
}

/// Ordered sequence of records, one per `end_of_record` boundary.
/// Order is report order; consumers re-key by file path.
pub type CoverageCollection = Vec<CoverageRecord>;
