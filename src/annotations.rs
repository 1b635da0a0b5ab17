//! Projection of coverage records into editor-displayable annotations, plus
//! the per-file cache of previously computed annotation sets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::CoverageRecord;
use crate::ranges::to_ranges;

pub const UNCOVERED_LINE_MESSAGE: &str = "This line is missing code coverage.";

/// An inclusive 0-based line range within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start_line: u32,
    pub end_line: u32,
}

/// A visual annotation anchored to a line range. Each line in the range is
/// rendered at full width by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub range: LineRange,
    pub message: String,
}

/// Map a coverage record to one annotation per maximal contiguous run of
/// uncovered lines.
///
/// Pure and deterministic: the same record always yields the same set, which
/// is what makes the per-file cache sound. A record with no line details
/// yields an empty set.
#[must_use]
pub fn detailed_annotations(record: &CoverageRecord) -> Vec<Annotation> {
    let uncovered: Vec<u32> = record
        .lines
        .details
        .iter()
        .filter(|detail| detail.hit == 0)
        .map(|detail| detail.line.saturating_sub(1))
        .collect();

    to_ranges(&uncovered)
        .into_iter()
        .map(|(start_line, end_line)| Annotation {
            range: LineRange {
                start_line,
                end_line,
            },
            message: UNCOVERED_LINE_MESSAGE.to_string(),
        })
        .collect()
}

/// Build the rolled-up summary annotation for a record.
///
/// Fully covered records and records without line details yield `None`.
/// Otherwise the annotation spans from the first to the last uncovered line,
/// or collapses to a point at the first uncovered line when `span_to_last`
/// is off, and carries the aggregate hit/found count.
#[must_use]
pub fn summary_annotation(record: &CoverageRecord, span_to_last: bool) -> Option<Annotation> {
    let lines = &record.lines;
    if lines.hit == lines.found || lines.details.is_empty() {
        return None;
    }

    let front = lines.details.iter().position(|detail| detail.hit == 0)?;
    let back = lines.details.iter().rposition(|detail| detail.hit == 0)?;
    if front > back {
        return None;
    }

    let start_line = lines.details[front].line.saturating_sub(1);
    let end_line = if span_to_last {
        lines.details[back].line.saturating_sub(1)
    } else {
        start_line
    };

    Some(Annotation {
        range: LineRange {
            start_line,
            end_line,
        },
        message: format!("{}/{} lines covered", lines.hit, lines.found),
    })
}

/// Per-file cache of computed annotation sets, keyed by absolute path.
///
/// Populated eagerly when a parse is recorded and lazily on first request;
/// an entry is dropped whenever its document's text changes, since coverage
/// and document can then disagree.
#[derive(Debug, Default)]
pub struct AnnotationCache {
    entries: HashMap<PathBuf, Vec<Annotation>>,
}

impl AnnotationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, annotations: Vec<Annotation>) {
        self.entries.insert(path, annotations);
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&[Annotation]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Cached set for `path`, computing and storing it on a miss.
    pub fn get_or_compute(&mut self, path: &Path, record: &CoverageRecord) -> &[Annotation] {
        self.entries
            .entry(path.to_path_buf())
            .or_insert_with(|| detailed_annotations(record))
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineHit, MetricGroup};

    fn record_with_lines(found: u64, hit: u64, details: &[(u32, u64)]) -> CoverageRecord {
        CoverageRecord {
            source_file: "a.ts".to_string(),
            lines: MetricGroup {
                found,
                hit,
                details: details
                    .iter()
                    .map(|&(line, hit)| LineHit { line, hit })
                    .collect(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_detailed_single_uncovered_line() {
        // Source line 3 uncovered maps to one annotation at 0-based line 2.
        let record = record_with_lines(4, 3, &[(1, 1), (2, 1), (3, 0), (4, 1)]);
        let annotations = detailed_annotations(&record);

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].range.start_line, 2);
        assert_eq!(annotations[0].range.end_line, 2);
        assert_eq!(annotations[0].message, UNCOVERED_LINE_MESSAGE);
    }

    #[test]
    fn test_detailed_merges_contiguous_runs() {
        let record = record_with_lines(6, 2, &[(1, 0), (2, 0), (3, 1), (4, 0), (5, 0), (6, 0)]);
        let annotations = detailed_annotations(&record);

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].range, LineRange { start_line: 0, end_line: 1 });
        assert_eq!(annotations[1].range, LineRange { start_line: 3, end_line: 5 });
    }

    #[test]
    fn test_detailed_empty_details_never_panics() {
        let record = record_with_lines(0, 0, &[]);
        assert!(detailed_annotations(&record).is_empty());

        let record = CoverageRecord::default();
        assert!(detailed_annotations(&record).is_empty());
    }

    #[test]
    fn test_detailed_fully_covered() {
        let record = record_with_lines(2, 2, &[(1, 3), (2, 9)]);
        assert!(detailed_annotations(&record).is_empty());
    }

    #[test]
    fn test_summary_spans_first_to_last_uncovered() {
        let record = record_with_lines(5, 2, &[(1, 1), (2, 0), (3, 1), (4, 0), (5, 1)]);
        let annotation = summary_annotation(&record, true).unwrap();

        assert_eq!(annotation.range, LineRange { start_line: 1, end_line: 3 });
        assert_eq!(annotation.message, "2/5 lines covered");
    }

    #[test]
    fn test_summary_point_when_span_disabled() {
        let record = record_with_lines(5, 2, &[(1, 1), (2, 0), (3, 1), (4, 0), (5, 1)]);
        let annotation = summary_annotation(&record, false).unwrap();

        assert_eq!(annotation.range, LineRange { start_line: 1, end_line: 1 });
    }

    #[test]
    fn test_summary_none_when_fully_covered() {
        let record = record_with_lines(2, 2, &[(1, 1), (2, 1)]);
        assert_eq!(summary_annotation(&record, true), None);

        let record = record_with_lines(0, 0, &[]);
        assert_eq!(summary_annotation(&record, true), None);
    }

    #[test]
    fn test_summary_none_when_counts_disagree_but_details_covered() {
        // Counters claim a miss but every detail line is hit: nothing to
        // anchor the summary to.
        let record = record_with_lines(4, 3, &[(1, 1), (2, 1)]);
        assert_eq!(summary_annotation(&record, true), None);
    }

    #[test]
    fn test_cache_lazy_population_and_invalidation() {
        let mut cache = AnnotationCache::new();
        let record = record_with_lines(2, 1, &[(1, 0), (2, 1)]);
        let path = Path::new("/proj/src/a.rs");

        assert!(cache.get(path).is_none());
        assert_eq!(cache.get_or_compute(path, &record).len(), 1);
        assert!(cache.get(path).is_some());

        cache.invalidate(path);
        assert!(cache.get(path).is_none());
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = AnnotationCache::new();
        cache.insert(PathBuf::from("/a"), vec![]);
        cache.insert(PathBuf::from("/b"), vec![]);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
