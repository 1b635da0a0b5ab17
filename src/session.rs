//! The per-host-session context object.
//!
//! Owns the coverage-by-file snapshot, the annotation cache, the visibility
//! state machine, and the badge provider. Everything is mutated from the
//! host's single event thread; the host calls in with lifecycle messages
//! and reads projections back out. Torn down by dropping the session.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::debug;

use crate::annotations::{detailed_annotations, summary_annotation, Annotation, AnnotationCache};
use crate::badge::{Badge, BadgeProvider};
use crate::coalesce::Coalescer;
use crate::config::{Config, ConfigOption};
use crate::error::Result;
use crate::mode::{ModeMachine, Transition, Visibility};
use crate::model::{CoverageCollection, CoverageRecord};
use crate::parser;

/// What the host should repaint once a coalesced refresh fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// Repaint every visible surface.
    All,
    /// Repaint one document's annotations.
    File(PathBuf),
}

pub struct Session {
    config: Config,
    coverage_by_file: HashMap<PathBuf, CoverageRecord>,
    cache: AnnotationCache,
    mode: ModeMachine,
    badges: BadgeProvider,
    visible: bool,
    /// Documents edited since the last parse; their annotations are
    /// withheld until fresh coverage arrives.
    stale_docs: BTreeSet<PathBuf>,
    refresh: Coalescer<Refresh>,
    last_parsed: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let visible = config.enable_on_startup;
        let mode = ModeMachine::new(config.detail_coverage_mode);
        let mut badges = BadgeProvider::new(config.coverage_threshold);
        badges.set_enabled(visible);

        Self {
            config,
            coverage_by_file: HashMap::new(),
            cache: AnnotationCache::new(),
            mode,
            badges,
            visible,
            stale_docs: BTreeSet::new(),
            refresh: Coalescer::default(),
            last_parsed: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.coverage_by_file.len()
    }

    #[must_use]
    pub fn last_parsed(&self) -> Option<DateTime<Utc>> {
        self.last_parsed
    }

    #[must_use]
    pub fn coverage_for(&self, path: &Path) -> Option<&CoverageRecord> {
        self.coverage_by_file.get(path)
    }

    /// All files in the snapshot, unordered.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &CoverageRecord)> {
        self.coverage_by_file
            .iter()
            .map(|(path, record)| (path.as_path(), record))
    }

    /// Parse a report file and replace the coverage snapshot with its
    /// contents. Returns the visibility transitions the host should apply
    /// now that coverage is ready.
    pub fn load_report(
        &mut self,
        report: &Path,
        project_root: &Path,
        now: Instant,
    ) -> Result<Vec<Transition>> {
        let collection = parser::parse_file(report)?;
        Ok(self.record_coverage(collection, project_root, now))
    }

    /// Replace the coverage snapshot wholesale with a freshly parsed
    /// collection, re-keyed onto absolute paths under `project_root`.
    ///
    /// The snapshot is never merged in place: two overlapping reports race
    /// and the later call wins per file path.
    pub fn record_coverage(
        &mut self,
        collection: CoverageCollection,
        project_root: &Path,
        now: Instant,
    ) -> Vec<Transition> {
        self.coverage_by_file.clear();
        self.cache.clear();
        self.stale_docs.clear();

        for record in collection {
            if record.source_file.is_empty() {
                debug!("dropping coverage record without a source file");
                continue;
            }
            let key = absolute_key(project_root, &record.source_file);
            // Eager population: the decoration push right after a parse
            // should not pay the projection cost per file on first read.
            self.cache.insert(key.clone(), detailed_annotations(&record));
            self.coverage_by_file.insert(key, record);
        }

        self.last_parsed = Some(Utc::now());
        self.refresh.trigger(Refresh::All, now);
        self.mode.on_coverage_ready()
    }

    /// Turn coverage signals on. Idempotent; data reappears on the next
    /// report parse (the host re-runs discovery when toggling on).
    pub fn show_coverage(&mut self) {
        self.visible = true;
        self.badges.set_enabled(true);
    }

    /// Turn all coverage signals off and drop the snapshot. Idempotent:
    /// hiding twice leaves the same empty state as hiding once.
    pub fn hide_coverage(&mut self) {
        self.visible = false;
        self.badges.set_enabled(false);
        self.coverage_by_file.clear();
        self.cache.clear();
        self.stale_docs.clear();
    }

    /// Visibility of one document's annotations, accounting for the global
    /// toggle.
    #[must_use]
    pub fn visibility_for(&self, path: &Path) -> Visibility {
        if !self.visible {
            Visibility::Suppressed
        } else {
            self.mode.visibility(path)
        }
    }

    /// The annotation set to display for one document: per-line detail or
    /// the rolled-up summary depending on the document's visibility state,
    /// and nothing at all while coverage is hidden or the document has been
    /// edited since the last parse.
    pub fn annotations_for(&mut self, path: &Path) -> Vec<Annotation> {
        if self.stale_docs.contains(path) {
            return Vec::new();
        }
        let Some(record) = self.coverage_by_file.get(path) else {
            return Vec::new();
        };

        match self.visibility_for(path) {
            Visibility::Suppressed => Vec::new(),
            Visibility::Detailed => self.cache.get_or_compute(path, record).to_vec(),
            Visibility::Summary => {
                summary_annotation(record, self.config.summary_with_curly)
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Gutter decorations: the same annotation set, but only when the
    /// decorations option is enabled.
    pub fn decorations_for(&mut self, path: &Path) -> Vec<Annotation> {
        if !self.config.enable_decorations {
            return Vec::new();
        }
        self.annotations_for(path)
    }

    /// Status-bar text for the active document, or `None` to hide the
    /// status entry.
    #[must_use]
    pub fn status_text(&self, path: &Path) -> Option<String> {
        if !self.visible {
            return None;
        }
        self.coverage_by_file
            .get(path)
            .map(|record| format!("Coverage: {}/{} lines", record.lines.hit, record.lines.found))
    }

    /// Explorer badge for one file, if it sits below the threshold.
    #[must_use]
    pub fn badge_for(&self, path: &Path) -> Option<Badge> {
        self.badges.provide(path, &self.coverage_by_file)
    }

    pub fn document_opened(&mut self, path: &Path, now: Instant) -> Vec<Transition> {
        let transitions = self.mode.on_open(path);
        self.request_repaint(&transitions, now);
        transitions
    }

    pub fn document_closed(&mut self, path: &Path, now: Instant) -> Vec<Transition> {
        let transitions = self.mode.on_close(path);
        self.request_repaint(&transitions, now);
        transitions
    }

    pub fn document_activated(&mut self, path: &Path, now: Instant) -> Vec<Transition> {
        let transitions = self.mode.on_activate(path);
        self.request_repaint(&transitions, now);
        transitions
    }

    /// The document's text changed: coverage and document can now disagree,
    /// so its annotations are dropped until the next parse.
    pub fn document_changed(&mut self, path: &Path, now: Instant) {
        self.cache.invalidate(path);
        self.stale_docs.insert(path.to_path_buf());
        self.refresh.trigger(Refresh::File(path.to_path_buf()), now);
    }

    /// Adopt a new configuration snapshot, returning which options changed.
    ///
    /// The detail policy is fixed for the session lifetime: a changed
    /// `detailCoverageMode` is ignored here and takes effect when the host
    /// builds its next session.
    pub fn apply_config(&mut self, newer: Config, now: Instant) -> Vec<ConfigOption> {
        let mut newer = newer;
        newer.detail_coverage_mode = self.mode.mode();

        let changed = self.config.diff(&newer);
        for option in &changed {
            match option {
                ConfigOption::CoverageThreshold => {
                    if self.badges.set_threshold(newer.coverage_threshold) {
                        self.refresh.trigger(Refresh::All, now);
                    }
                }
                ConfigOption::EnableDecorations => {
                    self.refresh.trigger(Refresh::All, now);
                }
                // Read at projection time or by the host (search criteria,
                // startup flag): nothing to recompute here.
                _ => {}
            }
        }
        self.config = newer;
        changed
    }

    /// Pump the coalesced repaint step. Returns a refresh once the window
    /// has elapsed with no further triggers; the host then pushes the
    /// affected annotation sets to its surfaces.
    pub fn poll_refresh(&mut self, now: Instant) -> Option<Refresh> {
        self.refresh.poll(now)
    }

    /// Drain any pending repaint immediately (host teardown).
    pub fn flush_refresh(&mut self) -> Option<Refresh> {
        self.refresh.flush()
    }

    fn request_repaint(&mut self, transitions: &[Transition], now: Instant) {
        match transitions {
            [] => {}
            [(path, _)] => self.refresh.trigger(Refresh::File(path.clone()), now),
            _ => self.refresh.trigger(Refresh::All, now),
        }
    }
}

/// Re-key a report path onto an absolute path under the project root.
pub(crate) fn absolute_key(project_root: &Path, source_file: &str) -> PathBuf {
    let path = Path::new(source_file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
