//! Per-document visibility policy: decides whether a document shows
//! per-line detail or a rolled-up summary.
//!
//! The machine is host-independent. The host adapter translates real editor
//! events into `on_open`/`on_close`/`on_activate`/`on_coverage_ready`
//! messages; each message returns the `(path, visibility)` transitions the
//! host should apply to its surfaces.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Detail policy, selected once from configuration and fixed for the
/// session lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailMode {
    /// Every file with coverage always shows full per-line detail.
    #[default]
    All,
    /// Every file shows only the rolled-up summary annotation.
    Never,
    /// Open documents show detail; closed ones fall back to summary.
    Open,
    /// Only the single last-active document shows detail.
    Active,
}

impl DetailMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DetailMode::All => "all",
            DetailMode::Never => "never",
            DetailMode::Open => "open",
            DetailMode::Active => "active",
        }
    }
}

/// What a document currently shows. Tracked per document, recomputed on
/// lifecycle transitions, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Summary,
    Detailed,
    /// Coverage is globally hidden for this document.
    Suppressed,
}

/// A visibility change the host should apply to one document.
pub type Transition = (PathBuf, Visibility);

/// Explicit per-document state machine over the four detail policies.
#[derive(Debug)]
pub struct ModeMachine {
    mode: DetailMode,
    /// Which documents are currently open (`Open` policy bookkeeping).
    open_docs: BTreeSet<PathBuf>,
    /// The single tracked document (`Active` policy bookkeeping).
    last_active: Option<PathBuf>,
    states: HashMap<PathBuf, Visibility>,
}

impl ModeMachine {
    #[must_use]
    pub fn new(mode: DetailMode) -> Self {
        Self {
            mode,
            open_docs: BTreeSet::new(),
            last_active: None,
            states: HashMap::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> DetailMode {
        self.mode
    }

    /// Visibility for a document no event has touched yet.
    #[must_use]
    pub fn initial_visibility(&self) -> Visibility {
        match self.mode {
            DetailMode::All => Visibility::Detailed,
            _ => Visibility::Summary,
        }
    }

    /// Current visibility for one document.
    #[must_use]
    pub fn visibility(&self, path: &Path) -> Visibility {
        self.states
            .get(path)
            .copied()
            .unwrap_or_else(|| self.initial_visibility())
    }

    pub fn on_open(&mut self, path: &Path) -> Vec<Transition> {
        match self.mode {
            DetailMode::All => self.apply(vec![(path.to_path_buf(), Visibility::Detailed)]),
            DetailMode::Never => self.apply(vec![(path.to_path_buf(), Visibility::Summary)]),
            DetailMode::Open => {
                self.open_docs.insert(path.to_path_buf());
                self.apply(vec![(path.to_path_buf(), Visibility::Detailed)])
            }
            // Opening a document makes it the active one.
            DetailMode::Active => self.activate(path),
        }
    }

    pub fn on_close(&mut self, path: &Path) -> Vec<Transition> {
        match self.mode {
            DetailMode::All | DetailMode::Never => Vec::new(),
            DetailMode::Open => {
                self.open_docs.remove(path);
                self.apply(vec![(path.to_path_buf(), Visibility::Summary)])
            }
            DetailMode::Active => {
                // Only a close of the tracked document downgrades and
                // clears it; closing anything else is a no-op.
                if self.last_active.as_deref() == Some(path) {
                    self.last_active = None;
                    self.apply(vec![(path.to_path_buf(), Visibility::Summary)])
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn on_activate(&mut self, path: &Path) -> Vec<Transition> {
        match self.mode {
            DetailMode::All | DetailMode::Never | DetailMode::Open => Vec::new(),
            DetailMode::Active => self.activate(path),
        }
    }

    /// Re-apply the policy after a parse cycle, reconciling documents that
    /// were already open before coverage data arrived.
    pub fn on_coverage_ready(&mut self) -> Vec<Transition> {
        match self.mode {
            DetailMode::All | DetailMode::Never => Vec::new(),
            DetailMode::Open => {
                let transitions = self
                    .open_docs
                    .iter()
                    .map(|path| (path.clone(), Visibility::Detailed))
                    .collect();
                self.apply(transitions)
            }
            DetailMode::Active => match self.last_active.clone() {
                Some(path) => self.apply(vec![(path, Visibility::Detailed)]),
                None => Vec::new(),
            },
        }
    }

    fn activate(&mut self, path: &Path) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if let Some(previous) = self.last_active.take() {
            if previous != path {
                transitions.push((previous, Visibility::Summary));
            }
        }
        self.last_active = Some(path.to_path_buf());
        transitions.push((path.to_path_buf(), Visibility::Detailed));
        self.apply(transitions)
    }

    fn apply(&mut self, transitions: Vec<Transition>) -> Vec<Transition> {
        for (path, visibility) in &transitions {
            self.states.insert(path.clone(), *visibility);
        }
        transitions
    }
}
