//! Migration chains over schema versions.
//!
//! A [`VersionGraph`] records which schema version upgrades into which. It is
//! a directed graph in which every version has at most one successor, so a
//! walk from any starting version is a straight line. Construction never
//! fails: contradictory input (the same version mapped to two different
//! successors, or a repeated version in an ordered list) still produces a
//! usable graph, with [`VersionGraph::is_valid`] lowered so the session layer
//! can refuse it before any store work begins.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::migration::steps::MigrationSteps;
use crate::migration::version::VersionId;

/// Directed graph of schema version upgrades.
///
/// Each version maps to at most one successor. Versions that never appear as
/// a successor are *roots*; versions with no successor of their own (or whose
/// only successor is themselves) are *leaves*. A graph built from
/// contradictory input keeps all the mappings it was given but reports
/// `is_valid() == false`.
///
/// # Examples
///
/// ```
/// use datastack::{VersionGraph, VersionId};
///
/// let chain = VersionGraph::linear(["v1", "v2", "v3"]);
/// assert!(chain.is_valid());
/// assert_eq!(
///     chain.next_version(&VersionId::new("v1")),
///     Some(&VersionId::new("v2")),
/// );
/// assert_eq!(chain.next_version(&VersionId::new("v3")), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGraph {
    edges: BTreeMap<VersionId, VersionId>,
    roots: BTreeSet<VersionId>,
    leaves: BTreeSet<VersionId>,
    valid: bool,
}

impl VersionGraph {
    /// A graph with no migration constraints at all.
    ///
    /// An empty graph is valid and contains no versions.
    #[must_use]
    pub fn none() -> Self {
        Self {
            edges: BTreeMap::new(),
            roots: BTreeSet::new(),
            leaves: BTreeSet::new(),
            valid: true,
        }
    }

    /// A graph pinned to exactly one version.
    ///
    /// The version is both the sole root and the sole leaf, and has no
    /// successor.
    #[must_use]
    pub fn single(version: impl Into<VersionId>) -> Self {
        let version = version.into();
        Self {
            edges: BTreeMap::new(),
            roots: BTreeSet::from([version.clone()]),
            leaves: BTreeSet::from([version]),
            valid: true,
        }
    }

    /// An ordered chain in which each version upgrades into the next.
    ///
    /// The first element becomes the sole root and the last the sole leaf.
    /// An empty iterator produces [`VersionGraph::none`]. A repeated version
    /// makes the graph invalid, though every pairwise mapping is still
    /// recorded (later mappings overwrite earlier ones for the same source).
    #[must_use]
    pub fn linear<I, V>(versions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VersionId>,
    {
        let versions: Vec<VersionId> = versions.into_iter().map(Into::into).collect();
        let (Some(first), Some(last)) = (versions.first(), versions.last()) else {
            return Self::none();
        };

        let distinct: BTreeSet<&VersionId> = versions.iter().collect();
        let valid = distinct.len() == versions.len();

        let mut edges = BTreeMap::new();
        for pair in versions.windows(2) {
            edges.insert(pair[0].clone(), pair[1].clone());
        }

        Self {
            edges,
            roots: BTreeSet::from([first.clone()]),
            leaves: BTreeSet::from([last.clone()]),
            valid,
        }
    }

    /// A graph from explicit `(from, to)` pairs.
    ///
    /// Roots and leaves are derived from the pairs: a root appears as a
    /// source but never as a target, and a leaf appears as a target (or in a
    /// self-loop) without mapping onward to a different version. Mapping the
    /// same source to two different targets makes the graph invalid; the last
    /// mapping wins in the edge table. Repeating an identical pair is
    /// harmless.
    #[must_use]
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<VersionId>,
        B: Into<VersionId>,
    {
        let mut edges: BTreeMap<VersionId, VersionId> = BTreeMap::new();
        let mut targets: BTreeSet<VersionId> = BTreeSet::new();
        let mut valid = true;

        for (from, to) in pairs {
            let (from, to) = (from.into(), to.into());
            if let Some(previous) = edges.insert(from, to.clone()) {
                if previous != to {
                    valid = false;
                }
            }
            targets.insert(to);
        }

        let mut members: BTreeSet<VersionId> = edges.keys().cloned().collect();
        members.extend(targets.iter().cloned());

        let roots = members
            .iter()
            .filter(|version| !targets.contains(*version))
            .cloned()
            .collect();
        let leaves = members
            .iter()
            .filter(|version| match edges.get(*version) {
                None => true,
                Some(next) => next == *version,
            })
            .cloned()
            .collect();

        Self {
            edges,
            roots,
            leaves,
            valid,
        }
    }

    /// Whether the construction input was free of contradictions.
    ///
    /// An invalid graph still answers every query; the flag only tells the
    /// session layer not to trust it.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the graph mentions no versions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.roots.is_empty() && self.leaves.is_empty()
    }

    /// Whether the graph mentions `version` anywhere.
    #[must_use]
    pub fn contains(&self, version: &VersionId) -> bool {
        self.roots.contains(version)
            || self.leaves.contains(version)
            || self.edges.contains_key(version)
            || self.edges.values().any(|target| target == version)
    }

    /// The successor of `version`, if it has one.
    ///
    /// A version mapped to itself reports no successor, so upgrade loops
    /// driven by this query always terminate.
    #[must_use]
    pub fn next_version(&self, version: &VersionId) -> Option<&VersionId> {
        match self.edges.get(version) {
            Some(next) if next != version => Some(next),
            _ => None,
        }
    }

    /// Versions that only ever appear as upgrade sources.
    #[must_use]
    pub const fn roots(&self) -> &BTreeSet<VersionId> {
        &self.roots
    }

    /// Versions with no onward upgrade.
    #[must_use]
    pub const fn leaves(&self) -> &BTreeSet<VersionId> {
        &self.leaves
    }

    /// Every version the graph mentions, as source, target, root, or leaf.
    #[must_use]
    pub fn versions(&self) -> BTreeSet<VersionId> {
        let mut members: BTreeSet<VersionId> = self.edges.keys().cloned().collect();
        members.extend(self.edges.values().cloned());
        members.extend(self.roots.iter().cloned());
        members.extend(self.leaves.iter().cloned());
        members
    }

    /// Iterator over the successors of `from`, in upgrade order.
    ///
    /// The starting version itself is not yielded. The iterator refuses to
    /// revisit a version, so it terminates even on graphs whose pairs form a
    /// cycle.
    #[must_use]
    pub fn steps_from(&self, from: &VersionId) -> MigrationSteps<'_> {
        MigrationSteps::new(self, from)
    }

    /// Human-readable rendering of every upgrade path.
    ///
    /// One line per root, in sorted order, with versions joined by `" -> "`.
    /// Intended for logs and debugging only; the format is not stable.
    #[must_use]
    pub fn debug_path(&self) -> String {
        let mut lines = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let mut line = root.to_string();
            for step in self.steps_from(root) {
                line.push_str(" -> ");
                line.push_str(step.as_str());
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

impl Default for VersionGraph {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for VersionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "(unconstrained)")
        } else {
            write!(f, "{}", self.debug_path())
        }
    }
}
