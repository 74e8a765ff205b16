//! Iterator over the upgrade steps of a migration chain.

use std::collections::BTreeSet;

use crate::migration::chain::VersionGraph;
use crate::migration::version::VersionId;

/// Iterator over successive versions of a [`VersionGraph`] walk.
///
/// Created by [`VersionGraph::steps_from`]. Yields each successor in upgrade
/// order, starting after the version the walk began at. Every yielded version
/// is remembered, so a cyclic pair set cannot make the iterator spin.
#[derive(Debug, Clone)]
pub struct MigrationSteps<'a> {
    graph: &'a VersionGraph,
    cursor: VersionId,
    visited: BTreeSet<VersionId>,
}

impl<'a> MigrationSteps<'a> {
    pub(crate) fn new(graph: &'a VersionGraph, start: &VersionId) -> Self {
        Self {
            graph,
            cursor: start.clone(),
            visited: BTreeSet::from([start.clone()]),
        }
    }
}

impl<'a> Iterator for MigrationSteps<'a> {
    type Item = &'a VersionId;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.graph.next_version(&self.cursor)?;
        if !self.visited.insert(next.clone()) {
            return None;
        }
        self.cursor = next.clone();
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_yield_successors_in_order() {
        let chain = VersionGraph::linear(["v1", "v2", "v3"]);
        let start = VersionId::new("v1");
        let steps: Vec<&VersionId> = chain.steps_from(&start).collect();
        assert_eq!(steps, vec![&VersionId::new("v2"), &VersionId::new("v3")]);
    }

    #[test]
    fn test_steps_are_exhausted_after_leaf() {
        let chain = VersionGraph::linear(["v1", "v2"]);
        let start = VersionId::new("v1");
        let mut steps = chain.steps_from(&start);
        assert_eq!(steps.next(), Some(&VersionId::new("v2")));
        assert_eq!(steps.next(), None);
        assert_eq!(steps.next(), None);
    }

    #[test]
    fn test_steps_stop_when_a_version_repeats() {
        let chain = VersionGraph::from_pairs([("a", "b"), ("b", "c"), ("c", "a")]);
        let start = VersionId::new("a");
        let steps: Vec<&VersionId> = chain.steps_from(&start).collect();
        assert_eq!(steps, vec![&VersionId::new("b"), &VersionId::new("c")]);
    }
}
