//! The cached-attribute computer: batch passes over the topological order.
//!
//! # The Sweeps
//!
//! Insertion order is topological (parents precede children), so every
//! attribute falls out of plain sweeps with no fixpoint iteration:
//!
//! ```text
//! Attribute       │ Sweep    │ Recurrence
//! ────────────────┼──────────┼──────────────────────────────────────────
//! depth           │ forward  │ 0 at roots, else 1 + max over parents
//! leaf_count      │ reverse  │ |distinct leaves subsumed| (1 at a leaf)
//! hyponym_count   │ reverse  │ |distinct descendants|, self excluded
//! subsumer_count  │ forward  │ |distinct ancestors|, self included
//! ```
//!
//! Depth uses max-root-path semantics: edge-counting similarity measures
//! need the longest root-to-node path consistent with their notion of
//! distance, not the shortest.
//!
//! # Multiple Inheritance
//!
//! Under multiple inheritance the transitive counts must not double-count
//! a vertex reachable along several paths, so the recurrences above are
//! set unions, never sums. When the ancestor-set cache is already present
//! the subsumer count is read straight off it; otherwise the counts run a
//! transient sweep that frees each vertex's scratch set as soon as its
//! last dependent has consumed it, keeping peak memory well below a full
//! cache at SNOMED scale.
//!
//! # Query Policy
//!
//! Attribute accessors fail with `UninitializedTaxonomy` before this pass
//! runs; no silent zero defaults. The pass recomputes everything from
//! scratch on every call, so repeated invocations on an unchanged
//! taxonomy yield identical values.

use tracing::debug;

use crate::taxonomy::ancestors::union_many;
use crate::taxonomy::vertex::Pos;
use crate::taxonomy::Taxonomy;

/// Frozen scalar attributes, indexed by vertex position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CachedAttributes {
    pub(crate) depth: Vec<u32>,
    pub(crate) leaf_count: Vec<usize>,
    pub(crate) subsumer_count: Vec<usize>,
    pub(crate) hyponym_count: Vec<usize>,
}

impl Taxonomy {
    /// Compute depth, leaf count, subsumer count, and hyponym count for
    /// every vertex. Must run after all insertions and before any
    /// attribute query; rerun it after further insertions.
    pub fn compute_cached_attributes(&mut self) {
        let n = self.verts.len();

        // Forward sweep: longest root-to-vertex path.
        let mut depth = vec![0u32; n];
        for pos in 0..n {
            depth[pos] = self.verts[pos]
                .parents
                .iter()
                .map(|&p| depth[p as usize] + 1)
                .max()
                .unwrap_or(0);
        }

        let (leaf_count, hyponym_count) = self.descendant_counts();

        let subsumer_count = match &self.ancestors {
            Some(cache) => cache.sets.iter().map(Vec::len).collect(),
            None => self.subsumer_counts_transient(),
        };

        debug!(vertices = n, "cached attributes computed");
        self.attrs = Some(CachedAttributes {
            depth,
            leaf_count,
            subsumer_count,
            hyponym_count,
        });
    }

    /// Have the cached attributes been computed?
    pub fn has_cached_attributes(&self) -> bool {
        self.attrs.is_some()
    }

    /// Reverse sweep: distinct-leaf and distinct-descendant counts.
    ///
    /// Scratch sets are freed once every parent of a vertex has been
    /// processed, bounding peak memory by the widest frontier instead of
    /// the whole graph.
    fn descendant_counts(&self) -> (Vec<usize>, Vec<usize>) {
        let n = self.verts.len();
        let mut leaf_count = vec![0usize; n];
        let mut hyponym_count = vec![0usize; n];

        let mut leaf_sets: Vec<Option<Vec<Pos>>> = vec![None; n];
        let mut desc_sets: Vec<Option<Vec<Pos>>> = vec![None; n];
        let mut pending_parents: Vec<usize> =
            self.verts.iter().map(|v| v.parents.len()).collect();

        // Children always sit after their parents, so the reverse order
        // visits all children of a vertex first.
        for pos in (0..n).rev() {
            let rec = &self.verts[pos];

            let mut desc = vec![pos as Pos];
            desc.extend(union_many(
                rec.children
                    .iter()
                    .map(|&c| desc_sets[c as usize].as_deref().unwrap_or(&[])),
            ));
            hyponym_count[pos] = desc.len() - 1;

            let leaves = if rec.children.is_empty() {
                vec![pos as Pos]
            } else {
                union_many(
                    rec.children
                        .iter()
                        .map(|&c| leaf_sets[c as usize].as_deref().unwrap_or(&[])),
                )
            };
            leaf_count[pos] = leaves.len();

            for &c in &rec.children {
                let c = c as usize;
                pending_parents[c] -= 1;
                if pending_parents[c] == 0 {
                    desc_sets[c] = None;
                    leaf_sets[c] = None;
                }
            }
            desc_sets[pos] = Some(desc);
            leaf_sets[pos] = Some(leaves);
        }

        (leaf_count, hyponym_count)
    }

    /// Forward sweep computing |ancestors ∪ {self}| without keeping the
    /// sets, for taxonomies built with ancestor caching disabled.
    fn subsumer_counts_transient(&self) -> Vec<usize> {
        let n = self.verts.len();
        let mut counts = vec![0usize; n];
        let mut sets: Vec<Option<Vec<Pos>>> = vec![None; n];
        let mut pending_children: Vec<usize> =
            self.verts.iter().map(|v| v.children.len()).collect();

        for pos in 0..n {
            let rec = &self.verts[pos];
            let mut set = union_many(
                rec.parents
                    .iter()
                    .map(|&p| sets[p as usize].as_deref().unwrap_or(&[])),
            );
            set.push(pos as Pos);
            counts[pos] = set.len();

            for &p in &rec.parents {
                let p = p as usize;
                pending_children[p] -= 1;
                if pending_children[p] == 0 {
                    sets[p] = None;
                }
            }
            if pending_children[pos] > 0 {
                sets[pos] = Some(set);
            }
        }

        counts
    }
}
