//! Per-vertex ancestor-set cache.
//!
//! # The Memory/Time Trade-Off
//!
//! This is the single largest memory cost in the system: for N concepts at
//! depth d the total footprint is O(N·d) entries (SNOMED-CT: hundreds of
//! thousands of concepts, tens of levels, tens of millions of entries).
//! The pass is therefore optional — depth- and leaf-count-based measures
//! work without it — but [`crate::path::AncSplEngine`] requires it, since
//! AncSPL converts every path query into an intersection of two cached
//! sets.
//!
//! Sets are stored as sorted, deduplicated `u32` position vectors: half
//! the footprint of `usize`, merge-intersectable in O(|a| + |b|), and
//! membership-testable by binary search.
//!
//! # The Sweep
//!
//! Vertices are processed in insertion order, which is topological, so
//! every parent's set is final when a vertex is reached:
//!
//! ```text
//! anc(v) = {v} ∪ ⋃ anc(p)   for p in parents(v)
//! ```
//!
//! One forward sweep, no fixpoint iteration — the DAG property exploited
//! directly. Ancestors always precede a vertex in insertion order, so
//! appending the vertex itself after the merge keeps the set sorted.

use tracing::debug;

use crate::error::{Error, Result};
use crate::taxonomy::vertex::{Pos, VertexId};
use crate::taxonomy::Taxonomy;

/// Frozen ancestor sets, plus optional per-ancestor path weights.
#[derive(Debug, Clone)]
pub(crate) struct AncestorCache {
    /// Sorted ancestor positions per vertex, self included.
    pub(crate) sets: Vec<Vec<Pos>>,
    /// Parallel to `sets`: minimum ascending path length (unit edges) from
    /// the vertex to each ancestor. Present only when requested.
    pub(crate) weights: Option<Vec<Vec<f64>>>,
}

impl Taxonomy {
    /// Compute and store the ancestor set of every vertex.
    ///
    /// With `include_weights`, additionally stores the minimum ascending
    /// path length from each vertex to each of its ancestors, for
    /// weighted-distance consumers (Jiang-Conrath-family measures).
    ///
    /// Recomputation replaces the previous cache wholesale.
    pub fn compute_cached_ancestor_set(&mut self, include_weights: bool) {
        let n = self.verts.len();
        let mut sets: Vec<Vec<Pos>> = Vec::with_capacity(n);
        let mut weights: Vec<Vec<f64>> = if include_weights {
            Vec::with_capacity(n)
        } else {
            Vec::new()
        };

        let mut total_entries = 0usize;
        for pos in 0..n {
            let parents = &self.verts[pos].parents;
            let mut set = union_many(parents.iter().map(|&p| sets[p as usize].as_slice()));

            if include_weights {
                // Minimum over parents of (1 + parent's weight to the
                // ancestor), for each merged ancestor.
                let mut w = Vec::with_capacity(set.len() + 1);
                for &a in &set {
                    let mut best = f64::INFINITY;
                    for &p in parents {
                        let pset = &sets[p as usize];
                        if let Ok(i) = pset.binary_search(&a) {
                            let cand = 1.0 + weights[p as usize][i];
                            if cand < best {
                                best = cand;
                            }
                        }
                    }
                    w.push(best);
                }
                w.push(0.0);
                weights.push(w);
            }

            set.push(pos as Pos);
            total_entries += set.len();
            sets.push(set);
        }

        debug!(
            vertices = n,
            entries = total_entries,
            weighted = include_weights,
            "ancestor-set cache computed"
        );
        self.ancestors = Some(AncestorCache {
            sets,
            weights: include_weights.then_some(weights),
        });
    }

    /// Is the ancestor-set cache available?
    pub fn has_ancestor_cache(&self) -> bool {
        self.ancestors.is_some()
    }

    /// Minimum ascending path length (unit edges) from `v` to `ancestor`,
    /// or `None` when `ancestor` does not subsume `v`.
    ///
    /// Fails with [`Error::UncachedAncestors`] unless the cache was
    /// computed with `include_weights = true`.
    pub fn ancestor_path_weight(&self, v: VertexId, ancestor: VertexId) -> Result<Option<f64>> {
        let cache = self.ancestors.as_ref().ok_or(Error::UncachedAncestors)?;
        let weights = cache.weights.as_ref().ok_or(Error::UncachedAncestors)?;
        let (vp, ap) = (self.pos(v)?, self.pos(ancestor)?);
        Ok(cache.sets[vp]
            .binary_search(&(ap as Pos))
            .ok()
            .map(|i| weights[vp][i]))
    }
}

/// Merge two sorted, deduplicated position sets.
pub(crate) fn union_sorted(a: &[Pos], b: &[Pos]) -> Vec<Pos> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Merge any number of sorted, deduplicated position sets.
pub(crate) fn union_many<'a>(sets: impl Iterator<Item = &'a [Pos]>) -> Vec<Pos> {
    let mut acc: Vec<Pos> = Vec::new();
    for s in sets {
        if acc.is_empty() {
            acc.extend_from_slice(s);
        } else {
            acc = union_sorted(&acc, s);
        }
    }
    acc
}

/// Intersect two sorted, deduplicated position sets in O(|a| + |b|).
pub(crate) fn intersect_sorted(a: &[Pos], b: &[Pos]) -> Vec<Pos> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Taxonomy {
        let mut tax = Taxonomy::new();
        tax.add_vertex(0, &[]).unwrap();
        tax.add_vertex(1, &[0]).unwrap();
        tax.add_vertex(2, &[0]).unwrap();
        tax.add_vertex(3, &[1, 2]).unwrap();
        tax
    }

    #[test]
    fn test_ancestor_sets_on_diamond() {
        let mut tax = diamond();
        tax.compute_cached_ancestor_set(false);

        assert_eq!(tax.get(0).unwrap().ancestor_ids().unwrap(), vec![0]);
        assert_eq!(tax.get(1).unwrap().ancestor_ids().unwrap(), vec![0, 1]);
        // Shared root appears once despite two inheritance paths.
        assert_eq!(
            tax.get(3).unwrap().ancestor_ids().unwrap(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_uncached_ancestors_is_an_error() {
        let tax = diamond();
        assert_eq!(
            tax.get(3).unwrap().ancestor_ids(),
            Err(Error::UncachedAncestors)
        );
    }

    #[test]
    fn test_weighted_variant_stores_min_ascending_lengths() {
        let mut tax = diamond();
        // Long alternative route to the root: 0 -> 1 -> 4, alongside the
        // direct 0 -> 4 edge.
        tax.add_vertex(4, &[0, 1]).unwrap();
        tax.compute_cached_ancestor_set(true);

        assert_eq!(tax.ancestor_path_weight(4, 4).unwrap(), Some(0.0));
        assert_eq!(tax.ancestor_path_weight(4, 1).unwrap(), Some(1.0));
        // Direct edge wins over the two-step route through vertex 1.
        assert_eq!(tax.ancestor_path_weight(4, 0).unwrap(), Some(1.0));
        assert_eq!(tax.ancestor_path_weight(3, 0).unwrap(), Some(2.0));
        // Not an ancestor.
        assert_eq!(tax.ancestor_path_weight(1, 2).unwrap(), None);
    }

    #[test]
    fn test_weights_require_weighted_pass() {
        let mut tax = diamond();
        tax.compute_cached_ancestor_set(false);
        assert_eq!(tax.ancestor_path_weight(3, 0), Err(Error::UncachedAncestors));
    }

    #[test]
    fn test_set_helpers() {
        assert_eq!(union_sorted(&[1, 3, 5], &[2, 3, 6]), vec![1, 2, 3, 5, 6]);
        assert_eq!(intersect_sorted(&[1, 3, 5], &[2, 3, 5]), vec![3, 5]);
        assert!(intersect_sorted(&[1, 2], &[3, 4]).is_empty());
        assert_eq!(union_many(std::iter::empty::<&[Pos]>()), Vec::<Pos>::new());
    }
}
