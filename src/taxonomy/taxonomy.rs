//! The taxonomy: dense vertex storage, construction, and subsumer queries.

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};

use fixedbitset::FixedBitSet;
use tracing::debug;

use crate::error::{Error, Result};
use crate::taxonomy::ancestors::{intersect_sorted, AncestorCache};
use crate::taxonomy::attributes::CachedAttributes;
use crate::taxonomy::vertex::{Pos, VertexId, VertexRecord, VertexRef};

/// A concept DAG with cached topological attributes.
///
/// Vertices are stored densely in insertion order, with an ID→position map
/// on the side (producer IDs need not be contiguous). Insertion requires
/// parents to be present already, so positions are a topological order and
/// every cache pass is a single sweep over them.
///
/// Construction mutates the taxonomy; cache passes take `&mut self`; all
/// queries take `&self`. Any insertion invalidates previously computed
/// caches, so a query can never observe a cache built for a smaller graph.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    pub(crate) verts: Vec<VertexRecord>,
    pub(crate) index: HashMap<VertexId, usize>,
    pub(crate) tag_index: HashMap<String, usize>,
    pub(crate) attrs: Option<CachedAttributes>,
    pub(crate) ancestors: Option<AncestorCache>,
}

impl Taxonomy {
    /// Create an empty taxonomy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty taxonomy sized for `expected` vertices.
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            verts: Vec::with_capacity(expected),
            index: HashMap::with_capacity(expected),
            tag_index: HashMap::new(),
            attrs: None,
            ancestors: None,
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.verts.len()
    }

    /// Is the taxonomy empty?
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// Does a vertex with this ID exist?
    pub fn contains(&self, id: VertexId) -> bool {
        self.index.contains_key(&id)
    }

    /// Insert a new vertex with the given parent IDs.
    ///
    /// Every parent must already be present, so insertion order is a valid
    /// topological order. Fails with [`Error::DuplicateId`] or
    /// [`Error::MissingParent`] before any mutation takes place; a failed
    /// insertion leaves the taxonomy exactly as it was.
    ///
    /// Inserting into a taxonomy whose caches were already computed
    /// invalidates them; rerun the cache passes afterwards.
    pub fn add_vertex(&mut self, id: VertexId, parents: &[VertexId]) -> Result<VertexRef<'_>> {
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateId { id });
        }

        let mut parent_pos = Vec::with_capacity(parents.len());
        for &parent in parents {
            match self.index.get(&parent) {
                Some(&p) => {
                    // Tolerate a repeated parent ID in the declaration.
                    if !parent_pos.contains(&(p as Pos)) {
                        parent_pos.push(p as Pos);
                    }
                }
                None => return Err(Error::MissingParent { id, parent }),
            }
        }

        // All inputs validated; mutation starts here.
        self.attrs = None;
        self.ancestors = None;

        let pos = self.verts.len();
        for &p in &parent_pos {
            self.verts[p as usize].children.push(pos as Pos);
        }
        self.verts.push(VertexRecord {
            id,
            parents: parent_pos,
            children: Vec::new(),
            tag: None,
            ic_value: 0.0,
            probability: 0.0,
        });
        self.index.insert(id, pos);

        Ok(VertexRef { tax: self, pos })
    }

    /// Look up a vertex by ID.
    pub fn get(&self, id: VertexId) -> Option<VertexRef<'_>> {
        self.index.get(&id).map(|&pos| VertexRef { tax: self, pos })
    }

    /// Look up a vertex by ID, failing with [`Error::VertexNotFound`].
    pub fn vertex(&self, id: VertexId) -> Result<VertexRef<'_>> {
        self.get(id).ok_or(Error::VertexNotFound { id })
    }

    /// Iterate vertices in insertion order (a topological order).
    pub fn iter(&self) -> impl Iterator<Item = VertexRef<'_>> {
        (0..self.verts.len()).map(move |pos| VertexRef { tax: self, pos })
    }

    /// IDs of the root vertices (no parents).
    pub fn root_ids(&self) -> Vec<VertexId> {
        self.verts
            .iter()
            .filter(|v| v.parents.is_empty())
            .map(|v| v.id)
            .collect()
    }

    /// Release all vertex storage and caches.
    pub fn clear(&mut self) {
        self.verts.clear();
        self.verts.shrink_to_fit();
        self.index.clear();
        self.tag_index.clear();
        self.attrs = None;
        self.ancestors = None;
        debug!("taxonomy cleared");
    }

    /// Attach an opaque external label (e.g. an OBO concept ID) to a
    /// vertex, replacing any previous tag.
    pub fn set_tag(&mut self, id: VertexId, tag: impl Into<String>) -> Result<()> {
        let pos = self.pos(id)?;
        if let Some(old) = self.verts[pos].tag.take() {
            self.tag_index.remove(&old);
        }
        let tag = tag.into();
        self.tag_index.insert(tag.clone(), pos);
        self.verts[pos].tag = Some(tag);
        Ok(())
    }

    /// Look up a vertex by its external tag.
    pub fn get_by_tag(&self, tag: &str) -> Option<VertexRef<'_>> {
        self.tag_index
            .get(tag)
            .map(|&pos| VertexRef { tax: self, pos })
    }

    /// Write the IC-value slot of a vertex (external IC models only).
    pub fn set_ic_value(&mut self, id: VertexId, ic_value: f64) -> Result<()> {
        let pos = self.pos(id)?;
        self.verts[pos].ic_value = ic_value;
        Ok(())
    }

    /// Write the occurrence-probability slot of a vertex (external IC
    /// models only).
    pub fn set_probability(&mut self, id: VertexId, probability: f64) -> Result<()> {
        let pos = self.pos(id)?;
        self.verts[pos].probability = probability;
        Ok(())
    }

    /// Sum of the probability slots over the leaf vertices.
    pub fn sum_leaf_probability(&self) -> f64 {
        self.verts
            .iter()
            .filter(|v| v.children.is_empty())
            .map(|v| v.probability)
            .sum()
    }

    /// The lowest common subsumer of two vertices: the common ancestor at
    /// maximum depth, breaking ties toward the lowest vertex ID so results
    /// are reproducible on multiple-inheritance taxonomies.
    ///
    /// Requires [`Taxonomy::compute_cached_attributes`]; uses the ancestor
    /// cache when present, or an on-the-fly upward traversal otherwise.
    pub fn lcs(&self, a: VertexId, b: VertexId) -> Result<VertexRef<'_>> {
        let (ap, bp) = (self.pos(a)?, self.pos(b)?);
        match self.deepest_common_subsumer(ap, bp)? {
            Some(pos) => Ok(VertexRef { tax: self, pos }),
            None => Err(Error::NoCommonSubsumer { a, b }),
        }
    }

    /// The most informative common ancestor: the common subsumer with the
    /// highest IC value, breaking ties toward the lowest vertex ID.
    ///
    /// IC values are written by an external IC model; with no model applied
    /// every slot is 0.0 and the tie-break alone decides.
    pub fn mica(&self, a: VertexId, b: VertexId) -> Result<VertexRef<'_>> {
        let (ap, bp) = (self.pos(a)?, self.pos(b)?);
        let common = intersect_sorted(
            &self.ancestor_positions(ap),
            &self.ancestor_positions(bp),
        );
        let mut best: Option<usize> = None;
        for &c in &common {
            let c = c as usize;
            let better = match best {
                None => true,
                Some(cur) => {
                    let (ic_c, ic_cur) = (self.verts[c].ic_value, self.verts[cur].ic_value);
                    ic_c > ic_cur || (ic_c == ic_cur && self.verts[c].id < self.verts[cur].id)
                }
            };
            if better {
                best = Some(c);
            }
        }
        match best {
            Some(pos) => Ok(VertexRef { tax: self, pos }),
            None => Err(Error::NoCommonSubsumer { a, b }),
        }
    }

    /// The vertex set that can appear on any path between two vertices:
    /// the union of the ancestor and descendant closures of both. Returned
    /// as ascending vertex IDs.
    ///
    /// Subgraph scalability experiments extract this set to evaluate path
    /// queries on subtaxonomies of growing size.
    pub fn common_subgraph(&self, a: VertexId, b: VertexId) -> Result<Vec<VertexId>> {
        let (ap, bp) = (self.pos(a)?, self.pos(b)?);

        let mut member = FixedBitSet::with_capacity(self.verts.len());
        for up in [true, false] {
            for seed in [ap, bp] {
                self.closure_into(seed, up, &mut member);
            }
        }

        let mut ids: Vec<VertexId> = member.ones().map(|pos| self.verts[pos].id).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    pub(crate) fn pos(&self, id: VertexId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(Error::VertexNotFound { id })
    }

    /// The ancestor positions of a vertex (self included), sorted
    /// ascending. Borrows the cache when available, otherwise traverses
    /// upward with a call-local visited set.
    pub(crate) fn ancestor_positions(&self, pos: usize) -> Cow<'_, [Pos]> {
        match &self.ancestors {
            Some(cache) => Cow::Borrowed(cache.sets[pos].as_slice()),
            None => {
                let mut visited = FixedBitSet::with_capacity(self.verts.len());
                self.closure_into(pos, true, &mut visited);
                let mut set: Vec<Pos> = visited.ones().map(|p| p as Pos).collect();
                set.sort_unstable();
                Cow::Owned(set)
            }
        }
    }

    /// Deepest common subsumer of two positions, lowest-ID tie-break.
    /// `Ok(None)` when the vertices share no ancestor.
    pub(crate) fn deepest_common_subsumer(&self, ap: usize, bp: usize) -> Result<Option<usize>> {
        let attrs = self.attrs.as_ref().ok_or(Error::UninitializedTaxonomy {
            attribute: "depth",
        })?;
        let common = intersect_sorted(
            &self.ancestor_positions(ap),
            &self.ancestor_positions(bp),
        );
        let mut best: Option<usize> = None;
        for &c in &common {
            let c = c as usize;
            let better = match best {
                None => true,
                Some(cur) => {
                    let (d_c, d_cur) = (attrs.depth[c], attrs.depth[cur]);
                    d_c > d_cur || (d_c == d_cur && self.verts[c].id < self.verts[cur].id)
                }
            };
            if better {
                best = Some(c);
            }
        }
        Ok(best)
    }

    /// Mark the transitive closure of `seed` (self included) in `visited`,
    /// following parent edges when `up`, child edges otherwise.
    fn closure_into(&self, seed: usize, up: bool, visited: &mut FixedBitSet) {
        let mut pending = VecDeque::new();
        pending.push_back(seed);
        visited.insert(seed);
        while let Some(cur) = pending.pop_front() {
            let rec = &self.verts[cur];
            let next = if up { &rec.parents } else { &rec.children };
            for &adj in next {
                if !visited.contains(adj as usize) {
                    visited.insert(adj as usize);
                    pending.push_back(adj as usize);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Diamond: R(0) -> A(1), B(2); C(3) under both A and B.
    fn diamond() -> Taxonomy {
        let mut tax = Taxonomy::new();
        tax.add_vertex(0, &[]).unwrap();
        tax.add_vertex(1, &[0]).unwrap();
        tax.add_vertex(2, &[0]).unwrap();
        tax.add_vertex(3, &[1, 2]).unwrap();
        tax
    }

    #[test]
    fn test_insertion_builds_bidirectional_adjacency() {
        let tax = diamond();
        assert_eq!(tax.len(), 4);
        assert_eq!(tax.get(0).unwrap().child_ids(), vec![1, 2]);
        assert_eq!(tax.get(3).unwrap().parent_ids(), vec![1, 2]);
        assert!(tax.get(0).unwrap().is_root());
        assert!(tax.get(3).unwrap().is_leaf());
    }

    #[test]
    fn test_duplicate_id_leaves_taxonomy_untouched() {
        let mut tax = Taxonomy::new();
        tax.add_vertex(1, &[]).unwrap();
        let err = tax.add_vertex(1, &[]).unwrap_err();
        assert_eq!(err, Error::DuplicateId { id: 1 });
        assert_eq!(tax.len(), 1);
        assert!(tax.get(1).unwrap().child_ids().is_empty());
    }

    #[test]
    fn test_missing_parent_is_rejected() {
        let mut tax = Taxonomy::new();
        tax.add_vertex(1, &[]).unwrap();
        let err = tax.add_vertex(5, &[99]).unwrap_err();
        assert_eq!(err, Error::MissingParent { id: 5, parent: 99 });
        assert_eq!(tax.len(), 1);
    }

    #[test]
    fn test_insertion_invalidates_caches() {
        let mut tax = diamond();
        tax.compute_cached_attributes();
        assert!(tax.get(3).unwrap().depth().is_ok());
        tax.add_vertex(4, &[3]).unwrap();
        assert_eq!(
            tax.get(3).unwrap().depth(),
            Err(Error::UninitializedTaxonomy { attribute: "depth" })
        );
    }

    #[test]
    fn test_tag_round_trip() {
        let mut tax = diamond();
        tax.set_tag(3, "GO:0008150").unwrap();
        assert_eq!(tax.get_by_tag("GO:0008150").unwrap().id(), 3);
        assert_eq!(tax.get(3).unwrap().tag(), Some("GO:0008150"));

        // Re-tagging drops the old label.
        tax.set_tag(3, "GO:0003674").unwrap();
        assert!(tax.get_by_tag("GO:0008150").is_none());
        assert_eq!(tax.get_by_tag("GO:0003674").unwrap().id(), 3);
    }

    #[test]
    fn test_lcs_on_diamond() {
        let mut tax = diamond();
        tax.compute_cached_attributes();

        // Works with or without the ancestor cache.
        assert_eq!(tax.lcs(1, 2).unwrap().id(), 0);
        tax.compute_cached_ancestor_set(false);
        assert_eq!(tax.lcs(1, 2).unwrap().id(), 0);

        // A vertex subsumes itself.
        assert_eq!(tax.lcs(3, 3).unwrap().id(), 3);
        // An ancestor is its own LCS with a descendant.
        assert_eq!(tax.lcs(1, 3).unwrap().id(), 1);
    }

    #[test]
    fn test_lcs_requires_attribute_pass() {
        let tax = diamond();
        assert_eq!(
            tax.lcs(1, 2).unwrap_err(),
            Error::UninitializedTaxonomy { attribute: "depth" }
        );
    }

    #[test]
    fn test_no_common_subsumer_between_disjoint_roots() {
        let mut tax = Taxonomy::new();
        tax.add_vertex(10, &[]).unwrap();
        tax.add_vertex(20, &[]).unwrap();
        tax.compute_cached_attributes();
        assert_eq!(
            tax.lcs(10, 20).unwrap_err(),
            Error::NoCommonSubsumer { a: 10, b: 20 }
        );
    }

    #[test]
    fn test_mica_prefers_highest_ic() {
        let mut tax = Taxonomy::new();
        tax.add_vertex(0, &[]).unwrap();
        tax.add_vertex(1, &[0]).unwrap();
        tax.add_vertex(2, &[1]).unwrap();
        tax.add_vertex(3, &[1]).unwrap();
        tax.set_ic_value(0, 0.0).unwrap();
        tax.set_ic_value(1, 2.5).unwrap();

        // Common subsumers of 2 and 3 are {0, 1}; vertex 1 is the most
        // informative.
        assert_eq!(tax.mica(2, 3).unwrap().id(), 1);
    }

    #[test]
    fn test_common_subgraph_of_diamond_siblings() {
        let tax = diamond();
        // Ancestors of 1 and 2 cover {0, 1, 2}; descendants add 3.
        assert_eq!(tax.common_subgraph(1, 2).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sum_leaf_probability() {
        let mut tax = diamond();
        tax.set_probability(3, 0.75).unwrap();
        tax.set_probability(0, 0.25).unwrap(); // not a leaf, ignored
        assert!((tax.sum_leaf_probability() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut tax = diamond();
        tax.compute_cached_attributes();
        tax.clear();
        assert!(tax.is_empty());
        assert!(tax.get(0).is_none());
    }
}
