//! Vertex identity and the borrowed vertex handle.

use crate::error::{Error, Result};
use crate::taxonomy::Taxonomy;

/// Public vertex identity: a 64-bit unsigned integer, unique per taxonomy.
///
/// Producers (WordNet, SNOMED-CT, OBO readers) choose the IDs; they need
/// not be contiguous. Internally every vertex also has a dense position in
/// insertion order, which the cache passes index by.
pub type VertexId = u64;

/// Dense internal position of a vertex, assigned in insertion order.
///
/// Insertion order is a valid topological order (parents precede
/// children), so the cache sweeps iterate positions directly. `u32` keeps
/// ancestor sets at half the footprint of `usize` at SNOMED scale.
pub(crate) type Pos = u32;

/// Internal vertex record.
///
/// The parent list is immutable after insertion; the child list grows as
/// later vertices declare this one as a parent. All derived attributes
/// (depth, counts, ancestor sets) live in taxonomy-owned caches, not here,
/// so queries never mutate the record.
#[derive(Debug, Clone)]
pub(crate) struct VertexRecord {
    pub(crate) id: VertexId,
    pub(crate) parents: Vec<Pos>,
    pub(crate) children: Vec<Pos>,
    /// Opaque external label (e.g. an OBO concept ID) for round-trip lookup.
    pub(crate) tag: Option<String>,
    /// Opaque slot written by external IC models.
    pub(crate) ic_value: f64,
    /// Opaque occurrence-probability slot written by external IC models.
    pub(crate) probability: f64,
}

/// A borrowed handle to one vertex of a [`Taxonomy`].
///
/// Attribute accessors fail with [`Error::UninitializedTaxonomy`] or
/// [`Error::UncachedAncestors`] when the corresponding batch pass has not
/// run; none of them silently default to zero.
#[derive(Debug, Clone, Copy)]
pub struct VertexRef<'a> {
    pub(crate) tax: &'a Taxonomy,
    pub(crate) pos: usize,
}

impl<'a> VertexRef<'a> {
    fn record(&self) -> &'a VertexRecord {
        &self.tax.verts[self.pos]
    }

    /// The vertex ID.
    pub fn id(&self) -> VertexId {
        self.record().id
    }

    /// The optional external tag attached to this vertex.
    pub fn tag(&self) -> Option<&'a str> {
        self.record().tag.as_deref()
    }

    /// IDs of the parent vertices (immutable since insertion).
    pub fn parent_ids(&self) -> Vec<VertexId> {
        self.record()
            .parents
            .iter()
            .map(|&p| self.tax.verts[p as usize].id)
            .collect()
    }

    /// IDs of the child vertices.
    pub fn child_ids(&self) -> Vec<VertexId> {
        self.record()
            .children
            .iter()
            .map(|&c| self.tax.verts[c as usize].id)
            .collect()
    }

    /// Number of parents.
    pub fn parent_count(&self) -> usize {
        self.record().parents.len()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.record().children.len()
    }

    /// A root has no parents.
    pub fn is_root(&self) -> bool {
        self.record().parents.is_empty()
    }

    /// A leaf has no children.
    pub fn is_leaf(&self) -> bool {
        self.record().children.is_empty()
    }

    /// Longest root-to-vertex path length (max-depth semantics).
    pub fn depth(&self) -> Result<usize> {
        self.tax
            .attrs
            .as_ref()
            .map(|a| a.depth[self.pos] as usize)
            .ok_or(Error::UninitializedTaxonomy { attribute: "depth" })
    }

    /// Number of distinct leaves subsumed by this vertex (1 for a leaf).
    pub fn leaf_count(&self) -> Result<usize> {
        self.tax
            .attrs
            .as_ref()
            .map(|a| a.leaf_count[self.pos])
            .ok_or(Error::UninitializedTaxonomy {
                attribute: "leaf_count",
            })
    }

    /// Number of subsumers: distinct ancestors including the vertex itself.
    pub fn subsumer_count(&self) -> Result<usize> {
        self.tax
            .attrs
            .as_ref()
            .map(|a| a.subsumer_count[self.pos])
            .ok_or(Error::UninitializedTaxonomy {
                attribute: "subsumer_count",
            })
    }

    /// Number of distinct descendants, excluding the vertex itself.
    pub fn hyponym_count(&self) -> Result<usize> {
        self.tax
            .attrs
            .as_ref()
            .map(|a| a.hyponym_count[self.pos])
            .ok_or(Error::UninitializedTaxonomy {
                attribute: "hyponym_count",
            })
    }

    /// The cached ancestor set as vertex IDs, including this vertex.
    ///
    /// Fails with [`Error::UncachedAncestors`] if the ancestor-set pass was
    /// skipped.
    pub fn ancestor_ids(&self) -> Result<Vec<VertexId>> {
        let cache = self.tax.ancestors.as_ref().ok_or(Error::UncachedAncestors)?;
        Ok(cache.sets[self.pos]
            .iter()
            .map(|&a| self.tax.verts[a as usize].id)
            .collect())
    }

    /// The IC value written by an external IC model (0.0 until set).
    pub fn ic_value(&self) -> f64 {
        self.record().ic_value
    }

    /// The occurrence probability written by an external IC model
    /// (0.0 until set).
    pub fn probability(&self) -> f64 {
        self.record().probability
    }
}
