//! Worklist construction of a taxonomy from unordered concept records.
//!
//! Ontology readers (OBO, GO, WordNet, SNOMED RF2) rarely emit concepts in
//! an insertion-ready order; [`Taxonomy::add_vertex`] however requires
//! every parent to be present already. This builder accepts declarations
//! in any order and finds a valid topological insertion order itself:
//!
//! 1. Queue all records.
//! 2. Pop a record; if every declared parent is already inserted, insert
//!    it, otherwise requeue it at the tail.
//! 3. A full cycle over the queue with no insertion means no record will
//!    ever become ready: either a parent ID never appears anywhere
//!    ([`Error::MissingParent`]) or the remainder forms a cycle
//!    ([`Error::CycleDetected`]).
//!
//! Worst-case requeue cost is O(N·d) for N concepts at depth d.
//!
//! Ontologies with several disconnected top concepts can be unified under
//! a synthesized virtual root ([`TaxonomyBuilder::unify_roots`]), giving
//! the DAG a single root so that any two concepts share a subsumer.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{Error, Result};
use crate::taxonomy::vertex::VertexId;
use crate::taxonomy::Taxonomy;

#[derive(Debug, Clone)]
struct ConceptRecord {
    id: VertexId,
    parents: Vec<VertexId>,
    tag: Option<String>,
}

/// Accumulates concept declarations in arbitrary order and builds a
/// [`Taxonomy`] by topological worklist insertion.
///
/// ```
/// use taxodist::TaxonomyBuilder;
///
/// let mut builder = TaxonomyBuilder::new();
/// builder.record(3, &[1, 2]); // child declared before its parents
/// builder.record(1, &[0]);
/// builder.record(2, &[0]);
/// builder.record(0, &[]);
/// let tax = builder.build().unwrap();
/// assert_eq!(tax.len(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaxonomyBuilder {
    records: Vec<ConceptRecord>,
    virtual_root: Option<VertexId>,
}

impl TaxonomyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder sized for `expected` concepts.
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            records: Vec::with_capacity(expected),
            virtual_root: None,
        }
    }

    /// Declare a concept and its parent IDs. Order is irrelevant.
    pub fn record(&mut self, id: VertexId, parents: &[VertexId]) -> &mut Self {
        self.records.push(ConceptRecord {
            id,
            parents: parents.to_vec(),
            tag: None,
        });
        self
    }

    /// Declare a concept carrying an external tag (e.g. an OBO ID).
    pub fn record_tagged(
        &mut self,
        id: VertexId,
        parents: &[VertexId],
        tag: impl Into<String>,
    ) -> &mut Self {
        self.records.push(ConceptRecord {
            id,
            parents: parents.to_vec(),
            tag: Some(tag.into()),
        });
        self
    }

    /// Synthesize a virtual root with the given ID and re-parent every
    /// otherwise-parentless concept under it, unifying disconnected top
    /// concepts into a single-rooted DAG.
    pub fn unify_roots(&mut self, root_id: VertexId) -> &mut Self {
        self.virtual_root = Some(root_id);
        self
    }

    /// Number of recorded concepts (excluding any virtual root).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Have any concepts been recorded?
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve a topological insertion order and build the taxonomy.
    ///
    /// Fails with [`Error::DuplicateId`] on repeated declarations,
    /// [`Error::MissingParent`] when a parent ID never appears, and
    /// [`Error::CycleDetected`] when the remaining records refer into one
    /// another. On failure the partial taxonomy is discarded.
    pub fn build(mut self) -> Result<Taxonomy> {
        let mut tax = Taxonomy::with_capacity(self.records.len() + 1);

        if let Some(root_id) = self.virtual_root {
            tax.add_vertex(root_id, &[])?;
            for rec in &mut self.records {
                if rec.parents.is_empty() {
                    rec.parents.push(root_id);
                }
            }
        }

        let mut pending: VecDeque<ConceptRecord> = self.records.into();
        let mut since_progress = 0usize;

        while let Some(rec) = pending.pop_front() {
            if rec.parents.iter().all(|p| tax.contains(*p)) {
                tax.add_vertex(rec.id, &rec.parents)?;
                if let Some(tag) = rec.tag {
                    tax.set_tag(rec.id, tag)?;
                }
                since_progress = 0;
            } else {
                since_progress += 1;
                pending.push_back(rec);
                if since_progress > pending.len() {
                    return Err(Self::diagnose(&tax, &pending));
                }
            }
        }

        debug!(vertices = tax.len(), "taxonomy built from worklist");
        Ok(tax)
    }

    /// Classify a stalled worklist: a dangling parent reference beats the
    /// generic cycle report.
    fn diagnose(tax: &Taxonomy, pending: &VecDeque<ConceptRecord>) -> Error {
        for rec in pending {
            for &p in &rec.parents {
                if !tax.contains(p) && !pending.iter().any(|other| other.id == p) {
                    return Error::MissingParent { id: rec.id, parent: p };
                }
            }
        }
        Error::CycleDetected {
            remaining: pending.len(),
        }
    }
}
