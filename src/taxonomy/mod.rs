//! The taxonomy graph engine: a concept DAG with cached topological
//! attributes.
//!
//! # The Representation
//!
//! A taxonomy is a directed acyclic graph of concepts with multiple
//! inheritance (WordNet synsets, SNOMED-CT concepts, Gene Ontology terms).
//! Vertices are stored densely in insertion order; because every vertex is
//! inserted after all its parents, insertion order doubles as a
//! topological order and every cache pass is a single sweep.
//!
//! ```text
//! Phase                          │ Call
//! ───────────────────────────────┼────────────────────────────────────
//! Construction                   │ add_vertex / TaxonomyBuilder::build
//! Scalar attributes (required)   │ compute_cached_attributes
//! Ancestor sets (optional)       │ compute_cached_ancestor_set
//! Queries (read-only)            │ VertexRef, LCS/MICA, path engines
//! ```
//!
//! Phases are sequenced by the API, not by locks: cache passes take
//! `&mut Taxonomy`, queries take `&Taxonomy`. After the passes a taxonomy
//! can be shared read-only across threads; nothing on the query path
//! mutates it.
//!
//! # Module Overview
//!
//! - [`TaxonomyBuilder`]: worklist builder accepting concepts in
//!   arbitrary order
//! - [`Taxonomy::compute_cached_attributes`]: depth / leaf / subsumer /
//!   hyponym batch passes
//! - [`Taxonomy::compute_cached_ancestor_set`]: per-vertex ancestor-set
//!   cache, the memory-dominant structure and the input
//!   [`crate::path::AncSplEngine`] requires
//! - [`Taxonomy::health_check`]: structural checks over a built taxonomy

mod ancestors;
mod attributes;
mod build;
#[allow(clippy::module_inception)]
mod taxonomy;
mod validate;
mod vertex;

pub use build::TaxonomyBuilder;
pub use taxonomy::Taxonomy;
pub use validate::{Severity, ValidationIssue, ValidationReport};
pub use vertex::{VertexId, VertexRef};

pub(crate) use ancestors::AncestorCache;
pub(crate) use attributes::CachedAttributes;
