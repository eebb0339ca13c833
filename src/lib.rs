//! # taxodist
//!
//! Taxonomy graph engine: in-memory concept DAGs (WordNet synsets,
//! SNOMED-CT concepts, Gene Ontology terms) with cached topological
//! attributes and the Ancestor-based Shortest Path Length (AncSPL)
//! approximation for large-scale semantic distance queries.
//!
//! # The Pipeline
//!
//! Construction and querying are explicit, sequenced phases — no locks,
//! no partially populated caches:
//!
//! ```text
//! Phase                        │ API
//! ─────────────────────────────┼─────────────────────────────────────
//! 1. Build the DAG             │ Taxonomy::add_vertex / TaxonomyBuilder
//! 2. Scalar attribute pass     │ compute_cached_attributes
//! 3. Ancestor-set pass (opt.)  │ compute_cached_ancestor_set
//! 4. Read-only queries         │ VertexRef, LCS/MICA, path engines
//! ```
//!
//! After phase 2/3 the taxonomy is frozen from the query side: every
//! query borrows it immutably, so a single instance can serve many
//! threads without synchronization.
//!
//! # Distance Queries
//!
//! [`ExactPathEngine`] is the O(V+E)-per-query Dijkstra oracle.
//! [`AncSplEngine`] answers from cached ancestor sets and depths in
//! O(|anc(u)| + |anc(v)|) per pair — an upper bound on the true distance,
//! exact on trees, designed for the millions of pairwise evaluations
//! benchmark experiments need.
//!
//! ```
//! use taxodist::{AncSplEngine, Taxonomy};
//!
//! let mut tax = Taxonomy::new();
//! tax.add_vertex(0, &[])?;      // root
//! tax.add_vertex(1, &[0])?;
//! tax.add_vertex(2, &[0])?;
//! tax.add_vertex(3, &[1, 2])?;  // multiple inheritance
//! tax.compute_cached_attributes();
//! tax.compute_cached_ancestor_set(false);
//!
//! let engine = AncSplEngine::new(&tax)?;
//! assert_eq!(engine.distance(1, 2)?, 2.0);
//! # Ok::<(), taxodist::Error>(())
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `parallel` | rayon-powered `AncSplEngine::par_distances` batch evaluation |

pub mod cancel;
/// Error types used across `taxodist`.
pub mod error;
pub mod path;
pub mod taxonomy;

#[cfg(test)]
mod property_tests;

pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use path::{AncSplEngine, ExactPathEngine};
pub use taxonomy::{
    Severity, Taxonomy, TaxonomyBuilder, ValidationIssue, ValidationReport, VertexId, VertexRef,
};
