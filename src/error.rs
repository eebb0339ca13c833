use core::fmt;

use crate::taxonomy::VertexId;

/// Result alias for `taxodist`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by taxonomy construction and path queries.
///
/// Construction errors ([`Error::DuplicateId`], [`Error::MissingParent`],
/// [`Error::CycleDetected`]) are deterministic input-data faults: the
/// affected taxonomy must be discarded. Query errors
/// ([`Error::UninitializedTaxonomy`], [`Error::UncachedAncestors`]) report a
/// missing cache phase rather than silently defaulting to zero.
/// [`Error::Cancelled`] is an early-termination signal, not a data fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A vertex with this ID is already present in the taxonomy.
    DuplicateId {
        /// The offending vertex ID.
        id: VertexId,
    },

    /// A declared parent ID does not exist in the taxonomy.
    MissingParent {
        /// The vertex being inserted.
        id: VertexId,
        /// The parent ID that could not be resolved.
        parent: VertexId,
    },

    /// The pending-insertion worklist made a full pass with no progress
    /// while every remaining concept referred into the remainder.
    CycleDetected {
        /// Number of concepts left uninserted.
        remaining: usize,
    },

    /// No vertex with this ID exists in the taxonomy.
    VertexNotFound {
        /// The requested vertex ID.
        id: VertexId,
    },

    /// A cached attribute was queried before `compute_cached_attributes` ran.
    UninitializedTaxonomy {
        /// Name of the attribute that was requested.
        attribute: &'static str,
    },

    /// An ancestor set was queried before `compute_cached_ancestor_set` ran,
    /// or a path weight was queried from an unweighted cache.
    UncachedAncestors,

    /// Two vertices share no common subsumer (disconnected top concepts).
    NoCommonSubsumer {
        /// First vertex.
        a: VertexId,
        /// Second vertex.
        b: VertexId,
    },

    /// A batch evaluation observed its cancellation token.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateId { id } => {
                write!(f, "vertex {id} is already present in the taxonomy")
            }
            Error::MissingParent { id, parent } => {
                write!(f, "vertex {id} declares parent {parent}, which does not exist")
            }
            Error::CycleDetected { remaining } => {
                write!(
                    f,
                    "no insertable concept found: {remaining} concepts form a cycle or refer to absent parents"
                )
            }
            Error::VertexNotFound { id } => write!(f, "vertex {id} not found"),
            Error::UninitializedTaxonomy { attribute } => {
                write!(
                    f,
                    "'{attribute}' queried before compute_cached_attributes ran"
                )
            }
            Error::UncachedAncestors => {
                write!(
                    f,
                    "ancestor sets queried before compute_cached_ancestor_set ran"
                )
            }
            Error::NoCommonSubsumer { a, b } => {
                write!(f, "vertices {a} and {b} share no common subsumer")
            }
            Error::Cancelled => write!(f, "evaluation cancelled"),
        }
    }
}

impl std::error::Error for Error {}
