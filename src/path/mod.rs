//! Path-length queries over a frozen taxonomy.
//!
//! Two engines with one contract and opposite trade-offs:
//!
//! | Engine | Cost per query | Result |
//! |--------|----------------|--------|
//! | [`AncSplEngine`] | O(\|anc(u)\| + \|anc(v)\|) set intersection | upper bound, exact on trees |
//! | [`ExactPathEngine`] | O(V + E) Dijkstra | exact |
//!
//! Both engines borrow the taxonomy read-only, so any number of them can
//! run concurrently over one frozen instance, and both accept a
//! [`crate::CancelToken`] for cooperative cancellation of long batches.
//! The exact engine exists as the oracle the approximation is validated
//! against; benchmark suites measure the gap, they do not close it.

mod ancspl;
mod exact;

pub use ancspl::AncSplEngine;
pub use exact::ExactPathEngine;
