//! Client-side tablet routing index
//!
//! Keeps a local, continuously updated mapping from (table, token) to the
//! tablet owning that token and its replicas, so queries route straight
//! to the right node without asking the cluster:
//! - Token and token-range arithmetic on the 2^64 ring (wraparound,
//!   equal splitting)
//! - A concurrent per-table index with overlap-resolving insertion and
//!   point lookup
//! - Invalidation hooks for schema changes and node removal
//!
//! The index is purely reactive: ownership facts are learned from query
//! response metadata and inserted via [`TabletMap::insert`] or
//! [`TabletMap::apply_fact`]; a missed lookup means "fall back to
//! non-token-aware routing", never an error.

pub mod events;
pub mod map;
pub mod range;
pub mod tablet;
pub mod token;

// Re-export commonly used types
pub use events::{SchemaListener, TabletInvalidator, TopologyListener};
pub use map::{TableKey, TabletMap};
pub use range::TokenRange;
pub use tablet::{FactError, NodeId, ShardIndex, Tablet, TabletFact, TabletReplica};
pub use token::{Token, RING_LENGTH};
