//! Tablet metadata
//!
//! A tablet binds a token range to the ordered list of replicas currently
//! serving it. Tablets are immutable: a placement change observed later
//! produces a new tablet that supersedes the old one in the map.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::range::TokenRange;
use crate::token::Token;

/// Node ID type
pub type NodeId = String;

/// Shard index within a node
pub type ShardIndex = u32;

/// One replica serving a tablet: a node and the shard on that node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabletReplica {
    /// Node identifier
    pub node: NodeId,
    /// Shard index on that node
    pub shard: ShardIndex,
}

impl TabletReplica {
    /// Create a new replica entry
    pub fn new(node: impl Into<NodeId>, shard: ShardIndex) -> Self {
        Self {
            node: node.into(),
            shard,
        }
    }
}

/// A token range and the replicas that own it.
///
/// Ordering and equality consider only the range's end token, so tablets
/// can live in an end-ordered set searched by `partition_point`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tablet {
    range: TokenRange,
    replicas: Vec<TabletReplica>,
}

impl Tablet {
    /// Create a new tablet
    pub fn new(range: TokenRange, replicas: Vec<TabletReplica>) -> Self {
        Self { range, replicas }
    }

    /// The token range this tablet owns
    pub fn range(&self) -> TokenRange {
        self.range
    }

    /// Replicas in placement order
    pub fn replicas(&self) -> &[TabletReplica] {
        &self.replicas
    }

    /// Check if a token belongs to this tablet
    pub fn contains(&self, token: Token) -> bool {
        self.range.contains(token)
    }

    /// Check if the given node serves this tablet
    pub fn has_replica_on(&self, node: &str) -> bool {
        self.replicas.iter().any(|r| r.node == node)
    }

    /// Shard the given node serves this tablet from, if it is a replica
    pub fn shard_of(&self, node: &str) -> Option<ShardIndex> {
        self.replicas
            .iter()
            .find(|r| r.node == node)
            .map(|r| r.shard)
    }
}

impl PartialEq for Tablet {
    fn eq(&self, other: &Self) -> bool {
        self.range.end() == other.range.end()
    }
}

impl Eq for Tablet {}

impl PartialOrd for Tablet {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tablet {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.range.end().cmp(&other.range.end())
    }
}

/// Errors decoding an ownership fact into a tablet
#[derive(Debug, Error)]
pub enum FactError {
    #[error("tablet for {keyspace}.{table} carries no replicas")]
    EmptyReplicas { keyspace: String, table: String },
    #[error("degenerate token range ({token}, {token}] for {keyspace}.{table}")]
    DegenerateRange {
        keyspace: String,
        table: String,
        token: i64,
    },
}

/// A validated range-ownership fact extracted from a query response.
///
/// Facts arrive ad hoc, one per response, with no ordering guarantee;
/// validation happens here so the map itself never has to error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabletFact {
    /// Keyspace the fact applies to
    pub keyspace: String,
    /// Table the fact applies to
    pub table: String,
    /// The observed tablet
    pub tablet: Tablet,
}

impl TabletFact {
    /// Validate raw response metadata into a fact.
    ///
    /// `first_token` is the exclusive start and `last_token` the inclusive
    /// end of the owned range. `first_token == last_token` is only legal
    /// as the whole-ring sentinel (both at the ring minimum); any other
    /// degenerate range is rejected, as is an empty replica list.
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        first_token: i64,
        last_token: i64,
        replicas: Vec<TabletReplica>,
    ) -> Result<Self, FactError> {
        let keyspace = keyspace.into();
        let table = table.into();

        if replicas.is_empty() {
            return Err(FactError::EmptyReplicas { keyspace, table });
        }

        let range = if first_token == last_token {
            if first_token == Token::MIN.value() {
                TokenRange::full_ring()
            } else {
                return Err(FactError::DegenerateRange {
                    keyspace,
                    table,
                    token: first_token,
                });
            }
        } else {
            TokenRange::new(Token::new(first_token), Token::new(last_token))
        };

        Ok(Self {
            keyspace,
            table,
            tablet: Tablet::new(range, replicas),
        })
    }
}
