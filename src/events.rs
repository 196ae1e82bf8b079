//! Schema and topology invalidation
//!
//! Bridges the metadata subsystem's change notifications into tablet map
//! invalidations. The adapter is stateless and purely forwarding: node
//! additions and ownership discovery never arrive here, they flow through
//! the response-metadata path into [`TabletMap::insert`].

use std::sync::Arc;

use tracing::debug;

use crate::map::{TableKey, TabletMap};
use crate::tablet::NodeId;

/// Observer interface for schema change notifications.
///
/// Implemented by components that react to DDL observed by the schema
/// metadata subsystem. Updates carry both the current and the previous
/// definition; invalidation keys off the previous one.
pub trait SchemaListener: Send + Sync {
    /// A keyspace was dropped
    fn on_keyspace_dropped(&self, keyspace: &str);
    /// A keyspace was altered
    fn on_keyspace_updated(&self, current: &str, previous: &str);
    /// A table was dropped
    fn on_table_dropped(&self, table: &TableKey);
    /// A table was altered
    fn on_table_updated(&self, current: &TableKey, previous: &TableKey);
}

/// Observer interface for topology change notifications.
pub trait TopologyListener: Send + Sync {
    /// A node left the cluster
    fn on_node_removed(&self, node: &NodeId);
}

/// Translates schema and topology events into tablet map invalidations.
///
/// An altered keyspace or table means its previously learned tablets are
/// stale, so the whole subtree is dropped and relearned from subsequent
/// query responses.
pub struct TabletInvalidator {
    map: Arc<TabletMap>,
}

impl TabletInvalidator {
    /// Create an invalidator forwarding into `map`
    pub fn new(map: Arc<TabletMap>) -> Self {
        Self { map }
    }
}

impl SchemaListener for TabletInvalidator {
    fn on_keyspace_dropped(&self, keyspace: &str) {
        debug!(keyspace, "keyspace dropped, invalidating tablets");
        self.map.remove_by_keyspace(keyspace);
    }

    fn on_keyspace_updated(&self, _current: &str, previous: &str) {
        debug!(keyspace = previous, "keyspace updated, invalidating tablets");
        self.map.remove_by_keyspace(previous);
    }

    fn on_table_dropped(&self, table: &TableKey) {
        debug!(%table, "table dropped, invalidating tablets");
        self.map.remove_by_table(table);
    }

    fn on_table_updated(&self, _current: &TableKey, previous: &TableKey) {
        debug!(table = %previous, "table updated, invalidating tablets");
        self.map.remove_by_table(previous);
    }
}

impl TopologyListener for TabletInvalidator {
    fn on_node_removed(&self, node: &NodeId) {
        debug!(node = %node, "node removed, invalidating tablets");
        self.map.remove_by_node(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::TokenRange;
    use crate::tablet::{Tablet, TabletReplica};
    use crate::token::Token;

    fn tablet(node: &str) -> Tablet {
        Tablet::new(
            TokenRange::new(Token::new(0), Token::new(100)),
            vec![TabletReplica::new(node, 0)],
        )
    }

    fn populated_map() -> Arc<TabletMap> {
        let map = Arc::new(TabletMap::new());
        map.insert(TableKey::new("ks1", "a"), tablet("n1"));
        map.insert(TableKey::new("ks1", "b"), tablet("n2"));
        map.insert(TableKey::new("ks2", "a"), tablet("n1"));
        map
    }

    #[test]
    fn test_keyspace_events_purge_keyspace() {
        let map = populated_map();
        let invalidator = TabletInvalidator::new(map.clone());

        invalidator.on_keyspace_updated("ks1", "ks1");
        assert!(map.lookup(&TableKey::new("ks1", "a"), Token::new(50)).is_none());
        assert!(map.lookup(&TableKey::new("ks2", "a"), Token::new(50)).is_some());

        invalidator.on_keyspace_dropped("ks2");
        assert_eq!(map.table_count(), 0);
    }

    #[test]
    fn test_table_events_purge_only_that_table() {
        let map = populated_map();
        let invalidator = TabletInvalidator::new(map.clone());

        let dropped = TableKey::new("ks1", "a");
        invalidator.on_table_dropped(&dropped);
        assert!(map.lookup(&dropped, Token::new(50)).is_none());
        assert!(map.lookup(&TableKey::new("ks1", "b"), Token::new(50)).is_some());

        // Update invalidates by the previous identity.
        let previous = TableKey::new("ks1", "b");
        invalidator.on_table_updated(&TableKey::new("ks1", "b2"), &previous);
        assert!(map.lookup(&previous, Token::new(50)).is_none());
    }

    #[test]
    fn test_node_removed_purges_replica_holders() {
        let map = populated_map();
        let invalidator = TabletInvalidator::new(map.clone());

        invalidator.on_node_removed(&"n1".to_string());
        assert!(map.lookup(&TableKey::new("ks1", "a"), Token::new(50)).is_none());
        assert!(map.lookup(&TableKey::new("ks2", "a"), Token::new(50)).is_none());
        assert!(map.lookup(&TableKey::new("ks1", "b"), Token::new(50)).is_some());
    }
}
