//! Tablet map - the per-table routing index
//!
//! Maps (keyspace, table) to the ordered set of tablets currently known
//! for that table. Ownership facts observed on query responses are
//! inserted here; token-aware routing reads it on the hot path.
//!
//! Consistency comes from range geometry alone: facts carry no sequence
//! numbers, so a newly observed tablet simply supersedes every stored
//! tablet whose range it overlaps. Unknown regions of the ring are
//! absent and lookups for them miss, which callers treat as "use the
//! non-token-aware fallback".

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::range::TokenRange;
use crate::tablet::{Tablet, TabletFact};
use crate::token::Token;

/// Identifies one table's independent tablet set.
///
/// Identifiers are case-normalized on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TableKey {
    keyspace: String,
    table: String,
}

impl TableKey {
    /// Create a key, lowercasing both identifiers
    pub fn new(keyspace: &str, table: &str) -> Self {
        Self {
            keyspace: keyspace.to_lowercase(),
            table: table.to_lowercase(),
        }
    }

    /// Keyspace name (normalized)
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Table name (normalized)
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl std::fmt::Display for TableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

/// One table's tablets, kept sorted by range end token.
type TableEntry = Arc<RwLock<Vec<Tablet>>>;

/// Concurrent routing index from (table, token) to the owning tablet.
///
/// One instance exists per client session, shared by every query-routing
/// call site and every event source. The outer lock is held only long
/// enough to resolve a table's entry; each table's set has its own lock,
/// so mutation of one table never blocks lookups on another. Within a
/// table, an insert and all the overlap removals it implies happen under
/// a single write lock and appear atomic to concurrent lookups.
#[derive(Debug, Default)]
pub struct TabletMap {
    tables: RwLock<HashMap<TableKey, TableEntry>>,
}

impl TabletMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly observed tablet, superseding overlapping ones.
    ///
    /// Every stored tablet whose range intersects the new tablet's range
    /// is removed first; the new tablet is then placed in end-token
    /// order. Overlaps are evidence of staleness (a prior split or
    /// merge), so this never errors.
    pub fn insert(&self, table: TableKey, tablet: Tablet) {
        let entry = self.entry_or_create(&table);
        let mut tablets = entry.write();
        let removed = remove_overlapping(&mut tablets, tablet.range());
        if removed > 0 {
            debug!(%table, range = %tablet.range(), removed, "tablet superseded stale entries");
        }
        let idx = tablets.partition_point(|t| t.range().end() < tablet.range().end());
        tablets.insert(idx, tablet);
    }

    /// Validate-free entry point for decoded ownership facts
    pub fn apply_fact(&self, fact: TabletFact) {
        let key = TableKey::new(&fact.keyspace, &fact.table);
        self.insert(key, fact.tablet);
    }

    /// Find the tablet owning `token`, if the index knows it.
    ///
    /// `None` means the table is unknown or the token falls in a gap;
    /// callers fall back to default routing, this is not an error.
    pub fn lookup(&self, table: &TableKey, token: Token) -> Option<Tablet> {
        let entry = self.tables.read().get(table).cloned()?;
        let tablets = entry.read();

        // Smallest end token >= the target.
        let idx = tablets.partition_point(|t| t.range().end() < token);
        if let Some(candidate) = tablets.get(idx) {
            if candidate.contains(token) {
                return Some(candidate.clone());
            }
        }
        // Wraparound fallback: a tablet crossing the ring boundary sorts
        // first because its end token is small.
        let first = tablets.first()?;
        if idx > 0 && first.contains(token) {
            return Some(first.clone());
        }
        None
    }

    /// Drop every tablet that lists `node` among its replicas.
    ///
    /// Called when a node leaves the cluster; routing must not hand out
    /// replicas that no longer exist. Tables left with no tablets lose
    /// their entry entirely.
    pub fn remove_by_node(&self, node: &str) {
        let entries: Vec<(TableKey, TableEntry)> = self
            .tables
            .read()
            .iter()
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect();

        let mut emptied = Vec::new();
        for (table, entry) in entries {
            let mut tablets = entry.write();
            let before = tablets.len();
            tablets.retain(|t| !t.has_replica_on(node));
            let removed = before - tablets.len();
            if removed > 0 {
                debug!(%table, node, removed, "purged tablets for removed node");
            }
            if tablets.is_empty() {
                emptied.push(table);
            }
        }

        if !emptied.is_empty() {
            let mut tables = self.tables.write();
            for table in emptied {
                // A fact may have repopulated the entry since the scan.
                let still_empty = tables.get(&table).is_some_and(|e| e.read().is_empty());
                if still_empty {
                    tables.remove(&table);
                }
            }
        }
    }

    /// Drop every table entry under `keyspace`
    pub fn remove_by_keyspace(&self, keyspace: &str) {
        let keyspace = keyspace.to_lowercase();
        let mut tables = self.tables.write();
        let before = tables.len();
        tables.retain(|key, _| key.keyspace() != keyspace);
        let removed = before - tables.len();
        if removed > 0 {
            debug!(keyspace = %keyspace, removed, "purged tablet mappings for keyspace");
        }
    }

    /// Drop exactly one table's entry
    pub fn remove_by_table(&self, table: &TableKey) {
        if self.tables.write().remove(table).is_some() {
            debug!(%table, "purged tablet mappings for table");
        }
    }

    /// Point-in-time snapshot of the whole index, for diagnostics and
    /// for policies that iterate known ranges.
    pub fn mapping(&self) -> HashMap<TableKey, Vec<Tablet>> {
        self.tables
            .read()
            .iter()
            .map(|(k, e)| (k.clone(), e.read().clone()))
            .collect()
    }

    /// Number of tables with at least one known tablet
    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }

    /// Total number of tablets across all tables
    pub fn tablet_count(&self) -> usize {
        self.tables.read().values().map(|e| e.read().len()).sum()
    }

    fn entry_or_create(&self, table: &TableKey) -> TableEntry {
        if let Some(entry) = self.tables.read().get(table) {
            return entry.clone();
        }
        self.tables
            .write()
            .entry(table.clone())
            .or_default()
            .clone()
    }
}

/// Remove every stored tablet whose range intersects `range`.
///
/// The set is sorted by end token and its arcs are pairwise disjoint, so
/// for a non-wrapping range the overlapping tablets form one contiguous
/// run: binary-search to the first end token past the range start, then
/// walk while ranges keep intersecting. At most one stored arc crosses
/// the ring boundary and it always sorts first, so it gets checked
/// separately. Wrapping or whole-ring inserts touch both ends of the set
/// and fall back to a full scan.
fn remove_overlapping(tablets: &mut Vec<Tablet>, range: TokenRange) -> usize {
    if tablets.is_empty() {
        return 0;
    }
    let before = tablets.len();

    if range.is_full_ring() || range.wraps() {
        tablets.retain(|t| !t.range().overlaps(&range));
        return before - tablets.len();
    }

    let start = tablets.partition_point(|t| t.range().end() <= range.start());
    let mut idx = start;
    while idx < tablets.len() && tablets[idx].range().overlaps(&range) {
        idx += 1;
    }
    tablets.drain(start..idx);

    // A wrapping or whole-ring arc sorts first because its end token is
    // small; it can still cover the inserted range from the front of the
    // set. A plain arc surviving up front has end <= range.start and
    // cannot overlap.
    if let Some(first) = tablets.first() {
        if first.range().overlaps(&range) {
            tablets.remove(0);
        }
    }

    before - tablets.len()
}
