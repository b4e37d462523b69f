use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("ledger backend failure: {0}")]
    Backend(String),
}

/// One committed version of a key, as reported by the store's history index.
///
/// A delete is committed as a tombstone: `is_delete` set and an empty value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyVersion {
    pub commit_seq: u64,
    pub value: Vec<u8>,
    pub is_delete: bool,
}

/// Per-invocation handle to the ledger store. Every store operation of one
/// contract invocation goes through exactly one context; nothing is cached
/// across invocations.
pub trait TransactionContext {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    fn delete_state(&mut self, key: &str) -> Result<(), StoreError>;

    /// Ordered snapshot scan over live keys in `[start, end)`. Empty bounds
    /// mean an open end on that side, so `range("", "")` covers the whole
    /// namespace.
    fn range(&self, start: &str, end: &str) -> Result<RangeScan, StoreError>;

    /// Every version ever committed under `key`, oldest first, tombstones
    /// included. Empty if the key was never written.
    fn history(&self, key: &str) -> Result<Vec<KeyVersion>, StoreError>;
}

/// One-shot scan handle. A partially consumed scan is released on drop and
/// leaves no state behind.
pub struct RangeScan {
    entries: std::vec::IntoIter<(String, Vec<u8>)>,
}

impl Iterator for RangeScan {
    type Item = (String, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

/// In-memory versioned key-value store: current state plus a per-key version
/// log appended in commit order. Serializable so the CLI can persist a ledger
/// between invocations.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryLedger {
    state: BTreeMap<String, Vec<u8>>,
    versions: BTreeMap<String, Vec<KeyVersion>>,
    commit_seq: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the transaction context for one invocation.
    pub fn begin(&mut self) -> MemoryTransaction<'_> {
        MemoryTransaction { ledger: self }
    }

    fn commit(&mut self, key: &str, value: Vec<u8>, is_delete: bool) {
        self.commit_seq += 1;
        self.versions
            .entry(key.to_string())
            .or_default()
            .push(KeyVersion {
                commit_seq: self.commit_seq,
                value,
                is_delete,
            });
    }
}

/// Transaction context over a [`MemoryLedger`]. The exclusive borrow gives
/// the single-writer discipline the store's commit protocol would otherwise
/// enforce.
pub struct MemoryTransaction<'a> {
    ledger: &'a mut MemoryLedger,
}

impl TransactionContext for MemoryTransaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.ledger.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.ledger.state.insert(key.to_string(), value.clone());
        self.ledger.commit(key, value, false);
        Ok(())
    }

    fn delete_state(&mut self, key: &str) -> Result<(), StoreError> {
        if self.ledger.state.remove(key).is_some() {
            self.ledger.commit(key, Vec::new(), true);
        }
        Ok(())
    }

    fn range(&self, start: &str, end: &str) -> Result<RangeScan, StoreError> {
        let entries: Vec<(String, Vec<u8>)> = self
            .ledger
            .state
            .iter()
            .filter(|(key, _)| key.as_str() >= start)
            .filter(|(key, _)| end.is_empty() || key.as_str() < end)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(RangeScan {
            entries: entries.into_iter(),
        })
    }

    fn history(&self, key: &str) -> Result<Vec<KeyVersion>, StoreError> {
        Ok(self.ledger.versions.get(key).cloned().unwrap_or_default())
    }
}
