use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, RecordValue};
use crate::ledger::{StoreError, TransactionContext};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("the record {key} does not exist")]
    NotFound { key: String },
    #[error("record encoding failed: {0}")]
    Codec(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A record shape the repository can store: serde round-trippable, keyed, and
/// tagged with the document type distinguishing its family inside the shared
/// key namespace.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const DOC_TYPE: &'static str;

    fn key(&self) -> &str;
}

/// Enumeration/history element: the key plus the tolerantly decoded value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry<T> {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: RecordValue<T>,
}

/// Generic CRUD over one record family. Stateless; every call threads the
/// caller's transaction context through to the store.
pub struct Repository<T> {
    _record: PhantomData<T>,
}

impl<T: Record> Repository<T> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }

    /// True iff a non-empty value is currently stored under `key`. Never
    /// raises `NotFound`.
    pub fn exists(&self, ctx: &dyn TransactionContext, key: &str) -> Result<bool, LedgerError> {
        Ok(ctx.get_state(key)?.is_some_and(|value| !value.is_empty()))
    }

    /// Write `record` under its key, overwriting any existing value. Callers
    /// that need create-if-absent semantics check [`Self::exists`] first.
    pub fn create(
        &self,
        ctx: &mut dyn TransactionContext,
        record: T,
    ) -> Result<T, LedgerError> {
        let bytes = codec::encode(&record)?;
        ctx.put_state(record.key(), bytes)?;
        debug!(key = record.key(), doc_type = T::DOC_TYPE, "record written");
        Ok(record)
    }

    /// Current value under `key`, tolerantly decoded. `NotFound` when the key
    /// is absent or its stored value is empty.
    pub fn read(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<RecordValue<T>, LedgerError> {
        let bytes = ctx
            .get_state(key)?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| LedgerError::NotFound {
                key: key.to_string(),
            })?;
        Ok(codec::decode_tolerant(&bytes))
    }

    /// Strictly decoded read, for read-modify-write paths that must have the
    /// structured shape.
    pub fn read_structured(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<T, LedgerError> {
        match self.read(ctx, key)? {
            RecordValue::Structured(record) => Ok(record),
            RecordValue::Opaque(text) => Ok(codec::decode(text.as_bytes())?),
        }
    }

    /// Full replacement of an existing record. `NotFound` when the key does
    /// not currently exist.
    pub fn update(&self, ctx: &mut dyn TransactionContext, record: T) -> Result<(), LedgerError> {
        if !self.exists(ctx, record.key())? {
            return Err(LedgerError::NotFound {
                key: record.key().to_string(),
            });
        }
        let bytes = codec::encode(&record)?;
        ctx.put_state(record.key(), bytes)?;
        debug!(key = record.key(), doc_type = T::DOC_TYPE, "record replaced");
        Ok(())
    }

    /// Remove `key` from current state. `NotFound` when absent; history is
    /// retained by the store.
    pub fn delete(&self, ctx: &mut dyn TransactionContext, key: &str) -> Result<(), LedgerError> {
        if !self.exists(ctx, key)? {
            return Err(LedgerError::NotFound {
                key: key.to_string(),
            });
        }
        ctx.delete_state(key)?;
        debug!(key, doc_type = T::DOC_TYPE, "record deleted");
        Ok(())
    }

    /// Unbounded range scan over the namespace, in ascending key order, each
    /// value decoded tolerantly as it is drained from the scan.
    pub fn list_all(&self, ctx: &dyn TransactionContext) -> Result<Vec<Entry<T>>, LedgerError> {
        let entries = ctx
            .range("", "")?
            .map(|(key, bytes)| Entry {
                record: codec::decode_tolerant(&bytes),
                key,
            })
            .collect();
        Ok(entries)
    }

    /// Every value ever committed under `key`, oldest first. Superseded and
    /// deleted versions are included; a tombstone surfaces as an empty opaque
    /// entry.
    pub fn history(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<Vec<Entry<T>>, LedgerError> {
        let versions = ctx.history(key)?;
        Ok(versions
            .into_iter()
            .map(|version| Entry {
                key: key.to_string(),
                record: codec::decode_tolerant(&version.value),
            })
            .collect())
    }
}

impl<T: Record> Default for Repository<T> {
    fn default() -> Self {
        Self::new()
    }
}
