//! Append-only, history-tracked entity store for the Akademia network.
//!
//! Records live under unique string keys in a versioned key-value store.
//! A generic repository gives each record family deterministic CRUD,
//! existence-gated mutation, tolerant range enumeration, and per-key
//! historical replay; two contract surfaces (financial transfers and
//! log-integrity facts) expose that repository to callers over a text-only
//! wire: string arguments in, JSON out.

pub mod codec;
pub mod contracts;
pub mod identity;
pub mod ledger;
pub mod repository;
pub mod session;

pub use codec::RecordValue;
pub use contracts::{AssetContract, AssetRecord, Contract, ContractError, LogContract, LogRecord};
pub use ledger::{MemoryLedger, TransactionContext};
pub use repository::{Entry, LedgerError, Record, Repository};
pub use session::{ContractSession, InProcessSession};
