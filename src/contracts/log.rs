use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::RecordValue;
use crate::contracts::{expect_args, Contract, ContractError};
use crate::ledger::TransactionContext;
use crate::repository::{Entry, LedgerError, Record, Repository};

fn log_doc_type() -> String {
    LogRecord::DOC_TYPE.to_string()
}

/// One log-integrity fact: the hash of a log file and the signature over it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "HashValue")]
    pub hash_value: String,
    #[serde(rename = "Signature")]
    pub signature: String,
    #[serde(rename = "docType", default = "log_doc_type")]
    pub doc_type: String,
}

impl LogRecord {
    pub fn new(
        id: impl Into<String>,
        hash_value: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            hash_value: hash_value.into(),
            signature: signature.into(),
            doc_type: log_doc_type(),
        }
    }
}

impl Record for LogRecord {
    const DOC_TYPE: &'static str = "log";

    fn key(&self) -> &str {
        &self.id
    }
}

fn seed_logs() -> Vec<LogRecord> {
    vec![
        LogRecord::new("akademia-2021-08-01.log", "hash value one", "signature one"),
        LogRecord::new("akademia-2021-08-02.log", "hash value two", "signature two"),
        LogRecord::new(
            "akademia-2021-08-03.log",
            "hash value three",
            "signature three",
        ),
        LogRecord::new(
            "akademia-2021-08-04.log",
            "hash value four",
            "signature four",
        ),
    ]
}

/// Contract surface for log-integrity records. Same CRUD pattern as the
/// asset contract plus per-key historical replay.
#[derive(Default)]
pub struct LogContract {
    repo: Repository<LogRecord>,
}

impl LogContract {
    pub fn new() -> Self {
        Self {
            repo: Repository::new(),
        }
    }

    pub fn init_ledger(&self, ctx: &mut dyn TransactionContext) -> Result<(), ContractError> {
        for log in seed_logs() {
            let log = self.repo.create(ctx, log)?;
            info!(key = log.id.as_str(), "log file initialized");
        }
        Ok(())
    }

    pub fn create_log(
        &self,
        ctx: &mut dyn TransactionContext,
        log: LogRecord,
    ) -> Result<LogRecord, ContractError> {
        Ok(self.repo.create(ctx, log)?)
    }

    pub fn read_log(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<RecordValue<LogRecord>, ContractError> {
        Ok(self.repo.read(ctx, key)?)
    }

    pub fn update_log(
        &self,
        ctx: &mut dyn TransactionContext,
        log: LogRecord,
    ) -> Result<(), ContractError> {
        Ok(self.repo.update(ctx, log)?)
    }

    pub fn delete_log(
        &self,
        ctx: &mut dyn TransactionContext,
        key: &str,
    ) -> Result<(), ContractError> {
        Ok(self.repo.delete(ctx, key)?)
    }

    pub fn log_exists(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<bool, ContractError> {
        Ok(self.repo.exists(ctx, key)?)
    }

    pub fn get_all_logs(
        &self,
        ctx: &dyn TransactionContext,
    ) -> Result<Vec<Entry<LogRecord>>, ContractError> {
        Ok(self.repo.list_all(ctx)?)
    }

    /// Every value ever committed for `key`, oldest first, deleted state
    /// included.
    pub fn retrieve_log_history(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<Vec<Entry<LogRecord>>, ContractError> {
        Ok(self.repo.history(ctx, key)?)
    }

    fn log_from_args(args: &[String], op: &'static str) -> Result<LogRecord, ContractError> {
        let [id, hash_value, signature] = expect_args::<3>(op, args)?;
        Ok(LogRecord::new(id, hash_value, signature))
    }
}

impl Contract for LogContract {
    fn name(&self) -> &'static str {
        "log"
    }

    fn invoke(
        &self,
        ctx: &mut dyn TransactionContext,
        op: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        match op {
            "InitLedger" => {
                expect_args::<0>("InitLedger", args)?;
                self.init_ledger(ctx)?;
                Ok(Vec::new())
            }
            "CreateLog" => {
                let log = Self::log_from_args(args, "CreateLog")?;
                let created = self.create_log(ctx, log)?;
                Ok(serde_json::to_vec(&created).map_err(LedgerError::from)?)
            }
            "ReadLog" => {
                let [key] = expect_args::<1>("ReadLog", args)?;
                let record = self.read_log(ctx, key)?;
                Ok(serde_json::to_vec(&record).map_err(LedgerError::from)?)
            }
            "UpdateLog" => {
                let log = Self::log_from_args(args, "UpdateLog")?;
                self.update_log(ctx, log)?;
                Ok(Vec::new())
            }
            "DeleteLog" => {
                let [key] = expect_args::<1>("DeleteLog", args)?;
                self.delete_log(ctx, key)?;
                Ok(Vec::new())
            }
            "LogExists" => {
                let [key] = expect_args::<1>("LogExists", args)?;
                let exists = self.log_exists(ctx, key)?;
                Ok(serde_json::to_vec(&exists).map_err(LedgerError::from)?)
            }
            "GetAllLogs" => {
                expect_args::<0>("GetAllLogs", args)?;
                let entries = self.get_all_logs(ctx)?;
                Ok(serde_json::to_vec(&entries).map_err(LedgerError::from)?)
            }
            // both spellings are live among callers
            "RetrieveLogHistory" | "RetrieveHistory" => {
                let [key] = expect_args::<1>("RetrieveLogHistory", args)?;
                let entries = self.retrieve_log_history(ctx, key)?;
                Ok(serde_json::to_vec(&entries).map_err(LedgerError::from)?)
            }
            other => Err(ContractError::UnknownOperation(other.to_string())),
        }
    }
}
