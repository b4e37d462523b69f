use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::RecordValue;
use crate::contracts::{expect_args, parse_amount, Contract, ContractError};
use crate::ledger::TransactionContext;
use crate::repository::{Entry, LedgerError, Record, Repository};

fn asset_doc_type() -> String {
    AssetRecord::DOC_TYPE.to_string()
}

/// One financial-transfer fact: prior balance, amount moved, owner identity,
/// resulting balance, and a content fingerprint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRecord {
    #[serde(rename = "TransacId")]
    pub transac_id: String,
    #[serde(rename = "TransacOwner")]
    pub transac_owner: String,
    #[serde(rename = "OldBalance")]
    pub old_balance: u64,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "NewBalance")]
    pub new_balance: u64,
    #[serde(rename = "Fingerprint")]
    pub fingerprint: String,
    #[serde(rename = "docType", default = "asset_doc_type")]
    pub doc_type: String,
}

impl AssetRecord {
    pub fn new(
        transac_id: impl Into<String>,
        transac_owner: impl Into<String>,
        old_balance: u64,
        amount: u64,
        new_balance: u64,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            transac_id: transac_id.into(),
            transac_owner: transac_owner.into(),
            old_balance,
            amount,
            new_balance,
            fingerprint: fingerprint.into(),
            doc_type: asset_doc_type(),
        }
    }
}

impl Record for AssetRecord {
    const DOC_TYPE: &'static str = "asset";

    fn key(&self) -> &str {
        &self.transac_id
    }
}

fn seed_assets() -> Vec<AssetRecord> {
    vec![
        AssetRecord::new("01", "ibsaberon", 5000, 5000, 0, "a1"),
        AssetRecord::new("02", "ibsaberon", 10000, 5000, 5000, "a2"),
        AssetRecord::new("03", "msjohnson", 5000, 2500, 2500, "a3"),
        AssetRecord::new("04", "kbernard", 2500, 2500, 0, "a4"),
        AssetRecord::new("05", "alsalvador", 10000, 10000, 0, "a5"),
        AssetRecord::new("06", "ibsaberon", 15000, 10000, 5000, "a6"),
    ]
}

/// Contract surface for transfer records.
#[derive(Default)]
pub struct AssetContract {
    repo: Repository<AssetRecord>,
}

impl AssetContract {
    pub fn new() -> Self {
        Self {
            repo: Repository::new(),
        }
    }

    /// Write the fixed seed set. Re-running overwrites the same keys with the
    /// same values, so the loader is idempotent in effect.
    pub fn init_ledger(&self, ctx: &mut dyn TransactionContext) -> Result<(), ContractError> {
        for asset in seed_assets() {
            let asset = self.repo.create(ctx, asset)?;
            info!(key = asset.transac_id.as_str(), "asset initialized");
        }
        Ok(())
    }

    pub fn create_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        asset: AssetRecord,
    ) -> Result<AssetRecord, ContractError> {
        Ok(self.repo.create(ctx, asset)?)
    }

    pub fn read_asset(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<RecordValue<AssetRecord>, ContractError> {
        Ok(self.repo.read(ctx, key)?)
    }

    pub fn update_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        asset: AssetRecord,
    ) -> Result<(), ContractError> {
        Ok(self.repo.update(ctx, asset)?)
    }

    pub fn delete_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        key: &str,
    ) -> Result<(), ContractError> {
        Ok(self.repo.delete(ctx, key)?)
    }

    pub fn asset_exists(
        &self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<bool, ContractError> {
        Ok(self.repo.exists(ctx, key)?)
    }

    /// Rewrite only the owner-identity field of an existing asset.
    pub fn transfer_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        key: &str,
        new_owner: &str,
    ) -> Result<(), ContractError> {
        let mut asset = self.repo.read_structured(ctx, key)?;
        asset.transac_owner = new_owner.to_string();
        self.repo.create(ctx, asset)?;
        Ok(())
    }

    pub fn get_all_assets(
        &self,
        ctx: &dyn TransactionContext,
    ) -> Result<Vec<Entry<AssetRecord>>, ContractError> {
        Ok(self.repo.list_all(ctx)?)
    }

    fn asset_from_args(args: &[String], op: &'static str) -> Result<AssetRecord, ContractError> {
        let [id, owner, old_balance, amount, new_balance, fingerprint] =
            expect_args::<6>(op, args)?;
        Ok(AssetRecord::new(
            id,
            owner,
            parse_amount("oldBalance", old_balance)?,
            parse_amount("amount", amount)?,
            parse_amount("newBalance", new_balance)?,
            fingerprint,
        ))
    }
}

impl Contract for AssetContract {
    fn name(&self) -> &'static str {
        "asset"
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
            "CreateAsset" => {
                let asset = Self::asset_from_args(args, "CreateAsset")?;
                let created = self.create_asset(ctx, asset)?;
                Ok(serde_json::to_vec(&created).map_err(LedgerError::from)?)
            }
            "ReadAsset" => {
                let [key] = expect_args::<1>("ReadAsset", args)?;
                let record = self.read_asset(ctx, key)?;
                Ok(serde_json::to_vec(&record).map_err(LedgerError::from)?)
            }
            "UpdateAsset" => {
                let asset = Self::asset_from_args(args, "UpdateAsset")?;
                self.update_asset(ctx, asset)?;
                Ok(Vec::new())
            }
            "DeleteAsset" => {
                let [key] = expect_args::<1>("DeleteAsset", args)?;
                self.delete_asset(ctx, key)?;
                Ok(Vec::new())
            }
            "AssetExists" => {
                let [key] = expect_args::<1>("AssetExists", args)?;
                let exists = self.asset_exists(ctx, key)?;
                Ok(serde_json::to_vec(&exists).map_err(LedgerError::from)?)
            }
            "TransferAsset" => {
                let [key, new_owner] = expect_args::<2>("TransferAsset", args)?;
                self.transfer_asset(ctx, key, new_owner)?;
                Ok(Vec::new())
            }
            "GetAllAssets" => {
                expect_args::<0>("GetAllAssets", args)?;
                let entries = self.get_all_assets(ctx)?;
                Ok(serde_json::to_vec(&entries).map_err(LedgerError::from)?)
            }
            other => Err(ContractError::UnknownOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn init_ledger_seeds_six_assets() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        contract.init_ledger(&mut txn).unwrap();
        let entries = contract.get_all_assets(&txn).unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].key, "01");
        let first = entries[0].record.as_structured().unwrap();
        assert_eq!(first.transac_owner, "ibsaberon");
        assert_eq!(first.doc_type, "asset");
        // record 03 carries the normalized balance field
        let third = entries[2].record.as_structured().unwrap();
        assert_eq!(third.old_balance, 5000);
    }

    #[test]
    fn init_ledger_rerun_is_idempotent_in_effect() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        contract.init_ledger(&mut txn).unwrap();
        let before = contract.get_all_assets(&txn).unwrap();
        contract.init_ledger(&mut txn).unwrap();
        let after = contract.get_all_assets(&txn).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn create_then_read_returns_typed_fields() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        contract
            .invoke(
                &mut txn,
                "CreateAsset",
                &strings(&["10", "alice", "100", "40", "60", "fp1"]),
            )
            .unwrap();
        let bytes = contract
            .invoke(&mut txn, "ReadAsset", &strings(&["10"]))
            .unwrap();
        let read: AssetRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(read.transac_owner, "alice");
        assert_eq!(read.old_balance, 100);
        assert_eq!(read.amount, 40);
        assert_eq!(read.new_balance, 60);
        assert_eq!(read.fingerprint, "fp1");
    }

    #[test]
    fn create_asset_rejects_non_numeric_balance() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        let err = contract
            .invoke(
                &mut txn,
                "CreateAsset",
                &strings(&["10", "alice", "many", "40", "60", "fp1"]),
            )
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument { .. }));
    }

    #[test]
    fn transfer_changes_only_the_owner() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        contract.init_ledger(&mut txn).unwrap();
        contract
            .invoke(&mut txn, "TransferAsset", &strings(&["01", "newOwner"]))
            .unwrap();
        let read = contract.read_asset(&txn, "01").unwrap();
        let asset = read.as_structured().unwrap();
        assert_eq!(asset.transac_owner, "newOwner");
        assert_eq!(asset.old_balance, 5000);
        assert_eq!(asset.amount, 5000);
        assert_eq!(asset.new_balance, 0);
        assert_eq!(asset.fingerprint, "a1");
    }

    #[test]
    fn transfer_of_missing_asset_propagates_not_found() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        let err = contract
            .invoke(&mut txn, "TransferAsset", &strings(&["99", "nobody"]))
            .unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn exists_is_boolean_json_on_the_wire() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        let absent = contract
            .invoke(&mut txn, "AssetExists", &strings(&["01"]))
            .unwrap();
        assert_eq!(absent, b"false");
        contract.init_ledger(&mut txn).unwrap();
        let present = contract
            .invoke(&mut txn, "AssetExists", &strings(&["01"]))
            .unwrap();
        assert_eq!(present, b"true");
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        let contract = AssetContract::new();
        let err = contract.invoke(&mut txn, "MintAsset", &[]).unwrap_err();
        assert!(matches!(err, ContractError::UnknownOperation(_)));
    }

    #[test]
    fn legacy_asset_without_doc_type_still_decodes() {
        let mut ledger = MemoryLedger::new();
        let mut txn = ledger.begin();
        txn.put_state(
            "07",
            br#"{"TransacId":"07","TransacOwner":"legacy","OldBalance":1,"Amount":1,"NewBalance":0,"Fingerprint":"a7"}"#.to_vec(),
        )
        .unwrap();
        let contract = AssetContract::new();
        let read = contract.read_asset(&txn, "07").unwrap();
        let asset = read.as_structured().unwrap();
        assert_eq!(asset.doc_type, "asset");
    }
}
