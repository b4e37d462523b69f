use tracing::debug;

use crate::contracts::{Contract, ContractError};
use crate::ledger::MemoryLedger;

/// The abstract session a client holds against a named contract: submit a
/// state-changing invocation or evaluate a read-only one, getting back wire
/// bytes or the invocation's failure. Enrollment, channels, and gateways live
/// behind whatever implements this.
pub trait ContractSession {
    fn submit(&mut self, op: &str, args: &[&str]) -> Result<Vec<u8>, ContractError>;

    fn evaluate(&mut self, op: &str, args: &[&str]) -> Result<Vec<u8>, ContractError>;
}

/// Session binding one contract to an owned in-memory ledger. Each call opens
/// a fresh transaction context; nothing is cached between invocations.
pub struct InProcessSession<C> {
    contract: C,
    ledger: MemoryLedger,
}

impl<C: Contract> InProcessSession<C> {
    pub fn new(contract: C) -> Self {
        Self {
            contract,
            ledger: MemoryLedger::new(),
        }
    }

    pub fn with_ledger(contract: C, ledger: MemoryLedger) -> Self {
        Self { contract, ledger }
    }

    pub fn into_ledger(self) -> MemoryLedger {
        self.ledger
    }

    fn invoke(&mut self, op: &str, args: &[&str]) -> Result<Vec<u8>, ContractError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let mut txn = self.ledger.begin();
        debug!(contract = self.contract.name(), op, "invoking");
        self.contract.invoke(&mut txn, op, &args)
    }
}

impl<C: Contract> ContractSession for InProcessSession<C> {
    fn submit(&mut self, op: &str, args: &[&str]) -> Result<Vec<u8>, ContractError> {
        self.invoke(op, args)
    }

    fn evaluate(&mut self, op: &str, args: &[&str]) -> Result<Vec<u8>, ContractError> {
        self.invoke(op, args)
    }
}
