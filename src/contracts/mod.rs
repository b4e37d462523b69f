pub mod asset;
pub mod log;

pub use asset::{AssetContract, AssetRecord};
pub use log::{LogContract, LogRecord};

use crate::ledger::TransactionContext;
use crate::repository::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("unknown operation {0}")]
    UnknownOperation(String),
    #[error("{op} expects {expected} argument(s), got {actual}")]
    BadArity {
        op: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A named-operation dispatch table over one record family. The wire boundary
/// is text-only: string arguments in, JSON bytes out, repository errors
/// propagated unchanged.
pub trait Contract {
    fn name(&self) -> &'static str;

    fn invoke(
        &self,
        ctx: &mut dyn TransactionContext,
        op: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError>;
}

pub(crate) fn expect_args<'a, const N: usize>(
    op: &'static str,
    args: &'a [String],
) -> Result<[&'a str; N], ContractError> {
    if args.len() != N {
        return Err(ContractError::BadArity {
            op,
            expected: N,
            actual: args.len(),
        });
    }
    let mut out = [""; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.as_str();
    }
    Ok(out)
}

pub(crate) fn parse_amount(name: &'static str, raw: &str) -> Result<u64, ContractError> {
    raw.trim()
        .parse()
        .map_err(|err: std::num::ParseIntError| ContractError::InvalidArgument {
            name,
            reason: err.to_string(),
        })
}
