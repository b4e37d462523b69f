use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use akademia_ledger::contracts::{AssetContract, Contract, LogContract};
use akademia_ledger::identity;
use akademia_ledger::ledger::MemoryLedger;
use akademia_ledger::session::{ContractSession, InProcessSession};

#[derive(Parser)]
#[command(name = "akademia-ledger", version, about = "Ledger-backed entity store for transfer and log-integrity records")]
struct Cli {
    /// Path of the JSON-persisted ledger file.
    #[arg(long, global = true, default_value = "akademia.ledger.json")]
    ledger: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ContractName {
    Asset,
    Log,
}

#[derive(Subcommand)]
enum Command {
    /// Seed the chosen contract's fixed starting data set.
    Init { contract: ContractName },
    /// Submit a state-changing operation (CreateLog, UpdateAsset, ...).
    Submit {
        contract: ContractName,
        op: String,
        args: Vec<String>,
    },
    /// Evaluate a read-only operation (ReadAsset, GetAllLogs, ...).
    Evaluate {
        contract: ContractName,
        op: String,
        args: Vec<String>,
    },
    /// Print the sha256 fingerprint of a file (the HashValue of a log record).
    Hash { file: PathBuf },
    /// Generate an ed25519 keypair as sk.hex / pk.hex in a directory.
    Keygen {
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Sign a file's fingerprint (the Signature of a log record).
    Sign {
        file: PathBuf,
        #[arg(long)]
        sk_hex: String,
    },
}

fn load_ledger(path: &Path) -> anyhow::Result<MemoryLedger> {
    if !path.exists() {
        return Ok(MemoryLedger::new());
    }
    let bytes = fs::read(path).with_context(|| format!("read ledger {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse ledger {}", path.display()))
}

fn save_ledger(path: &Path, ledger: &MemoryLedger) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(ledger).context("encode ledger")?;
    fs::write(path, bytes).with_context(|| format!("write ledger {}", path.display()))
}

/// Run one invocation through an in-process session against the persisted
/// ledger, committing the ledger file afterwards when the call mutates state.
fn invoke(
    ledger_path: &Path,
    contract: ContractName,
    op: &str,
    args: &[String],
    mutating: bool,
) -> anyhow::Result<Vec<u8>> {
    let ledger = load_ledger(ledger_path)?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let (output, ledger) = match contract {
        ContractName::Asset => {
            let mut session = InProcessSession::with_ledger(AssetContract::new(), ledger);
            let output = session.submit(op, &args);
            (output, session.into_ledger())
        }
        ContractName::Log => {
            let mut session = InProcessSession::with_ledger(LogContract::new(), ledger);
            let output = session.submit(op, &args);
            (output, session.into_ledger())
        }
    };
    let output = output?;
    if mutating {
        save_ledger(ledger_path, &ledger)?;
    }
    Ok(output)
}

fn print_wire(bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    // pretty-print when the payload is JSON, raw otherwise
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default()),
        Err(_) => println!("{}", String::from_utf8_lossy(bytes)),
    }
}

fn contract_label(contract: ContractName) -> &'static str {
    match contract {
        ContractName::Asset => AssetContract::new().name(),
        ContractName::Log => LogContract::new().name(),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init { contract } => {
            invoke(&cli.ledger, contract, "InitLedger", &[], true)?;
            eprintln!(
                "{} ledger seeded → {}",
                contract_label(contract),
                cli.ledger.display()
            );
        }
        Command::Submit { contract, op, args } => {
            let output = invoke(&cli.ledger, contract, &op, &args, true)?;
            print_wire(&output);
        }
        Command::Evaluate { contract, op, args } => {
            let output = invoke(&cli.ledger, contract, &op, &args, false)?;
            print_wire(&output);
        }
        Command::Hash { file } => {
            let bytes =
                fs::read(&file).with_context(|| format!("read file {}", file.display()))?;
            println!("{}", identity::fingerprint(&bytes));
        }
        Command::Keygen { out_dir } => {
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("mkdir {}", out_dir.display()))?;
            let pair = identity::generate_keypair();
            fs::write(out_dir.join("sk.hex"), &pair.secret_hex).context("write sk.hex")?;
            fs::write(out_dir.join("pk.hex"), &pair.public_hex).context("write pk.hex")?;
            eprintln!("keypair written → {}", out_dir.display());
        }
        Command::Sign { file, sk_hex } => {
            let bytes =
                fs::read(&file).with_context(|| format!("read file {}", file.display()))?;
            let sk = identity::signing_key_from_hex(&sk_hex)?;
            let fingerprint = identity::fingerprint(&bytes);
            println!("{}", identity::sign_fingerprint(&sk, &fingerprint));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ledger_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.ledger.json");
        use akademia_ledger::ledger::TransactionContext;
        let mut ledger = load_ledger(&path).unwrap();
        let txn = ledger.begin();
        assert!(txn.range("", "").unwrap().next().is_none());
    }

    #[test]
    fn state_survives_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.ledger.json");
        invoke(&path, ContractName::Asset, "InitLedger", &[], true).unwrap();
        let output = invoke(&path, ContractName::Asset, "GetAllAssets", &[], false).unwrap();
        let entries: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(entries.as_array().map(|a| a.len()), Some(6));
    }

    #[test]
    fn failed_submit_does_not_rewrite_the_ledger_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.ledger.json");
        let args = vec!["ghost".to_string(), "h".to_string(), "s".to_string()];
        let err = invoke(&path, ContractName::Log, "UpdateLog", &args, true).unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert!(!path.exists());
    }
}
