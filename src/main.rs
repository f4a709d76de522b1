// ghx - continuity ledger toolbox
//
// Thin surface over the library: audit a snapshot file, diff two
// snapshots, inspect the newest vault snapshot, or run a two-node
// federation round end to end.

use clap::{Parser, Subcommand};
use ghx_continuity::{LedgerAuditor, LedgerFederation, VaultExporter};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ghx", about = "GHX continuity ledger toolbox", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Audit a snapshot file and print a report
    Verify {
        /// Path to a snapshot JSON file
        snapshot: PathBuf,
    },
    /// Compare two snapshot files for divergence
    Diff {
        a: PathBuf,
        b: PathBuf,
    },
    /// Load and audit the newest snapshot in a vault container
    Latest {
        /// Vault root directory
        #[arg(long)]
        vault: PathBuf,
        /// Container id within the vault
        #[arg(long, default_value = "gcl")]
        container: String,
    },
    /// Run a two-node broadcast/merge round and print the integrity report
    Demo,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Verify { snapshot } => {
            let value = read_snapshot(&snapshot)?;
            println!("{}", LedgerAuditor::report(&value));
            let report = LedgerAuditor::verify_snapshot(&value);
            Ok(exit_for(report.verified))
        }

        Command::Diff { a, b } => {
            let diff = LedgerAuditor::diff(&read_snapshot(&a)?, &read_snapshot(&b)?);
            println!("{}", serde_json::to_string_pretty(&diff)?);
            Ok(exit_for(!diff.diverged))
        }

        Command::Latest { vault, container } => {
            let exporter = VaultExporter::new(vault);
            let ledger = exporter.load_latest(&container)?;
            let value = ledger.snapshot().to_value();
            println!("{}", LedgerAuditor::report(&value));
            Ok(exit_for(LedgerAuditor::verify_snapshot(&value).verified))
        }

        Command::Demo => {
            let report = demo_round()?;
            println!("{report}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Two federations, symmetric broadcast and merge, integrity at the end.
fn demo_round() -> Result<String, Box<dyn std::error::Error>> {
    let mut alpha = LedgerFederation::new("alpha");
    let mut beta = LedgerFederation::new("beta");
    alpha.register_peer("beta", beta.local_handle())?;
    beta.register_peer("alpha", alpha.local_handle())?;

    alpha.broadcast_event("startup", json!({"ok": true}))?;
    beta.broadcast_event("heartbeat", json!({"coherence": 0.99}))?;
    alpha.merge_ledgers();
    beta.merge_ledgers();

    let integrity = alpha.verify_federation_integrity();
    Ok(serde_json::to_string_pretty(&integrity)?)
}

fn read_snapshot(path: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn exit_for(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
