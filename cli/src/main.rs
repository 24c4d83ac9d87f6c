//! chainlog: operator CLI for the tamper-evident audit trail.
//!
//! Appends, lists, verifies and prunes records in the chain configured by a
//! TOML file (default: file backend under `./chainlog-data`).
//!
//! Usage:
//!   chainlog add --event vm.start --subject '{"userName":"admin"}'
//!   chainlog list --limit 20
//!   chainlog check 'oldestId|newestId'
//!   chainlog prune --from <id>
//!   chainlog retain

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chainlog_audit::{AuditChain, NULL_ID};
use chainlog_contracts::{checkpoint::Checkpoint, error::AuditError, record::AuditRecord};
use chainlog_core::traits::AuditStorage;
use chainlog_store::{open_chain, ChainlogConfig};

// ── CLI definition ────────────────────────────────────────────────────────────

/// chainlog: append-only, hash-chained audit trail.
#[derive(Parser)]
#[command(
    name = "chainlog",
    about = "Tamper-evident audit trail",
    long_about = "Appends audit records to a SHA-256 hash chain and verifies that no\n\
                  past record was deleted, reordered or modified."
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append a record and print it.
    Add {
        /// Event tag naming the action.
        #[arg(long)]
        event: String,
        /// Subject as JSON (who triggered the event).
        #[arg(long, default_value = "{}")]
        subject: String,
        /// Event payload as JSON.
        #[arg(long, default_value = "{}")]
        data: String,
    },
    /// List records newest first, one JSON object per line.
    List {
        /// Start from this id instead of the head.
        #[arg(long)]
        from: Option<String>,
        /// Stop after this many records.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Verify a checkpoint and print a fresh one covering new records.
    Check {
        /// Saved checkpoint `oldest|newest`; defaults to `nullId|nullId`.
        #[arg(default_value = "")]
        checkpoint: String,
        /// On an integrity failure, print a checkpoint re-anchored at the
        /// offending record.
        #[arg(long)]
        rebase: bool,
    },
    /// Delete a record and all of its ancestors.
    Prune {
        /// Id of the newest record to delete.
        #[arg(long)]
        from: String,
    },
    /// Prune records older than `retention.max_age_days`.
    Retain,
    /// Print the current head id.
    Head,
}

// ── Errors ────────────────────────────────────────────────────────────────────

enum CliError {
    /// Bad input or configuration; exit code 1.
    Usage(String),
    /// Storage or engine failure; exit code 1, or 2 for integrity failures.
    Audit(AuditError),
}

impl From<AuditError> for CliError {
    fn from(e: AuditError) -> Self {
        CliError::Audit(e)
    }
}

type CliResult<T> = Result<T, CliError>;

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Structured logging to stderr.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(msg)) => {
            eprintln!("error: {}", msg);
            ExitCode::from(1)
        }
        Err(CliError::Audit(e)) if e.is_integrity_failure() => {
            eprintln!("INTEGRITY FAILURE: {}", e);
            ExitCode::from(2)
        }
        Err(CliError::Audit(e)) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => ChainlogConfig::from_file(path),
        None => Ok(ChainlogConfig::default()),
    }
    .map_err(|e| CliError::Usage(e.to_string()))?;
    debug!(?config, "loaded configuration");

    let chain = open_chain(&config).map_err(|e| CliError::Usage(e.to_string()))?;

    match cli.command {
        Command::Add {
            event,
            subject,
            data,
        } => cmd_add(&chain, &event, &subject, &data),
        Command::List { from, limit } => cmd_list(&chain, from.as_deref(), limit),
        Command::Check { checkpoint, rebase } => cmd_check(&chain, &checkpoint, rebase),
        Command::Prune { from } => {
            chain.delete_from(&from)?;
            println!("pruned from {}", from);
            Ok(())
        }
        Command::Retain => cmd_retain(&chain, &config),
        Command::Head => {
            let head = chain.head()?.unwrap_or_else(|| NULL_ID.to_string());
            println!("{}", head);
            Ok(())
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

type Chain = AuditChain<Box<dyn AuditStorage>>;

fn parse_json(label: &str, raw: &str) -> CliResult<Value> {
    serde_json::from_str(raw).map_err(|e| CliError::Usage(format!("invalid {} JSON: {}", label, e)))
}

fn print_record(record: &AuditRecord) -> CliResult<()> {
    let line = serde_json::to_string(record)
        .map_err(|e| CliError::Usage(format!("failed to render JSON: {}", e)))?;
    println!("{}", line);
    Ok(())
}

fn cmd_add(chain: &Chain, event: &str, subject: &str, data: &str) -> CliResult<()> {
    let subject = parse_json("subject", subject)?;
    let data = parse_json("data", data)?;
    let record = chain.add(subject, event, data)?;
    print_record(&record)
}

fn cmd_list(chain: &Chain, from: Option<&str>, limit: Option<usize>) -> CliResult<()> {
    let walk = chain.get_from(from);
    for record in walk.take(limit.unwrap_or(usize::MAX)) {
        print_record(&record?)?;
    }
    Ok(())
}

/// Verify the saved segment, then everything appended since, and print the
/// checkpoint the operator should save next.
fn cmd_check(chain: &Chain, raw: &str, rebase: bool) -> CliResult<()> {
    let saved = raw
        .parse::<Checkpoint>()
        .map_err(|e| CliError::Usage(e.to_string()))?;

    let result = chain
        .check_integrity(&saved.oldest, &saved.newest)
        .and_then(|n_saved| chain.fingerprint(&saved.newest).map(|fp| (n_saved, fp)));

    match result {
        Ok((n_saved, fingerprint)) => {
            println!("{} records valid in saved checkpoint", n_saved);
            println!("{} records valid since", fingerprint.n_valid);
            println!("new checkpoint: {}", fingerprint.checkpoint);
            Ok(())
        }
        Err(e) if rebase && e.is_integrity_failure() => {
            let failed_id = e.record_id().unwrap_or(NULL_ID).to_string();
            let head = chain.head()?.unwrap_or_else(|| NULL_ID.to_string());
            println!("rebased checkpoint: {}", Checkpoint::rebased(failed_id, head));
            Err(CliError::Audit(e))
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_retain(chain: &Chain, config: &ChainlogConfig) -> CliResult<()> {
    let Some(cutoff) = config.retention_cutoff(Utc::now()) else {
        return Err(CliError::Usage(
            "retention.max_age_days is not configured".to_string(),
        ));
    };

    match chain.prune_older_than(cutoff)? {
        Some(boundary) => println!("pruned records up to {}", boundary),
        None => println!("nothing to prune"),
    }
    Ok(())
}
