use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use splitsettle::application::engine::{EngineConfig, SettlementEngine};
use splitsettle::domain::expense::GroupId;
use splitsettle::domain::money::Money;
use splitsettle::domain::ports::{LedgerStore, LedgerStoreBox};
use splitsettle::infrastructure::in_memory::{InMemoryLedgerStore, InMemoryProfileDirectory};
use splitsettle::interfaces::csv::ledger_reader::{LedgerAssembler, LedgerReader};
use splitsettle::interfaces::csv::member_reader::MemberReader;
use splitsettle::interfaces::csv::report_writer::{Report, ReportWriter};
use splitsettle::telemetry;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, error, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input ledger CSV file
    input: PathBuf,

    /// Only report on this group
    #[arg(long)]
    group: Option<String>,

    /// Differences at or below this amount count as settled
    #[arg(long, env = "SPLITSETTLE_EPSILON", default_value = "0.01")]
    epsilon: Decimal,

    /// What to print
    #[arg(long, value_enum, default_value_t = Report::Settlements)]
    report: Report,

    /// Members CSV (member, name) used to label settlements
    #[arg(long)]
    members: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "SPLITSETTLE_DB_PATH")]
    db_path: Option<PathBuf>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<LedgerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = splitsettle::infrastructure::rocksdb::RocksDbLedgerStore::open(path)
                .into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage"
            );
            Ok(Box::new(InMemoryLedgerStore::new()))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

async fn load_directory(path: Option<PathBuf>) -> Result<InMemoryProfileDirectory> {
    let directory = InMemoryProfileDirectory::new();
    if let Some(path) = path {
        let file = File::open(path).into_diagnostic()?;
        for member in MemberReader::new(file).members() {
            match member {
                Ok(member) => directory.insert(member).await,
                Err(e) => warn!("skipping malformed member record: {e}"),
            }
        }
    }
    Ok(directory)
}

async fn write_group<W: Write>(
    engine: &SettlementEngine,
    directory: &InMemoryProfileDirectory,
    writer: &mut ReportWriter<W>,
    group: &GroupId,
) -> splitsettle::error::Result<()> {
    match writer.report() {
        Report::Settlements => {
            let settled = engine.settle_group(group).await?;
            let labelled = engine
                .label_settlements(&settled.settlements, directory)
                .await?;
            writer.write_settlements(group, &labelled)
        }
        Report::Balances => {
            let settled = engine.settle_group(group).await?;
            writer.write_balances(group, &settled.balances)
        }
        Report::Summary => {
            let summary = engine.summarize_group(group).await?;
            writer.write_summary(group, &summary)
        }
        Report::Categories => {
            let summary = engine.summarize_group(group).await?;
            writer.write_categories(group, &summary)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let store = open_store(cli.db_path)?;

    // Read the whole ledger before touching the store
    let file = File::open(&cli.input).into_diagnostic()?;
    let mut assembler = LedgerAssembler::new();
    for record in LedgerReader::new(file).records() {
        if let Err(e) = record.and_then(|record| assembler.apply(record)) {
            warn!("skipping malformed ledger record: {e}");
        }
    }
    for (expense, splits) in assembler.into_entries() {
        let id = expense.id.clone();
        if !store.record(expense, splits).await.into_diagnostic()? {
            debug!(expense = %id, "expense already recorded");
        }
    }

    let config = EngineConfig {
        epsilon: Money::new(cli.epsilon),
        ..EngineConfig::default()
    };
    let engine = SettlementEngine::new(store, config);
    let directory = load_directory(cli.members).await?;

    let groups = match cli.group {
        Some(group) => vec![GroupId::from(group)],
        None => engine.groups().await.into_diagnostic()?,
    };

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock(), cli.report).into_diagnostic()?;
    let mut failed = 0;
    for group in &groups {
        if let Err(e) = write_group(&engine, &directory, &mut writer, group).await {
            error!(group = %group, "{e}");
            failed += 1;
        }
    }
    writer.flush().into_diagnostic()?;

    if failed > 0 {
        return Err(miette!("{failed} group(s) could not be reported"));
    }
    Ok(())
}
