use clap::Parser;
use miette::{IntoDiagnostic, Result};
use minibank::application::engine::BankEngine;
use minibank::domain::exchange::ExchangeGraph;
use minibank::domain::ports::{
    AccountStoreBox, ClockBox, CommerciantStore, CommerciantStoreBox, NumberFactoryBox, UserStore,
    UserStoreBox,
};
use minibank::infrastructure::clock::SystemClock;
use minibank::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryCommerciantStore, InMemoryUserStore,
};
use minibank::infrastructure::numbers::SeededNumbers;
use minibank::interfaces::csv::balance_writer::BalanceWriter;
use minibank::interfaces::json::input_reader::read_input;
use minibank::interfaces::json::report_writer::{ReportEntry, ReportWriter};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input simulation JSON file
    input: PathBuf,

    /// Optional CSV export of the final account balances
    #[arg(long)]
    balances: Option<PathBuf>,

    /// Seed for IBAN and card-number generation
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let file = File::open(&cli.input).into_diagnostic()?;
    let input = read_input(file).into_diagnostic()?;

    let mut exchange = ExchangeGraph::new();
    for rate in &input.exchange_rates {
        exchange.add_rate(&rate.from, &rate.to, rate.rate);
    }
    exchange.materialize_inverses();

    let user_store = InMemoryUserStore::new();
    let commerciant_store = InMemoryCommerciantStore::new();
    for seed in input.users {
        user_store.store(seed.into_user()).await.into_diagnostic()?;
    }
    for seed in input.commerciants {
        commerciant_store
            .store(seed.into_commerciant())
            .await
            .into_diagnostic()?;
    }

    let users: UserStoreBox = Box::new(user_store);
    let accounts: AccountStoreBox = Box::new(InMemoryAccountStore::new());
    let commerciants: CommerciantStoreBox = Box::new(commerciant_store);
    let numbers: NumberFactoryBox = Box::new(SeededNumbers::new(cli.seed));
    let clock: ClockBox = Box::new(SystemClock);

    let engine = BankEngine::new(users, accounts, commerciants, exchange, numbers, clock);

    // Replay the commands strictly in order, one completing before the next.
    let mut entries = Vec::new();
    for operation in input.commands {
        let command = operation.name();
        let timestamp = operation.timestamp();
        match engine.process(operation).await {
            Ok(outcome) => entries.push(ReportEntry {
                command,
                timestamp,
                outcome,
            }),
            Err(e) => tracing::error!(command, timestamp, "operation failed: {e}"),
        }
    }

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write(&entries).into_diagnostic()?;

    if let Some(path) = cli.balances {
        let accounts = engine.accounts_snapshot().await.into_diagnostic()?;
        let file = File::create(path).into_diagnostic()?;
        let mut writer = BalanceWriter::new(file);
        writer.write_balances(&accounts).into_diagnostic()?;
    }

    Ok(())
}
