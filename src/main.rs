use chrono::Utc;
use dotenvy::dotenv;
use installment_ledger::{
    config::{
        self,
        database::{create_connection, create_tables, get_database_url},
    },
    core::{DebtWorkflow, NoOrigin},
    errors::Result,
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Ledger settings, LEDGER_CONFIG overrides ./config.toml
    let ledger_config = match env::var("LEDGER_CONFIG") {
        Ok(path) => config::ledger::load_config(&path),
        Err(_) => config::ledger::load_default_config(),
    }
    .inspect_err(|e| error!("Failed to load ledger configuration: {}", e))?;
    info!(
        default_period_count = ledger_config.default_period_count,
        settlement_tolerance = %ledger_config.settlement_tolerance,
        "Loaded ledger configuration"
    );

    // 4. Connect and make sure the tables exist
    let db = create_connection()
        .await
        .inspect(|_| info!("Connected to {}", get_database_url()))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Mark overdue periods and bring every debt's status up to date
    let workflow = DebtWorkflow::new(db, ledger_config, NoOrigin);
    let summary = workflow.refresh_overdue(Utc::now().date_naive()).await?;
    info!(
        debts = summary.debts_checked,
        overdue_debts = summary.overdue_debts,
        paid_debts = summary.paid_debts,
        overdue_periods = summary.overdue_periods,
        "Ledger maintenance complete"
    );

    Ok(())
}
