#![allow(clippy::result_large_err)]

use ledger_buddy::{
    config::{database, settings},
    core::{balance, month::MonthKey, seed, summary},
    errors::Result,
};
use dotenvy::dotenv;
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

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load ledger settings
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    let month = match env::args().nth(1) {
        Some(arg) => {
            MonthKey::parse(&arg).inspect_err(|e| error!("Invalid month argument: {}", e))?
        }
        None => MonthKey::current(),
    };

    // 4. Open the database and ensure the schema
    let db = database::open(&database::get_database_url())
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed reference data listed in the settings file
    seed::seed_reference_data(&db, &settings)
        .await
        .inspect_err(|e| error!("Failed to seed reference data: {}", e))?;

    // 6. Report balances and the month's budget summary
    println!("Wallet balances");
    for entry in balance::get_all_wallet_balances(&db).await? {
        println!("  {:<24} {:>16} IDR", entry.wallet.name, entry.balance);
    }

    let report =
        summary::get_budget_summary_with_policy(&db, month, settings.budget.savings_policy).await?;
    println!();
    println!("Budgets for {}", report.month);
    for item in &report.items {
        println!(
            "  {:<24} {:>14} / {:>14} IDR  {:>4}%  {:?}",
            item.target_name, item.spent_amount, item.budget_amount, item.percent_used, item.status
        );
    }
    println!(
        "  {:<24} {:>14} / {:>14} IDR  remaining {}",
        "Total", report.total_spent, report.total_budget, report.remaining
    );

    // 7. Close the connection
    database::close(db).await
}
