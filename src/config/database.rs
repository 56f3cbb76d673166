//! Database configuration module.
//!
//! This module handles the `SQLite` connection lifecycle and table creation. The connection
//! is opened once at startup, passed by reference into every core operation and closed
//! explicitly at shutdown; nothing in the crate holds a global handle.
//!
//! Tables are created from hand-written DDL rather than from the entity definitions because
//! the ledger's invariants live in the schema: CHECK constraints for the budget target and
//! posting account pairs, and partial unique indexes that allow only one active budget per
//! month and target.

use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use std::path::Path;
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/ledger_buddy.sqlite?mode=rwc";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS wallets (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        archived BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        category_type TEXT NOT NULL CHECK (category_type IN ('income', 'expense')),
        archived BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS savings_buckets (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        target_amount_idr INTEGER CHECK (target_amount_idr IS NULL OR target_amount_idr > 0),
        archived BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY NOT NULL,
        transaction_type TEXT NOT NULL CHECK (transaction_type IN
            ('expense', 'income', 'transfer', 'savings_contribution', 'savings_withdrawal')),
        occurred_at TEXT NOT NULL,
        note TEXT NOT NULL DEFAULT '',
        payee TEXT,
        category_id TEXT REFERENCES categories (id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_transactions_occurred_at ON transactions (occurred_at)",
    "CREATE TABLE IF NOT EXISTS postings (
        id TEXT PRIMARY KEY NOT NULL,
        event_id TEXT NOT NULL REFERENCES transactions (id) ON DELETE CASCADE,
        wallet_id TEXT REFERENCES wallets (id),
        savings_bucket_id TEXT REFERENCES savings_buckets (id),
        amount_idr INTEGER NOT NULL CHECK (amount_idr <> 0),
        CHECK ((wallet_id IS NULL) <> (savings_bucket_id IS NULL))
    )",
    "CREATE INDEX IF NOT EXISTS idx_postings_event ON postings (event_id)",
    "CREATE INDEX IF NOT EXISTS idx_postings_wallet ON postings (wallet_id)",
    "CREATE INDEX IF NOT EXISTS idx_postings_savings_bucket ON postings (savings_bucket_id)",
    "CREATE TABLE IF NOT EXISTS budgets (
        id TEXT PRIMARY KEY NOT NULL,
        month TEXT NOT NULL,
        category_id TEXT REFERENCES categories (id),
        savings_bucket_id TEXT REFERENCES savings_buckets (id),
        amount_idr INTEGER NOT NULL CHECK (amount_idr > 0),
        note TEXT,
        archived BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        CHECK ((category_id IS NULL) <> (savings_bucket_id IS NULL))
    )",
    // One active budget per (month, target). Archived rows are exempt so a target can be
    // archived and budgeted again in the same month.
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_active_category
        ON budgets (month, category_id)
        WHERE archived = 0 AND category_id IS NOT NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_active_savings_bucket
        ON budgets (month, savings_bucket_id)
        WHERE archived = 0 AND savings_bucket_id IS NOT NULL",
];

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file (created on first use) if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all ledger tables, CHECK constraints and indexes if they do not exist yet.
#[instrument(skip(db))]
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    for statement in SCHEMA {
        db.execute_unprepared(statement).await?;
    }
    info!("Database tables ensured.");
    Ok(())
}

/// Creates the parent directory of a file-backed `SQLite` URL so `mode=rwc` can create
/// the file. Other URLs are left alone.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::Config {
            message: format!("Failed to create database directory {}: {e}", parent.display()),
        })?;
    }
    Ok(())
}

/// Opens the connection and ensures the schema, the usual startup sequence.
pub async fn open(database_url: &str) -> Result<DatabaseConnection> {
    ensure_sqlite_dir(database_url)?;
    let db = create_connection(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Closes the connection pool at shutdown.
pub async fn close(db: DatabaseConnection) -> Result<()> {
    db.close().await?;
    info!("Database connection closed.");
    Ok(())
}
