/// Database connection lifecycle and schema creation
pub mod database;

/// Ledger settings and seed data loading from ledger.toml
pub mod settings;
