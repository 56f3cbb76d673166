//! Unified error types and result handling.
//!
//! Every failure that leaves the core is one of a closed set of kinds (see [`ErrorKind`]).
//! Raw storage errors are classified once, in [`classify_db_err`], so callers only ever
//! match on typed variants and never on driver-specific codes or messages.

use sea_orm::sqlx::error::ErrorKind as SqlxErrorKind;
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The kinds of records the core reads and writes, used to label lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// A money-holding account
    Wallet,
    /// An income or expense classification
    Category,
    /// A named savings goal
    SavingsBucket,
    /// A ledger event (the owner of postings)
    Transaction,
    /// A monthly spending cap
    Budget,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Wallet => "Wallet",
            Self::Category => "Category",
            Self::SavingsBucket => "Savings bucket",
            Self::Transaction => "Transaction",
            Self::Budget => "Budget",
        };
        f.write_str(label)
    }
}

/// Closed set of error kinds exposed to the transport layer.
///
/// The transport decides the status code; the usual mapping is
/// Validation → 400/422, `NotFound` → 404, `ArchivedReference` → 400,
/// Conflict → 409, `ConstraintViolation` → 400 and Storage → 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input
    Validation,
    /// A referenced record does not exist
    NotFound,
    /// A referenced record exists but is archived
    ArchivedReference,
    /// A uniqueness rule would be broken
    Conflict,
    /// Any other storage-level constraint failure
    ConstraintViolation,
    /// Connection failures and anything unrecognized
    Storage,
}

/// Errors produced by the ledger core.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed validation before touching storage.
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A referenced record does not exist (or is soft-deleted).
    #[error("{resource} not found: {id}")]
    NotFound {
        /// What kind of record was looked up
        resource: Resource,
        /// The id that was looked up
        id: String,
    },

    /// A referenced record exists but is archived.
    #[error("{resource} is archived: {id}")]
    ArchivedReference {
        /// What kind of record was referenced
        resource: Resource,
        /// The archived record's id
        id: String,
    },

    /// A uniqueness rule or state transition conflict.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable reason
        message: String,
    },

    /// A storage-level constraint other than uniqueness failed.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// Sanitized reason, never the raw driver message
        message: String,
    },

    /// Anything the classifier did not recognize.
    #[error("Storage error: the operation could not be completed")]
    Storage {
        /// Raw error, kept for logging only
        #[source]
        source: DbErr,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },
}

impl Error {
    /// Returns the taxonomy kind the transport layer maps to a response.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ArchivedReference { .. } => ErrorKind::ArchivedReference,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Self::Storage { .. } | Self::Config { .. } => ErrorKind::Storage,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(resource: Resource, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub(crate) fn archived(resource: Resource, id: impl Into<String>) -> Self {
        Self::ArchivedReference {
            resource,
            id: id.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        classify_db_err(err)
    }
}

/// Pulls the driver's typed constraint kind out of a `DbErr`, if it carries one.
fn driver_error_kind(err: &DbErr) -> Option<SqlxErrorKind> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err))) => {
            Some(db_err.kind())
        }
        _ => None,
    }
}

/// Maps a raw storage error onto the closed error taxonomy.
///
/// Messages on the classified variants are fixed strings; the driver message only
/// survives inside [`Error::Storage`] as its source.
#[must_use]
pub fn classify_db_err(err: DbErr) -> Error {
    let classified = match driver_error_kind(&err) {
        Some(SqlxErrorKind::UniqueViolation) => Error::conflict("record already exists"),
        Some(SqlxErrorKind::ForeignKeyViolation) => Error::ConstraintViolation {
            message: "a referenced record does not exist".to_string(),
        },
        Some(SqlxErrorKind::NotNullViolation) => Error::ConstraintViolation {
            message: "a required field is missing".to_string(),
        },
        Some(SqlxErrorKind::CheckViolation) => Error::ConstraintViolation {
            message: "a value failed a consistency check".to_string(),
        },
        _ => {
            tracing::error!(error = %err, "Unclassified storage error");
            return Error::Storage { source: err };
        }
    };
    tracing::debug!(error = %err, kind = ?classified.kind(), "Classified storage error");
    classified
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
