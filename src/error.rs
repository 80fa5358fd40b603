use rusqlite::Error as RusqliteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpgradeError {
    /// Negative target version. Rejected before any database access; zero is
    /// a valid target (it bootstraps the bookkeeping table and nothing else).
    #[error("expected a target version >= 0, got {0}")]
    InvalidTarget(i64),

    /// The recorded schema version is already ahead of the requested target.
    /// Downgrades are not supported, so this indicates caller misuse or
    /// external tampering with the `versions` table.
    #[error("actual schema version = {actual} is greater than target version {target}")]
    VersionAhead { actual: i64, target: i64 },

    /// A `StepMap` had no step registered for a version the upgrade needed.
    #[error("no upgrade step registered for version {0}")]
    MissingStep(i64),

    #[error("database error: {0}")]
    Database(#[from] RusqliteError), // Converts rusqlite::Error automatically

    #[error("Error: {0}")]
    Error(String), // Allows custom errors from caller-supplied version builders
}
