//! Stepwise SQLite schema upgrades with per-version transactional bookkeeping.
//!
//! `verstep` brings a database from whatever schema version it currently
//! holds up to a requested target version. Applied versions are recorded in a
//! `versions` bookkeeping table, created lazily on the first upgrade. Each
//! version is applied in its own transaction together with its bookkeeping
//! row, so an interrupted upgrade leaves the database at a well-defined
//! intermediate version and a later run resumes from there.
//!
//! The per-version schema changes themselves are supplied by the caller as a
//! [`VersionBuilder`] — typically a [`StepMap`] with one function per
//! version:
//!
//! ```
//! use rusqlite::Connection;
//! use verstep::{get_version_of, upgrade_version, StepMap, UpgradeError};
//!
//! fn main() -> Result<(), UpgradeError> {
//!     let conn = Connection::open_in_memory()?;
//!
//!     let mut steps = StepMap::new().with_step(1, |conn| {
//!         conn.execute("CREATE TABLE users (name TEXT PRIMARY KEY)", [])?;
//!         Ok(())
//!     });
//!
//!     upgrade_version(&conn, steps.latest_version(), &mut steps)?;
//!     assert_eq!(get_version_of(&conn)?, 1);
//!     Ok(())
//! }
//! ```
//!
//! The crate never opens or closes connections and performs no cross-process
//! locking; both belong to the caller.

mod builder;
mod error;
mod upgrader;

pub use builder::{StepFn, StepMap, VersionBuilder};
pub use error::UpgradeError;
pub use upgrader::{get_version_of, upgrade_version};
