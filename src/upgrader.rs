use log::{debug, info};
use rusqlite::Connection;

use crate::builder::VersionBuilder;
use crate::error::UpgradeError;

/// Bookkeeping table: one row per successfully applied schema version.
/// Rows are append-only and always form a contiguous run 1..N, because
/// versions are only ever applied sequentially and only recorded on success.
const CREATE_VERSIONS_TABLE_SQL: &str = "CREATE TABLE versions (
    number INTEGER PRIMARY KEY NOT NULL,
    ts TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Reads the current schema version from the `versions` bookkeeping table.
///
/// Returns `-1` if the table does not exist (the database has never been
/// upgraded), `0` if it exists but holds no rows, and the highest recorded
/// version otherwise. Table absence is probed explicitly via `sqlite_master`,
/// so any failure of the version query itself propagates as a real error.
pub fn get_version_of(conn: &Connection) -> Result<i64, UpgradeError> {
    match recorded_version(conn)? {
        Some(version) => Ok(version),
        None => Ok(-1),
    }
}

/// Upgrades the database schema to `target_version`, applying each missing
/// version through `builder` in ascending order.
///
/// Each version is applied in its own transaction together with its
/// bookkeeping row, so a failure mid-sequence leaves the database at the last
/// fully committed version; already committed steps are never undone. The
/// builder's error is propagated unchanged after the rollback.
///
/// A `target_version` equal to the current version is a no-op. Zero is a
/// valid target: it creates the bookkeeping table without invoking the
/// builder at all.
pub fn upgrade_version<B>(
    conn: &Connection,
    target_version: i64,
    builder: &mut B,
) -> Result<(), UpgradeError>
where
    B: VersionBuilder + ?Sized,
{
    if target_version < 0 {
        return Err(UpgradeError::InvalidTarget(target_version));
    }

    let actual_version = get_version_of(conn)?;
    if actual_version > target_version {
        return Err(UpgradeError::VersionAhead {
            actual: actual_version,
            target: target_version,
        });
    }

    build_version(conn, actual_version, target_version, builder)
}

fn build_version<B>(
    conn: &Connection,
    mut actual_version: i64,
    target_version: i64,
    builder: &mut B,
) -> Result<(), UpgradeError>
where
    B: VersionBuilder + ?Sized,
{
    if actual_version == -1 {
        // Runs outside the per-version transactions below: nothing has been
        // recorded yet, so there is nothing to roll back if this fails.
        info!("Creating schema version bookkeeping table");
        conn.execute(CREATE_VERSIONS_TABLE_SQL, [])?;
        actual_version = 0;
    }

    if actual_version == target_version {
        debug!("Schema already at version {target_version}, nothing to apply");
        return Ok(());
    }

    for version in actual_version + 1..=target_version {
        info!("Upgrading schema to version {version}");

        // Rolls back on drop unless committed, so any error below undoes
        // both the builder's changes and the bookkeeping row for `version`.
        let tx = conn.unchecked_transaction()?;
        builder.apply(&tx, version)?;
        tx.execute("INSERT INTO versions (number) VALUES (?1)", [version])?;
        tx.commit()?;
    }

    info!("Schema upgraded to version {target_version}");
    Ok(())
}

/// Two-outcome version probe: `None` means the bookkeeping table is absent,
/// `Some(n)` its highest recorded version (0 when empty).
fn recorded_version(conn: &Connection) -> Result<Option<i64>, UpgradeError> {
    let table_count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'versions'",
        [],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Ok(None);
    }

    let max_version: Option<i64> =
        conn.query_row("SELECT max(number) FROM versions", [], |row| row.get(0))?;
    Ok(Some(max_version.unwrap_or(0)))
}
