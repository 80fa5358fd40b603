use std::collections::BTreeMap;

use rusqlite::Connection;

use crate::error::UpgradeError;

/// Capability supplied by the caller: performs the schema changes for exactly
/// one version number.
///
/// The upgrader invokes `apply` once per missing version, in ascending order,
/// inside a transaction it controls. Implementations must not commit or roll
/// back themselves; they signal failure by returning an error, which rolls
/// back that version's transaction (including its bookkeeping row) and halts
/// the upgrade.
pub trait VersionBuilder {
    fn apply(&mut self, conn: &Connection, version: i64) -> Result<(), UpgradeError>;
}

impl<F> VersionBuilder for F
where
    F: FnMut(&Connection, i64) -> Result<(), UpgradeError>,
{
    fn apply(&mut self, conn: &Connection, version: i64) -> Result<(), UpgradeError> {
        self(conn, version)
    }
}

/// Function type for the schema changes of a single version.
pub type StepFn = fn(&Connection) -> Result<(), UpgradeError>;

/// A `VersionBuilder` that dispatches on the version number through an
/// ordered map of steps.
///
/// This is the usual shape of a migration payload: one function per version,
/// registered once at startup. A version with no registered step fails the
/// upgrade with [`UpgradeError::MissingStep`] rather than silently applying
/// nothing, since a gap in the step table is a programming error.
#[derive(Default)]
pub struct StepMap {
    steps: BTreeMap<i64, StepFn>,
}

impl StepMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the step for `version`, replacing any previous registration.
    pub fn with_step(mut self, version: i64, step: StepFn) -> Self {
        self.steps.insert(version, step);
        self
    }

    /// Highest registered version, or 0 if no steps are registered. Handy as
    /// the target for "upgrade to whatever the code supports".
    pub fn latest_version(&self) -> i64 {
        self.steps.keys().next_back().copied().unwrap_or(0)
    }
}

impl VersionBuilder for StepMap {
    fn apply(&mut self, conn: &Connection, version: i64) -> Result<(), UpgradeError> {
        match self.steps.get(&version) {
            Some(step) => step(conn),
            None => Err(UpgradeError::MissingStep(version)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_marker(conn: &Connection) -> Result<(), UpgradeError> {
        conn.execute("CREATE TABLE marker (id INTEGER PRIMARY KEY)", [])?;
        Ok(())
    }

    fn fail_step(_conn: &Connection) -> Result<(), UpgradeError> {
        Err(UpgradeError::Error("step failed".to_string()))
    }

    #[test]
    fn test_step_map_dispatches_registered_step() {
        let conn = Connection::open_in_memory().unwrap();
        let mut steps = StepMap::new().with_step(1, create_marker);

        steps.apply(&conn, 1).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'marker'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_step_map_missing_step_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        let mut steps = StepMap::new().with_step(1, create_marker);

        match steps.apply(&conn, 2) {
            Err(UpgradeError::MissingStep(2)) => {}
            other => panic!("expected MissingStep(2), got {other:?}"),
        }
    }

    #[test]
    fn test_step_map_propagates_step_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let mut steps = StepMap::new().with_step(1, fail_step);

        match steps.apply(&conn, 1) {
            Err(UpgradeError::Error(msg)) => assert_eq!(msg, "step failed"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn test_step_map_latest_version() {
        assert_eq!(StepMap::new().latest_version(), 0);

        let steps = StepMap::new()
            .with_step(3, create_marker)
            .with_step(1, create_marker);
        assert_eq!(steps.latest_version(), 3);
    }

    #[test]
    fn test_closures_are_version_builders() {
        let conn = Connection::open_in_memory().unwrap();
        let mut seen = Vec::new();
        let mut builder = |_c: &Connection, v: i64| -> Result<(), UpgradeError> {
            seen.push(v);
            Ok(())
        };

        builder.apply(&conn, 7).unwrap();
        assert_eq!(seen, vec![7]);
    }
}
