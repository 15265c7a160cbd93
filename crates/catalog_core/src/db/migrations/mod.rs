//! Ordered schema steps for the catalog store.
//!
//! # Responsibility
//! - Register catalog schema steps with their target versions.
//! - Bring a connection from its recorded version to the latest one.
//!
//! # Invariants
//! - Versions strictly increase in `STEPS`.
//! - All pending steps commit in one transaction together with the new
//!   `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::cmp::Ordering;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "catalog",
        sql: include_str!("0001_catalog.sql"),
    },
    SchemaStep {
        version: 2,
        name: "relation_indexes",
        sql: include_str!("0002_relation_indexes.sql"),
    },
];

/// Schema version written by the newest step of this build.
pub fn latest_version() -> u32 {
    STEPS.iter().map(|step| step.version).max().unwrap_or(0)
}

/// Runs every step newer than the recorded schema version.
///
/// Returns how many steps were applied; `0` means the schema was current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let recorded: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();

    match recorded.cmp(&latest) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: recorded,
                latest_supported: latest,
            })
        }
        Ordering::Equal => return Ok(0),
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    let mut applied = 0;
    for step in STEPS.iter().filter(|step| step.version > recorded) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
        applied += 1;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={recorded} to_version={latest} steps={applied}");
    Ok(applied)
}
