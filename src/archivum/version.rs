//! Version stamp: a freshness token for manifest consumers.
//!
//! The stamp is Unix seconds, persisted in the `meta` table so it survives
//! restarts and travels with snapshots. Two commits inside the same second
//! would otherwise share a value, so a bump never goes below `previous + 1`.

use chrono::Utc;
use rusqlite::Connection;

use crate::error::Result;
use crate::store::sqlite::{get_meta, set_meta};

const VERSION_KEY: &str = "version";

/// Current persisted stamp, `0` for a database that was never mutated.
pub fn read(conn: &Connection) -> Result<i64> {
    Ok(get_meta(conn, VERSION_KEY)?.unwrap_or(0))
}

/// Advance the stamp to the current time and return the new value.
pub fn bump(conn: &Connection) -> Result<i64> {
    bump_at(conn, Utc::now().timestamp())
}

pub(crate) fn bump_at(conn: &Connection, now: i64) -> Result<i64> {
    let previous = read(conn)?;
    let next = now.max(previous + 1);
    set_meta(conn, VERSION_KEY, next)?;
    Ok(next)
}
