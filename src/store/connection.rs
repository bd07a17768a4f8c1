use crate::error::{Error, Result};
use log::debug;
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Longest busy timeout SQLite accepts (`i32::MAX` milliseconds)
pub const MAX_FETCH_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

const MEMORY_PATH: &str = ":memory:";

static NEXT_MEMORY_DB: AtomicUsize = AtomicUsize::new(0);

// Embed migrations from the migrations directory
refinery::embed_migrations!("migrations");

/// Opens the database, applies the fetch timeout and runs migrations.
///
/// The timeout is SQLite's busy timeout: a fetch that waits longer than this
/// for a lock fails with `SQLITE_BUSY`, which surfaces as
/// [`Error::Unavailable`](crate::error::Error::Unavailable).
pub fn init_connection(db_path: &str, fetch_timeout: Duration) -> Result<Connection> {
    let mut conn = open_reader(db_path, fetch_timeout)?;

    let report = migrations::runner().run(&mut conn)?;
    debug!(
        "Migrations completed successfully ({} applied) for {}",
        report.applied_migrations().len(),
        db_path
    );

    Ok(conn)
}

/// Where extra connections to the same database should point.
///
/// Every plain `:memory:` connection is its own empty database, so an
/// in-memory store is given a uniquely named shared-cache URI instead.
pub fn shared_location(db_path: &str) -> String {
    if db_path == MEMORY_PATH {
        let id = NEXT_MEMORY_DB.fetch_add(1, Ordering::Relaxed);
        format!(
            "file:classroom-insights-{}-{id}?mode=memory&cache=shared",
            std::process::id()
        )
    } else {
        db_path.to_string()
    }
}

/// Opens a connection to an already migrated database
pub fn open_reader(location: &str, fetch_timeout: Duration) -> Result<Connection> {
    if fetch_timeout > MAX_FETCH_TIMEOUT {
        return Err(Error::Config(format!(
            "fetch timeout {fetch_timeout:?} exceeds the maximum of {MAX_FETCH_TIMEOUT:?}"
        )));
    }

    let conn = Connection::open(location)?;
    conn.busy_timeout(fetch_timeout)?;
    Ok(conn)
}
