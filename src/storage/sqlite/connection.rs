//! Shared connection handling for storage backends.

use crate::{Error, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a connection waits on a locked database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Acquires a mutex lock, recovering the inner value if it was poisoned.
///
/// A panic inside a previous critical section leaves the guarded value
/// usable for key/value reads and writes, so the poison is logged and
/// cleared instead of propagated.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("storage mutex was poisoned, recovering");
            metrics::counter!("storage_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a `SQLite` connection for a small single-writer workload.
///
/// - **WAL mode**: concurrent readers with a single writer (in-memory
///   databases stay in `memory` mode)
/// - **NORMAL synchronous**: durability/performance balance
/// - **busy timeout**: waits up to 5 seconds on lock contention
///
/// # Errors
///
/// Returns an error if the busy timeout or synchronous mode cannot be set.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    let journal_mode: rusqlite::Result<String> =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0));
    if let Ok(mode) = journal_mode {
        tracing::debug!(journal_mode = %mode, "Configured sqlite journal mode");
    }

    conn.pragma_update(None, "synchronous", "NORMAL")
        .and_then(|()| conn.busy_timeout(BUSY_TIMEOUT))
        .map_err(|e| Error::OperationFailed {
            operation: "configure_sqlite".to_string(),
            cause: e.to_string(),
        })
}
