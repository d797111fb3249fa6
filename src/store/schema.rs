use rusqlite::Connection;
use tracing::{debug, warn};

type Migration = fn(&Connection) -> rusqlite::Result<()>;

/// Ordered schema steps; step N brings the database to `user_version` N + 1.
const MIGRATIONS: &[Migration] = &[create_tables, add_owner_columns, add_lookup_indexes];

pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

/// Bring the database up to `SCHEMA_VERSION`, one transaction per step.
///
/// Databases written by the earlier receipt app report version 0 and may
/// already carry some of the tables and columns, so the early steps tolerate
/// existing structure.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<i64> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    if current > SCHEMA_VERSION {
        warn!(
            current,
            supported = SCHEMA_VERSION,
            "database schema is newer than this build"
        );
        return Ok(current);
    }

    // Steps tolerate existing structure, so a negative version replays them all
    let applied = usize::try_from(current).unwrap_or_else(|_| {
        warn!(current, "negative schema version, re-applying all migrations");
        0
    });

    for (idx, step) in MIGRATIONS.iter().enumerate().skip(applied) {
        let version = idx as i64 + 1;
        let tx = conn.transaction()?;
        step(&tx)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        debug!(version, "applied schema migration");
    }

    Ok(SCHEMA_VERSION)
}

fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT,
            vendor TEXT,
            invoice_no TEXT,
            total REAL
        );

        CREATE TABLE IF NOT EXISTS invoices_full (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT,
            invoice_no TEXT,
            invoice_json TEXT
        );

        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            address TEXT,
            phone TEXT,
            ntn TEXT,
            notes TEXT,
            created_at TEXT
        );
        "#,
    )
}

fn add_owner_columns(conn: &Connection) -> rusqlite::Result<()> {
    for table in ["invoices", "invoices_full", "clients"] {
        if !has_column(conn, table, "user_id")? {
            conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN user_id TEXT"))?;
        }
    }
    Ok(())
}

fn add_lookup_indexes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_invoices_user_id ON invoices(user_id);
        CREATE INDEX IF NOT EXISTS idx_invoices_full_lookup ON invoices_full(invoice_no, user_id);
        CREATE INDEX IF NOT EXISTS idx_clients_user_id ON clients(user_id);
        "#,
    )
}

fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().any(|n| n == column))
}
