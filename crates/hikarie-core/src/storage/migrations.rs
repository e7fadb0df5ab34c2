//! Database schema migrations for hikarie.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Schema version after all migrations have run.
pub const CURRENT_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i32>>(0)
    }) {
        Ok(version) => Ok(version.unwrap_or(0)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: check-ins, streaks, awards and scores.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS check_in_attempts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         TEXT NOT NULL,
            calendar_date   TEXT NOT NULL,
            timestamp_of_day TEXT NOT NULL,
            recorded_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS check_ins (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         TEXT NOT NULL,
            calendar_date   TEXT NOT NULL,
            timestamp_of_day TEXT NOT NULL,
            tier            TEXT NOT NULL,
            created_at      TEXT NOT NULL,
            UNIQUE (user_id, calendar_date)
        );

        CREATE TABLE IF NOT EXISTS streaks (
            user_id         TEXT PRIMARY KEY,
            current_streak_length INTEGER NOT NULL,
            last_calendar_date TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS badge_awards (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         TEXT NOT NULL,
            badge_id        INTEGER NOT NULL,
            awarded_date    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_scores (
            user_id         TEXT PRIMARY KEY,
            previous_score  INTEGER NOT NULL,
            current_score   INTEGER NOT NULL,
            level           INTEGER NOT NULL,
            level_up        INTEGER NOT NULL DEFAULT 0,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_check_ins_date ON check_ins(calendar_date, timestamp_of_day);
        CREATE INDEX IF NOT EXISTS idx_badge_awards_user ON badge_awards(user_id);
        CREATE INDEX IF NOT EXISTS idx_attempts_user ON check_in_attempts(user_id, calendar_date);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: mirror of the badge catalogue.
///
/// Rows are refreshed from the in-process registry on every open.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS badge_types (
            id              INTEGER PRIMARY KEY,
            name            TEXT NOT NULL,
            description     TEXT NOT NULL,
            apply_start     TEXT
        );

        CREATE TABLE IF NOT EXISTS badges (
            id              INTEGER PRIMARY KEY,
            badge_type_id   INTEGER NOT NULL REFERENCES badge_types(id),
            message         TEXT NOT NULL,
            condition       TEXT NOT NULL,
            level           INTEGER NOT NULL,
            score           INTEGER NOT NULL
        );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i32>(0),
        )
        .unwrap()
            > 0
    }

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
        for table in [
            "check_in_attempts",
            "check_ins",
            "streaks",
            "badge_awards",
            "user_scores",
            "badge_types",
            "badges",
        ] {
            assert!(table_exists(&conn, table), "missing table {table}");
        }
    }

    #[test]
    fn test_migrate_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert!(!table_exists(&conn, "badges"));

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
        assert!(table_exists(&conn, "badges"));
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_unique_check_in_per_day() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let insert = "INSERT INTO check_ins (user_id, calendar_date, timestamp_of_day, tier, created_at)
                      VALUES ('U1', '2025-01-06', '08:55:00', 'early', '2025-01-05T23:55:00+00:00')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
