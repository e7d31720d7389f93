use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (appointments + queue status)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE appointments (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                phone         TEXT NOT NULL,
                patient_name  TEXT NOT NULL,
                status        TEXT NOT NULL DEFAULT 'pending',
                created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                token_number  INTEGER,
                token_date    TEXT
            );

            CREATE INDEX idx_appointments_status
                ON appointments(status, created_at);

            -- One token per number per approval day
            CREATE UNIQUE INDEX idx_appointments_daily_token
                ON appointments(token_date, token_number)
                WHERE token_number IS NOT NULL;

            CREATE TABLE queue_status (
                id          INTEGER PRIMARY KEY,
                is_open     INTEGER NOT NULL DEFAULT 0,
                updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            -- The intake gate starts closed
            INSERT OR IGNORE INTO queue_status (id, is_open) VALUES (1, 0);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
