use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS pitches (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        city TEXT NOT NULL,
        country TEXT NOT NULL,
        turf_type TEXT NOT NULL,
        current_condition INTEGER NOT NULL CHECK (current_condition BETWEEN 1 AND 10),
        last_maintenance_date TEXT NOT NULL,
        next_scheduled_maintenance TEXT,
        need_to_change_turf INTEGER NOT NULL DEFAULT 0,
        pitch_analyzed_last TEXT,
        replacement_date TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Indexes for the status queries
    r#"
    CREATE INDEX IF NOT EXISTS idx_pitches_next_scheduled_maintenance
        ON pitches(next_scheduled_maintenance);
    CREATE INDEX IF NOT EXISTS idx_pitches_need_to_change_turf
        ON pitches(need_to_change_turf);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        let current_version: i32 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                let tx = conn.transaction()?;
                tx.execute_batch(migration)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    })
}
