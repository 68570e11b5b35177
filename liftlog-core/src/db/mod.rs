pub mod models;
pub mod operations;

use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use std::time::Duration;

use crate::error::Result;

/// Fixed key of the single global settings row.
pub const SETTINGS_KEY: &str = "global";

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_08_30_000000_SETUP_TABLES: &str =
    include_str!("../../../migrations/2026-08-30-000000-setup_tables/up.sql");

const MIGRATIONS: &[Migration] = &[Migration {
    name: "2026-08-30-000000-setup_tables",
    up_sql: MIGRATION_2026_08_30_000000_SETUP_TABLES,
}];

/// Open a pool against the given database file, creating it if missing.
/// Foreign keys are enabled per connection so machine deletion cascades.
pub async fn connect(db_path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

async fn mark_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<()> {
    sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
        .bind(migration_name)
        .execute(pool)
        .await?;
    Ok(())
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Apply pending migrations and seed the default settings row.
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement).execute(pool).await?;
        }
        mark_migration_applied(pool, migration.name).await?;
    }

    sqlx::query("INSERT OR IGNORE INTO settings (key, display_unit) VALUES (?1, 'kg')")
        .bind(SETTINGS_KEY)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete every machine, session and set. The settings row survives a
/// bulk clear.
pub async fn drop_all_rows(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM sets").execute(pool).await?;
    sqlx::query("DELETE FROM sessions").execute(pool).await?;
    sqlx::query("DELETE FROM machines").execute(pool).await?;
    Ok(())
}
