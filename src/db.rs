// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Sqlite};

use crate::models::Candle;

pub async fn create_db_pool(db_url: &str) -> Result<SqlitePool> {
    // Create database if it doesn't exist
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePool::connect(db_url).await?;

    Ok(pool)
}

// Table names are interpolated into DDL, so they must stay plain identifiers
fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Load a candle table wholesale, replacing any existing table of that name.
/// Column order matches the candle shape: time, open, high, low, close, volume.
pub async fn replace_candles(pool: &SqlitePool, table: &str, candles: &[Candle]) -> Result<()> {
    if !is_valid_table_name(table) {
        anyhow::bail!("invalid table name: {}", table);
    }

    let mut tx = pool.begin().await?;

    sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{}""#, table))
        .execute(&mut *tx)
        .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE "{}" (
            time TEXT NOT NULL,
            open REAL NOT NULL,
            high REAL NOT NULL,
            low REAL NOT NULL,
            close REAL NOT NULL,
            volume REAL NOT NULL
        )
        "#,
        table
    ))
    .execute(&mut *tx)
    .await?;

    for candle in candles {
        sqlx::query(&format!(
            r#"
            INSERT INTO "{}" (time, open, high, low, close, volume)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            table
        ))
        .bind(candle.time.format("%Y-%m-%d %H:%M:%S").to_string())
        .bind(candle.open)
        .bind(candle.high)
        .bind(candle.low)
        .bind(candle.close)
        .bind(candle.volume)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

pub async fn count_candles(pool: &SqlitePool, table: &str) -> Result<i64> {
    if !is_valid_table_name(table) {
        anyhow::bail!("invalid table name: {}", table);
    }

    let row: (i64,) = sqlx::query_as(&format!(r#"SELECT COUNT(*) FROM "{}""#, table))
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

#[cfg(test)]
pub async fn create_test_pool() -> Result<SqlitePool> {
    // a single connection keeps every query on the same in-memory database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}
