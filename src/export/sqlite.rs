//! SQLite export.
//!
//! The export tables are a snapshot, not a live library: each export drops
//! and recreates them inside one transaction, so a failed export leaves the
//! previous snapshot intact.

use std::path::Path;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::{CatalogRow, FormatRow, MetricRow};

const SCHEMA: &[&str] = &[
    "DROP TABLE IF EXISTS tracks",
    "DROP TABLE IF EXISTS library_metrics",
    "DROP TABLE IF EXISTS format_metrics",
    "CREATE TABLE tracks (
        path TEXT PRIMARY KEY NOT NULL,
        relative_path TEXT NOT NULL,
        format TEXT NOT NULL,
        size_bytes INTEGER NOT NULL,
        artist TEXT,
        album TEXT,
        title TEXT,
        track INTEGER,
        year INTEGER,
        genre TEXT,
        duration_seconds REAL,
        bitrate_kbps INTEGER,
        sample_rate_hz INTEGER,
        metadata_source TEXT NOT NULL
    )",
    "CREATE TABLE library_metrics (
        metric TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )",
    "CREATE TABLE format_metrics (
        format TEXT PRIMARY KEY NOT NULL,
        size_bytes INTEGER NOT NULL,
        size_mb REAL NOT NULL,
        percent_of_library REAL NOT NULL
    )",
];

/// Build a SQLite connection URL for a database file.
pub fn db_url(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

async fn open(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let url = db_url(path);
    if !sqlx::Sqlite::database_exists(&url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(&url).await?;
    }

    SqlitePoolOptions::new().max_connections(1).connect(&url).await
}

/// Replace the export tables in the database at `path`.
pub async fn write_database(
    path: &Path,
    tracks: &[CatalogRow],
    metrics: &[MetricRow],
    formats: &[FormatRow],
) -> Result<(), sqlx::Error> {
    let pool = open(path).await?;
    let mut tx = pool.begin().await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    for row in tracks {
        sqlx::query(
            "INSERT INTO tracks (path, relative_path, format, size_bytes, artist, album, title,
                track, year, genre, duration_seconds, bitrate_kbps, sample_rate_hz, metadata_source)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.path)
        .bind(&row.relative_path)
        .bind(&row.format)
        .bind(row.size_bytes as i64)
        .bind(row.artist.as_deref())
        .bind(row.album.as_deref())
        .bind(row.title.as_deref())
        .bind(row.track.map(i64::from))
        .bind(row.year.map(i64::from))
        .bind(row.genre.as_deref())
        .bind(row.duration_seconds)
        .bind(row.bitrate_kbps.map(i64::from))
        .bind(row.sample_rate_hz.map(i64::from))
        .bind(row.metadata_source)
        .execute(&mut *tx)
        .await?;
    }

    for row in metrics {
        sqlx::query("INSERT INTO library_metrics (metric, value) VALUES (?, ?)")
            .bind(row.metric)
            .bind(&row.value)
            .execute(&mut *tx)
            .await?;
    }

    for row in formats {
        sqlx::query(
            "INSERT INTO format_metrics (format, size_bytes, size_mb, percent_of_library) VALUES (?, ?, ?, ?)",
        )
        .bind(&row.format)
        .bind(row.size_bytes as i64)
        .bind(row.size_mb)
        .bind(row.percent_of_library)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    pool.close().await;
    Ok(())
}
