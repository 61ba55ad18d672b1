//! Flat-file table store for collector output.
//!
//! Each table is one CSV file with a fixed header row. A write replaces the
//! whole table: rows are serialized in memory, written to a sibling temp file
//! and renamed over the target, so a concurrent reader sees either the old or
//! the new table. Writes to the same file are serialized by a per-file lock.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{AppError, AppResult};

/// The tables written by the collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// `TrendRecord` rows
    TwitterTrends,
    /// `TrendWriteup` rows for the current Reels trends
    CurrentReels,
    /// `TrendWriteup` rows for past Reels trends
    ArchivedReels,
    /// `TrendingSong` rows
    TrendingAudio,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::TwitterTrends,
        Table::CurrentReels,
        Table::ArchivedReels,
        Table::TrendingAudio,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Table::TwitterTrends => "twitter_trends.csv",
            Table::CurrentReels => "latest_insta_trends.csv",
            Table::ArchivedReels => "archived_insta_trends.csv",
            Table::TrendingAudio => "instagram_trending_songs.csv",
        }
    }

    /// Fixed header row, in column order.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Table::TwitterTrends => &["Trend", "Count"],
            Table::CurrentReels | Table::ArchivedReels => &["Trend Name", "Links", "Explanation"],
            Table::TrendingAudio => &[
                "song_name",
                "artist_name",
                "reels_count",
                "song_link",
                "description",
                "likes",
            ],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::TwitterTrends => "twitter_trends",
            Table::CurrentReels => "current_reels",
            Table::ArchivedReels => "archived_reels",
            Table::TrendingAudio => "trending_audio",
        };
        f.write_str(name)
    }
}

/// CSV table store rooted at a data directory.
#[derive(Clone)]
pub struct TabularStore {
    data_dir: PathBuf,
    write_locks: Arc<Mutex<HashMap<Table, Arc<tokio::sync::Mutex<()>>>>>,
}

impl fmt::Debug for TabularStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabularStore")
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl TabularStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, table: Table) -> PathBuf {
        self.data_dir.join(table.file_name())
    }

    fn write_lock(&self, table: Table) -> Arc<tokio::sync::Mutex<()>> {
        // A poisoned map only means another writer panicked mid-insert.
        let mut locks = self
            .write_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(table).or_default())
    }

    /// Replace the contents of `table` with `rows`. Returns the row count.
    pub async fn write<T: Serialize>(&self, table: Table, rows: &[T]) -> AppResult<usize> {
        let bytes = encode_rows(table, rows)?;

        let lock = self.write_lock(table);
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.data_dir).await?;
        let target = self.path(table);
        let temp = self.data_dir.join(format!(".{}.tmp", table.file_name()));
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &target).await?;

        tracing::debug!(%table, rows = rows.len(), path = ?target, "Wrote table");
        Ok(rows.len())
    }

    /// Read every row of `table`.
    pub async fn read<T: DeserializeOwned>(&self, table: Table) -> AppResult<Vec<T>> {
        let path = self.path(table);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!(
                    "Table '{}' has not been collected yet ({:?})",
                    table, path
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let rows = decode_rows(&bytes)?;
        tracing::debug!(%table, rows = rows.len(), "Read table");
        Ok(rows)
    }

    /// Whether `table` has been written at least once.
    pub fn exists(&self, table: Table) -> bool {
        self.path(table).is_file()
    }
}

fn encode_rows<T: Serialize>(table: Table, rows: &[T]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Serialization(format!("Failed to flush CSV writer: {}", e)))
}

fn decode_rows<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(AppError::from)
}
