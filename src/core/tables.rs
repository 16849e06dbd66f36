use crate::core::Storage;
use crate::domain::model::{AnalyzedPost, CleanPost, DatasetPost, RawPost};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// CSV tables kept under the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TableName {
    Raw,
    Clean,
    Analysis,
    Dataset,
}

impl TableName {
    pub fn name(&self) -> &'static str {
        match self {
            TableName::Raw => "whoosh_raw",
            TableName::Clean => "whoosh_clean",
            TableName::Analysis => "whoosh_analysis",
            TableName::Dataset => "kaggle_whoosh",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rows with a unique key and a timestamp.
pub trait TableRow: Serialize + DeserializeOwned + Clone + Send {
    fn key(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
}

impl TableRow for RawPost {
    fn key(&self) -> Option<&str> {
        Some(&self.tweet_id)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TableRow for CleanPost {
    fn key(&self) -> Option<&str> {
        Some(&self.tweet_id)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TableRow for AnalyzedPost {
    fn key(&self) -> Option<&str> {
        Some(&self.tweet_id)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// 匯入的資料集沒有主鍵，一律附加
impl TableRow for DatasetPost {
    fn key(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Reads a table; a table that was never written reads as empty.
pub async fn read_table<T: TableRow, S: Storage>(storage: &S, table: TableName) -> Result<Vec<T>> {
    let data = match storage.read_file(&table.file_name()).await {
        Ok(data) => data,
        Err(EtlError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Table {} does not exist yet", table);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut reader = csv::Reader::from_reader(data.as_slice());
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;

    tracing::debug!("Read {} rows from {}", rows.len(), table);
    Ok(rows)
}

pub async fn write_table<T: TableRow, S: Storage>(
    storage: &S,
    table: TableName,
    rows: &[T],
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let data = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Could not flush {} table: {}", table, e),
    })?;

    storage.write_file(&table.file_name(), &data).await?;
    tracing::debug!("Wrote {} rows to {}", rows.len(), table);
    Ok(())
}

/// Appends rows whose key is not present yet; existing rows win
/// (insert ... on conflict do nothing). Returns the number inserted.
pub fn insert_ignore<T: TableRow>(existing: &mut Vec<T>, new_rows: Vec<T>) -> usize {
    let mut keys: HashSet<String> = existing
        .iter()
        .filter_map(|row| row.key().map(str::to_string))
        .collect();

    let before = existing.len();
    for row in new_rows {
        match row.key() {
            Some(key) if keys.contains(key) => continue,
            Some(key) => {
                keys.insert(key.to_string());
                existing.push(row);
            }
            None => existing.push(row),
        }
    }
    existing.len() - before
}

/// Inserts new analysis rows and refreshes sentiment and score of rows that
/// already exist (on conflict do update).
pub fn upsert_analysis(existing: &mut Vec<AnalyzedPost>, new_rows: Vec<AnalyzedPost>) {
    let mut index: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, row)| (row.tweet_id.clone(), i))
        .collect();

    for row in new_rows {
        match index.get(&row.tweet_id) {
            Some(&i) => {
                existing[i].sentiment = row.sentiment;
                existing[i].score = row.score;
            }
            None => {
                index.insert(row.tweet_id.clone(), existing.len());
                existing.push(row);
            }
        }
    }
}

/// Upserts a batch into a stored table and returns how many rows were new.
pub async fn insert_rows<T: TableRow, S: Storage>(
    storage: &S,
    table: TableName,
    rows: Vec<T>,
) -> Result<usize> {
    let mut existing: Vec<T> = read_table(storage, table).await?;
    let inserted = insert_ignore(&mut existing, rows);
    write_table(storage, table, &existing).await?;
    Ok(inserted)
}
