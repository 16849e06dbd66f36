use crate::core::tables::{insert_rows, TableName};
use crate::core::Storage;
use crate::domain::model::DatasetPost;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_file_extension;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};

const DEFAULT_LANG: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub source: PathBuf,
    pub rows: usize,
}

/// Imports an external CSV dataset into `kaggle_whoosh`.
///
/// `path` may point at the CSV itself or at a directory, in which case the
/// first `*.csv` file (by name) is used. A `text` column is required; a
/// missing `created_at` column defaults to the import time and a missing
/// `lang` column to `id`.
pub async fn import_dataset<S: Storage>(storage: &S, path: &Path) -> Result<ImportReport> {
    let source = resolve_csv(path).await?;
    validate_file_extension("dataset", &source.to_string_lossy(), &["csv"])?;
    tracing::info!("📂 Loading CSV file: {}", source.display());

    let data = tokio::fs::read(&source).await?;
    let rows = parse_dataset(&data, Utc::now())?;
    let count = insert_rows(storage, TableName::Dataset, rows).await?;

    tracing::info!("✅ Successfully loaded {} dataset rows", count);
    Ok(ImportReport {
        source,
        rows: count,
    })
}

async fn resolve_csv(path: &Path) -> Result<PathBuf> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_dir() {
        return Ok(path.to_path_buf());
    }

    let mut entries = tokio::fs::read_dir(path).await?;
    let mut csv_files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file = entry.path();
        if file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            csv_files.push(file);
        }
    }
    csv_files.sort();

    csv_files
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::ValidationError {
            message: format!("No CSV file found in dataset folder {}", path.display()),
        })
}

fn parse_dataset(data: &[u8], imported_at: DateTime<Utc>) -> Result<Vec<DatasetPost>> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let text_idx = column("text").ok_or_else(|| EtlError::ValidationError {
        message: "Dataset must contain a 'text' column.".to_string(),
    })?;
    let created_at_idx = column("created_at");
    let lang_idx = column("lang");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;

        let created_at = match created_at_idx.and_then(|i| record.get(i)) {
            Some(value) if !value.trim().is_empty() => parse_timestamp(value)?,
            _ => imported_at,
        };
        let lang = lang_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANG);

        rows.push(DatasetPost {
            created_at,
            text: record.get(text_idx).unwrap_or_default().to_string(),
            lang: lang.to_string(),
        });
    }

    Ok(rows)
}

// 常見的資料集時間格式，無法解析時回傳最後一個錯誤
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
    Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::core::tables::read_table;
    use tempfile::TempDir;

    #[test]
    fn test_parse_dataset_with_all_columns() {
        let csv = "created_at,text,lang\n2025-10-01 08:30:00+00:00,Whoosh keren,id\n2025-10-02T09:00:00Z,too expensive,en\n";
        let imported_at = Utc::now();

        let rows = parse_dataset(csv.as_bytes(), imported_at).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "Whoosh keren");
        assert_eq!(rows[0].created_at.to_rfc3339(), "2025-10-01T08:30:00+00:00");
        assert_eq!(rows[1].lang, "en");
    }

    #[test]
    fn test_parse_dataset_fills_defaults() {
        let csv = "username,text\nbudi,naik whoosh\n";
        let imported_at: DateTime<Utc> = "2025-10-17T00:00:00Z".parse().unwrap();

        let rows = parse_dataset(csv.as_bytes(), imported_at).unwrap();

        assert_eq!(rows[0].lang, "id");
        assert_eq!(rows[0].created_at, imported_at);
    }

    #[test]
    fn test_parse_dataset_requires_text_column() {
        let csv = "content,lang\nhalo,id\n";
        assert!(matches!(
            parse_dataset(csv.as_bytes(), Utc::now()),
            Err(EtlError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-10-01").is_ok());
        assert!(parse_timestamp("2025-10-01 08:30:00.123").is_ok());
        assert!(matches!(
            parse_timestamp("kemarin"),
            Err(EtlError::TimestampError(_))
        ));
    }

    #[tokio::test]
    async fn test_import_from_directory_appends_rows() {
        let dataset_dir = TempDir::new().unwrap();
        std::fs::write(dataset_dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::write(
            dataset_dir.path().join("whoosh.csv"),
            "text\nwhoosh cepat\nwhoosh mahal\n",
        )
        .unwrap();

        let output_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(output_dir.path().to_str().unwrap().to_string());

        let report = import_dataset(&storage, dataset_dir.path()).await.unwrap();
        assert_eq!(report.rows, 2);
        assert!(report.source.ends_with("whoosh.csv"));

        // 沒有主鍵，重複匯入會附加
        import_dataset(&storage, dataset_dir.path()).await.unwrap();
        let rows: Vec<DatasetPost> = read_table(&storage, TableName::Dataset).await.unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[tokio::test]
    async fn test_import_from_empty_directory_fails() {
        let dataset_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(output_dir.path().to_str().unwrap().to_string());

        let result = import_dataset(&storage, dataset_dir.path()).await;
        assert!(matches!(result, Err(EtlError::ValidationError { .. })));
    }
}
