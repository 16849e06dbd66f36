use crate::core::tables::{read_table, TableName, TableRow};
use crate::core::Storage;
use crate::domain::model::{AnalyzedPost, CleanPost, DatasetPost, RawPost, SentimentSummary};
use crate::utils::error::Result;

pub const VIEW_LIMIT: usize = 500;

/// Newest rows of a table plus the table's total size.
#[derive(Debug, Clone)]
pub struct TableView<T> {
    pub total_rows: usize,
    pub rows: Vec<T>,
}

impl<T: TableRow> TableView<T> {
    pub fn from_rows(mut rows: Vec<T>, limit: usize) -> Self {
        let total_rows = rows.len();
        rows.sort_by_key(|row| std::cmp::Reverse(row.created_at()));
        rows.truncate(limit);
        Self { total_rows, rows }
    }
}

pub async fn view_table<T: TableRow, S: Storage>(
    storage: &S,
    table: TableName,
) -> Result<TableView<T>> {
    let rows: Vec<T> = read_table(storage, table).await?;
    Ok(TableView::from_rows(rows, VIEW_LIMIT))
}

/// Renders a table for the terminal; the analysis table also gets its
/// sentiment distribution.
pub async fn render_table<S: Storage>(storage: &S, table: TableName) -> Result<String> {
    let mut out = format!("{}\n", table);

    match table {
        TableName::Raw => {
            let view: TableView<RawPost> = view_table(storage, table).await?;
            push_header(&mut out, view.total_rows);
            for row in &view.rows {
                out.push_str(&format!(
                    "{}  {}  [{}]  {}\n",
                    row.created_at.format("%Y-%m-%d %H:%M"),
                    row.tweet_id,
                    row.lang,
                    one_line(&row.text)
                ));
            }
        }
        TableName::Clean => {
            let view: TableView<CleanPost> = view_table(storage, table).await?;
            push_header(&mut out, view.total_rows);
            for row in &view.rows {
                out.push_str(&format!(
                    "{}  {}  [{}]  {}\n",
                    row.created_at.format("%Y-%m-%d %H:%M"),
                    row.tweet_id,
                    row.lang,
                    row.text_clean
                ));
            }
        }
        TableName::Analysis => {
            let view: TableView<AnalyzedPost> = view_table(storage, table).await?;
            push_header(&mut out, view.total_rows);
            for row in &view.rows {
                out.push_str(&format!(
                    "{}  {}  {:<8} {:>6.2}  {}\n",
                    row.created_at.format("%Y-%m-%d %H:%M"),
                    row.tweet_id,
                    row.sentiment,
                    row.score,
                    row.text_clean
                ));
            }
            if !view.rows.is_empty() {
                out.push_str(&render_distribution(&SentimentSummary::from_posts(&view.rows)));
            }
        }
        TableName::Dataset => {
            let view: TableView<DatasetPost> = view_table(storage, table).await?;
            push_header(&mut out, view.total_rows);
            for row in &view.rows {
                out.push_str(&format!(
                    "{}  [{}]  {}\n",
                    row.created_at.format("%Y-%m-%d %H:%M"),
                    row.lang,
                    one_line(&row.text)
                ));
            }
        }
    }

    Ok(out)
}

pub fn render_distribution(summary: &SentimentSummary) -> String {
    let total = summary.total().max(1);
    let mut out = String::from("\nSentiment distribution\n");
    for (label, count) in [
        ("positive", summary.positive),
        ("negative", summary.negative),
        ("neutral", summary.neutral),
    ] {
        let bar = "#".repeat(count * 40 / total);
        out.push_str(&format!("{:<8} {:>6}  {}\n", label, count, bar));
    }
    out
}

fn push_header(out: &mut String, total_rows: usize) {
    out.push_str(&format!("Total rows: {}\n", total_rows));
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
