//! Analysis history

use crate::error::CliResult;
use crate::output::{print_output, print_single, OutputFormat};
use serde::Serialize;
use shelfscan_client::{HistoryEntry, ShelfClient};
use tabled::Tabled;

#[derive(Serialize, Tabled)]
struct HistoryRow {
    #[tabled(rename = "Session")]
    session_id: String,
    #[tabled(rename = "Created")]
    created_at: String,
    #[tabled(rename = "Books")]
    books: usize,
    #[tabled(rename = "Recommendations")]
    recommendations: usize,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            session_id: entry.session_id.clone(),
            created_at: entry.created_at.clone(),
            books: entry.detected_books_count,
            recommendations: entry.recommendations_count,
        }
    }
}

/// Execute `history`
pub async fn execute(client: &ShelfClient, format: OutputFormat) -> CliResult<()> {
    let history = client.history().await?;
    match format {
        OutputFormat::Table => {
            println!("{} sessions", history.total_sessions);
            print_output(history.history.iter().map(HistoryRow::from).collect(), format)
        }
        _ => print_single(&history, format),
    }
}
