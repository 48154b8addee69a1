//! Saved books commands

use crate::error::CliResult;
use crate::output::{print_output, print_single, print_success, OutputFormat};
use clap::Subcommand;
use serde::Serialize;
use shelfscan_client::{NewSavedBook, SavedBook, ShelfClient};
use tabled::Tabled;

/// Saved books subcommands
#[derive(Subcommand)]
pub enum SavedCommands {
    /// List saved books
    List,

    /// Save a book
    Add {
        title: String,
        author: String,
        /// Match score from a recommendation
        #[arg(long)]
        score: Option<i32>,
        /// Match reason from a recommendation
        #[arg(long)]
        reason: Option<String>,
    },

    /// Remove a saved book
    Remove { title: String, author: String },

    /// Mark a saved book as read
    Read {
        id: i64,
        /// Mark as unread instead
        #[arg(long)]
        unread: bool,
    },

    /// Replace the notes on a saved book
    Notes { id: i64, notes: String },
}

#[derive(Serialize, Tabled)]
struct SavedRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Read")]
    read: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<SavedBook> for SavedRow {
    fn from(book: SavedBook) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            read: if book.is_read { "yes" } else { "no" }.to_string(),
            notes: book.additional_notes.unwrap_or_default(),
        }
    }
}

/// Execute a saved-books command
pub async fn execute(
    command: SavedCommands,
    client: &ShelfClient,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        SavedCommands::List => {
            let books = client.list_saved_books().await?;
            match format {
                OutputFormat::Table => {
                    print_output(books.into_iter().map(SavedRow::from).collect(), format)
                }
                _ => print_single(&books, format),
            }
        }

        SavedCommands::Add {
            title,
            author,
            score,
            reason,
        } => {
            let book = client
                .save_book(&NewSavedBook {
                    title,
                    author,
                    match_score: score,
                    match_reason: reason,
                })
                .await?;
            print_success(&format!("Saved \"{}\" by {} (id {})", book.title, book.author, book.id));
            Ok(())
        }

        SavedCommands::Remove { title, author } => {
            client.remove_saved_book(&title, &author).await?;
            print_success(&format!("Removed \"{}\" by {}", title, author));
            Ok(())
        }

        SavedCommands::Read { id, unread } => {
            client.set_read(id, !unread).await?;
            let status = if unread { "unread" } else { "read" };
            print_success(&format!("Marked book {} as {}", id, status));
            Ok(())
        }

        SavedCommands::Notes { id, notes } => {
            client.update_notes(id, &notes).await?;
            print_success(&format!("Updated notes for book {}", id));
            Ok(())
        }
    }
}
