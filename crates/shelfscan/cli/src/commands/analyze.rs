//! Shelf analysis and preference import

use std::path::PathBuf;

use crate::error::CliResult;
use crate::output::{print_info, print_output, print_single, print_success, OutputFormat};
use clap::Args;
use serde::Serialize;
use shelfscan_client::{
    AnalysisResult, GoodreadsExport, ImageUpload, Preferences, Recommendation, ShelfClient,
};
use tabled::Tabled;

/// Arguments for `analyze`
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Shelf photo (JPEG, PNG or WebP, up to 10MB)
    pub image: PathBuf,

    /// Favourite genre (repeatable)
    #[arg(short, long = "genre")]
    pub genres: Vec<String>,

    /// Favourite author (repeatable)
    #[arg(short, long = "author")]
    pub authors: Vec<String>,

    /// Things to avoid, free text
    #[arg(long, default_value = "")]
    pub avoid: String,
}

impl AnalyzeArgs {
    fn preferences(&self) -> Preferences {
        Preferences {
            genres: self.genres.clone(),
            authors: self
                .authors
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            avoid: self.avoid.clone(),
        }
    }
}

#[derive(Serialize, Tabled)]
pub(crate) struct BookRow {
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Author")]
    pub author: String,
}

#[derive(Serialize, Tabled)]
pub(crate) struct RecommendationRow {
    #[tabled(rename = "Score")]
    pub score: i32,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Author")]
    pub author: String,
    #[tabled(rename = "Why")]
    pub reason: String,
}

impl From<&Recommendation> for RecommendationRow {
    fn from(rec: &Recommendation) -> Self {
        Self {
            score: rec.match_score,
            title: rec.title.clone(),
            author: rec.author.clone(),
            reason: rec.match_reason.clone(),
        }
    }
}

/// Execute `analyze`
pub async fn execute(args: AnalyzeArgs, client: &ShelfClient, format: OutputFormat) -> CliResult<()> {
    let image = ImageUpload::from_path(&args.image)?;
    print_info(&format!(
        "Uploading {} ({} bytes)",
        image.file_name(),
        image.len()
    ));

    let result = client
        .analyze_bookshelf(&image, &args.preferences())
        .await?;
    render(&result, format)
}

fn render(result: &AnalysisResult, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            print_success(&format!(
                "Detected {} books, {} recommendations (session {})",
                result.detected_books.len(),
                result.recommendations.len(),
                result.session_id
            ));
            println!("\nDetected books:");
            print_output(
                result
                    .detected_books
                    .iter()
                    .map(|b| BookRow {
                        title: b.title.clone(),
                        author: b.author.clone(),
                    })
                    .collect(),
                format,
            )?;
            println!("\nRecommendations:");
            print_output(
                result
                    .recommendations
                    .iter()
                    .map(RecommendationRow::from)
                    .collect(),
                format,
            )
        }
        _ => print_single(result, format),
    }
}

/// Execute `import-goodreads`
pub async fn import_goodreads(
    path: PathBuf,
    client: &ShelfClient,
    format: OutputFormat,
) -> CliResult<()> {
    let export = GoodreadsExport::from_path(&path)?;
    let preferences = client.process_goodreads(export).await?;

    match format {
        OutputFormat::Table => {
            print_success("Goodreads preferences imported");
            println!("Authors: {}", preferences.authors.join(", "));
            println!("Genres:  {}", preferences.genres.join(", "));
            Ok(())
        }
        _ => print_single(&preferences, format),
    }
}
