//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

/// Backend health response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// A book spotted on a shelf photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
}

/// A detected book matched against the reader's preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    #[serde(rename = "matchScore")]
    pub match_score: i32,
    #[serde(rename = "matchReason")]
    pub match_reason: String,
}

/// Reading preferences sent along with a shelf photo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub genres: Vec<String>,
    pub authors: Vec<String>,
    /// Free-text description of what to avoid
    pub avoid: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeRequest<'a> {
    pub image: &'a str,
    pub preferences: &'a Preferences,
}

/// Result of analysing one shelf photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub detected_books: Vec<Book>,
    pub recommendations: Vec<Recommendation>,
    pub user_id: String,
    pub session_id: String,
}

/// Preferences extracted from a Goodreads library export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedPreferences {
    pub authors: Vec<String>,
    pub genres: Vec<String>,
    pub user_id: Option<String>,
    /// Any further fields the backend returns
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One past analysis session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_id: String,
    pub created_at: String,
    pub detected_books_count: usize,
    pub recommendations_count: usize,
    #[serde(default)]
    pub detected_books: Vec<Book>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Analysis history for this device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub user_id: String,
    pub history: Vec<HistoryEntry>,
    pub total_sessions: usize,
}

/// A recommendation the reader kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBook {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub match_score: Option<i32>,
    #[serde(default)]
    pub match_reason: Option<String>,
}

/// Body for saving a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavedBook {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

impl From<&Recommendation> for NewSavedBook {
    fn from(rec: &Recommendation) -> Self {
        Self {
            title: rec.title.clone(),
            author: rec.author.clone(),
            match_score: Some(rec.match_score),
            match_reason: Some(rec.match_reason.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SavedBooksResponse {
    #[serde(default)]
    pub books: Vec<SavedBook>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadStatusRequest {
    pub is_read: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotesRequest<'a> {
    pub notes: &'a str,
}
