//! HTTP client for the shelfscan backend

use std::sync::Arc;

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shelfscan_identity::{parse_cookie_header, DeviceIdentity, SessionGate};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::*;
use crate::upload::{GoodreadsExport, ImageUpload};

/// Header carrying the device identity on every bound request
pub const DEVICE_ID_HEADER: &str = "X-Device-ID";

/// HTTP client bound to one device identity gate
pub struct ShelfClient {
    client: Client,
    base_url: String,
    gate: Arc<SessionGate>,
    config: ClientConfig,
}

impl ShelfClient {
    /// Create a new client
    pub fn new(config: ClientConfig, gate: Arc<SessionGate>) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            gate,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gate(&self) -> &Arc<SessionGate> {
        &self.gate
    }

    /// Check backend health. Does not need the device identity.
    pub async fn health_check(&self) -> ClientResult<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response("/health", None, response).await
    }

    // ========== Analysis API ==========

    /// Analyze a shelf photo against the reader's preferences
    pub async fn analyze_bookshelf(
        &self,
        image: &ImageUpload,
        preferences: &Preferences,
    ) -> ClientResult<AnalysisResult> {
        let encoded = image.to_base64();
        let body = AnalyzeRequest {
            image: &encoded,
            preferences,
        };
        self.send_json(Method::POST, "/analyze", &body).await
    }

    /// Upload a Goodreads export and get extracted preferences back
    pub async fn process_goodreads(
        &self,
        export: GoodreadsExport,
    ) -> ClientResult<ExtractedPreferences> {
        let (file_name, bytes) = export.into_parts();
        let part = Part::bytes(bytes).file_name(file_name).mime_str("text/csv")?;
        let form = Form::new().part("goodreads_csv", part);

        let (request, identity) = self.bound(Method::POST, "/process-goodreads").await?;
        let response = request.multipart(form).send().await?;
        self.handle_response("/process-goodreads", Some(&identity), response)
            .await
    }

    /// Get this device's analysis history
    pub async fn history(&self) -> ClientResult<History> {
        self.send(Method::GET, "/history").await
    }

    // ========== Saved books API ==========

    /// List saved books
    pub async fn list_saved_books(&self) -> ClientResult<Vec<SavedBook>> {
        let response: SavedBooksResponse = self.send(Method::GET, "/saved-books").await?;
        Ok(response.books)
    }

    /// Save a book to the reading list
    pub async fn save_book(&self, book: &NewSavedBook) -> ClientResult<SavedBook> {
        self.send_json(Method::POST, "/saved-books", book).await
    }

    /// Remove a saved book, identified by title and author
    pub async fn remove_saved_book(
        &self,
        title: &str,
        author: &str,
    ) -> ClientResult<serde_json::Value> {
        let (request, identity) = self.bound(Method::DELETE, "/saved-books").await?;
        let response = request
            .query(&[("title", title), ("author", author)])
            .send()
            .await?;
        self.handle_response("/saved-books", Some(&identity), response)
            .await
    }

    /// Mark a saved book as read or unread
    pub async fn set_read(&self, book_id: i64, is_read: bool) -> ClientResult<serde_json::Value> {
        self.send_json(
            Method::PUT,
            &format!("/saved-books/{}/read", book_id),
            &ReadStatusRequest { is_read },
        )
        .await
    }

    /// Replace the notes on a saved book
    pub async fn update_notes(&self, book_id: i64, notes: &str) -> ClientResult<serde_json::Value> {
        self.send_json(
            Method::PUT,
            &format!("/saved-books/{}/notes", book_id),
            &NotesRequest { notes },
        )
        .await
    }

    // ========== Internal HTTP helpers ==========

    /// Identity to bind, honouring the configured readiness policy.
    async fn identity(&self) -> ClientResult<DeviceIdentity> {
        let identity = match self.config.ready_wait() {
            None => self.gate.require_ready()?,
            Some(limit) => self.gate.wait_ready(Some(limit)).await?,
        };
        Ok(identity)
    }

    /// Request builder carrying the identity header and cookie.
    async fn bound(
        &self,
        method: Method,
        path: &str,
    ) -> ClientResult<(RequestBuilder, DeviceIdentity)> {
        let identity = self.identity().await?;
        let cookie_name = &self.gate.manager().config().cookie_name;
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, path, device_id = %identity.short(), "API request");

        let request = self
            .client
            .request(method, &url)
            .header(DEVICE_ID_HEADER, identity.as_str())
            .header(COOKIE, format!("{}={}", cookie_name, identity));
        Ok((request, identity))
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str) -> ClientResult<T> {
        let (request, identity) = self.bound(method, path).await?;
        let response = request.send().await?;
        self.handle_response(path, Some(&identity), response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let (request, identity) = self.bound(method, path).await?;
        let response = request.json(body).send().await?;
        self.handle_response(path, Some(&identity), response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        sent: Option<&DeviceIdentity>,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if let Some(sent) = sent {
            self.check_issued_cookie(sent, &response);
        }

        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), "API error response");
            return Err(ClientError::Status {
                status: status.as_u16(),
                status_text,
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    /// The backend may re-issue the identity cookie. Only the identity manager
    /// writes the identity, so a differing value is logged and ignored.
    fn check_issued_cookie(&self, sent: &DeviceIdentity, response: &reqwest::Response) {
        let cookie_name = &self.gate.manager().config().cookie_name;
        for header in response.headers().get_all(SET_COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            let first = header.split(';').next().unwrap_or_default();
            if let Some(issued) = parse_cookie_header(first, cookie_name) {
                if issued != sent.as_str() {
                    warn!(
                        sent = %sent.short(),
                        issued = %DeviceIdentity::new(issued).short(),
                        "Backend issued a different device identity cookie; keeping local identity"
                    );
                }
            }
        }
    }
}
