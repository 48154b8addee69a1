use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shelfscan_client::{
    ClientConfig, ClientError, GoodreadsExport, ImageUpload, NewSavedBook, Preferences,
    ShelfClient,
};
use shelfscan_identity::{
    DeviceIdentityManager, DurableStore, GateError, IdentityConfig, MemoryCookieJar,
    MemoryDurableStore, SessionGate,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEVICE: &str = "11111111-1111-4111-8111-111111111111";

fn ready_gate() -> Arc<SessionGate> {
    let durable = Arc::new(MemoryDurableStore::new());
    durable.set("bookscanner_device_id", DEVICE).unwrap();
    let manager = DeviceIdentityManager::with_backings(
        durable,
        Arc::new(MemoryCookieJar::new()),
        IdentityConfig::default(),
    );
    let gate = Arc::new(SessionGate::new(manager));
    gate.initialize();
    gate
}

fn client(server: &MockServer, gate: Arc<SessionGate>) -> ShelfClient {
    ShelfClient::new(ClientConfig::new(server.uri()), gate).expect("client should build")
}

#[tokio::test]
async fn history_carries_identity_header_and_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .and(header("X-Device-ID", DEVICE))
        .and(header("Cookie", format!("deviceId={DEVICE}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "user-1",
            "history": [{
                "session_id": "s1",
                "created_at": "2024-05-01T10:00:00",
                "detected_books_count": 1,
                "recommendations_count": 0,
                "detected_books": [{"title": "Dune", "author": "Frank Herbert"}],
                "recommendations": []
            }],
            "total_sessions": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let history = client(&server, ready_gate()).history().await.unwrap();
    assert_eq!(history.total_sessions, 1);
    assert_eq!(history.history[0].detected_books[0].title, "Dune");
}

#[tokio::test]
async fn analyze_posts_image_and_preferences() {
    let server = MockServer::start().await;
    let preferences = Preferences {
        genres: vec!["Fantasy".into()],
        authors: vec!["Ursula K. Le Guin".into()],
        avoid: "horror".into(),
    };
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(header("X-Device-ID", DEVICE))
        .and(body_json(json!({
            "image": "aGVsbG8=",
            "preferences": {
                "genres": ["Fantasy"],
                "authors": ["Ursula K. Le Guin"],
                "avoid": "horror"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "detected_books": [{"title": "Earthsea", "author": "Ursula K. Le Guin"}],
            "recommendations": [{
                "title": "Earthsea",
                "author": "Ursula K. Le Guin",
                "matchScore": 95,
                "matchReason": "Favourite author"
            }],
            "user_id": "user-1",
            "session_id": "session-9"
        })))
        .mount(&server)
        .await;

    let image = ImageUpload::from_bytes("shelf.jpg", b"hello".to_vec()).unwrap();
    let result = client(&server, ready_gate())
        .analyze_bookshelf(&image, &preferences)
        .await
        .unwrap();
    assert_eq!(result.session_id, "session-9");
    assert_eq!(result.recommendations[0].match_score, 95);
}

#[tokio::test]
async fn goodreads_upload_is_multipart_with_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process-goodreads"))
        .and(header("X-Device-ID", DEVICE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authors": ["Susanna Clarke"],
            "genres": ["Fantasy"],
            "user_id": "user-1"
        })))
        .mount(&server)
        .await;

    let export =
        GoodreadsExport::from_bytes("export.csv", b"Title,Author\nPiranesi,Susanna Clarke\n".to_vec())
            .unwrap();
    let prefs = client(&server, ready_gate())
        .process_goodreads(export)
        .await
        .unwrap();
    assert_eq!(prefs.authors, vec!["Susanna Clarke"]);

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"goodreads_csv\""));
    assert!(body.contains("Piranesi,Susanna Clarke"));
}

#[tokio::test]
async fn saved_book_operations_hit_expected_routes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/saved-books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "books": [{"id": 7, "title": "Dune", "author": "Frank Herbert", "is_read": false}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/saved-books"))
        .and(body_json(json!({"title": "Dune", "author": "Frank Herbert"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7, "title": "Dune", "author": "Frank Herbert"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/saved-books"))
        .and(query_param("title", "Dune"))
        .and(query_param("author", "Frank Herbert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/saved-books/7/read"))
        .and(body_json(json!({"is_read": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/saved-books/7/notes"))
        .and(body_json(json!({"notes": "Reread part two"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, ready_gate());
    let books = client.list_saved_books().await.unwrap();
    assert_eq!(books[0].id, 7);

    let saved = client
        .save_book(&NewSavedBook {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            match_score: None,
            match_reason: None,
        })
        .await
        .unwrap();
    assert_eq!(saved.id, 7);

    client.remove_saved_book("Dune", "Frank Herbert").await.unwrap();
    client.set_read(7, true).await.unwrap();
    client.update_notes(7, "Reread part two").await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "database offline"})),
        )
        .mount(&server)
        .await;

    let err = client(&server, ready_gate()).history().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    assert_eq!(err.backend_message().as_deref(), Some("database offline"));
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server, ready_gate()).history().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { ref endpoint, .. } if endpoint == "/history"));
}

#[tokio::test]
async fn not_ready_gate_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let manager = DeviceIdentityManager::with_backings(
        Arc::new(MemoryDurableStore::new()),
        Arc::new(MemoryCookieJar::new()),
        IdentityConfig::default(),
    );
    let gate = Arc::new(SessionGate::new(manager));
    let err = client(&server, gate).list_saved_books().await.unwrap_err();
    assert!(matches!(err, ClientError::NotReady(GateError::NotReady(_))));
}

#[tokio::test]
async fn waiting_client_sends_once_gate_is_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/saved-books"))
        .and(header("X-Device-ID", DEVICE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"books": []})))
        .expect(1)
        .mount(&server)
        .await;

    let durable = Arc::new(MemoryDurableStore::new());
    durable.set("bookscanner_device_id", DEVICE).unwrap();
    let manager = DeviceIdentityManager::with_backings(
        durable,
        Arc::new(MemoryCookieJar::new()),
        IdentityConfig::default(),
    );
    let gate = Arc::new(SessionGate::new(manager));
    let config = ClientConfig {
        ready_wait_ms: Some(5_000),
        ..ClientConfig::new(server.uri())
    };
    let client = ShelfClient::new(config, gate.clone()).unwrap();

    let pending = tokio::spawn(async move { client.list_saved_books().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.initialize();

    let books = pending.await.unwrap().unwrap();
    assert!(books.is_empty());
}

#[tokio::test]
async fn health_does_not_need_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "Server is running!"})),
        )
        .mount(&server)
        .await;

    let manager = DeviceIdentityManager::with_backings(
        Arc::new(MemoryDurableStore::new()),
        Arc::new(MemoryCookieJar::new()),
        IdentityConfig::default(),
    );
    let gate = Arc::new(SessionGate::new(manager));
    let status = client(&server, gate).health_check().await.unwrap();
    assert_eq!(status.status, "Server is running!");
}

#[tokio::test]
async fn issued_cookie_does_not_override_local_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/saved-books"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "set-cookie",
                    "deviceId=99999999-9999-4999-8999-999999999999; Max-Age=31536000; Path=/",
                )
                .set_body_json(json!({"books": []})),
        )
        .mount(&server)
        .await;

    let gate = ready_gate();
    client(&server, gate.clone())
        .list_saved_books()
        .await
        .unwrap();
    assert_eq!(gate.identity().unwrap().as_str(), DEVICE);
    assert_eq!(gate.manager().current().unwrap().as_str(), DEVICE);
}
