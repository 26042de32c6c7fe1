#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use noctober::model::{Batch, Highlight};
use noctober::notado::{NotadoClient, user_agent};
use serde_json::Value;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct FakeNotado {
    statuses: Arc<Mutex<Vec<StatusCode>>>,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// Handle on a local stand-in for the Notado GraphQL endpoint.
pub struct NotadoServer {
    pub endpoint: String,
    pub slow_endpoint: String,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl NotadoServer {
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }

    pub fn client(&self) -> NotadoClient {
        client_for(&self.endpoint)
    }
}

pub fn client_for(endpoint: &str) -> NotadoClient {
    NotadoClient::new(
        endpoint,
        &user_agent("test"),
        Duration::from_secs(10),
        tracing::Span::none(),
    )
    .unwrap()
}

/// Starts a fake Notado that answers with `statuses` in order, repeating the last one.
pub async fn spawn_notado(statuses: Vec<StatusCode>) -> NotadoServer {
    let state = FakeNotado {
        statuses: Arc::new(Mutex::new(statuses)),
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let received = state.received.clone();

    let app = Router::new()
        .route("/graphql", post(import_notes))
        .route("/slow", post(stall))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    NotadoServer {
        endpoint: format!("http://{}/graphql", address),
        slow_endpoint: format!("http://{}/slow", address),
        received,
    }
}

async fn import_notes(
    State(state): State<FakeNotado>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state
        .received
        .lock()
        .unwrap()
        .push(ReceivedRequest { headers, body });

    let status = {
        let mut statuses = state.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.remove(0)
        } else {
            statuses.first().copied().unwrap_or(StatusCode::OK)
        }
    };

    if status == StatusCode::OK {
        (status, r#"{"data":{"importNotes":true}}"#.to_string())
    } else {
        (status, r#"{"errors":[{"message":"invalid token"}]}"#.to_string())
    }
}

async fn stall() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(30)).await;
    StatusCode::OK
}

pub fn highlight(content: &str) -> Highlight {
    Highlight {
        content: content.to_string(),
        url: "file:///mnt/onboard/Good Book - An Author.epub".to_string(),
        title: "Good Book - An Author - ".to_string(),
        created: "2006-01-02T15:04:05+00:00".to_string(),
        tags: vec![],
        author: String::new(),
    }
}

pub fn batch(contents: &[&str]) -> Batch {
    Batch {
        highlights: contents.iter().map(|c| highlight(c)).collect(),
    }
}

pub const SIDELOADED_BOOK: &str = "file:///mnt/onboard/Books/Meditations.epub";
pub const UNTITLED_BOOK: &str = "file:///mnt/onboard/Books/Good%20Book%20-%20An%20Author.epub";
pub const STORE_BOOK: &str = "0b1c9c3a-6f6f-4f1e-9d5e-3e8e2b6a1f00";

const SCHEMA: &str = r#"
CREATE TABLE content (
    ContentID TEXT NOT NULL PRIMARY KEY,
    ContentType INTEGER,
    VolumeIndex INTEGER,
    Title TEXT,
    Attribution TEXT,
    ___PercentRead INTEGER
);
CREATE TABLE Bookmark (
    BookmarkID TEXT NOT NULL PRIMARY KEY,
    VolumeID TEXT NOT NULL,
    Text TEXT,
    Annotation TEXT,
    DateCreated TEXT,
    DateModified TEXT,
    ChapterProgress REAL
);
"#;

/// Writes a small device database and returns its directory and path.
pub async fn device_database(rows: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("KoboReader.sqlite");
    write_database(&path, rows).await;
    (dir, path)
}

async fn write_database(path: &Path, rows: &str) {
    let db = libsql::Builder::new_local(path).build().await.unwrap();
    let conn = db.connect().unwrap();
    conn.execute_batch(SCHEMA).await.unwrap();
    conn.execute_batch(rows).await.unwrap();
}

/// Two sideloaded books (one without a title), one store-bought book, one chapter row.
pub fn library_rows() -> String {
    format!(
        r#"
INSERT INTO content VALUES ('{sideloaded}', 6, -1, 'Meditations', 'Marcus Aurelius', 80);
INSERT INTO content VALUES ('{untitled}', 6, -1, NULL, NULL, 10);
INSERT INTO content VALUES ('{store}', 6, -1, 'Dune', 'Frank Herbert', 50);
INSERT INTO content VALUES ('{sideloaded}#chapter1', 9, 0, 'Book One', NULL, 0);

INSERT INTO Bookmark VALUES ('b1', '{sideloaded}', 'The impediment to action
advances action.', '.stoicism worth rereading', '2021-03-04T05:06:07.000', NULL, 0.2);
INSERT INTO Bookmark VALUES ('b2', '{sideloaded}', 'What stands in the way becomes the way.', NULL, NULL, '2021-03-05T00:00:00Z', 0.1);
INSERT INTO Bookmark VALUES ('b3', '{untitled}', 'Hello World', NULL, '2006-01-02T15:04:05.000', NULL, 0.5);
INSERT INTO Bookmark VALUES ('b4', '{store}', 'Fear is the mind-killer.', NULL, '2020-01-01T00:00:00.000', NULL, 0.3);
INSERT INTO Bookmark VALUES ('b5', '{sideloaded}', NULL, NULL, NULL, NULL, 0.9);
"#,
        sideloaded = SIDELOADED_BOOK,
        untitled = UNTITLED_BOOK,
        store = STORE_BOOK,
    )
}
