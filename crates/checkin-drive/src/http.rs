//! [`HttpDriveApi`] — Google Drive v3 over REST.

use std::time::Duration;

use checkin_core::store::Artifact;
use reqwest::{Client, Response, header};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  api::{DriveApi, DriveFile, FOLDER_MIME},
  auth::TokenProvider,
};

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

const FILE_FIELDS: &str = "id,name,webViewLink";

/// Drive v3 client.
///
/// Every request is bounded by the timeout given to [`HttpDriveApi::new`].
pub struct HttpDriveApi {
  client:   Client,
  base_url: String,
  tokens:   TokenProvider,
}

#[derive(Deserialize)]
struct FileList {
  #[serde(default)]
  files: Vec<DriveFile>,
}

impl HttpDriveApi {
  pub fn new(base_url: impl Into<String>, tokens: TokenProvider, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.into(), tokens })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn bearer(&self) -> Result<String> { self.tokens.token(&self.client).await }

  /// `GET /drive/v3/files?q=…` — oldest match first.
  async fn search(&self, query: String) -> Result<Option<DriveFile>> {
    let token = self.bearer().await?;
    let resp = self
      .client
      .get(self.url("/drive/v3/files"))
      .bearer_auth(token)
      .query(&[
        ("q", query.as_str()),
        ("fields", "files(id,name,webViewLink)"),
        ("orderBy", "createdTime"),
        ("pageSize", "10"),
        ("spaces", "drive"),
      ])
      .send()
      .await?;

    let list: FileList = check_status(resp, "files.list").await?.json().await?;
    if list.files.len() > 1 {
      tracing::warn!(count = list.files.len(), query = %query, "several matches; using the oldest");
    }
    Ok(list.files.into_iter().next())
  }
}

impl DriveApi for HttpDriveApi {
  async fn find_folder<'a>(&'a self, name: &'a str, parent: &'a str) -> Result<Option<DriveFile>> {
    self.search(search_query(name, parent, true)).await
  }

  async fn find_file<'a>(&'a self, name: &'a str, parent: &'a str) -> Result<Option<DriveFile>> {
    self.search(search_query(name, parent, false)).await
  }

  async fn create_folder<'a>(&'a self, name: &'a str, parent: &'a str) -> Result<DriveFile> {
    let token = self.bearer().await?;
    let resp = self
      .client
      .post(self.url("/drive/v3/files"))
      .bearer_auth(token)
      .query(&[("fields", FILE_FIELDS)])
      .json(&json!({ "name": name, "mimeType": FOLDER_MIME, "parents": [parent] }))
      .send()
      .await?;
    Ok(check_status(resp, "files.create (folder)").await?.json().await?)
  }

  async fn create_file<'a>(
    &'a self,
    name: &'a str,
    parent: &'a str,
    content: &'a Artifact,
  ) -> Result<DriveFile> {
    let token = self.bearer().await?;
    let boundary = format!("checkin-{}", Uuid::new_v4().simple());
    let metadata = json!({ "name": name, "parents": [parent] });
    let body = multipart_related(&boundary, &metadata, content);

    let resp = self
      .client
      .post(self.url("/upload/drive/v3/files"))
      .bearer_auth(token)
      .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
      .header(header::CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
      .body(body)
      .send()
      .await?;
    Ok(check_status(resp, "files.create").await?.json().await?)
  }

  async fn update_file<'a>(&'a self, id: &'a str, content: &'a Artifact) -> Result<DriveFile> {
    let token = self.bearer().await?;
    let resp = self
      .client
      .patch(self.url(&format!("/upload/drive/v3/files/{id}")))
      .bearer_auth(token)
      .query(&[("uploadType", "media"), ("fields", FILE_FIELDS)])
      .header(header::CONTENT_TYPE, content.content_type)
      .body(content.bytes.clone())
      .send()
      .await?;
    Ok(check_status(resp, "files.update").await?.json().await?)
  }

  async fn grant_public_read<'a>(&'a self, id: &'a str) -> Result<()> {
    let token = self.bearer().await?;
    let resp = self
      .client
      .post(self.url(&format!("/drive/v3/files/{id}/permissions")))
      .bearer_auth(token)
      .json(&json!({ "role": "reader", "type": "anyone" }))
      .send()
      .await?;
    check_status(resp, "permissions.create").await?;
    Ok(())
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Turn a non-2xx response into [`Error::Status`], keeping the body for logs.
pub(crate) async fn check_status(resp: Response, operation: &'static str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { operation, status: status.as_u16(), body })
}

fn search_query(name: &str, parent: &str, folder: bool) -> String {
  let op = if folder { "=" } else { "!=" };
  format!(
    "name = '{}' and '{}' in parents and mimeType {op} '{FOLDER_MIME}' and trashed = false",
    escape_literal(name),
    escape_literal(parent),
  )
}

/// Escape a value for a single-quoted Drive query literal.
fn escape_literal(value: &str) -> String { value.replace('\\', "\\\\").replace('\'', "\\'") }

/// A `multipart/related` body: JSON metadata part, then the media part.
fn multipart_related(boundary: &str, metadata: &serde_json::Value, content: &Artifact) -> Vec<u8> {
  let head = format!(
    "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
     --{boundary}\r\nContent-Type: {}\r\n\r\n",
    content.content_type
  );
  let tail = format!("\r\n--{boundary}--\r\n");

  let mut body = Vec::with_capacity(head.len() + content.bytes.len() + tail.len());
  body.extend_from_slice(head.as_bytes());
  body.extend_from_slice(&content.bytes);
  body.extend_from_slice(tail.as_bytes());
  body
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
  };

  use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
  };
  use tokio::net::TcpListener;

  use super::*;

  /// One request as seen by the stand-in Drive server.
  #[derive(Debug, Clone)]
  struct Seen {
    method:       Method,
    path:         String,
    query:        HashMap<String, String>,
    auth:         String,
    content_type: String,
    body:         Vec<u8>,
  }

  #[derive(Clone, Default)]
  struct Fake {
    seen:      Arc<Mutex<Vec<Seen>>>,
    /// `(method, path)` → `(status, json body)`.
    responses: Arc<HashMap<(Method, String), (StatusCode, String)>>,
  }

  async fn capture(
    State(fake): State<Fake>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
  ) -> impl IntoResponse {
    let header = |name: &str| {
      headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_owned()
    };
    fake.seen.lock().unwrap().push(Seen {
      method:       method.clone(),
      path:         uri.path().to_owned(),
      query,
      auth:         header("authorization"),
      content_type: header("content-type"),
      body:         body.to_vec(),
    });
    let (status, json) = fake
      .responses
      .get(&(method, uri.path().to_owned()))
      .cloned()
      .unwrap_or((StatusCode::NOT_FOUND, r#"{"error":"unexpected"}"#.to_owned()));
    (status, [("content-type", "application/json")], json)
  }

  async fn serve(responses: Vec<((Method, &str), (StatusCode, &str))>) -> (Fake, HttpDriveApi) {
    let fake = Fake {
      seen:      Arc::default(),
      responses: Arc::new(
        responses
          .into_iter()
          .map(|((m, p), (s, b))| ((m, p.to_owned()), (s, b.to_owned())))
          .collect(),
      ),
    };
    let app = Router::new().fallback(capture).with_state(fake.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let api = HttpDriveApi::new(
      format!("http://{addr}"),
      TokenProvider::bearer("test-token"),
      Duration::from_secs(5),
    )
    .unwrap();
    (fake, api)
  }

  fn artifact(body: &'static [u8]) -> Artifact {
    Artifact {
      bytes:        bytes::Bytes::from_static(body),
      content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
      file_name:    "check-ins.xlsx".into(),
    }
  }

  #[tokio::test]
  async fn find_file_queries_by_name_and_parent() {
    let (fake, api) = serve(vec![(
      (Method::GET, "/drive/v3/files"),
      (
        StatusCode::OK,
        r#"{"files":[{"id":"f1","name":"check-ins.xlsx","webViewLink":"https://drive/f1"}]}"#,
      ),
    )])
    .await;

    let found = api.find_file("check-ins.xlsx", "root-1").await.unwrap().unwrap();

    assert_eq!(found.id, "f1");
    assert_eq!(found.web_view_link.as_deref(), Some("https://drive/f1"));
    let seen = fake.seen.lock().unwrap()[0].clone();
    assert_eq!(seen.auth, "Bearer test-token");
    assert_eq!(
      seen.query["q"],
      "name = 'check-ins.xlsx' and 'root-1' in parents \
       and mimeType != 'application/vnd.google-apps.folder' and trashed = false"
    );
    assert_eq!(seen.query["orderBy"], "createdTime");
  }

  #[tokio::test]
  async fn empty_search_is_none() {
    let (_fake, api) =
      serve(vec![((Method::GET, "/drive/v3/files"), (StatusCode::OK, r#"{"files":[]}"#))]).await;
    assert!(api.find_folder("Check-ins", "root-1").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn create_file_sends_metadata_and_media_parts() {
    let (fake, api) = serve(vec![(
      (Method::POST, "/upload/drive/v3/files"),
      (StatusCode::OK, r#"{"id":"new-1","name":"check-ins.xlsx"}"#),
    )])
    .await;

    let created = api
      .create_file("check-ins.xlsx", "folder-9", &artifact(b"PK-workbook"))
      .await
      .unwrap();

    assert_eq!(created.id, "new-1");
    assert_eq!(created.web_view_link, None);
    let seen = fake.seen.lock().unwrap()[0].clone();
    assert_eq!(seen.query["uploadType"], "multipart");
    assert!(seen.content_type.starts_with("multipart/related; boundary="));
    let body = String::from_utf8(seen.body).unwrap();
    assert!(body.contains(r#""parents":["folder-9"]"#), "{body}");
    assert!(body.contains("PK-workbook"));
    assert!(body.trim_end().ends_with("--"));
  }

  #[tokio::test]
  async fn update_file_patches_media_with_content_type() {
    let (fake, api) = serve(vec![(
      (Method::PATCH, "/upload/drive/v3/files/f1"),
      (StatusCode::OK, r#"{"id":"f1","webViewLink":"https://drive/f1"}"#),
    )])
    .await;

    api.update_file("f1", &artifact(b"v2")).await.unwrap();

    let seen = fake.seen.lock().unwrap()[0].clone();
    assert_eq!(seen.method, Method::PATCH);
    assert_eq!(seen.path, "/upload/drive/v3/files/f1");
    assert_eq!(seen.query["uploadType"], "media");
    assert_eq!(
      seen.content_type,
      "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(seen.body, b"v2");
  }

  #[tokio::test]
  async fn grant_public_read_posts_anyone_reader() {
    let (fake, api) = serve(vec![(
      (Method::POST, "/drive/v3/files/folder-9/permissions"),
      (StatusCode::OK, r#"{"id":"anyoneWithLink"}"#),
    )])
    .await;

    api.grant_public_read("folder-9").await.unwrap();

    let seen = fake.seen.lock().unwrap()[0].clone();
    let body: serde_json::Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(body, json!({ "role": "reader", "type": "anyone" }));
  }

  #[tokio::test]
  async fn error_status_is_reported_with_operation() {
    let (_fake, api) = serve(vec![(
      (Method::GET, "/drive/v3/files"),
      (StatusCode::FORBIDDEN, r#"{"error":{"message":"insufficient scope"}}"#),
    )])
    .await;

    let err = api.find_file("check-ins.xlsx", "root-1").await.unwrap_err();
    match err {
      Error::Status { operation, status, body } => {
        assert_eq!(operation, "files.list");
        assert_eq!(status, 403);
        assert!(body.contains("insufficient scope"));
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn quotes_in_names_are_escaped() {
    assert_eq!(escape_literal(r"Ana's \ list"), r"Ana\'s \\ list");
  }
}
