//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use md5::{Digest, Md5};
use serde_json::Value;
use tower::ServiceExt;

use homeshare_api::{AppState, build_router};
use homeshare_auth::jwt::{Claims, JwtDecoder, JwtEncoder};
use homeshare_core::config::AppConfig;
use homeshare_database::{MemoryShareStore, MemoryUserStore};
use homeshare_service::{AuthService, BackgroundTasks, FileService, SharingService, UploadService};
use homeshare_storage::{LockRegistry, StorageLayout};

pub const ADMIN_PASSWORD: &str = "admin-password";
const SECRET: &[u8] = b"integration-test-secret";
const BOUNDARY: &str = "homeshare-test-boundary";

/// Test application context
pub struct TestApp {
    pub router: Router,
    pub layout: StorageLayout,
    pub locks: Arc<LockRegistry>,
    pub tasks: BackgroundTasks,
    pub decoder: JwtDecoder,
    _data: tempfile::TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON body, or `Null` for non-JSON bodies
    pub body: Value,
    pub raw: Bytes,
    pub set_cookie: Option<String>,
}

/// One multipart chunk upload.
pub struct ChunkUpload<'a> {
    pub transfer_id: &'a str,
    pub folder_id: &'a str,
    pub file_name: &'a str,
    pub file_extension: &'a str,
    pub file_hash: &'a str,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub chunk: &'a [u8],
}

pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

impl TestApp {
    pub async fn new() -> Self {
        let data = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.data_root = data.path().to_path_buf();
        config.storage.max_chunk_size_bytes = 1024 * 1024;
        config.auth.admin_password = ADMIN_PASSWORD.to_string();

        let encoder = Arc::new(JwtEncoder::new(SECRET));
        let decoder = Arc::new(JwtDecoder::new(SECRET));

        let layout = StorageLayout::new(&config.storage);
        layout
            .ensure_directories()
            .await
            .expect("Failed to create storage directories");

        let locks = Arc::new(LockRegistry::new(Duration::from_secs(45)));
        let tasks = BackgroundTasks::new();

        let auth = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            Arc::clone(&encoder),
            Arc::clone(&decoder),
            &config.auth,
        );
        auth.seed_admin(&config.auth)
            .await
            .expect("Failed to seed admin");

        let state = AppState {
            auth: Arc::new(auth),
            sharing: Arc::new(SharingService::new(
                Arc::new(MemoryShareStore::new()),
                layout.clone(),
                Arc::clone(&encoder),
                config.auth.share_access_ttl(),
            )),
            uploads: Arc::new(UploadService::new(
                layout.clone(),
                Arc::clone(&locks),
                tasks.clone(),
                config.storage.max_chunk_size_bytes,
            )),
            files: Arc::new(FileService::new(layout.clone(), Arc::clone(&locks))),
            refresh_cookie: config.auth.refresh_cookie_name.clone(),
            upload_body_limit: config.server.body_limit_bytes,
        };

        Self {
            router: build_router(state),
            layout,
            locks,
            tasks,
            decoder: JwtDecoder::new(SECRET),
            _data: data,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    pub async fn upload(&self, chunk: ChunkUpload<'_>, token: &str) -> TestResponse {
        let mut body = Vec::new();
        let text_fields = [
            ("transfer_id", chunk.transfer_id.to_string()),
            ("folder_id", chunk.folder_id.to_string()),
            ("file_name", chunk.file_name.to_string()),
            ("file_extension", chunk.file_extension.to_string()),
            ("file_hash", chunk.file_hash.to_string()),
            ("chunk_index", chunk.chunk_index.to_string()),
            ("total_chunks", chunk.total_chunks.to_string()),
        ];
        for (name, value) in text_fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"chunk\"; filename=\"blob\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(chunk.chunk);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/uploads")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Log in as the seeded admin and return the access token.
    pub async fn admin_token(&self) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "username": "admin",
                    "password": ADMIN_PASSWORD,
                })),
                None,
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    pub fn claims(&self, access_token: &str) -> Claims {
        self.decoder
            .decode_access_token(access_token)
            .expect("Failed to decode access token")
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let raw = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            raw,
            set_cookie,
        }
    }
}

/// The `name=value` part of a Set-Cookie header.
pub fn cookie_pair(set_cookie: &str) -> &str {
    set_cookie.split(';').next().unwrap_or_default()
}

/// The `Max-Age` attribute of a `Set-Cookie` value, in seconds.
pub fn cookie_max_age(set_cookie: &str) -> Option<i64> {
    set_cookie
        .split(';')
        .filter_map(|attr| attr.trim().strip_prefix("Max-Age="))
        .find_map(|value| value.parse().ok())
}
