//! Test harness: an in-memory app with a scratch upload directory.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use directory::{ContentPost, MemoryStore, PostStore};
use serde_json::Value;
use server_core::domains::auth::JwtService;
use server_core::server::{build_app, AppState};
use server_core::UploadConfig;
use tower::ServiceExt;
use uuid::Uuid;

pub const MULTIPART_BOUNDARY: &str = "being-happy-test-boundary";

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub jwt_service: JwtService,
    pub upload_dir: PathBuf,
    app: Router,
}

/// A response with its body parsed as JSON (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_max_upload_bytes(1024)
    }

    pub fn with_max_upload_bytes(max_bytes: usize) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let upload_dir = std::env::temp_dir().join(format!("being-happy-uploads-{}", Uuid::new_v4()));

        let state = AppState::new(
            store.clone(),
            jwt_service.clone(),
            UploadConfig {
                dir: upload_dir.clone(),
                public_base_url: "/uploads".to_string(),
                max_bytes,
            },
        );

        Self {
            store,
            jwt_service,
            upload_dir,
            app: build_app(state, &[]),
        }
    }

    pub fn admin_token(&self) -> String {
        self.jwt_service
            .create_token(Uuid::new_v4(), "admin@example.com".to_string(), true)
            .unwrap()
    }

    pub fn user_token(&self) -> String {
        self.jwt_service
            .create_token(Uuid::new_v4(), "reader@example.com".to_string(), false)
            .unwrap()
    }

    pub async fn seed_post(&self, title: &str, post_type: &str) -> ContentPost {
        let post = ContentPost::new(title, post_type);
        self.store.insert_post(&post).await.unwrap();
        post
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::delete(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn upload(
        &self,
        token: Option<&str>,
        post_id: &str,
        content_type: &str,
        file_name: &str,
        data: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"postId\"\r\n\r\n{post_id}\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n",
                b = MULTIPART_BOUNDARY,
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

        let mut builder = Request::post("/upload").header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}
