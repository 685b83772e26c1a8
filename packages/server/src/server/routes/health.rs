use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use directory::{DirectoryStore, LocationStore};
use serde::Serialize;

use crate::server::app::AppState;

const STORE_PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    store: StoreHealth,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StoreHealth {
    fn failed(error: String) -> Self {
        Self {
            status: "error",
            error: Some(error),
        }
    }
}

async fn probe_store(store: &dyn DirectoryStore) -> StoreHealth {
    match tokio::time::timeout(STORE_PING_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => StoreHealth {
            status: "ok",
            error: None,
        },
        Ok(Err(e)) => StoreHealth::failed(format!("Ping failed: {}", e)),
        Err(_) => StoreHealth::failed(format!(
            "Ping timeout (>{}s)",
            STORE_PING_TIMEOUT.as_secs()
        )),
    }
}

/// `GET /health`: 200 while the store answers, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = probe_store(state.store.as_ref()).await;

    let (code, status) = if store.error.is_none() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (code, Json(HealthResponse { status, store }))
}
