//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use directory::{DirectoryStore, LocationManager};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::UploadConfig;
use crate::domains::auth::JwtService;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    create_location, delete_location, get_location, health_handler, list_locations,
    list_posts_handler, location_tree, update_location, upload_handler,
};

/// Room for multipart framing on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DirectoryStore>,
    pub locations: Arc<LocationManager<dyn DirectoryStore>>,
    pub jwt_service: Arc<JwtService>,
    pub upload: UploadConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn DirectoryStore>, jwt_service: JwtService, upload: UploadConfig) -> Self {
        let locations = Arc::new(LocationManager::new(Arc::clone(&store)));
        Self {
            store,
            locations,
            jwt_service: Arc::new(jwt_service),
            upload,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        // No list configured: allow any origin (development)
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let jwt_service_for_middleware = state.jwt_service.clone();
    let upload_body_limit = state.upload.max_bytes + MULTIPART_OVERHEAD_BYTES;

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/locations", get(list_locations).post(create_location))
        .route("/locations/tree", get(location_tree))
        .route(
            "/locations/:id",
            get(get_location)
                .patch(update_location)
                .delete(delete_location),
        )
        .route("/posts", get(list_posts_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(upload_body_limit)),
        );

    // Serve stored images when they are addressed by a local path
    if state.upload.public_base_url.starts_with('/') {
        router = router.nest_service(
            &state.upload.public_base_url,
            ServeDir::new(&state.upload.dir),
        );
    }

    router
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
