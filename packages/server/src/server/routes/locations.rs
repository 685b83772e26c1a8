//! Location hierarchy endpoints. Reads are public; writes need an admin.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use directory::{
    CreateLocation, DeleteReport, LocationId, LocationNode, LocationTreeNode, LocationType,
    UpdateLocation,
};
use serde::Deserialize;
use tracing::info;

use crate::server::app::AppState;
use crate::server::error::{require_admin, ApiError};
use crate::server::middleware::AuthUser;

#[derive(Debug, Default, Deserialize)]
pub struct LocationsQuery {
    #[serde(rename = "type")]
    pub location_type: Option<String>,
}

fn parse_id(raw: &str) -> Result<LocationId, ApiError> {
    LocationId::parse(raw).map_err(|_| ApiError::BadRequest(format!("Invalid location id \"{}\"", raw)))
}

pub async fn list_locations(
    Extension(state): Extension<AppState>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<Vec<LocationNode>>, ApiError> {
    let location_type = query
        .location_type
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(str::parse::<LocationType>)
        .transpose()?;

    Ok(Json(state.locations.list_locations(location_type).await))
}

pub async fn location_tree(
    Extension(state): Extension<AppState>,
) -> Json<Vec<LocationTreeNode>> {
    let tree = state.locations.location_tree().await;
    Json(tree.as_ref().clone())
}

pub async fn get_location(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LocationNode>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.locations.get_location(id).await?))
}

pub async fn create_location(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(input): Json<CreateLocation>,
) -> Result<(StatusCode, Json<LocationNode>), ApiError> {
    let user = require_admin(auth)?;
    let node = state.locations.create_location(input).await?;

    info!(user_id = %user.user_id, location_id = %node.id, "Location created via API");
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn update_location(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
    Json(input): Json<UpdateLocation>,
) -> Result<Json<LocationNode>, ApiError> {
    let user = require_admin(auth)?;
    let id = parse_id(&id)?;
    let node = state.locations.update_location(id, input).await?;

    info!(user_id = %user.user_id, location_id = %id, version = node.version, "Location updated via API");
    Ok(Json(node))
}

pub async fn delete_location(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteReport>, ApiError> {
    let user = require_admin(auth)?;
    let id = parse_id(&id)?;
    let report = state.locations.delete_location(id).await?;

    info!(
        user_id = %user.user_id,
        location_id = %id,
        complete = report.is_complete(),
        "Location deleted via API"
    );
    Ok(Json(report))
}
