use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::listing::{validate_create, validate_update, Listing, SearchParams};
use crate::store::ListingStore;

/// GET /api/properties - all listings, newest first
pub async fn list(State(store): State<ListingStore>) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = store.list().await?;
    Ok(Json(listings))
}

/// GET /api/properties/search - filtered listings, newest first. Criteria
/// that fail to parse are dropped by the normalizer, never a request error.
pub async fn search(
    State(store): State<ListingStore>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let filter = params.normalize();
    let listings = store.search(&filter).await?;
    Ok(Json(listings))
}

/// POST /api/properties - create a listing (admin only)
pub async fn create(
    State(store): State<ListingStore>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Listing>), ApiError> {
    let new_listing = validate_create(&payload)?;
    let listing = store.create(new_listing).await?;

    tracing::info!(id = %listing.id, sequential_id = listing.sequential_id, "Created listing");
    Ok((StatusCode::CREATED, Json(listing)))
}

/// PUT /api/properties/:id - partial update (admin only). Only supplied
/// fields are touched; id, sequentialId and createdAt never change.
pub async fn update(
    State(store): State<ListingStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<Json<Listing>, ApiError> {
    let patch = validate_update(&payload)?;
    let listing = store.update(id, patch).await?;

    tracing::info!(id = %listing.id, "Updated listing");
    Ok(Json(listing))
}

/// DELETE /api/properties/:id - hard delete (admin only)
pub async fn delete(
    State(store): State<ListingStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    store.delete(id).await?;

    tracing::info!(%id, "Deleted listing");
    Ok(Json(json!({ "message": "Property deleted successfully" })))
}
