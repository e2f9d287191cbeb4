//! Categories and sectors API endpoints.

use api_types::category::{
    CategoryListResponse, CategoryNew, CategoryView, SectorCategories, SectorListResponse,
    SectorNew, SectorView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
    }
}

fn map_sector(sector: engine::Sector) -> SectorView {
    SectorView {
        id: sector.id,
        name: sector.name,
        category_ids: sector.category_ids,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state.engine.create_category(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn list_sectors(
    State(state): State<ServerState>,
) -> Result<Json<SectorListResponse>, ServerError> {
    let sectors = state
        .engine
        .list_sectors()
        .await?
        .into_iter()
        .map(map_sector)
        .collect();
    Ok(Json(SectorListResponse { sectors }))
}

pub async fn create_sector(
    State(state): State<ServerState>,
    Json(payload): Json<SectorNew>,
) -> Result<(StatusCode, Json<SectorView>), ServerError> {
    let sector = state
        .engine
        .create_sector(&payload.name, &payload.category_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(map_sector(sector))))
}

pub async fn get_sector(
    State(state): State<ServerState>,
    Path(sector_id): Path<Uuid>,
) -> Result<Json<SectorView>, ServerError> {
    Ok(Json(map_sector(state.engine.sector(sector_id).await?)))
}

pub async fn set_sector_categories(
    State(state): State<ServerState>,
    Path(sector_id): Path<Uuid>,
    Json(payload): Json<SectorCategories>,
) -> Result<Json<SectorView>, ServerError> {
    let sector = state
        .engine
        .set_sector_categories(sector_id, &payload.category_ids)
        .await?;
    Ok(Json(map_sector(sector)))
}
