//! Catalog browsing: products, departments, categories, shipping.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use shop_core::{Page, Pagination, Product, ShopError};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

fn paged(page: Page<Product>, window: Pagination) -> serde_json::Value {
    json!({
        "status": true,
        "meta": window.meta(page.total, page.rows.len()),
        "rows": page.rows,
    })
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let window = query.pagination();
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let page = state.stores.catalog.list_products(search, window).await?;

    Ok(Json(paged(page, window)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let product = state
        .stores
        .catalog
        .get_product(product_id)
        .await?
        .ok_or(ShopError::ProductNotFound { product_id })?;

    Ok(Json(json!({ "status": true, "product": product })))
}

pub async fn products_in_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let window = query.pagination();
    let page = state
        .stores
        .catalog
        .list_products_in_category(category_id, window)
        .await?;

    Ok(Json(paged(page, window)))
}

pub async fn products_in_department(
    State(state): State<AppState>,
    Path(department_id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let window = query.pagination();
    let page = state
        .stores
        .catalog
        .list_products_in_department(department_id, window)
        .await?;

    Ok(Json(paged(page, window)))
}

pub async fn list_departments(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let departments = state.stores.catalog.list_departments().await?;
    Ok(Json(json!({ "status": true, "departments": departments })))
}

pub async fn get_department(
    State(state): State<AppState>,
    Path(department_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let department = state
        .stores
        .catalog
        .get_department(department_id)
        .await?
        .ok_or(ShopError::DepartmentNotFound { department_id })?;

    Ok(Json(json!({ "status": true, "department": department })))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let categories = state.stores.catalog.list_categories().await?;
    Ok(Json(json!({ "status": true, "categories": categories })))
}

pub async fn list_shipping_regions(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let regions = state.stores.catalog.list_shipping_regions().await?;
    Ok(Json(json!({ "status": true, "shipping_regions": regions })))
}

pub async fn list_shipping_types(
    State(state): State<AppState>,
    Path(shipping_region_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let types = state
        .stores
        .catalog
        .list_shipping_types(shipping_region_id)
        .await?;
    Ok(Json(json!({ "status": true, "shipping_types": types })))
}
