//! Chart-of-accounts catalog routes: categories, subcategories, products.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use centralmei_core::cashbook::MovementDirection;
use centralmei_db::repositories::{
    CatalogError, CatalogRepository, CreateCategoryInput, CreateProductInput,
    CreateSubcategoryInput,
};

/// Creates the catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories", post(create_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/categories/{id}/subcategories", get(list_subcategories))
        .route("/subcategories", post(create_subcategory))
        .route("/subcategories/{id}", delete(delete_subcategory))
        .route("/products", get(list_products))
        .route("/products", post(create_product))
        .route("/products/{id}", delete(delete_product))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// Restrict to one kind (`in` or `out`).
    pub kind: Option<String>,
}

/// Body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryBody {
    /// Category name.
    pub name: String,
    /// `in` or `out`.
    pub kind: String,
}

/// Body for creating a subcategory.
#[derive(Debug, Deserialize)]
pub struct CreateSubcategoryBody {
    /// Parent category.
    pub category_id: Uuid,
    /// Subcategory name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductBody {
    /// Product name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Unit price (> 0).
    pub price: Decimal,
    /// Owning subcategory.
    pub subcategory_id: Uuid,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /categories - List active categories.
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> impl IntoResponse {
    let kind = match query.kind.as_deref().map(MovementDirection::from_str) {
        Some(Ok(kind)) => Some(kind),
        Some(Err(_)) => return bad_request("Unknown category kind"),
        None => None,
    };

    let repo = CatalogRepository::new((*state.db).clone());
    match repo.list_categories(kind).await {
        Ok(rows) => (StatusCode::OK, Json(json!({ "categories": rows }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list categories");
            internal_error()
        }
    }
}

/// POST /categories - Create a category.
async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryBody>,
) -> impl IntoResponse {
    let Ok(kind) = MovementDirection::from_str(&body.kind) else {
        return bad_request("Unknown category kind");
    };
    if body.name.trim().is_empty() {
        return bad_request("Category name is required");
    }

    let repo = CatalogRepository::new((*state.db).clone());
    match repo
        .create_category(CreateCategoryInput {
            name: body.name,
            kind,
        })
        .await
    {
        Ok(category) => {
            (StatusCode::CREATED, Json(json!({ "category": category }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create category");
            internal_error()
        }
    }
}

/// DELETE /categories/{id} - Remove an unreferenced category.
async fn delete_category(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = CatalogRepository::new((*state.db).clone());
    match repo.delete_category(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(CatalogError::CategoryNotFound(_)) => not_found("Category", id),
        Err(CatalogError::InUse(_)) => in_use(),
        Err(e) => {
            error!(error = %e, "Failed to delete category");
            internal_error()
        }
    }
}

/// GET /categories/{id}/subcategories - List a category's subcategories.
async fn list_subcategories(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CatalogRepository::new((*state.db).clone());
    match repo.list_subcategories(id).await {
        Ok(rows) => (StatusCode::OK, Json(json!({ "subcategories": rows }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list subcategories");
            internal_error()
        }
    }
}

/// POST /subcategories - Create a subcategory.
async fn create_subcategory(
    State(state): State<AppState>,
    Json(body): Json<CreateSubcategoryBody>,
) -> impl IntoResponse {
    if body.name.trim().is_empty() {
        return bad_request("Subcategory name is required");
    }

    let repo = CatalogRepository::new((*state.db).clone());
    match repo
        .create_subcategory(CreateSubcategoryInput {
            category_id: body.category_id,
            name: body.name,
            description: body.description,
        })
        .await
    {
        Ok(subcategory) => (
            StatusCode::CREATED,
            Json(json!({ "subcategory": subcategory })),
        )
            .into_response(),
        Err(CatalogError::CategoryNotFound(id)) => not_found("Category", id),
        Err(e) => {
            error!(error = %e, "Failed to create subcategory");
            internal_error()
        }
    }
}

/// DELETE /subcategories/{id} - Remove an unreferenced subcategory.
async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CatalogRepository::new((*state.db).clone());
    match repo.delete_subcategory(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(CatalogError::SubcategoryNotFound(_)) => not_found("Subcategory", id),
        Err(CatalogError::InUse(_)) => in_use(),
        Err(e) => {
            error!(error = %e, "Failed to delete subcategory");
            internal_error()
        }
    }
}

/// GET /products - List active products.
async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let repo = CatalogRepository::new((*state.db).clone());
    match repo.list_products().await {
        Ok(rows) => (StatusCode::OK, Json(json!({ "products": rows }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list products");
            internal_error()
        }
    }
}

/// POST /products - Create a product.
async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductBody>,
) -> impl IntoResponse {
    if body.name.trim().is_empty() {
        return bad_request("Product name is required");
    }

    let repo = CatalogRepository::new((*state.db).clone());
    match repo
        .create_product(CreateProductInput {
            name: body.name,
            description: body.description,
            price: body.price,
            subcategory_id: body.subcategory_id,
        })
        .await
    {
        Ok(product) => (StatusCode::CREATED, Json(json!({ "product": product }))).into_response(),
        Err(CatalogError::SubcategoryNotFound(id)) => not_found("Subcategory", id),
        Err(CatalogError::NonPositivePrice) => bad_request("Product price must be greater than zero"),
        Err(e) => {
            error!(error = %e, "Failed to create product");
            internal_error()
        }
    }
}

/// DELETE /products/{id} - Remove an unreferenced product.
async fn delete_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = CatalogRepository::new((*state.db).clone());
    match repo.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(CatalogError::ProductNotFound(_)) => not_found("Product", id),
        Err(CatalogError::InUse(_)) => in_use(),
        Err(e) => {
            error!(error = %e, "Failed to delete product");
            internal_error()
        }
    }
}

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": message
        })),
    )
        .into_response()
}

fn not_found(entity: &str, id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("{entity} not found: {id}")
        })),
    )
        .into_response()
}

fn in_use() -> axum::response::Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": "in_use",
            "message": "Entry is referenced by existing records and cannot be deleted"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
