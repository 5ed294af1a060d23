use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use depot_catalog::NewCategory;
use depot_core::{CategoryId, PageParams};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    perpage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPatch {
    name: Option<String>,
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ListQuery>,
) -> axum::response::Response {
    let page = PageParams::from_query(q.page.as_deref(), q.perpage.as_deref());

    match services.categories.list(page).await {
        Ok((categories, total)) => {
            let data = categories.iter().map(dto::category_to_json).collect();
            Json(dto::list_envelope(total, &page, data)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.categories.get(id).await {
        Ok(Some(category)) => {
            Json(serde_json::json!({ "data": dto::category_to_json(&category) })).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewCategory>,
) -> axum::response::Response {
    match services.categories.insert(body).await {
        Ok(category) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "category created",
                "data": dto::category_to_json(&category),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<CategoryPatch>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut category = match services.categories.get(id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(name) = patch.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "name is required");
        }
        category.name = name;
    }

    match services.categories.update(&category).await {
        Ok(()) => Json(serde_json::json!({
            "message": "category updated",
            "data": dto::category_to_json(&category),
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.categories.delete(id).await {
        Ok(true) => Json(serde_json::json!({ "message": "category deleted" })).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<CategoryId, axum::response::Response> {
    raw.parse::<CategoryId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}
