use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use depot_core::{OrderId, PageParams};
use depot_orders::{NewOrder, OrderPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    perpage: Option<String>,
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ListQuery>,
) -> axum::response::Response {
    let page = PageParams::from_query(q.page.as_deref(), q.perpage.as_deref());

    match services.orders.list(page).await {
        Ok((orders, total)) => {
            let data = orders.iter().map(dto::order_to_json).collect();
            Json(dto::list_envelope(total, &page, data)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.get(id).await {
        Ok(Some(populated)) => {
            Json(serde_json::json!({ "data": dto::populated_order_to_json(&populated) }))
                .into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewOrder>,
) -> axum::response::Response {
    match services.orders.insert(body, principal.name()).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "order created",
                "data": dto::order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut order = match services.orders.get(id).await {
        Ok(Some(populated)) => populated.order,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    order.merge(patch, principal.name(), Utc::now());

    match services.orders.update(&order).await {
        Ok(()) => Json(serde_json::json!({
            "message": "order updated",
            "data": dto::order_to_json(&order),
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.delete(id).await {
        Ok(true) => Json(serde_json::json!({ "message": "order deleted" })).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<OrderId, axum::response::Response> {
    raw.parse::<OrderId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}
