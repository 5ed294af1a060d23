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

use depot_core::{InvoiceId, PageParams};
use depot_orders::{InvoicePatch, NewInvoice};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    perpage: Option<String>,
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ListQuery>,
) -> axum::response::Response {
    let page = PageParams::from_query(q.page.as_deref(), q.perpage.as_deref());

    match services.invoices.list(page).await {
        Ok((invoices, total)) => {
            let data = invoices.iter().map(dto::invoice_to_json).collect();
            Json(dto::list_envelope(total, &page, data)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.get(id).await {
        Ok(Some(populated)) => {
            Json(serde_json::json!({ "data": dto::populated_invoice_to_json(&populated) }))
                .into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewInvoice>,
) -> axum::response::Response {
    match services.invoices.insert(body, principal.name()).await {
        Ok(invoice) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "invoice created",
                "data": dto::invoice_to_json(&invoice),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(patch): Json<InvoicePatch>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut invoice = match services.invoices.get(id).await {
        Ok(Some(populated)) => populated.invoice,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    invoice.merge(patch, principal.name(), Utc::now());

    match services.invoices.update(&invoice).await {
        Ok(()) => Json(serde_json::json!({
            "message": "invoice updated",
            "data": dto::invoice_to_json(&invoice),
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.delete(id).await {
        Ok(true) => Json(serde_json::json!({ "message": "invoice deleted" })).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<InvoiceId, axum::response::Response> {
    raw.parse::<InvoiceId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}
