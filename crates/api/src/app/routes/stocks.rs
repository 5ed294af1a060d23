use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use depot_catalog::{NewStock, StockPatch};
use depot_core::{PageParams, SortOrder, StockId};
use depot_store::repo::{StockListQuery, StockSort};
use depot_store::{sheet, UploadedFile};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// Images accepted per stock record.
const MAX_IMAGES: usize = 4;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stocks).post(create_stock))
        .route("/export", get(export_stocks))
        .route("/import", post(import_stocks))
        .route(
            "/:id",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
}

/// List query parameters, all taken as raw strings so malformed values fall
/// back to defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    perpage: Option<String>,
    search: Option<String>,
    from: Option<String>,
    to: Option<String>,
    sort: Option<String>,
    order: Option<String>,
}

fn parse_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|t| t.with_timezone(&Utc))
}

pub async fn list_stocks(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ListQuery>,
) -> axum::response::Response {
    let query = StockListQuery {
        page: PageParams::from_query(q.page.as_deref(), q.perpage.as_deref()),
        search: q.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
        from: parse_time(q.from.as_deref()),
        to: parse_time(q.to.as_deref()),
        sort: StockSort::from_query(q.sort.as_deref()),
        order: SortOrder::from_query(q.order.as_deref()),
    };

    let (stocks, total) = match services.stocks.list(&query).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    let data = stocks.iter().map(dto::stock_to_json).collect();
    let mut body = dto::list_envelope(total, &query.page, data);
    body["sort"] = query.sort.as_str().into();
    body["order"] = query.order.as_str().into();

    Json(body).into_response()
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.stocks.get(id).await {
        Ok(Some(populated)) => {
            Json(serde_json::json!({ "data": dto::populated_stock_to_json(&populated) }))
                .into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "stock not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    multipart: Multipart,
) -> axum::response::Response {
    let (fields, files) = match read_form(multipart).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new = match NewStock::from_form(&fields, principal.name()) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let images = if files.is_empty() {
        Vec::new()
    } else {
        match services.attachments.store(&new.code, &files).await {
            Ok(urls) => urls,
            Err(e) => return errors::store_error_to_response(e),
        }
    };

    match services.stocks.insert(new, images).await {
        Ok(stock) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "stock created",
                "data": dto::stock_to_json(&stock),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut stock = match services.stocks.get(id).await {
        Ok(Some(populated)) => populated.stock,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "stock not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let (fields, files) = match read_form(multipart).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let patch = match StockPatch::from_form(&fields) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let old_images = stock.images.clone();
    stock.merge(patch, principal.name(), Utc::now());

    // Fresh uploads replace the whole image set; removal of the old files is
    // best effort and never fails the update.
    if !files.is_empty() {
        if let Err(e) = services.attachments.remove_files(&old_images).await {
            tracing::warn!(error = %e, stock = %stock.id, "failed to remove replaced images");
        }
        stock.images = match services.attachments.store(&stock.code, &files).await {
            Ok(urls) => urls,
            Err(e) => return errors::store_error_to_response(e),
        };
    }

    match services.stocks.update(&stock).await {
        Ok(()) => Json(serde_json::json!({
            "message": "stock updated",
            "data": dto::stock_to_json(&stock),
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    // Load first so the image directory can still be resolved, then delete
    // the row before touching the filesystem.
    let stock = match services.stocks.get(id).await {
        Ok(Some(populated)) => populated.stock,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "stock not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.stocks.delete(id).await {
        Ok(true) => {}
        Ok(false) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "stock not found"),
        Err(e) => return errors::store_error_to_response(e),
    }

    if let Some(first) = stock.images.first() {
        if let Err(e) = services.attachments.remove_dir_for(first).await {
            tracing::warn!(error = %e, stock = %stock.id, "failed to remove image directory");
        }
    }

    Json(serde_json::json!({ "message": "stock deleted" })).into_response()
}

pub async fn export_stocks(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let rows = match services.stocks.export_rows().await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    let bytes = match sheet::write_workbook(&rows) {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        [
            (header::CONTENT_TYPE, XLSX_MIME),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"stocks.xlsx\"",
            ),
        ],
        bytes,
    )
        .into_response()
}

pub async fn import_stocks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let mut workbook: Option<Vec<u8>> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.file_name().is_none() {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => {
                        workbook = Some(bytes.to_vec());
                        break;
                    }
                    Err(e) => {
                        return errors::json_error(
                            StatusCode::BAD_REQUEST,
                            "invalid_multipart",
                            e.to_string(),
                        )
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_multipart",
                    e.to_string(),
                )
            }
        }
    }

    let Some(bytes) = workbook else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "an xlsx file is required",
        );
    };

    let rows = match sheet::read_workbook(&bytes) {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    let rows: Vec<NewStock> = rows
        .into_iter()
        .map(|row| {
            let mut new = row.inner;
            if new.created_by.trim().is_empty() {
                new.created_by = principal.name().to_string();
            }
            new
        })
        .collect();

    match services.stocks.insert_batch(rows).await {
        Ok(count) => Json(serde_json::json!({
            "message": "import complete",
            "imported": count,
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<StockId, axum::response::Response> {
    raw.parse::<StockId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

/// Drain a multipart form into text fields plus uploaded image files.
///
/// Any field named `images` with a filename is an upload; the cap on image
/// count is enforced here so handlers never see an oversized batch.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Vec<UploadedFile>), axum::response::Response> {
    let mut fields = HashMap::new();
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_multipart",
                    e.to_string(),
                ))
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == "images" && field.file_name().is_some() {
            if files.len() >= MAX_IMAGES {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("at most {MAX_IMAGES} images are allowed"),
                ));
            }
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = match field.bytes().await {
                Ok(b) => b.to_vec(),
                Err(e) => {
                    return Err(errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "invalid_multipart",
                        e.to_string(),
                    ))
                }
            };
            files.push(UploadedFile { filename, bytes });
        } else {
            let value = match field.text().await {
                Ok(v) => v,
                Err(e) => {
                    return Err(errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "invalid_multipart",
                        e.to_string(),
                    ))
                }
            };
            fields.insert(name, value);
        }
    }

    Ok((fields, files))
}
