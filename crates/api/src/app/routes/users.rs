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

use depot_auth::{hash_password, verify_password, Claims, NewUser, User};
use depot_core::{PageParams, UserId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Authenticated user routes. Registration and login are wired separately as
/// public routes in `app::build_app`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    perpage: Option<String>,
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewUser>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            );
        }
    };

    let user = User {
        id: UserId::new(),
        name: body.name.trim().to_string(),
        email: body.email.trim().to_lowercase(),
        password_hash,
        time: Utc::now(),
    };

    match services.users.insert(&user).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "user registered",
                "data": dto::user_to_json(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let invalid =
        || errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials");

    let user = match services.users.find_by_email(body.email.trim()).await {
        Ok(Some(u)) => u,
        Ok(None) => return invalid(),
        Err(e) => return errors::store_error_to_response(e),
    };

    if !verify_password(&body.password, &user.password_hash) {
        return invalid();
    }

    let claims = Claims::new(user.id, user.name.clone(), Utc::now(), services.token_ttl);
    let token = match services.tokens.encode(&claims) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "token encoding failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            );
        }
    };

    Json(serde_json::json!({
        "token": token,
        "user": dto::user_to_json(&user),
    }))
    .into_response()
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<ListQuery>,
) -> axum::response::Response {
    let page = PageParams::from_query(q.page.as_deref(), q.perpage.as_deref());

    match services.users.list(page).await {
        Ok((users, total)) => {
            let data = users.iter().map(dto::user_to_json).collect();
            Json(dto::list_envelope(total, &page, data)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.users.get(id).await {
        Ok(Some(user)) => {
            Json(serde_json::json!({ "data": dto::user_to_json(&user) })).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.users.delete(id).await {
        Ok(true) => Json(serde_json::json!({ "message": "user deleted" })).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse::<UserId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}
