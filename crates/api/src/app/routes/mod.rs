use axum::Router;

pub mod categories;
pub mod invoices;
pub mod orders;
pub mod stocks;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints, mounted under `/api` by
/// `app::build_app`.
pub fn router() -> Router {
    Router::new()
        .nest("/stocks", stocks::router())
        .nest("/category", categories::router())
        .nest("/order", orders::router())
        .nest("/invoice", invoices::router())
        .nest("/users", users::router())
}
