use std::sync::Arc;

use sqlx::PgPool;

use depot_auth::TokenCodec;
use depot_store::{
    repo::{CategoryRepo, InvoiceRepo, OrderRepo, StockRepo, UserRepo},
    AttachmentStore,
};

use crate::config::Config;

/// Shared per-request services, injected as an `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub stocks: StockRepo,
    pub categories: CategoryRepo,
    pub users: UserRepo,
    pub orders: OrderRepo,
    pub invoices: InvoiceRepo,
    pub attachments: AttachmentStore,
    pub tokens: Arc<TokenCodec>,
    pub token_ttl: chrono::Duration,
}

pub fn build_services(pool: PgPool, config: &Config) -> AppServices {
    AppServices {
        stocks: StockRepo::new(pool.clone()),
        categories: CategoryRepo::new(pool.clone()),
        users: UserRepo::new(pool.clone()),
        orders: OrderRepo::new(pool.clone()),
        invoices: InvoiceRepo::new(pool),
        attachments: AttachmentStore::new(config.public_dir.clone(), &config.app_url),
        tokens: Arc::new(TokenCodec::new(config.jwt_secret.as_bytes())),
        token_ttl: chrono::Duration::minutes(config.token_ttl_minutes),
    }
}
