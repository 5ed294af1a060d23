#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    depot_observability::init();

    let config = depot_api::Config::from_env().expect("invalid configuration");

    let pool = depot_store::db::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    depot_store::db::migrate(&pool)
        .await
        .expect("failed to run migrations");

    let bind_addr = config.bind_addr.clone();
    let app = depot_api::app::build_app(config, pool);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
