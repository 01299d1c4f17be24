use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use htraining_server::config::Config;
use htraining_server::routes::create_routes;
use htraining_server::state::{select_backend, AppState};
use htraining_server::storage::Storage;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let storage = Storage::new(select_backend(&config));
    let state = AppState::init(&config, storage).await;

    let app: Router = create_routes(state, &config);

    tracing::info!("🚀 Server running at http://{}", config.addr);

    let listener = TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
