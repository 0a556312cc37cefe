use std::sync::Arc;

use mock_server::MockState;
use tokio::{net::TcpListener, sync::RwLock};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("FREEDCAMP_API_KEY").unwrap_or_else(|_| "demo-key".to_string());
    let api_secret =
        std::env::var("FREEDCAMP_API_SECRET").unwrap_or_else(|_| "demo-secret".to_string());

    let mut state = MockState::new(&api_key, &api_secret, 1);
    state.add_task(101, "Draft release notes", "Backlog");
    state.add_task(102, "Fix login redirect", "Ready");
    state.add_task(103, "Review dependency bumps", "Ready");
    let db = Arc::new(RwLock::new(state));

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock Freedcamp API listening");
    mock_server::run(listener, db).await
}
