use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_backend::config::AppConfig;
use todo_backend::domain::{TodoService, UserService};
use todo_backend::rest::{create_router, AppState};
use todo_backend::storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // The engine is chosen once here; everything downstream sees the same
    // trait objects regardless of backend
    let stores = storage::connect(&config).await?;

    let user_service = UserService::new(stores.users.clone(), stores.todos.clone());
    let todo_service = TodoService::new(stores.todos, stores.users);
    let state = AppState::new(user_service, todo_service, config.jwt_secret.clone());

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
