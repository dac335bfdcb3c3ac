use confman::{config, db, routes, state};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "confman=info,tower_http=info".into()),
        )
        .init();

    let config = Arc::new(config::Config::from_env());

    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    db::run_migrations(pool.as_ref()).await?;

    let state = Arc::new(state::AppState {
        pool,
        config: config.clone(),
    });

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Confman listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
