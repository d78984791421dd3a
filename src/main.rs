use english_quiz::{build_state, config::Config, routes::build_router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let state = build_state(&config)?;

    // On failure the quiz stays in load_failed until POST /api/v1/quiz/load.
    match state.reload().await {
        Ok(total) => tracing::info!("question bank ready with {} questions", total),
        Err(err) => tracing::warn!("question bank unavailable ({}), waiting for a reload", err),
    }

    let app = build_router(state, &config.cors_origin)?;
    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("quiz backend listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
