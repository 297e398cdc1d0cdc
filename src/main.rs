mod app;
mod auth;
mod config;
mod db;
mod errors;
mod state;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "rollcall=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    // Schema must be current before the service accepts traffic.
    db::Migrator::embedded().run(&state.db).await?;

    let (host, port) = (
        state.config.listen_host.clone(),
        state.config.listen_port,
    );
    let app = app::build_app(state);
    app::serve(app, &host, port).await
}
