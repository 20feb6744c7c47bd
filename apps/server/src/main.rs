use chainsight_server::{app_router, build_state, init_tracing, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    let router = app_router(state, &config);
    tracing::info!(
        "Listening on {} (request timeout {}ms)",
        config.listen_addr,
        config.request_timeout.as_millis()
    );
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
