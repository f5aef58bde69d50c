mod api;
mod middleware;

use std::sync::Arc;

use plaza_geofence::PgBusinessLocationService;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = plaza_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = plaza_db::PoolConfig::from_app_config(&config);
    let pool = plaza_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = plaza_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    match plaza_db::postgis_installed(&pool).await {
        Ok(true) => tracing::info!("postgis available; full spatial validation enabled"),
        Ok(false) => tracing::warn!(
            "postgis not installed; location validation will run in degraded mode"
        ),
        Err(e) => tracing::warn!(error = %e, "could not determine postgis availability"),
    }

    let locations = Arc::new(PgBusinessLocationService::from_pool(pool.clone(), &config));
    let auth = AuthState::from_env(matches!(config.env, plaza_core::Environment::Development))?;
    let app = build_app(AppState { pool, locations }, auth, default_rate_limit_state());

    tracing::info!(bind_addr = %config.bind_addr, env = %config.env, "plaza-server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
