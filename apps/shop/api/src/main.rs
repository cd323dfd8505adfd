use axum_helpers::JwtAuth;
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config_with_retry, run_migrations};
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before anything fallible so startup errors get colored reports
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(
        app = config.app.name,
        version = config.app.version,
        missing_child_policy = %config.missing_child_policy,
        "Starting"
    );

    let db = connect_from_config_with_retry(config.database.clone(), config.retry.clone())
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        run_migrations::<Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    let state = AppState {
        jwt: JwtAuth::new(&config.jwt),
        config,
        db,
    };

    let api_routes = api::routes(&state);

    let app = create_router::<openapi::ApiDoc>(api_routes, &state.config.cors_origins)?
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    let AppState { config, db, .. } = state;

    create_production_app(app, &config.server, async move {
        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(()) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Shop API shutdown complete");
    Ok(())
}
