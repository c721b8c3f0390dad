pub mod app;
pub mod handlers;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use crate::config::{AppConfig, JWT_SECRET_ENV};
use crate::database::{connection::*, migrations::Migrator};

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: &AppConfig) -> Result<()> {
    if config.uses_default_secret() {
        warn!(
            "No JWT secret configured; tokens are signed with the built-in development secret. Set {} or [jwt] secret",
            JWT_SECRET_ENV
        );
    }

    let database_url = get_database_url(Some(&config.database));
    let db = setup_database(&database_url).await?;
    info!("Database migrations completed");

    let app = app::create_app(db, config.cors_origin.as_deref(), config.token_settings())?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /graphql                    - GraphQL API (POST) & Playground (GET)");
}

pub async fn init_database(database_path: &str) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    setup_database(&database_url).await?;
    info!("Database initialized at {}", database_path);
    Ok(())
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
