use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use inkpost::config::AppConfig;
use inkpost::database::connection::{get_database_url, setup_database};
use inkpost::server::{self, MigrateDirection};
use inkpost::services::UserService;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// TOML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL server
    Serve {
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    /// Database management
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Create a staff user with admin rights
    CreateSuperuser {
        #[clap(long)]
        email: String,
        #[clap(long)]
        username: String,
        #[clap(long, env = "INKPOST_SUPERUSER_PASSWORD")]
        password: String,
        #[clap(short, long)]
        database: Option<String>,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Create the database and apply every migration
    Init {
        #[clap(short, long)]
        database: Option<String>,
    },
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
        #[clap(short, long, global = true)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(database) = database {
                config.database = database;
            }
            if cors_origin.is_some() {
                config.cors_origin = cors_origin;
            }
            info!("Starting server on port {}", config.port);
            server::start_server(&config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                let database = database.unwrap_or(config.database);
                server::init_database(&database).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                let database = database.unwrap_or(config.database);
                server::migrate_database(&database, direction).await?;
            }
        },
        Commands::CreateSuperuser {
            email,
            username,
            password,
            database,
        } => {
            let database = database.unwrap_or(config.database);
            let db = setup_database(&get_database_url(Some(&database))).await?;
            let user = UserService::new(db)
                .create_superuser(&email, &username, &password)
                .await
                .map_err(|e| anyhow!("{}", e))?;
            info!("Created superuser {} ({})", user.id, user.email);
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
