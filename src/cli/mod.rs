use clap::{Parser, Subcommand};

use crate::auth::PasswordService;
use crate::config::AppConfig;
use crate::database::PgStore;

#[derive(Parser)]
#[command(name = "entreprise-api")]
#[command(about = "Entreprise API - missions, factures, contacts and public profiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Bind address, overrides HOST")]
        host: Option<String>,
        #[arg(long, help = "Listen port, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply the Postgres schema and exit")]
    Migrate,

    #[command(about = "Print an Argon2 hash for a password")]
    HashPassword { password: String },
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Migrate => {
            let store = PgStore::connect(&config.database).await?;
            store.migrate().await?;
            store.close().await;
            println!("Schema applied");
            Ok(())
        }
        Commands::HashPassword { password } => {
            println!("{}", PasswordService::hash(&password)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    tracing::info!("Starting Entreprise API in {:?} mode", config.environment);

    let store = crate::connect_store(&config).await?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = crate::app(crate::state::AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;
    tracing::info!("Entreprise API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
