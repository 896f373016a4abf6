use clap::Parser;
use tracing_subscriber::EnvFilter;

use entreprise_api::cli::{self, Cli};
use entreprise_api::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("entreprise_api=info,tower_http=info")),
        )
        .init();

    if config::config().security.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD is not set; admin login is disabled");
    }

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli, config::config().clone()).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
