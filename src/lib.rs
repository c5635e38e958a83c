pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod parser;
pub mod services;
pub mod state;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use clients::CompletionClient;
pub use config::Config;
use config::CompletionConfig;
use db::Store;
use domain::Role;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) | None => run_server(config).await,

        Some(Commands::Init) => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        Some(Commands::CreateAdmin {
            email,
            name,
            password,
        }) => cmd_create_admin(&config, &email, &name, &password).await,

        Some(Commands::TestCompletion) => cmd_test_completion(&config).await,
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!(
        "Ideaforge v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let state = api::create_app_state_from_config(config.clone()).await?;

    if !state.expansion().is_configured() {
        tracing::warn!("GROQ_API_KEY is not set; idea expansion will fail until it is configured");
    }

    let app = api::router(state).await;
    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::error!("Error listening for shutdown: {}", e),
    }
}

async fn cmd_create_admin(
    config: &Config,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    let email = api::validation::validate_email(email)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_lowercase();
    api::validation::validate_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    if store.email_taken(&email, None).await? {
        anyhow::bail!("An account with email {email} already exists");
    }

    let user = store
        .create_user(&email, name.trim(), password, Role::Admin, Some(&config.security))
        .await?;

    println!("✓ Created admin account: {} (ID: {})", user.email, user.id);
    Ok(())
}

async fn cmd_test_completion(config: &Config) -> anyhow::Result<()> {
    let completion_config = config.completion.clone().with_env_overrides();
    let client = CompletionClient::new(&completion_config, CompletionConfig::api_key_from_env())?;

    match client.test_connection().await {
        Ok(()) => println!("✓ Completion service connection successful"),
        Err(e) => println!("✗ Completion check failed: {e}"),
    }

    Ok(())
}
