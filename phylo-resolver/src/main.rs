//! phylo-resolver - classification post resolution service
//!
//! Serves buffered and streaming resolution of classification names into
//! posts, plus age-filtered tree display.

use anyhow::{Context, Result};
use clap::Parser;
use phylo_common::config::{ConfigSource, TomlConfig, ENV_BIND, ENV_DATABASE};
use phylo_common::db::init_database;
use phylo_resolver::matcher::{HttpMatcher, SemanticMatcher};
use phylo_resolver::resolve::ResolverSettings;
use phylo_resolver::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for phylo-resolver
#[derive(Parser, Debug)]
#[command(name = "phylo-resolver")]
#[command(about = "Classification post resolution service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(short, long, env = ENV_DATABASE)]
    database: Option<PathBuf>,

    /// Listen address
    #[arg(short, long, env = ENV_BIND)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing exists so the log level can come from it
    let config_source = ConfigSource::locate(args.config.as_deref());
    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("phylo_resolver={level},phylo_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting phylo-resolver v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log();

    let db_path = config.resolve_database_path(args.database.as_deref());
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let settings = ResolverSettings::from_config(&config);
    let matcher: Option<Arc<dyn SemanticMatcher>> = match config.resolve_matcher_api_key() {
        Some(api_key) => {
            let client = HttpMatcher::new(&config.matcher, &api_key, settings.call_timeout)
                .context("Failed to create matcher client")?;
            info!(model = %config.matcher.model, "Semantic matcher enabled");
            Some(Arc::new(client))
        }
        None => {
            warn!("No matcher API key configured, semantic phase will fail");
            None
        }
    };

    let app = build_router(AppState::from_pool(pool, matcher, settings));

    let bind = config.resolve_bind(args.bind.as_deref());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("phylo-resolver listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
