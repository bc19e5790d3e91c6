use std::sync::Arc;

use asamblea::{
    AppError, Config, ConfigError, JsonFileStore, Renderer, SettingsStore, cli,
    sanitize::sanitize_url,
    server::{Server, ServerConfig},
    store::YOUTUBE_URL_KEY,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = cli::Args::parse();
    init_tracing(&args.log_level_filter());

    let mut config = Config::read(args.config.as_deref())?;
    apply_cli_overrides(&mut config, &args)?;
    config.validate()?;

    let store = Arc::new(JsonFileStore::open(&config.settings_file)?);

    if let Some(raw) = args.set_url.as_deref() {
        // Admin mode - store a URL without going through the web form
        let url = sanitize_url(raw).inspect_err(|e| tracing::error!("Rejected URL: {e}"))?;
        store.set(YOUTUBE_URL_KEY, &url)?;
        if url.is_empty() {
            println!("Cleared the configured YouTube URL");
        } else {
            println!("Configured YouTube URL: {url}");
        }
    } else if args.render {
        // CLI mode - print the fragment for the stored URL
        let renderer = Renderer::new(config.locale, config.unparseable_policy)
            .with_player_title(config.player_title.clone());
        let configured_url = store.get(YOUTUBE_URL_KEY);
        println!("{}", renderer.render(&configured_url, args.debug, args.debug));
    } else {
        if !config.content_dir.is_dir() {
            tracing::warn!(
                "content dir {} does not exist; only / and /embed will have content",
                config.content_dir.display()
            );
        }
        let server = Server::init(ServerConfig::from(&config), store)?;
        tracing::info!(
            "Server running at http://{}:{}/ (settings: {})",
            config.host,
            config.port,
            config.settings_file.display()
        );
        server.start().await?;
    }
    Ok(())
}

fn init_tracing(default_filter: &str) {
    // try_init: a global subscriber may already be set (e.g. in tests)
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Command-line flags win over the config file and environment.
fn apply_cli_overrides(config: &mut Config, args: &cli::Args) -> Result<(), ConfigError> {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host.as_deref() {
        config.host = host.parse()?;
    }
    if let Some(dir) = &args.content_dir {
        config.content_dir = dir.clone();
    }
    if let Some(file) = &args.settings_file {
        config.settings_file = file.clone();
    }
    Ok(())
}
