use anyhow::Result;
use is_terminal::IsTerminal;
use ringproxy::{Config, DynPlatform, RestPlatform, SharedConfig};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load the dotenv file before tracing so RUST_LOG may come from it.
    let env_res = env_init();
    tracing_init();
    if let Err(err) = env_res {
        tracing::warn!("ignoring dotenv file: {err}");
    }

    let config = config_init(std::env::args().nth(1))?;
    let platform: DynPlatform = Arc::new(RestPlatform::new(&config)?);

    tracing::info!("using platform {}", &config.server_url);
    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = ringproxy::api::new(config.clone(), platform);
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

/// Load `ENV_PATH`, or `./.env` when it isn't set. A missing file is fine.
fn env_init() -> Result<(), dotenvy::Error> {
    let res = match std::env::var("ENV_PATH") {
        Ok(path) if !path.is_empty() => dotenvy::from_path(path),
        _ => dotenvy::dotenv().map(|_| ()),
    };
    match res {
        Err(err) if err.not_found() => Ok(()),
        res => res,
    }
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ringproxy=info,tower_http=info".into()),
        )
        .init();
}

fn config_init(config_file: Option<String>) -> Result<SharedConfig> {
    let config = match config_file {
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            config
        }
        None => {
            let config = Config::from_env()?;
            tracing::debug!("loaded config from environment");
            config
        }
    };
    Ok(Arc::new(config))
}
