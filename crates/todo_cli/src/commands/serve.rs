//! Serve command implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use todo_server::{ServerConfig, TodoServer};
use tracing::info;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Bind address.
    pub bind: Option<SocketAddr>,
    /// Commit log file.
    pub data: Option<PathBuf>,
    /// Static asset directory.
    pub assets: Option<PathBuf>,
    /// Enable CORS.
    pub cors: bool,
}

/// Loads the config file (or defaults) and applies `overrides`.
pub fn load_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = overrides.bind {
        config = config.with_bind_addr(bind);
    }
    if let Some(data) = overrides.data {
        config = config.with_data_path(data);
    }
    if let Some(assets) = overrides.assets {
        config = config.with_assets_dir(assets);
    }
    if overrides.cors {
        config = config.with_cors(true);
    }

    Ok(config)
}

/// Runs the server until Ctrl-C.
pub fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let server = TodoServer::new(config)?;
        server
            .run(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("received Ctrl-C");
                }
            })
            .await
    })?;
    Ok(())
}
