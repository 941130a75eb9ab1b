//! Draft preview server command.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use folio_server::{PreviewServer, ServerConfig};
use folio_static::PageGenerator;

use crate::config::{read_token, FileConfig, READ_TOKEN_ENV};

/// Run the draft preview server.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    let file_config = FileConfig::load(config_path)?;
    file_config.validate()?;

    let token = read_token().with_context(|| format!("{READ_TOKEN_ENV} must be set for draft preview"))?;

    tracing::info!("Starting draft preview on port {}", port);

    let config = ServerConfig {
        output_dir: file_config.output_dir(),
        port,
        open,
        ..Default::default()
    };

    let server = PreviewServer::new(
        config,
        PageGenerator::new(file_config.content.clone(), Some(token)),
        file_config.renderer(),
        Duration::from_millis(file_config.live.poll_interval_ms),
    )?;

    server.start().await?;

    Ok(())
}
