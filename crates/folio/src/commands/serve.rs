//! Published site server command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use folio_server::{ServerConfig, SiteServer};
use folio_static::{PageGenerator, Site};

use crate::config::FileConfig;

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>, open: bool) -> Result<()> {
    let file_config = FileConfig::load(config_path)?;
    file_config.validate()?;

    let dir = dir.unwrap_or_else(|| file_config.output_dir());
    if !dir.exists() {
        tracing::warn!(
            "{} not found, every post will be generated on first request. Run 'folio build' first.",
            dir.display()
        );
    }

    let generator = PageGenerator::new(file_config.content.clone(), None);
    let site = Site::new(generator, file_config.renderer()).with_output_dir(&dir);

    let config = ServerConfig {
        output_dir: dir,
        port,
        open,
        ..Default::default()
    };

    SiteServer::new(config, Arc::new(site)).start().await?;

    Ok(())
}
