//! Scaffold a folio.toml.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    tracing::info!("Set content.project_id, then run 'folio build'.");
    tracing::info!("Draft preview ('folio dev') reads its token from SANITY_API_READ_TOKEN.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Folio Configuration

[content]
# Content project id
project_id = ""

# Dataset to read posts from
dataset = "production"

# Dated query API version
api_version = "2023-06-21"

# Read published content through the CDN
use_cdn = true

[site]
# Site title
title = "My Blog"

# Output directory for built pages
output = "dist"

# Base URL (for deployment)
base_url = "/"

[build]
# Enable CSS minification
minify = true

# Posts generated at the same time
concurrency = 8

[live]
# How often draft preview checks for changes
poll_interval_ms = 1000
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_loadable_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("folio.toml");

        run(&path, false).await.unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.build.concurrency, 8);
    }

    #[tokio::test]
    async fn keeps_existing_config_without_yes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("folio.toml");
        fs::write(&path, "[site]\ntitle = \"Mine\"\n").unwrap();

        run(&path, false).await.unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("Mine"));

        run(&path, true).await.unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("My Blog"));
    }
}
