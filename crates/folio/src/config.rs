//! Configuration file (folio.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_content::{ClientConfig, ImageUrlBuilder};
use folio_static::{PageRenderer, SiteMeta};
use serde::Deserialize;

/// Environment variable holding the draft read token.
pub const READ_TOKEN_ENV: &str = "SANITY_API_READ_TOKEN";

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub content: ClientConfig,
    pub site: SiteSettings,
    pub build: BuildSettings,
    pub live: LiveSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub title: String,
    pub output: String,
    pub base_url: String,
    /// Extra stylesheets to link from every page
    pub styles: Vec<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            output: "dist".to_string(),
            base_url: "/".to_string(),
            styles: vec![],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub minify: bool,
    pub concurrency: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: true,
            concurrency: 8,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveSettings {
    pub poll_interval_ms: u64,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

impl FileConfig {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check that the content project is configured.
    pub fn validate(&self) -> Result<()> {
        if self.content.project_id.is_empty() && self.content.api_host.is_none() {
            anyhow::bail!("content.project_id is not set. Run 'folio init' or edit the config file.");
        }
        Ok(())
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.site.output)
    }

    pub fn renderer(&self) -> PageRenderer {
        let site = SiteMeta {
            title: self.site.title.clone(),
            base_url: normalize_base_url(&self.site.base_url),
            styles: self.site.styles.clone(),
        };

        PageRenderer::new(
            site,
            ImageUrlBuilder::new(&self.content.project_id, &self.content.dataset),
        )
    }
}

/// Draft read token from the environment, if set.
pub fn read_token() -> Option<String> {
    std::env::var(READ_TOKEN_ENV).ok().filter(|t| !t.is_empty())
}

/// Base URLs always end with a slash.
fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}
