//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use folio_static::{BuildConfig, PageGenerator, StaticBuilder};

use crate::config::FileConfig;

/// Run the build command.
pub async fn run(
    config_path: &Path,
    output: Option<PathBuf>,
    minify: Option<bool>,
    concurrency: Option<usize>,
) -> Result<()> {
    tracing::info!("Building static site...");

    let file_config = FileConfig::load(config_path)?;
    file_config.validate()?;

    let config = BuildConfig {
        output_dir: output.unwrap_or_else(|| file_config.output_dir()),
        minify: minify.unwrap_or(file_config.build.minify),
        concurrency: concurrency.unwrap_or(file_config.build.concurrency),
    };

    // Builds never read drafts.
    let generator = PageGenerator::new(file_config.content.clone(), None);
    let builder = StaticBuilder::new(config, generator, file_config.renderer());

    let result = builder.build().await?;

    tracing::info!(
        "Built {} pages in {}ms ({} removed during build)",
        result.pages,
        result.duration_ms,
        result.not_found
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
