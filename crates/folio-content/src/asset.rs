//! Image asset references.
//!
//! Image asset ids encode the asset's hash, intrinsic size and file format:
//! `image-<hash>-<width>x<height>-<format>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::blocks::ImageValue;

static ASSET_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^image-([A-Za-z0-9_]+)-(\d+)x(\d+)-([a-z0-9]+)$").expect("valid asset id pattern")
});

/// A parsed image asset id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId {
    pub hash: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetId {
    /// File name of the original asset on the CDN.
    pub fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.hash, self.width, self.height, self.format)
    }
}

/// Intrinsic size of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

/// Errors that can occur when resolving an asset reference.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Image has no asset reference")]
    MissingAsset,

    #[error("Invalid image asset id: {0}")]
    InvalidAssetId(String),

    #[error("Image asset has a zero dimension: {0}")]
    ZeroDimension(String),
}

/// Parse an image asset id.
pub fn parse_asset_id(id: &str) -> Result<AssetId, AssetError> {
    let caps = ASSET_ID
        .captures(id)
        .ok_or_else(|| AssetError::InvalidAssetId(id.to_string()))?;

    let dimension = |index: usize| {
        caps[index]
            .parse::<u32>()
            .map_err(|_| AssetError::InvalidAssetId(id.to_string()))
    };

    let width = dimension(2)?;
    let height = dimension(3)?;

    if width == 0 || height == 0 {
        return Err(AssetError::ZeroDimension(id.to_string()));
    }

    Ok(AssetId {
        hash: caps[1].to_string(),
        width,
        height,
        format: caps[4].to_string(),
    })
}

/// Resolve the asset id an image points at.
pub fn asset_id(image: &ImageValue) -> Result<AssetId, AssetError> {
    let reference = image.asset.as_ref().ok_or(AssetError::MissingAsset)?;
    parse_asset_id(&reference.reference)
}

/// Resolve the intrinsic width, height and aspect ratio of an image.
pub fn image_dimensions(image: &ImageValue) -> Result<Dimensions, AssetError> {
    let id = asset_id(image)?;

    Ok(Dimensions {
        width: id.width,
        height: id.height,
        aspect_ratio: f64::from(id.width) / f64::from(id.height),
    })
}
