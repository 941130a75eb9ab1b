//! Image CDN URL builder.

use crate::asset::{asset_id, AssetError};
use crate::blocks::ImageValue;

/// Default image CDN.
pub const DEFAULT_CDN_URL: &str = "https://cdn.sanity.io";

/// How the CDN fits the image into the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Clip,
    Crop,
    Fill,
    FillMax,
    /// Preserve aspect ratio and never upscale
    Max,
    Scale,
    Min,
}

impl Fit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Crop => "crop",
            Self::Fill => "fill",
            Self::FillMax => "fillmax",
            Self::Max => "max",
            Self::Scale => "scale",
            Self::Min => "min",
        }
    }
}

/// Automatic transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auto {
    /// Negotiate the output format with the browser
    Format,
}

impl Auto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format",
        }
    }
}

/// Builds CDN URLs for images in one project and dataset.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_CDN_URL.to_string(),
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// Use a different CDN host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Start a URL for the given image.
    pub fn image<'a>(&'a self, source: &'a ImageValue) -> ImageUrl<'a> {
        ImageUrl {
            builder: self,
            source,
            width: None,
            height: None,
            fit: None,
            auto: None,
        }
    }
}

/// A URL under construction. Call [`ImageUrl::url`] to finish it.
#[derive(Debug, Clone)]
pub struct ImageUrl<'a> {
    builder: &'a ImageUrlBuilder,
    source: &'a ImageValue,
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<Fit>,
    auto: Option<Auto>,
}

impl ImageUrl<'_> {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn auto(mut self, auto: Auto) -> Self {
        self.auto = Some(auto);
        self
    }

    /// Produce the final URL.
    pub fn url(&self) -> Result<String, AssetError> {
        let id = asset_id(self.source)?;

        let mut params = Vec::new();

        if let Some(crop) = self.source.crop.filter(|c| !c.is_empty()) {
            let width = f64::from(id.width);
            let height = f64::from(id.height);
            let left = (crop.left * width).round();
            let top = (crop.top * height).round();
            let rect_width = (width - crop.right * width - left).round();
            let rect_height = (height - crop.bottom * height - top).round();
            params.push(format!(
                "rect={},{},{},{}",
                left as u32, top as u32, rect_width as u32, rect_height as u32
            ));
        }
        if let Some(width) = self.width {
            params.push(format!("w={width}"));
        }
        if let Some(height) = self.height {
            params.push(format!("h={height}"));
        }
        if let Some(fit) = self.fit {
            params.push(format!("fit={}", fit.as_str()));
        }
        if let Some(auto) = self.auto {
            params.push(format!("auto={}", auto.as_str()));
        }

        let mut url = format!(
            "{}/images/{}/{}/{}",
            self.builder.base_url.trim_end_matches('/'),
            self.builder.project_id,
            self.builder.dataset,
            id.file_name()
        );
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        Ok(url)
    }
}

/// Start a URL with the site defaults: fit `max`, auto `format`.
pub fn url_for_image<'a>(builder: &'a ImageUrlBuilder, source: &'a ImageValue) -> ImageUrl<'a> {
    builder.image(source).auto(Auto::Format).fit(Fit::Max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Crop;
    use pretty_assertions::assert_eq;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("proj", "production")
    }

    #[test]
    fn builds_plain_url() {
        let image = ImageValue::from_ref("image-abc-800x400-png");
        let url = builder().image(&image).url().unwrap();

        assert_eq!(url, "https://cdn.sanity.io/images/proj/production/abc-800x400.png");
    }

    #[test]
    fn orders_transform_params() {
        let image = ImageValue::from_ref("image-abc-800x400-png");
        let url = builder()
            .image(&image)
            .auto(Auto::Format)
            .fit(Fit::Max)
            .width(800)
            .url()
            .unwrap();

        assert_eq!(
            url,
            "https://cdn.sanity.io/images/proj/production/abc-800x400.png?w=800&fit=max&auto=format"
        );
    }

    #[test]
    fn applies_crop_rect() {
        let image = ImageValue {
            crop: Some(Crop {
                top: 0.1,
                bottom: 0.1,
                left: 0.25,
                right: 0.25,
            }),
            ..ImageValue::from_ref("image-abc-1000x500-jpg")
        };

        let url = url_for_image(&builder(), &image).url().unwrap();

        assert_eq!(
            url,
            "https://cdn.sanity.io/images/proj/production/abc-1000x500.jpg?rect=250,50,500,400&fit=max&auto=format"
        );
    }

    #[test]
    fn ignores_empty_crop() {
        let image = ImageValue {
            crop: Some(Crop::default()),
            ..ImageValue::from_ref("image-abc-10x10-jpg")
        };

        let url = builder().image(&image).height(5).url().unwrap();

        assert!(url.ends_with("abc-10x10.jpg?h=5"));
    }

    #[test]
    fn fails_without_asset() {
        let image = ImageValue::default();
        assert!(builder().image(&image).url().is_err());
    }
}
