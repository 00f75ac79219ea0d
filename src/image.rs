//! Image reference resolution.
//!
//! Turns an [`ImageRef`] plus display parameters into an asset CDN URL.
//! Asset ids encode everything needed to address the original file:
//!
//! ```text
//! image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg
//!       └────────── hash ──────┘ └ dims ─┘ └ext┘
//! ```
//!
//! which maps to
//!
//! ```text
//! {cdn}/images/{project}/{dataset}/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg?fit=max&auto=format
//! ```
//!
//! Resolution never fails loudly: an absent image, an image without an
//! asset, or an id that does not parse all yield `None`, and callers render
//! their placeholder block instead.

use crate::types::{Crop, ImageRef};
use std::fmt;

/// How the CDN fits the image into the requested box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fit {
    #[default]
    Max,
    Clip,
    Crop,
    Fill,
    FillMax,
    Min,
    Scale,
}

impl Fit {
    fn as_str(self) -> &'static str {
        match self {
            Fit::Max => "max",
            Fit::Clip => "clip",
            Fit::Crop => "crop",
            Fit::Fill => "fill",
            Fit::FillMax => "fillmax",
            Fit::Min => "min",
            Fit::Scale => "scale",
        }
    }
}

/// Output format. `Auto` lets the CDN negotiate from the `Accept` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Auto,
    Jpg,
    Png,
    Webp,
}

/// Display parameters for a single image URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<Fit>,
    pub format: Option<Format>,
}

impl ImageOptions {
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn square(size: u32) -> Self {
        Self {
            width: Some(size),
            height: Some(size),
            ..Self::default()
        }
    }
}

/// The parts of an asset id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId<'a> {
    pub hash: &'a str,
    pub width: u32,
    pub height: u32,
    pub extension: &'a str,
}

impl<'a> AssetId<'a> {
    /// Parse `image-<hash>-<w>x<h>-<ext>`. Returns `None` for anything else.
    pub fn parse(id: &'a str) -> Option<Self> {
        let rest = id.strip_prefix("image-")?;
        let mut parts = rest.rsplitn(3, '-');
        let extension = parts.next()?;
        let dims = parts.next()?;
        let hash = parts.next()?;
        let (w, h) = dims.split_once('x')?;
        let width = w.parse().ok()?;
        let height = h.parse().ok()?;
        if hash.is_empty() || extension.is_empty() || width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            hash,
            width,
            height,
            extension,
        })
    }
}

impl fmt::Display for AssetId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}x{}.{}",
            self.hash, self.width, self.height, self.extension
        )
    }
}

/// Builds CDN URLs for one project/dataset.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(base_url: &str, project_id: &str, dataset: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
        }
    }

    /// Resolve an image to a URL, or `None` when there is nothing to show.
    pub fn resolve(&self, image: Option<&ImageRef>, options: &ImageOptions) -> Option<String> {
        let image = image?;
        let asset = AssetId::parse(image.asset_id()?)?;

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(rect) = image.crop.as_ref().and_then(|c| crop_rect(c, &asset)) {
            params.push(("rect", rect));
        }
        if let Some(w) = options.width {
            params.push(("w", w.to_string()));
        }
        if let Some(h) = options.height {
            params.push(("h", h.to_string()));
        }
        params.push(("fit", options.fit.unwrap_or_default().as_str().to_string()));
        match options.format.unwrap_or_default() {
            Format::Auto => params.push(("auto", "format".to_string())),
            Format::Jpg => params.push(("fm", "jpg".to_string())),
            Format::Png => params.push(("fm", "png".to_string())),
            Format::Webp => params.push(("fm", "webp".to_string())),
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        Some(format!(
            "{}/images/{}/{}/{}?{}",
            self.base_url, self.project_id, self.dataset, asset, query
        ))
    }
}

/// The low-quality placeholder, if the asset was resolved with metadata.
pub fn placeholder(image: Option<&ImageRef>) -> Option<&str> {
    image?
        .resolved()?
        .metadata
        .as_ref()?
        .lqip
        .as_deref()
        .filter(|s| !s.is_empty())
}

/// The asset's mime type, if resolved.
pub fn mime_type(image: Option<&ImageRef>) -> Option<&str> {
    image?.resolved()?.mime_type.as_deref()
}

/// Convert fractional crop insets into a pixel `rect` parameter.
fn crop_rect(crop: &Crop, asset: &AssetId<'_>) -> Option<String> {
    if crop.is_empty() {
        return None;
    }
    let (w, h) = (f64::from(asset.width), f64::from(asset.height));
    let left = (crop.left * w).round();
    let top = (crop.top * h).round();
    let width = ((1.0 - crop.left - crop.right) * w).round();
    let height = ((1.0 - crop.top - crop.bottom) * h).round();
    if width <= 0.0 || height <= 0.0 || left < 0.0 || top < 0.0 {
        return None;
    }
    Some(format!(
        "{},{},{},{}",
        left as u32, top as u32, width as u32, height as u32
    ))
}
