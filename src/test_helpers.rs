//! Shared test utilities.
//!
//! Builders for the document types, a default render context, and a
//! [`MemoryStore`] loaded from `fixtures/export.ndjson`.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = project_doc("tidal", "Tidal", "2023-05-01");
//! let html = render_ctx(|ctx| render_project(ctx, &project, "/project/tidal"));
//! assert!(html.contains("Tidal"));
//! ```

use chrono::NaiveDate;
use maud::Markup;

use crate::config::SiteConfig;
use crate::content::MemoryStore;
use crate::image::ImageUrlBuilder;
use crate::render::{Chrome, RenderContext};
use crate::types::{
    AssetMetadata, AssetRef, Dimensions, ImageAsset, ImageRef, PageDocument, ProjectCard,
    ProjectDocument,
};

// =========================================================================
// Images
// =========================================================================

/// An image holding a bare asset reference.
pub fn image_ref(asset_id: &str) -> ImageRef {
    ImageRef {
        asset: Some(AssetRef::Reference {
            id: asset_id.to_string(),
        }),
        ..ImageRef::default()
    }
}

/// An image whose asset was dereferenced, with mime type and dimensions
/// taken from the id (`image-{hash}-{w}x{h}-{ext}`).
pub fn resolved_image_ref(asset_id: &str, lqip: Option<&str>) -> ImageRef {
    let mut parts = asset_id.rsplitn(3, '-');
    let ext = parts.next().unwrap_or("jpg");
    let (width, height) = parts
        .next()
        .and_then(|dims| dims.split_once('x'))
        .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
        .unwrap_or((1, 1));
    let mime = match ext {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/jpeg",
    };

    ImageRef {
        asset: Some(AssetRef::Resolved(ImageAsset {
            id: asset_id.to_string(),
            url: None,
            mime_type: Some(mime.to_string()),
            metadata: Some(AssetMetadata {
                lqip: lqip.map(String::from),
                dimensions: Some(Dimensions {
                    width,
                    height,
                    aspect_ratio: Some(width as f64 / height as f64),
                }),
            }),
        })),
        ..ImageRef::default()
    }
}

pub fn test_images() -> ImageUrlBuilder {
    ImageUrlBuilder::new("https://cdn.sanity.io", "abc123", "production")
}

// =========================================================================
// Documents
// =========================================================================

pub fn date(iso: &str) -> NaiveDate {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").unwrap()
}

fn slugify(title: &str) -> String {
    title.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// A listing card whose slug is derived from the title.
pub fn card(id: &str, title: &str, iso_date: &str) -> ProjectCard {
    ProjectCard {
        id: id.to_string(),
        title: title.to_string(),
        slug: slugify(title),
        date: date(iso_date),
        featured_image: image_ref(&format!("image-{id}-10x10-jpg")),
    }
}

pub fn project_doc(slug: &str, title: &str, iso_date: &str) -> ProjectDocument {
    ProjectDocument {
        id: format!("project-{slug}"),
        title: title.to_string(),
        slug: slug.to_string(),
        description: None,
        date: date(iso_date),
        featured_image: image_ref(&format!("image-{slug}-10x10-jpg")),
        additional_images: Vec::new(),
        is_featured: false,
        tags: Vec::new(),
    }
}

/// A page with nothing but a title and slug.
pub fn page_doc(slug: &str, title: &str) -> PageDocument {
    PageDocument {
        id: format!("page-{slug}"),
        title: title.to_string(),
        slug: slug.to_string(),
        body: None,
        featured_image: None,
        additional_images: Vec::new(),
        email: None,
        phone_number: None,
        social_links: Vec::new(),
    }
}

// =========================================================================
// Rendering
// =========================================================================

/// Render with the fallback layout and default image sizes.
pub fn render_ctx<F>(render: F) -> String
where
    F: FnOnce(RenderContext<'_>) -> Markup,
{
    let config = SiteConfig::default();
    let chrome = Chrome::fallback(&config);
    let images = test_images();
    render(RenderContext {
        chrome: &chrome,
        images: &images,
        sizes: &config.images,
    })
    .into_string()
}

// =========================================================================
// Content
// =========================================================================

/// The sample dataset in `fixtures/export.ndjson`.
pub fn fixture_store() -> MemoryStore {
    MemoryStore::parse_export(include_str!("../fixtures/export.ndjson")).unwrap()
}
