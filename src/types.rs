//! Document shapes returned by the content store.
//!
//! Everything here is read-only: the site never writes back to the store.
//! The store hands out loosely-typed JSON where any projected field may come
//! back as `null`, so decoding is where required and optional fields get
//! sorted out. Renderers only ever see these validated structs.

use crate::richtext::RichText;
use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Fixed document id of the site settings singleton.
pub const SITE_SETTINGS_ID: &str = "siteSettings";

/// A generic page (about, contact, colophon...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "required_slug")]
    pub slug: String,
    #[serde(default)]
    pub body: Option<RichText>,
    #[serde(default)]
    pub featured_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_images: Vec<ImageRef>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_links: Vec<SocialLink>,
}

impl PageDocument {
    /// Whether any contact detail is present. An empty string counts as absent.
    pub fn has_contact_details(&self) -> bool {
        non_empty(self.email.as_deref()).is_some()
            || non_empty(self.phone_number.as_deref()).is_some()
            || !self.social_links.is_empty()
    }
}

/// A portfolio project with its full detail fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "required_slug")]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub featured_image: ImageRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_images: Vec<ImageRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,
    /// Display order is authoring order; filtering only cares about membership.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl ProjectDocument {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The listing projection of a project, used by the home grid and tag pages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "required_slug")]
    pub slug: String,
    pub date: NaiveDate,
    pub featured_image: ImageRef,
}

/// Site-wide settings, stored as a singleton document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub site_title: Option<String>,
    #[serde(default)]
    pub site_description: Option<RichText>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub font_color: Option<String>,
    #[serde(default)]
    pub font_link_color: Option<String>,
    #[serde(default)]
    pub favicon: Option<ImageRef>,
}

/// The navigation projection of a page: just enough to build a link.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NavPage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "optional_slug")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SocialLink {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    pub platform: String,
    pub url: String,
}

/// An image field: a reference to an asset plus optional crop/hotspot.
///
/// The asset may be a bare reference (`{"_ref": "image-…"}`) when the query
/// did not dereference it, or the resolved asset document when it did.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub crop: Option<Crop>,
    #[serde(default)]
    pub hotspot: Option<Hotspot>,
}

impl ImageRef {
    /// The asset id, whichever form the asset arrived in.
    pub fn asset_id(&self) -> Option<&str> {
        match self.asset.as_ref()? {
            AssetRef::Resolved(asset) => Some(asset.id.as_str()),
            AssetRef::Reference { id } => Some(id.as_str()),
        }
    }

    /// Resolved asset metadata, if the query dereferenced the asset.
    pub fn resolved(&self) -> Option<&ImageAsset> {
        match self.asset.as_ref()? {
            AssetRef::Resolved(asset) => Some(asset),
            AssetRef::Reference { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AssetRef {
    Resolved(ImageAsset),
    Reference {
        #[serde(rename = "_ref")]
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<AssetMetadata>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetMetadata {
    /// Low-quality image placeholder, a base64 data URI.
    #[serde(default)]
    pub lqip: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

/// Crop insets as fractions of the source image (0.0 = no crop on that edge).
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Crop {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

impl Crop {
    pub fn is_empty(&self) -> bool {
        self.top == 0.0 && self.bottom == 0.0 && self.left == 0.0 && self.right == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// A derived navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Wire-format helpers
// ============================================================================

/// Decode `null` as the type's default (empty sequence, `false`).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Slugs are stored as `{"_type": "slug", "current": "about"}`; plain strings
/// are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum SlugField {
    Object {
        #[serde(default)]
        current: Option<String>,
    },
    Plain(String),
}

impl SlugField {
    fn into_current(self) -> Option<String> {
        let current = match self {
            SlugField::Object { current } => current,
            SlugField::Plain(s) => Some(s),
        };
        current
            .map(|s| s.trim().trim_matches('/').to_string())
            .filter(|s| !s.is_empty())
    }
}

fn required_slug<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<SlugField>::deserialize(deserializer)?
        .and_then(SlugField::into_current)
        .ok_or_else(|| de::Error::custom("missing slug.current"))
}

fn optional_slug<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SlugField>::deserialize(deserializer)?.and_then(SlugField::into_current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_decodes_null_sequences_as_empty() {
        let project: ProjectDocument = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Tidal",
            "slug": {"_type": "slug", "current": "tidal"},
            "description": null,
            "date": "2023-05-01",
            "featuredImage": {"asset": {"_ref": "image-abc-10x10-jpg"}},
            "additionalImages": null,
            "isFeatured": null,
            "tags": null
        }))
        .unwrap();

        assert_eq!(project.slug, "tidal");
        assert!(project.additional_images.is_empty());
        assert!(project.tags.is_empty());
        assert!(!project.is_featured);
        assert_eq!(project.date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
    }

    #[test]
    fn project_requires_featured_image() {
        let result: Result<ProjectDocument, _> = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Tidal",
            "slug": {"current": "tidal"},
            "date": "2023-05-01",
            "featuredImage": null
        }));
        assert!(result.is_err());
    }

    #[test]
    fn page_requires_slug() {
        let result: Result<PageDocument, _> = serde_json::from_value(json!({
            "_id": "x",
            "title": "About",
            "slug": {"current": null}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn nav_page_tolerates_missing_slug() {
        let page: NavPage = serde_json::from_value(json!({"title": "Draft", "slug": null})).unwrap();
        assert_eq!(page.slug, None);

        let page: NavPage =
            serde_json::from_value(json!({"title": "About", "slug": {"current": "/about/"}}))
                .unwrap();
        assert_eq!(page.slug.as_deref(), Some("about"));
    }

    #[test]
    fn image_asset_reference_and_resolved_forms() {
        let unresolved: ImageRef =
            serde_json::from_value(json!({"asset": {"_ref": "image-abc-10x10-png"}})).unwrap();
        assert_eq!(unresolved.asset_id(), Some("image-abc-10x10-png"));
        assert!(unresolved.resolved().is_none());

        let resolved: ImageRef = serde_json::from_value(json!({
            "_key": "k1",
            "asset": {
                "_id": "image-abc-10x10-png",
                "_type": "sanity.imageAsset",
                "mimeType": "image/png",
                "metadata": {"lqip": "data:image/jpeg;base64,AAA"}
            }
        }))
        .unwrap();
        assert_eq!(resolved.asset_id(), Some("image-abc-10x10-png"));
        let asset = resolved.resolved().unwrap();
        assert_eq!(asset.mime_type.as_deref(), Some("image/png"));
        assert_eq!(
            asset.metadata.as_ref().and_then(|m| m.lqip.as_deref()),
            Some("data:image/jpeg;base64,AAA")
        );
    }

    #[test]
    fn contact_details_ignore_blank_strings() {
        let page: PageDocument = serde_json::from_value(json!({
            "_id": "x",
            "title": "About",
            "slug": "about",
            "email": "  ",
            "phoneNumber": null,
            "socialLinks": null
        }))
        .unwrap();
        assert!(!page.has_contact_details());
    }
}
