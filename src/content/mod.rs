//! Content query layer.
//!
//! Every read the site makes goes through [`ContentStore`]. A store only has
//! to answer one raw operation, [`ContentStore::fetch`], which takes a
//! [`Query`] and returns the store's JSON result. The typed operations are
//! provided methods that decode that JSON through the same boundary
//! functions, so the live client and the offline export store validate
//! documents identically.
//!
//! Three implementations:
//!
//! | Store | Purpose |
//! |-------|---------|
//! | [`client::SanityClient`] | GROQ over HTTP against the hosted dataset |
//! | [`memory::MemoryStore`] | A dataset export held in memory (offline serving, tests) |
//! | [`cached::CachedStore`] | Revalidation window around either of the above |
//!
//! Not-found is never an error: single-document lookups return `Ok(None)`
//! and listings return an empty `Vec`. An `Err` always means the data is
//! unavailable.

pub mod cached;
pub mod client;
pub mod memory;
pub mod queries;

use crate::richtext::RichText;
use crate::types::{NavPage, PageDocument, ProjectCard, ProjectDocument, SiteSettings};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub use cached::CachedStore;
pub use client::SanityClient;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("content request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content store responded {status}: {body}")]
    HttpResponse { status: u16, body: String },
    #[error("content payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {kind} document: {reason}")]
    Invalid { kind: &'static str, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One content operation with its parameter.
///
/// Doubles as the revalidation cache key, so two calls with the same
/// operation and parameter share a cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    PageBySlug(String),
    ProjectBySlug(String),
    FeaturedProjects,
    ProjectsByTag(String),
    SiteSettings,
    SiteDescription,
    NavPages,
}

impl Query {
    /// The GROQ text for this operation. Parameters are never interpolated.
    pub fn groq(&self) -> &'static str {
        match self {
            Query::PageBySlug(_) => queries::PAGE_BY_SLUG,
            Query::ProjectBySlug(_) => queries::PROJECT_BY_SLUG,
            Query::FeaturedProjects => queries::FEATURED_PROJECTS,
            Query::ProjectsByTag(_) => queries::PROJECTS_BY_TAG,
            Query::SiteSettings => queries::SITE_SETTINGS,
            Query::SiteDescription => queries::SITE_DESCRIPTION,
            Query::NavPages => queries::NAV_PAGES,
        }
    }

    /// Named parameters as `(name, value)` pairs, without the `$` sigil.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            Query::PageBySlug(slug) | Query::ProjectBySlug(slug) => vec![("slug", slug.as_str())],
            Query::ProjectsByTag(tag) => vec![("tag", tag.as_str())],
            Query::FeaturedProjects
            | Query::SiteSettings
            | Query::SiteDescription
            | Query::NavPages => Vec::new(),
        }
    }

    /// Short operation name for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Query::PageBySlug(_) => "page",
            Query::ProjectBySlug(_) => "project",
            Query::FeaturedProjects => "featured-projects",
            Query::ProjectsByTag(_) => "tag-projects",
            Query::SiteSettings => "site-settings",
            Query::SiteDescription => "site-description",
            Query::NavPages => "nav-pages",
        }
    }
}

/// Read access to portfolio content.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run one query and return the raw JSON result (`null` when a
    /// single-document query matches nothing).
    async fn fetch(&self, query: &Query) -> Result<Value, ContentError>;

    async fn page_by_slug(&self, slug: &str) -> Result<Option<PageDocument>, ContentError> {
        let value = self.fetch(&Query::PageBySlug(slug.to_string())).await?;
        decode_one(value, "page")
    }

    async fn project_by_slug(&self, slug: &str) -> Result<Option<ProjectDocument>, ContentError> {
        let value = self.fetch(&Query::ProjectBySlug(slug.to_string())).await?;
        decode_one(value, "project")
    }

    /// Featured projects, newest first.
    async fn featured_projects(&self) -> Result<Vec<ProjectCard>, ContentError> {
        let value = self.fetch(&Query::FeaturedProjects).await?;
        decode_list(value, "project")
    }

    /// Every project carrying `tag` (exact match), newest first.
    async fn projects_by_tag(&self, tag: &str) -> Result<Vec<ProjectCard>, ContentError> {
        let value = self.fetch(&Query::ProjectsByTag(tag.to_string())).await?;
        decode_list(value, "project")
    }

    async fn site_settings(&self) -> Result<Option<SiteSettings>, ContentError> {
        let value = self.fetch(&Query::SiteSettings).await?;
        decode_one(value, "siteSettings")
    }

    /// Pages with a defined slug, in content order.
    async fn nav_pages(&self) -> Result<Vec<NavPage>, ContentError> {
        let value = self.fetch(&Query::NavPages).await?;
        decode_list(value, "page")
    }

    /// The home page introduction from the settings singleton.
    async fn site_description(&self) -> Result<Option<RichText>, ContentError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Projection {
            #[serde(default)]
            site_description: Option<RichText>,
        }

        let value = self.fetch(&Query::SiteDescription).await?;
        let projection: Option<Projection> = decode_one(value, "siteSettings")?;
        Ok(projection.and_then(|p| p.site_description))
    }
}

/// Decode a single-document result. `null` is not-found; a payload that
/// fails validation is an error, never a silently defaulted document.
pub fn decode_one<T: DeserializeOwned>(
    value: Value,
    kind: &'static str,
) -> Result<Option<T>, ContentError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ContentError::Invalid {
            kind,
            reason: e.to_string(),
        })
}

/// Decode a listing result. Entries that fail validation are skipped with a
/// warning so one bad document does not take down a whole listing.
pub fn decode_list<T: DeserializeOwned>(
    value: Value,
    kind: &'static str,
) -> Result<Vec<T>, ContentError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ContentError::Invalid {
                kind,
                reason: format!("expected an array, got {}", json_type(&other)),
            });
        }
    };

    let mut decoded = Vec::with_capacity(items.len());
    for item in items {
        let id = item
            .get("_id")
            .and_then(Value::as_str)
            .unwrap_or("<no id>")
            .to_string();
        match serde_json::from_value(item) {
            Ok(doc) => decoded.push(doc),
            Err(e) => warn!(kind, id = %id, error = %e, "skipping invalid document"),
        }
    }
    Ok(decoded)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
