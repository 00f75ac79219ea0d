//! In-memory content store backed by a dataset export.
//!
//! Exports are NDJSON (one document per line, as produced by the content
//! CLI's dataset export) or a single JSON array. Each [`Query`] is evaluated
//! directly against the documents, producing the same JSON shape the GROQ
//! projection would return: projected-but-absent fields are `null`, image
//! assets are dereferenced to their `sanity.imageAsset` document, and draft
//! documents (`drafts.` ids) are invisible.

use super::{ContentError, ContentStore, Query};
use crate::types::SITE_SETTINGS_ID;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DRAFT_PREFIX: &str = "drafts.";

/// Field lists for each projection.
const PAGE_FIELDS: &[Field] = &[
    Field::Plain("_id"),
    Field::Plain("title"),
    Field::Plain("slug"),
    Field::Plain("body"),
    Field::Image("featuredImage"),
    Field::Images("additionalImages"),
    Field::Plain("email"),
    Field::Plain("phoneNumber"),
    Field::Plain("socialLinks"),
];

const PROJECT_FIELDS: &[Field] = &[
    Field::Plain("_id"),
    Field::Plain("title"),
    Field::Plain("slug"),
    Field::Plain("description"),
    Field::Plain("date"),
    Field::Image("featuredImage"),
    Field::Images("additionalImages"),
    Field::Plain("isFeatured"),
    Field::Plain("tags"),
];

const CARD_FIELDS: &[Field] = &[
    Field::Plain("_id"),
    Field::Plain("title"),
    Field::Plain("slug"),
    Field::Plain("date"),
    Field::Image("featuredImage"),
];

const SETTINGS_FIELDS: &[Field] = &[
    Field::Plain("siteTitle"),
    Field::Plain("backgroundColor"),
    Field::Plain("fontColor"),
    Field::Plain("fontLinkColor"),
    Field::Image("favicon"),
];

const DESCRIPTION_FIELDS: &[Field] = &[Field::Plain("siteDescription")];

const NAV_FIELDS: &[Field] = &[Field::Plain("title"), Field::Plain("slug")];

#[derive(Debug, Clone, Copy)]
enum Field {
    Plain(&'static str),
    /// An image object whose `asset._ref` is dereferenced.
    Image(&'static str),
    /// An array of image objects, each dereferenced.
    Images(&'static str),
}

/// Content store over a fixed set of documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Value>,
    by_id: HashMap<String, usize>,
}

impl MemoryStore {
    /// Build a store from raw documents. Drafts and non-objects are dropped.
    pub fn new(documents: impl IntoIterator<Item = Value>) -> Self {
        let documents: Vec<Value> = documents
            .into_iter()
            .filter(|doc| doc.is_object() && !id_of(doc).is_some_and(|id| id.starts_with(DRAFT_PREFIX)))
            .collect();
        let by_id = documents
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| id_of(doc).map(|id| (id.to_string(), i)))
            .collect();
        Self { documents, by_id }
    }

    /// Load an export file.
    pub fn from_export(path: &Path) -> Result<Self, ContentError> {
        let text = fs::read_to_string(path)?;
        let store = Self::parse_export(&text)?;
        info!(path = %path.display(), documents = store.len(), "loaded dataset export");
        Ok(store)
    }

    /// Parse export text: a JSON array, or NDJSON with blank lines ignored.
    pub fn parse_export(text: &str) -> Result<Self, ContentError> {
        if text.trim_start().starts_with('[') {
            let documents: Vec<Value> = serde_json::from_str(text)?;
            return Ok(Self::new(documents));
        }

        let mut documents = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let doc = serde_json::from_str(line).map_err(|e| ContentError::Invalid {
                kind: "export",
                reason: format!("line {}: {e}", n + 1),
            })?;
            documents.push(doc);
        }
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn of_type<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.documents
            .iter()
            .filter(move |doc| doc.get("_type").and_then(Value::as_str) == Some(kind))
    }

    fn first_by_slug(&self, kind: &str, slug: &str, fields: &[Field]) -> Value {
        self.of_type(kind)
            .find(|doc| slug_current(doc) == Some(slug))
            .map_or(Value::Null, |doc| self.project(doc, fields))
    }

    fn projects_newest_first<F>(&self, keep: F) -> Value
    where
        F: Fn(&Value) -> bool,
    {
        let mut matches: Vec<&Value> = self.of_type("project").filter(|doc| keep(doc)).collect();
        matches.sort_by(|a, b| date_desc(a, b));
        Value::Array(matches.into_iter().map(|doc| self.project(doc, CARD_FIELDS)).collect())
    }

    fn settings(&self, fields: &[Field]) -> Value {
        self.by_id
            .get(SITE_SETTINGS_ID)
            .map(|&i| &self.documents[i])
            .filter(|doc| doc.get("_type").and_then(Value::as_str) == Some("siteSettings"))
            .map_or(Value::Null, |doc| self.project(doc, fields))
    }

    fn project(&self, doc: &Value, fields: &[Field]) -> Value {
        let mut out = Map::new();
        for field in fields {
            let (name, value) = match *field {
                Field::Plain(name) => (name, doc.get(name).cloned().unwrap_or(Value::Null)),
                Field::Image(name) => (
                    name,
                    doc.get(name).map_or(Value::Null, |img| self.dereference_image(img)),
                ),
                Field::Images(name) => (
                    name,
                    match doc.get(name) {
                        Some(Value::Array(images)) => Value::Array(
                            images.iter().map(|img| self.dereference_image(img)).collect(),
                        ),
                        _ => Value::Null,
                    },
                ),
            };
            out.insert(name.to_string(), value);
        }
        Value::Object(out)
    }

    /// Replace `asset: {"_ref": id}` with the referenced asset document.
    /// A dangling reference becomes `null`, as it does in the hosted store.
    fn dereference_image(&self, image: &Value) -> Value {
        let mut image = image.clone();
        let Some(obj) = image.as_object_mut() else {
            return image;
        };
        let target = obj
            .get("asset")
            .and_then(|a| a.get("_ref"))
            .and_then(Value::as_str)
            .map(|id| self.by_id.get(id).map(|&i| self.documents[i].clone()));
        if let Some(resolved) = target {
            obj.insert("asset".to_string(), resolved.unwrap_or(Value::Null));
        }
        image
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, query: &Query) -> Result<Value, ContentError> {
        let result = match query {
            Query::PageBySlug(slug) => self.first_by_slug("page", slug, PAGE_FIELDS),
            Query::ProjectBySlug(slug) => self.first_by_slug("project", slug, PROJECT_FIELDS),
            Query::FeaturedProjects => self.projects_newest_first(|doc| {
                doc.get("isFeatured").and_then(Value::as_bool) == Some(true)
            }),
            Query::ProjectsByTag(tag) => self.projects_newest_first(|doc| {
                doc.get("tags")
                    .and_then(Value::as_array)
                    .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag.as_str())))
            }),
            Query::SiteSettings => self.settings(SETTINGS_FIELDS),
            Query::SiteDescription => self.settings(DESCRIPTION_FIELDS),
            Query::NavPages => Value::Array(
                self.of_type("page")
                    .filter(|doc| slug_current(doc).is_some())
                    .map(|doc| self.project(doc, NAV_FIELDS))
                    .collect(),
            ),
        };
        debug!(kind = query.kind(), "memory query");
        Ok(result)
    }
}

fn id_of(doc: &Value) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

fn slug_current(doc: &Value) -> Option<&str> {
    doc.pointer("/slug/current").and_then(Value::as_str)
}

/// `order(date desc)`: ISO dates compare as strings; missing dates sort last.
fn date_desc(a: &Value, b: &Value) -> Ordering {
    let date = |doc: &Value| doc.get("date").and_then(Value::as_str).map(str::to_string);
    match (date(a), date(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            json!({"_id": "image-aaa-800x600-jpg", "_type": "sanity.imageAsset",
                   "mimeType": "image/jpeg", "metadata": {"lqip": "data:image/jpeg;base64,AA"}}),
            json!({"_id": "p-old", "_type": "project", "title": "Old", "slug": {"current": "old"},
                   "date": "2019-01-01", "isFeatured": true, "tags": ["film"],
                   "featuredImage": {"asset": {"_ref": "image-aaa-800x600-jpg"}}}),
            json!({"_id": "p-new", "_type": "project", "title": "New", "slug": {"current": "new"},
                   "date": "2023-01-01", "isFeatured": true, "tags": ["film", "print"],
                   "featuredImage": {"asset": {"_ref": "image-missing-1x1-jpg"}}}),
            json!({"_id": "p-hidden", "_type": "project", "title": "Hidden", "slug": {"current": "hidden"},
                   "date": "2021-01-01", "tags": ["print"],
                   "featuredImage": {"asset": {"_ref": "image-aaa-800x600-jpg"}}}),
            json!({"_id": "drafts.p-new", "_type": "project", "title": "Draft", "slug": {"current": "new"},
                   "date": "2024-01-01", "isFeatured": true}),
            json!({"_id": "page-about", "_type": "page", "title": "About", "slug": {"current": "about"}}),
            json!({"_id": "page-noslug", "_type": "page", "title": "Orphan"}),
            json!({"_id": "siteSettings", "_type": "siteSettings", "siteTitle": "Studio",
                   "siteDescription": [{"_type": "block", "children": [{"text": "hi"}]}]}),
        ])
    }

    #[tokio::test]
    async fn featured_projects_are_newest_first_without_drafts() {
        let value = store().fetch(&Query::FeaturedProjects).await.unwrap();
        let ids: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["p-new", "p-old"]);
    }

    #[tokio::test]
    async fn tag_filter_is_exact_membership() {
        let s = store();
        let print = s.projects_by_tag("print").await.unwrap();
        assert_eq!(
            print.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["p-new", "p-hidden"]
        );
        assert!(s.projects_by_tag("Print").await.unwrap().is_empty());
        assert!(s.projects_by_tag("fil").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tag_listing_members_carry_the_tag() {
        let s = store();
        for tag in ["film", "print"] {
            for card in s.projects_by_tag(tag).await.unwrap() {
                let project = s.project_by_slug(&card.slug).await.unwrap().unwrap();
                assert!(project.has_tag(tag), "{} lacks {tag}", project.id);
            }
        }
    }

    #[tokio::test]
    async fn images_are_dereferenced() {
        let value = store()
            .fetch(&Query::ProjectBySlug("old".into()))
            .await
            .unwrap();
        assert_eq!(value["featuredImage"]["asset"]["mimeType"], "image/jpeg");
        assert_eq!(value["additionalImages"], Value::Null);
        assert_eq!(value["description"], Value::Null);
    }

    #[tokio::test]
    async fn dangling_asset_reference_becomes_null() {
        let value = store()
            .fetch(&Query::ProjectBySlug("new".into()))
            .await
            .unwrap();
        assert_eq!(value["title"], "New");
        assert_eq!(value["featuredImage"]["asset"], Value::Null);
    }

    #[tokio::test]
    async fn missing_slug_is_not_found() {
        let s = store();
        assert!(s.page_by_slug("nope").await.unwrap().is_none());
        assert!(s.project_by_slug("nope").await.unwrap().is_none());
        assert!(s.page_by_slug("about").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn nav_pages_require_a_slug() {
        let pages = store().nav_pages().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].slug.as_deref(), Some("about"));
    }

    #[tokio::test]
    async fn settings_and_description() {
        let s = store();
        let settings = s.site_settings().await.unwrap().unwrap();
        assert_eq!(settings.site_title.as_deref(), Some("Studio"));
        assert!(settings.site_description.is_none());
        let description = s.site_description().await.unwrap().unwrap();
        assert_eq!(description.len(), 1);
    }

    #[tokio::test]
    async fn missing_settings_is_none() {
        let empty = MemoryStore::default();
        assert!(empty.site_settings().await.unwrap().is_none());
        assert!(empty.site_description().await.unwrap().is_none());
        assert!(empty.featured_projects().await.unwrap().is_empty());
    }

    #[test]
    fn parses_ndjson_and_array_exports() {
        let ndjson = "{\"_id\": \"a\", \"_type\": \"page\"}\n\n{\"_id\": \"b\", \"_type\": \"page\"}\n";
        assert_eq!(MemoryStore::parse_export(ndjson).unwrap().len(), 2);

        let array = r#"[{"_id": "a", "_type": "page"}, {"_id": "drafts.a", "_type": "page"}]"#;
        assert_eq!(MemoryStore::parse_export(array).unwrap().len(), 1);
    }

    #[test]
    fn bad_ndjson_line_reports_line_number() {
        let err = MemoryStore::parse_export("{\"_id\": \"a\"}\n{oops\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
