//! End-to-end route tests: the axum router over the fixture dataset.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use folio::config::SiteConfig;
use folio::content::{ContentError, ContentStore, MemoryStore, Query};
use folio::server::{AppState, create_router};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

fn fixture_store() -> MemoryStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/export.ndjson");
    MemoryStore::from_export(&path).unwrap()
}

fn app() -> Router {
    let state = AppState::new(Arc::new(fixture_store()), SiteConfig::default()).with_shuffle_seed(11);
    create_router(Arc::new(state))
}

/// A store whose every fetch fails, like an unreachable API.
struct DownStore;

#[async_trait]
impl ContentStore for DownStore {
    async fn fetch(&self, _query: &Query) -> Result<Value, ContentError> {
        Err(ContentError::HttpResponse {
            status: 502,
            body: "bad gateway".into(),
        })
    }
}

struct Fetched {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: String,
}

async fn get(app: Router, uri: &str) -> Fetched {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: Router, request: Request<Body>) -> Fetched {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Fetched {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Card titles in document order.
fn card_titles(html: &str) -> Vec<&str> {
    html.split("<h3>")
        .skip(1)
        .filter_map(|s| s.split("</h3>").next())
        .collect()
}

/// The wide-screen navigation row.
fn nav_bar(html: &str) -> &str {
    let start = html.find(r#"<nav class="nav-bar""#).unwrap();
    let end = start + html[start..].find("</nav>").unwrap();
    &html[start..end]
}

#[tokio::test]
async fn home_lists_featured_projects_newest_first() {
    let res = get(app(), "/").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(card_titles(&res.body), vec!["Tidal", "Dunes", "harbor lights"]);
    assert!(res.body.contains("Photographs of coastlines"));
    assert!(res.body.contains("<strong>Prints available</strong>"));
    assert!(!res.body.contains("Archive"));
}

#[tokio::test]
async fn home_sort_param_reorders_from_the_fetched_set() {
    let alpha = get(app(), "/?sort=alpha").await;
    assert_eq!(card_titles(&alpha.body), vec!["Dunes", "harbor lights", "Tidal"]);

    let oldest = get(app(), "/?sort=oldest").await;
    assert_eq!(card_titles(&oldest.body), vec!["harbor lights", "Dunes", "Tidal"]);

    let unknown = get(app(), "/?sort=sideways").await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(card_titles(&unknown.body), vec!["Tidal", "Dunes", "harbor lights"]);

    let random = get(app(), "/?sort=random").await;
    let mut titles = card_titles(&random.body);
    titles.sort_unstable();
    assert_eq!(titles, vec!["Dunes", "Tidal", "harbor lights"]);
}

#[tokio::test]
async fn layout_comes_from_site_settings() {
    let res = get(app(), "/").await;
    assert!(res.body.contains("<title>Studio Tide</title>"));
    assert!(res.body.contains("--color-background: #f5f0e8"));
    assert!(res.body.contains("--color-link: #8a4b2a"));
    assert!(res.body.contains(r#"type="image/png""#));
    assert!(res.body.contains("fav005-64x64.png?w=32&amp;h=32"));
}

#[tokio::test]
async fn navigation_follows_priority_then_content_order() {
    let res = get(app(), "/").await;
    let nav = nav_bar(&res.body);
    let positions: Vec<usize> = [">Work</a>", ">About</a>", ">Contact</a>", ">Random</a>"]
        .iter()
        .map(|label| nav.find(label).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert!(nav.contains(r#"<a href="/" class="active" aria-current="page">Work</a>"#));
}

#[tokio::test]
async fn page_renders_body_and_grid() {
    let res = get(app(), "/about").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("<title>About | Studio Tide</title>"));
    assert!(res.body.contains(r#"<a href="/contact">contact page</a>"#));
    assert!(res.body.contains("More Images"));
    assert!(!res.body.contains("Contact Details"));
    assert!(nav_bar(&res.body).contains(r#"<a href="/about" class="active" aria-current="page">About</a>"#));
}

#[tokio::test]
async fn contact_page_shows_contact_details() {
    let res = get(app(), "/contact").await;
    assert!(res.body.contains("Contact Details"));
    assert!(res.body.contains(r#"href="mailto:hello@studiotide.example""#));
    assert!(res.body.contains(r#"href="tel:442079460000""#));
    assert!(res.body.contains(r#"target="_blank" rel="noopener noreferrer">Instagram</a>"#));
}

#[tokio::test]
async fn project_renders_viewer_over_resolvable_images() {
    let res = get(app(), "/project/tidal").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("May 1, 2023"));
    assert!(res.body.contains("Six months on the estuary at low water.<br>Shot on medium format film."));
    // Featured, harbor and fog; the dangling reference is skipped.
    assert!(res.body.contains(r#"id="lightbox-2""#));
    assert!(!res.body.contains(r#"id="lightbox-3""#));
    assert!(res.body.contains(r#"href="/tag/coast""#));
    assert!(res.body.contains("All featured projects"));
    assert!(!res.body.contains("Tidal (draft)"));
}

#[tokio::test]
async fn only_featured_projects_link_back_home() {
    let res = get(app(), "/project/archive").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("No Image"));
    assert!(!res.body.contains("All featured projects"));
}

#[tokio::test]
async fn tag_route_decodes_and_filters_exactly() {
    let res = get(app(), "/tag/film%20photo").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(card_titles(&res.body), vec!["harbor lights"]);
    assert!(res.body.contains(r#"<span class="tag-name">film photo</span>"#));

    let film = get(app(), "/tag/film").await;
    assert_eq!(card_titles(&film.body), vec!["Tidal", "Archive"]);
    assert!(film.body.contains("No Image"));
}

#[tokio::test]
async fn tag_without_matches_is_an_empty_listing() {
    let res = get(app(), "/tag/Film").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("No projects found for Film"));
}

#[tokio::test]
async fn missing_documents_are_404_within_the_layout() {
    for uri in ["/nope", "/project/nope", "/a/b/c"] {
        let res = get(app(), uri).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{uri}");
        assert!(res.body.contains("Page not found"));
        assert!(nav_bar(&res.body).contains(">About</a>"));
        assert_eq!(res.headers[header::CACHE_CONTROL], "no-store");
    }
}

#[tokio::test]
async fn store_failure_is_503_not_404() {
    let state = AppState::new(Arc::new(DownStore), SiteConfig::default());
    let app = create_router(Arc::new(state));

    for uri in ["/", "/about", "/project/tidal", "/tag/film"] {
        let res = get(app.clone(), uri).await;
        assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert!(res.body.contains("Temporarily unavailable"));
        assert!(!res.body.contains("bad gateway"));
    }
}

#[tokio::test]
async fn responses_carry_revalidation_headers_and_honor_etags() {
    let first = get(app(), "/about").await;
    assert_eq!(
        first.headers[header::CACHE_CONTROL],
        "public, max-age=0, s-maxage=60"
    );
    let etag = first.headers[header::ETAG].to_str().unwrap().to_string();

    let request = Request::get("/about")
        .header(header::IF_NONE_MATCH, &etag)
        .body(Body::empty())
        .unwrap();
    let second = send(app(), request).await;
    assert_eq!(second.status, StatusCode::NOT_MODIFIED);
    assert!(second.body.is_empty());

    let request = Request::get("/about")
        .header(header::IF_NONE_MATCH, "\"stale\"")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app(), request).await.status, StatusCode::OK);
}

#[tokio::test]
async fn healthz() {
    let res = get(app(), "/_healthz").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "ok");
}

#[tokio::test]
async fn healthz_does_not_shadow_page_slugs() {
    let export = r#"{"_id":"page-h","_type":"page","title":"Healthz","slug":{"_type":"slug","current":"healthz"}}"#;
    let store = MemoryStore::parse_export(export).unwrap();
    let app = create_router(Arc::new(AppState::new(Arc::new(store), SiteConfig::default())));
    let res = get(app, "/healthz").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"<h1 class="page-title">Healthz</h1>"#));
}

#[tokio::test]
async fn undecodable_path_segments_are_404_within_the_layout() {
    for uri in ["/tag/%FF", "/%FF", "/project/%C3%28"] {
        let res = get(app(), uri).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{uri}");
        assert!(res.body.contains("Page not found"), "{uri}");
        assert!(nav_bar(&res.body).contains(">About</a>"), "{uri}");
        assert_eq!(res.headers[header::CACHE_CONTROL], "no-store");
    }
}
