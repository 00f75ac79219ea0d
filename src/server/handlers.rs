//! Route handlers and the shared render pipeline.
//!
//! Each request joins its independent content fetches with
//! `tokio::try_join!`, so one failing fetch fails the whole page with a 503.
//! Not-found is decided after the join: a missing page or project is a 404
//! rendered inside the normal layout.

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use maud::Markup;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::error::{ErrorPage, ServerError};
use super::state::AppState;
use crate::render::{listing, page, project};
use crate::render::listing::tag_path;
use crate::sort::{ProjectGallery, SortOrder};

/// The routes the site renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Page(String),
    Project(String),
    Tag(String),
}

impl Route {
    /// Parse a request path (without query string). Tag segments are
    /// percent-decoded; anything deeper than two segments is not a route.
    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Home),
            ["project", slug] => Some(Route::Project((*slug).to_string())),
            ["tag", tag] => percent_decode_str(tag)
                .decode_utf8()
                .ok()
                .map(|tag| Route::Tag(tag.into_owned())),
            [slug] => Some(Route::Page((*slug).to_string())),
            _ => None,
        }
    }

    /// The canonical path, with the tag percent-encoded.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Page(slug) => format!("/{slug}"),
            Route::Project(slug) => format!("/project/{slug}"),
            Route::Tag(tag) => tag_path(tag),
        }
    }
}

/// Fetch everything `route` needs and render it.
pub async fn render_route(state: &AppState, route: &Route, order: SortOrder) -> Result<Markup, ServerError> {
    let store = state.store.as_ref();
    let path = route.path();

    match route {
        Route::Home => {
            let (settings, nav_pages, featured, description) = tokio::try_join!(
                store.site_settings(),
                store.nav_pages(),
                store.featured_projects(),
                store.site_description(),
            )?;
            let chrome = state.chrome(settings.as_ref(), &nav_pages);
            let gallery = ProjectGallery::new(featured);
            let cards = gallery.view(order, &mut state.rng());
            Ok(listing::render_home(state.context(&chrome), description.as_ref(), &cards, order))
        }
        Route::Page(slug) => {
            let (settings, nav_pages, doc) =
                tokio::try_join!(store.site_settings(), store.nav_pages(), store.page_by_slug(slug))?;
            let chrome = state.chrome(settings.as_ref(), &nav_pages);
            match doc {
                Some(doc) => Ok(page::render_page(state.context(&chrome), &doc, &path)),
                None => Err(ServerError::not_found(path, chrome)),
            }
        }
        Route::Project(slug) => {
            let (settings, nav_pages, doc) =
                tokio::try_join!(store.site_settings(), store.nav_pages(), store.project_by_slug(slug))?;
            let chrome = state.chrome(settings.as_ref(), &nav_pages);
            match doc {
                Some(doc) => Ok(project::render_project(state.context(&chrome), &doc, &path)),
                None => Err(ServerError::not_found(path, chrome)),
            }
        }
        Route::Tag(tag) => {
            let (settings, nav_pages, cards) =
                tokio::try_join!(store.site_settings(), store.nav_pages(), store.projects_by_tag(tag))?;
            let chrome = state.chrome(settings.as_ref(), &nav_pages);
            Ok(listing::render_tag(state.context(&chrome), tag, &cards))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingParams {
    sort: Option<String>,
}

/// Handle GET /.
pub(crate) async fn home(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListingParams>,
    headers: HeaderMap,
) -> Result<Response, ErrorPage> {
    let order = SortOrder::from_param(params.sort.as_deref());
    respond(&state, &headers, Route::Home, order).await
}

/// Handle GET /{slug}.
pub(crate) async fn page(
    State(state): State<Arc<AppState>>,
    slug: Result<Path<String>, PathRejection>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ErrorPage> {
    let slug = segment(&state, &uri, slug).await?;
    respond(&state, &headers, Route::Page(slug), SortOrder::default()).await
}

/// Handle GET /project/{slug}.
pub(crate) async fn project(
    State(state): State<Arc<AppState>>,
    slug: Result<Path<String>, PathRejection>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ErrorPage> {
    let slug = segment(&state, &uri, slug).await?;
    respond(&state, &headers, Route::Project(slug), SortOrder::default()).await
}

/// Handle GET /tag/{tag}. The extractor has already percent-decoded the tag.
pub(crate) async fn tag(
    State(state): State<Arc<AppState>>,
    tag: Result<Path<String>, PathRejection>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ErrorPage> {
    let tag = segment(&state, &uri, tag).await?;
    respond(&state, &headers, Route::Tag(tag), SortOrder::default()).await
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

/// Anything no route matches.
pub(crate) async fn fallback(State(state): State<Arc<AppState>>, uri: Uri) -> ErrorPage {
    not_found_page(&state, uri.path()).await
}

/// The decoded path parameter, or the 404 page when it does not decode
/// (e.g. percent-encoded bytes that are not UTF-8).
async fn segment(
    state: &AppState,
    uri: &Uri,
    extracted: Result<Path<String>, PathRejection>,
) -> Result<String, ErrorPage> {
    match extracted {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(path = %uri.path(), error = %rejection, "undecodable path parameter");
            Err(not_found_page(state, uri.path()).await)
        }
    }
}

/// A 404 for a path that names no document. Layout data is still fetched so
/// the page keeps its navigation; if that fails too, the configured shell is
/// used.
async fn not_found_page(state: &AppState, path: &str) -> ErrorPage {
    let store = state.store.as_ref();
    let chrome = match tokio::try_join!(store.site_settings(), store.nav_pages()) {
        Ok((settings, nav_pages)) => state.chrome(settings.as_ref(), &nav_pages),
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "layout unavailable for 404 page");
            crate::render::Chrome::fallback(&state.config)
        }
    };
    ServerError::not_found(path.to_string(), chrome).into_page(path, &state.config)
}

async fn respond(
    state: &AppState,
    headers: &HeaderMap,
    route: Route,
    order: SortOrder,
) -> Result<Response, ErrorPage> {
    let path = route.path();
    let html = render_route(state, &route, order)
        .await
        .map_err(|err| err.into_page(&path, &state.config))?;
    Ok(html_response(headers, html, state.config.server.revalidate_secs))
}

/// Build a cacheable HTML response, or a 304 when the client already holds
/// this exact body.
pub(crate) fn html_response(headers: &HeaderMap, html: Markup, revalidate_secs: u64) -> Response {
    let body = html.into_string();
    let etag = compute_etag(&body);
    let cache_control = format!("public, max-age=0, s-maxage={revalidate_secs}");

    if if_none_match(headers, &etag) {
        return (
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response();
    }

    (
        [(header::ETAG, etag), (header::CACHE_CONTROL, cache_control)],
        Html(body),
    )
        .into_response()
}

/// Strong `ETag` over the rendered body.
pub(crate) fn compute_etag(body: &str) -> String {
    format!("\"{:x}\"", Sha256::digest(body.as_bytes()))
}

/// Whether `If-None-Match` lists `etag` (weak comparison) or `*`.
fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value: &HeaderValue| value.to_str().ok())
        .is_some_and(|value| {
            value.split(',').map(str::trim).any(|candidate| {
                candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
            })
        })
}
