//! Request failures and their error pages.

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use maud::Markup;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::ContentError;
use crate::render::{self, Chrome};

#[derive(Error, Debug)]
pub enum ServerError {
    /// Nothing lives at the path. The layout data was fetched fine, so the
    /// 404 page renders with the real navigation.
    #[error("not found: {path}")]
    NotFound { path: String, chrome: Box<Chrome> },

    /// The content store failed or returned invalid data.
    #[error("content unavailable: {0}")]
    Unavailable(#[from] ContentError),
}

impl ServerError {
    pub fn not_found(path: impl Into<String>, chrome: Chrome) -> Self {
        ServerError::NotFound {
            path: path.into(),
            chrome: Box::new(chrome),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Render the error page for `path`. Store failures have no layout data,
    /// so they render in the shell built from configuration.
    pub fn into_page(self, path: &str, config: &SiteConfig) -> ErrorPage {
        let status = self.status();
        let html = match self {
            ServerError::NotFound { path, chrome } => {
                tracing::debug!(path = %path, "not found");
                render::not_found_page(&chrome, &path)
            }
            ServerError::Unavailable(err) => {
                tracing::error!(path = %path, error = %err, "content store unavailable");
                render::unavailable_page(&Chrome::fallback(config), path)
            }
        };
        ErrorPage { status, html }
    }
}

/// A rendered error page, ready to send.
pub struct ErrorPage {
    pub status: StatusCode,
    pub html: Markup,
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CACHE_CONTROL, "no-store")],
            Html(self.html.into_string()),
        )
            .into_response()
    }
}
