//! HTML rendering.
//!
//! Every renderer is a pure function of already-fetched data: nothing here
//! touches the network. Templates use [maud](https://maud.lambda.xyz/), so
//! markup is checked at compile time and all interpolated text is escaped.
//!
//! ## Pages
//!
//! - **Home** (`/`): site description, sort control, featured project grid
//! - **Page** (`/{slug}`): title, featured image, rich text body, image grid, contact block
//! - **Project** (`/project/{slug}`): date, featured image, description, image grid, tags, lightbox
//! - **Tag** (`/tag/{tag}`): grid of projects carrying the tag
//! - **Not found / unavailable**: error pages in the same layout
//!
//! ## Layout
//!
//! [`Chrome`] carries what every page shares: title, favicon, theme colors
//! and navigation. It is built once per request from site settings and the
//! navigation listing; when those could not be fetched, [`Chrome::fallback`]
//! gives a bare shell built from configuration alone.

pub mod listing;
pub mod page;
pub mod project;

use crate::config::{self, ImagesConfig, SiteConfig, Theme};
use crate::image::{self, ImageOptions, ImageUrlBuilder};
use crate::nav::{self, MenuState};
use crate::types::{NavLink, NavPage, SiteSettings, non_empty};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../../static/style.css");

/// Page-independent layout data.
#[derive(Debug, Clone, PartialEq)]
pub struct Chrome {
    /// Document title.
    pub site_title: String,
    /// Header name linking home.
    pub owner_name: String,
    pub favicon: Option<Favicon>,
    pub theme: Theme,
    pub nav: Vec<NavLink>,
    /// Asset host to preconnect to.
    pub cdn_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Favicon {
    pub href: String,
    pub mime_type: Option<String>,
}

impl Chrome {
    pub fn build(
        settings: Option<&SiteSettings>,
        nav_pages: &[NavPage],
        config: &SiteConfig,
        images: &ImageUrlBuilder,
    ) -> Self {
        let site_title = non_empty(settings.and_then(|s| s.site_title.as_deref()))
            .unwrap_or(&config.site.fallback_title)
            .to_string();
        let owner_name = non_empty(config.site.owner_name.as_deref())
            .map(String::from)
            .unwrap_or_else(|| site_title.clone());

        let favicon = settings.and_then(|s| {
            let icon = s.favicon.as_ref();
            let href = images.resolve(icon, &ImageOptions::square(config.images.favicon_size))?;
            Some(Favicon {
                href,
                mime_type: image::mime_type(icon).map(String::from),
            })
        });

        Self {
            site_title,
            owner_name,
            favicon,
            theme: Theme::resolve(settings, &config.theme),
            nav: nav::assemble_nav(nav_pages, &config.site.nav_priority),
            cdn_url: config.images.cdn_url.clone(),
        }
    }

    /// Layout from configuration alone, for error pages rendered when the
    /// content store could not supply settings or navigation.
    pub fn fallback(config: &SiteConfig) -> Self {
        let site_title = config.site.fallback_title.clone();
        Self {
            owner_name: non_empty(config.site.owner_name.as_deref())
                .map(String::from)
                .unwrap_or_else(|| site_title.clone()),
            site_title,
            favicon: None,
            theme: Theme::resolve(None, &config.theme),
            nav: nav::assemble_nav(&[], &config.site.nav_priority),
            cdn_url: config.images.cdn_url.clone(),
        }
    }
}

/// What page renderers need besides the document itself.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub chrome: &'a Chrome,
    pub images: &'a ImageUrlBuilder,
    pub sizes: &'a ImagesConfig,
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
pub fn base_document(
    chrome: &Chrome,
    page_title: Option<&str>,
    current_path: &str,
    content: Markup,
) -> Markup {
    let title = match page_title {
        Some(page) => format!("{page} | {}", chrome.site_title),
        None => chrome.site_title.clone(),
    };
    let css = format!("{}\n\n{}", config::generate_theme_css(&chrome.theme), CSS_STATIC);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content="Portfolio website";
                @if let Some(icon) = &chrome.favicon {
                    link rel="icon" href=(icon.href) type=[icon.mime_type.as_deref()];
                }
                link rel="preconnect" href=(chrome.cdn_url);
                style { (PreEscaped(css)) }
            }
            body {
                (site_header(chrome, current_path))
                main.site-main #content {
                    (content)
                }
            }
        }
    }
}

/// Renders the site header: owner name linking home, plus navigation
fn site_header(chrome: &Chrome, current_path: &str) -> Markup {
    html! {
        header.site-header {
            div.header-inner {
                a.site-name href="/" { (chrome.owner_name) }
                (render_nav(&chrome.nav, current_path, MenuState::default()))
            }
        }
    }
}

/// Renders navigation twice: a link row for wide screens and a
/// checkbox-driven disclosure menu for narrow ones. A fresh page load always
/// starts with the checkbox unchecked, which is what closes the menu after
/// following one of its links.
pub fn render_nav(links: &[NavLink], current_path: &str, menu: MenuState) -> Markup {
    html! {
        nav.nav-bar aria-label="Main" {
            (render_nav_links(links, current_path))
        }
        input.nav-toggle type="checkbox" id="nav-toggle" checked[menu.is_open()];
        label.nav-hamburger for="nav-toggle" aria-label="Toggle menu" {
            span.hamburger-line {}
            span.hamburger-line {}
            span.hamburger-line {}
        }
        nav.nav-menu aria-label="Main" {
            (render_nav_links(links, current_path))
        }
    }
}

fn render_nav_links(links: &[NavLink], current_path: &str) -> Markup {
    html! {
        ul {
            @for link in links {
                @let active = nav::is_active(link, current_path);
                li {
                    a href=(link.href)
                        class=[active.then_some("active")]
                        aria-current=[active.then_some("page")] {
                        (link.title)
                    }
                }
            }
        }
    }
}

/// An image, or the "No Image" block when it has no resolvable URL.
///
/// The LQIP placeholder is painted as the element background so the
/// blurred preview shows while the full image loads.
pub(crate) fn image_or_placeholder(
    src: Option<String>,
    lqip: Option<&str>,
    alt: &str,
    class: &str,
) -> Markup {
    let background = lqip
        .filter(|p| is_inline_image(p))
        .map(|p| format!("background-image: url('{p}'); background-size: cover;"));
    html! {
        @match src {
            Some(src) => {
                img class=(class) src=(src) alt=(alt) loading="lazy" decoding="async" style=[background];
            }
            None => {
                div class={ (class) " image-missing" } {
                    span { "No Image" }
                }
            }
        }
    }
}

/// Placeholders come from documents and are written into a style attribute.
fn is_inline_image(uri: &str) -> bool {
    uri.starts_with("data:image/")
        && uri
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '/' | ';' | ',' | '+' | '=' | '-' | '.'))
}

// ============================================================================
// Error Pages
// ============================================================================

pub fn not_found_page(chrome: &Chrome, path: &str) -> Markup {
    let content = html! {
        article.error-page {
            h1 { "Page not found" }
            p { "Nothing lives at " code { (path) } "." }
            p { a href="/" { "Back to the work" } }
        }
    };
    base_document(chrome, Some("Not found"), path, content)
}

pub fn unavailable_page(chrome: &Chrome, path: &str) -> Markup {
    let content = html! {
        article.error-page {
            h1 { "Temporarily unavailable" }
            p { "The content for this page could not be loaded. Please try again shortly." }
        }
    };
    base_document(chrome, Some("Unavailable"), path, content)
}
