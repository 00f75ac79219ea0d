//! CLI output formatting.
//!
//! Output is **information-centric**: every entity leads with its
//! positional index and title, with the route it renders at and any
//! problems shown as indented context lines. The result reads as a content
//! inventory.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Source
//!     https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production
//!
//! Site
//!     Title: Studio Tide
//!     Intro: Photographs of coastlines, harbors and the people...
//!     Favicon: yes
//!
//! Navigation
//! 001 Work → /
//! 002 About → /about
//!
//! Featured projects (2)
//! 001 Tidal → /project/tidal
//!     Date: 2023-05-01
//! 002 Archive → /project/archive
//!     Date: 2018-06-01
//!     Image: missing
//! ```
//!
//! ## Serve
//!
//! ```text
//! Serving http://127.0.0.1:3000
//!     Source: export fixtures/export.ndjson
//!     Revalidate: 60s
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::image::{ImageOptions, ImageUrlBuilder};
use crate::richtext::{Block, RichText};
use crate::types::{NavLink, ProjectCard, SiteSettings, non_empty};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Index, title and the route it renders at.
///
/// ```text
/// 001 Tidal → /project/tidal
/// ```
fn entity_line(index: usize, title: &str, href: &str) -> String {
    format!("{} {} → {}", format_index(index), title, href)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// First text block of a rich text value, as plain text.
fn first_paragraph(text: &RichText) -> Option<String> {
    text.iter().find_map(|block| match block {
        Block::Text(block) => Some(block.plain_text()).filter(|t| !t.trim().is_empty()),
        _ => None,
    })
}

// ============================================================================
// Check
// ============================================================================

/// What `check` fetched, ready to print.
pub struct Inventory<'a> {
    /// Query endpoint or export file.
    pub source: &'a str,
    pub settings: Option<&'a SiteSettings>,
    /// Home page introduction.
    pub description: Option<&'a RichText>,
    pub nav: &'a [NavLink],
    pub featured: &'a [ProjectCard],
}

/// Format the content inventory.
///
/// Projects whose featured image cannot be addressed are flagged, since
/// they render with the "No Image" placeholder.
pub fn format_check_output(inventory: &Inventory<'_>, images: &ImageUrlBuilder) -> Vec<String> {
    let mut lines = vec!["Source".to_string(), format!("{}{}", indent(1), inventory.source)];

    lines.push(String::new());
    lines.push("Site".to_string());
    match inventory.settings {
        Some(settings) => {
            let title = non_empty(settings.site_title.as_deref()).unwrap_or("(untitled)");
            lines.push(format!("{}Title: {}", indent(1), title));
            if let Some(intro) = inventory.description.and_then(first_paragraph) {
                lines.push(format!("{}Intro: {}", indent(1), truncate_desc(&intro, 50)));
            }
            let favicon = images
                .resolve(settings.favicon.as_ref(), &ImageOptions::default())
                .is_some();
            lines.push(format!("{}Favicon: {}", indent(1), if favicon { "yes" } else { "no" }));
        }
        None => lines.push(format!("{}No site settings document", indent(1))),
    }

    lines.push(String::new());
    lines.push("Navigation".to_string());
    for (i, link) in inventory.nav.iter().enumerate() {
        lines.push(entity_line(i + 1, &link.title, &link.href));
    }

    lines.push(String::new());
    lines.push(format!("Featured projects ({})", inventory.featured.len()));
    for (i, card) in inventory.featured.iter().enumerate() {
        let href = format!("/project/{}", card.slug);
        lines.push(entity_line(i + 1, &card.title, &href));
        lines.push(format!("{}Date: {}", indent(1), card.date));
        if images
            .resolve(Some(&card.featured_image), &ImageOptions::default())
            .is_none()
        {
            lines.push(format!("{}Image: missing", indent(1)));
        }
    }

    lines
}

pub fn print_check_output(inventory: &Inventory<'_>, images: &ImageUrlBuilder) {
    for line in format_check_output(inventory, images) {
        println!("{}", line);
    }
}

// ============================================================================
// Serve
// ============================================================================

pub fn format_serve_banner(host: &str, port: u16, source: &str, revalidate_secs: u64) -> Vec<String> {
    let revalidate = if revalidate_secs == 0 {
        "off".to_string()
    } else {
        format!("{revalidate_secs}s")
    };
    vec![
        format!("Serving http://{host}:{port}"),
        format!("{}Source: {}", indent(1), source),
        format!("{}Revalidate: {}", indent(1), revalidate),
    ]
}

pub fn print_serve_banner(host: &str, port: u16, source: &str, revalidate_secs: u64) {
    for line in format_serve_banner(host, port, source, revalidate_secs) {
        println!("{}", line);
    }
}
