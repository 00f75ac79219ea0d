//! # Folio
//!
//! A portfolio website served straight from a headless content store.
//! Pages, projects and site settings live in a hosted dataset; every
//! request fetches what its route needs, renders HTML on the server, and
//! sends it with revalidation headers.
//!
//! # Architecture: Fetch, Validate, Render
//!
//! ```text
//! 1. Fetch     ContentStore    →  JSON            (GROQ over HTTP, or a dataset export)
//! 2. Validate  JSON            →  types::*        (required fields checked at the boundary)
//! 3. Render    types + config  →  HTML            (maud templates, pure functions)
//! ```
//!
//! Fetching is the only step that can fail for reasons outside the site.
//! A failed fetch is reported as "unavailable" (503), never as "not found":
//! the two are kept apart from the store all the way to the response.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Content store trait, HTTP client, export-backed store, revalidation cache |
//! | [`types`] | Validated document shapes (`PageDocument`, `ProjectDocument`, `SiteSettings`) |
//! | [`richtext`] | Portable Text blocks to HTML |
//! | [`image`] | Image references to CDN URLs; placeholders and mime types |
//! | [`sort`] | Project list orders and the immutable fetched set they derive from |
//! | [`nav`] | Navigation assembly and the mobile menu state |
//! | [`lightbox`] | The project image viewer sequence and its markup |
//! | [`render`] | Page templates and the shared layout |
//! | [`server`] | axum routes, the render pipeline, caching headers, error pages |
//! | [`config`] | `folio.toml` loading, validation, merging, and theme CSS |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Server-Rendered, Script-Light
//!
//! Every page is complete HTML. The mobile menu is a checkbox, the sort
//! control is a link or a GET form, and the lightbox is a set of
//! `:target` overlays. The only script is keyboard stepping for the
//! lightbox. A sorted view is a URL, so it can be shared and cached.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Malformed markup is a build error and every
//! interpolation is escaped, which matters when the text comes from an
//! editor's CMS input.
//!
//! ## Revalidation Window
//!
//! Fetched results are reused for `server.revalidate_secs` before the next
//! request fetches again. The same value is sent as `s-maxage`, so a CDN in
//! front of the server holds pages for as long as the server holds data.

pub mod config;
pub mod content;
pub mod image;
pub mod lightbox;
pub mod nav;
pub mod output;
pub mod render;
pub mod richtext;
pub mod server;
pub mod sort;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
