//! Project listings: the home page grid and tag pages.

use super::{RenderContext, base_document, image_or_placeholder};
use crate::image::{self, ImageOptions};
use crate::richtext::{self, RichText};
use crate::sort::SortOrder;
use crate::types::ProjectCard;
use maud::{Markup, html};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped in a path segment, matching what browsers
/// leave alone in `encodeURIComponent`.
pub const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Link target for a tag page.
pub fn tag_path(tag: &str) -> String {
    format!("/tag/{}", utf8_percent_encode(tag, PATH_SEGMENT))
}

pub fn render_home(
    ctx: RenderContext<'_>,
    description: Option<&RichText>,
    cards: &[ProjectCard],
    order: SortOrder,
) -> Markup {
    let content = html! {
        @if let Some(description) = description.filter(|d| richtext::has_content(d)) {
            div.prose.site-description { (richtext::render(description)) }
        }
        h2.section-title { "Featured Projects" }
        (sort_controls(order))
        (project_grid(ctx, cards, "No featured projects found."))
    };
    base_document(ctx.chrome, None, "/", content)
}

pub fn render_tag(ctx: RenderContext<'_>, tag: &str, cards: &[ProjectCard]) -> Markup {
    let path = tag_path(tag);
    let content = html! {
        h1.page-title {
            "Projects tagged with: "
            span.tag-name { (tag) }
        }
        (project_grid(ctx, cards, &format!("No projects found for {tag}")))
    };
    base_document(ctx.chrome, Some(&format!("#{tag}")), &path, content)
}

/// Sort links for wide screens, a GET form for narrow ones. Either way the
/// choice travels as `?sort=` and the server derives the view.
pub fn sort_controls(current: SortOrder) -> Markup {
    html! {
        div.sort-controls {
            span { "Sort by:" }
            ul.sort-links {
                @for order in SortOrder::ALL {
                    @let active = order == current;
                    li {
                        a href={ "/?sort=" (order) }
                            class=[active.then_some("active")]
                            aria-current=[active.then_some("true")] {
                            (order.label())
                        }
                    }
                }
            }
            form.sort-form method="get" action="/" {
                select name="sort" aria-label="Sort projects" {
                    @for order in [SortOrder::Newest, SortOrder::Oldest, SortOrder::Alphabetical, SortOrder::Random] {
                        option value=(order) selected[order == current] { (order.label()) }
                    }
                }
                button type="submit" { "Sort" }
            }
        }
    }
}

fn project_grid(ctx: RenderContext<'_>, cards: &[ProjectCard], empty: &str) -> Markup {
    html! {
        @if cards.is_empty() {
            p.empty-state { (empty) }
        } @else {
            div.project-grid {
                @for card in cards {
                    (project_card(ctx, card))
                }
            }
        }
    }
}

pub fn project_card(ctx: RenderContext<'_>, card: &ProjectCard) -> Markup {
    let featured = Some(&card.featured_image);
    let src = ctx
        .images
        .resolve(featured, &ImageOptions::width(ctx.sizes.card_width));
    html! {
        a.project-card href={ "/project/" (card.slug) } data-id=(card.id) {
            (image_or_placeholder(src, image::placeholder(featured), &card.title, "card-image"))
            div.card-overlay {
                h3 { (card.title) }
            }
        }
    }
}
