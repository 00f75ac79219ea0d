//! Project detail rendering (`/project/{slug}`).

use super::listing::tag_path;
use super::page::image_grid;
use super::{RenderContext, base_document, image_or_placeholder};
use crate::image::{self, ImageOptions};
use crate::lightbox::Lightbox;
use crate::types::{ProjectDocument, non_empty};
use chrono::NaiveDate;
use maud::{Markup, html};

/// Long US-style date, e.g. "May 1, 2023".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn render_project(ctx: RenderContext<'_>, project: &ProjectDocument, current_path: &str) -> Markup {
    let detail = ImageOptions::width(ctx.sizes.detail_width);
    let featured = Some(&project.featured_image);
    let lightbox = Lightbox::build(
        featured,
        &project.additional_images,
        ctx.images,
        &detail,
        &project.title,
    );
    let featured_image = image_or_placeholder(
        ctx.images.resolve(featured, &detail),
        image::placeholder(featured),
        &project.title,
        "detail-image",
    );

    let content = html! {
        article.project {
            h1.page-title { (project.title) }
            p.project-date {
                time datetime=(project.date.format("%Y-%m-%d").to_string()) { (format_date(project.date)) }
            }
            div.featured-image {
                @match lightbox.open_href(0) {
                    Some(href) => {
                        a.lightbox-open href=(href) aria-label="View full size" { (featured_image) }
                    }
                    None => { (featured_image) }
                }
            }
            @if let Some(description) = non_empty(project.description.as_deref()) {
                div.prose.description {
                    p {
                        @for (i, line) in description.lines().enumerate() {
                            @if i > 0 { br; }
                            (line)
                        }
                    }
                }
            }
            (image_grid(ctx, &project.additional_images, &project.title, |index, rendered| {
                lightbox.open_href(index + 1).map(|href| html! {
                    a.lightbox-open href=(href) aria-label="View full size" { (rendered) }
                })
            }))
            @if !project.tags.is_empty() {
                section.tags {
                    h2 { "Tags" }
                    ul.tag-list {
                        @for tag in &project.tags {
                            li { a.tag href=(tag_path(tag)) { (tag) } }
                        }
                    }
                }
            }
            @if project.is_featured {
                p.project-back { a href="/" { "← All featured projects" } }
            }
            (lightbox.render())
        }
    };

    base_document(ctx.chrome, Some(&project.title), current_path, content)
}
