//! Generic page rendering (`/{slug}`).

use super::{RenderContext, base_document, image_or_placeholder};
use crate::image::{self, ImageOptions};
use crate::richtext;
use crate::types::{ImageRef, PageDocument, SocialLink, non_empty};
use maud::{Markup, html};

pub fn render_page(ctx: RenderContext<'_>, page: &PageDocument, current_path: &str) -> Markup {
    let featured = page.featured_image.as_ref();
    let featured_src = ctx
        .images
        .resolve(featured, &ImageOptions::width(ctx.sizes.detail_width));

    let content = html! {
        article.page {
            h1.page-title { (page.title) }
            @if featured_src.is_some() {
                div.featured-image {
                    (image_or_placeholder(featured_src, image::placeholder(featured), &page.title, "detail-image"))
                }
            }
            @if let Some(body) = page.body.as_deref().filter(|b| richtext::has_content(b)) {
                div.prose { (richtext::render(body)) }
            }
            (image_grid(ctx, &page.additional_images, &page.title, |_, _| None))
            @if page.has_contact_details() {
                (contact_section(page))
            }
        }
    };

    base_document(ctx.chrome, Some(&page.title), current_path, content)
}

/// The "More Images" grid. Images that do not resolve are left out; the
/// whole section is omitted when nothing is left. `open` may wrap an image
/// in a link, given its index and the rendered image.
pub(crate) fn image_grid<F>(
    ctx: RenderContext<'_>,
    images: &[ImageRef],
    title: &str,
    open: F,
) -> Markup
where
    F: Fn(usize, &Markup) -> Option<Markup>,
{
    let options = ImageOptions::square(ctx.sizes.grid_width);
    let items: Vec<(String, Markup)> = images
        .iter()
        .enumerate()
        .filter_map(|(index, img)| {
            let src = ctx.images.resolve(Some(img), &options)?;
            let alt = format!("Additional image for {title}");
            let rendered = image_or_placeholder(Some(src), image::placeholder(Some(img)), &alt, "grid-image");
            let item = open(index, &rendered).unwrap_or(rendered);
            Some((grid_item_key(img, index), item))
        })
        .collect();

    html! {
        @if !items.is_empty() {
            section.image-grid-section {
                h2 { "More Images" }
                div.image-grid {
                    @for (key, item) in &items {
                        div.image-grid-item data-key=(key) { (item) }
                    }
                }
            }
        }
    }
}

/// Stable identity for a grid item: the image's own key, else its asset id,
/// else its position.
pub fn grid_item_key(image: &ImageRef, index: usize) -> String {
    non_empty(image.key.as_deref())
        .or_else(|| non_empty(image.asset_id()))
        .map(String::from)
        .unwrap_or_else(|| format!("additional-img-{index}"))
}

/// `tel:` links carry digits only.
pub fn tel_href(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("tel:{digits}")
}

/// Contact block. Each detail renders only when present.
pub fn contact_section(page: &PageDocument) -> Markup {
    let email = non_empty(page.email.as_deref());
    let phone = non_empty(page.phone_number.as_deref());

    html! {
        section.contact {
            h2 { "Contact Details" }
            @if let Some(email) = email {
                div.contact-item {
                    h3 { "Email" }
                    a href={ "mailto:" (email) } { (email) }
                }
            }
            @if let Some(phone) = phone {
                div.contact-item {
                    h3 { "Phone" }
                    a href=(tel_href(phone)) { (phone) }
                }
            }
            @if !page.social_links.is_empty() {
                div.contact-item {
                    h3 { "Elsewhere" }
                    ul.social-links {
                        @for link in &page.social_links {
                            li { (social_link(link)) }
                        }
                    }
                }
            }
        }
    }
}

/// Social profiles always open in a new context.
fn social_link(link: &SocialLink) -> Markup {
    html! {
        a href=(link.url) target="_blank" rel="noopener noreferrer" { (link.platform) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{image_ref, page_doc, render_ctx};

    #[test]
    fn contact_section_omitted_without_details() {
        let page = page_doc("about", "About");
        let html = render_ctx(|ctx| render_page(ctx, &page, "/about"));
        assert!(!html.contains("Contact Details"));
        assert!(!html.contains("mailto:"));
    }

    #[test]
    fn contact_section_renders_present_details_only() {
        let mut page = page_doc("contact", "Contact");
        page.email = Some("hello@example.com".into());
        let html = contact_section(&page).into_string();
        assert!(html.contains(r#"href="mailto:hello@example.com""#));
        assert!(!html.contains("Phone"));
        assert!(!html.contains("Elsewhere"));
    }

    #[test]
    fn phone_link_strips_non_digits() {
        assert_eq!(tel_href("+1 (555) 010-9999"), "tel:15550109999");
        let mut page = page_doc("contact", "Contact");
        page.phone_number = Some("+44 20 7946 0000".into());
        let html = contact_section(&page).into_string();
        assert!(html.contains(r#"href="tel:442079460000""#));
        assert!(html.contains(">+44 20 7946 0000<"));
    }

    #[test]
    fn social_links_open_externally() {
        let mut page = page_doc("contact", "Contact");
        page.social_links = vec![SocialLink {
            key: Some("s1".into()),
            platform: "Instagram".into(),
            url: "https://instagram.com/someone".into(),
        }];
        let html = contact_section(&page).into_string();
        assert!(html.contains(
            r#"<a href="https://instagram.com/someone" target="_blank" rel="noopener noreferrer">Instagram</a>"#
        ));
    }

    #[test]
    fn grid_key_precedence() {
        let mut img = image_ref("image-abc-10x10-jpg");
        img.key = Some("k1".into());
        assert_eq!(grid_item_key(&img, 3), "k1");

        img.key = None;
        assert_eq!(grid_item_key(&img, 3), "image-abc-10x10-jpg");

        assert_eq!(grid_item_key(&ImageRef::default(), 3), "additional-img-3");
    }

    #[test]
    fn grid_skips_unresolvable_images_and_omits_when_empty() {
        let mut page = page_doc("about", "About");
        page.additional_images = vec![ImageRef::default(), image_ref("image-abc-10x10-jpg")];
        let html = render_ctx(|ctx| render_page(ctx, &page, "/about"));
        assert!(html.contains("More Images"));
        assert_eq!(html.matches(r#"class="image-grid-item""#).count(), 1);

        page.additional_images = vec![ImageRef::default()];
        let html = render_ctx(|ctx| render_page(ctx, &page, "/about"));
        assert!(!html.contains("More Images"));
    }

    #[test]
    fn absent_featured_image_is_omitted() {
        let page = page_doc("about", "About");
        let html = render_ctx(|ctx| render_page(ctx, &page, "/about"));
        assert!(!html.contains(r#"class="featured-image""#));
        assert!(!html.contains("No Image"));
    }

    #[test]
    fn body_renders_rich_text() {
        let mut page = page_doc("about", "About");
        page.body = Some(
            serde_json::from_value(serde_json::json!([
                {"_type": "block", "style": "normal", "children": [{"text": "Hello there"}]}
            ]))
            .unwrap(),
        );
        let html = render_ctx(|ctx| render_page(ctx, &page, "/about"));
        assert!(html.contains(r#"<div class="prose"><p>Hello there</p></div>"#));
        assert!(html.contains("<title>About | "));
    }
}
