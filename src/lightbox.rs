//! Project image viewer.
//!
//! The viewer steps through one ordered sequence: the featured image, then
//! the additional images in authoring order. Entries whose asset cannot be
//! resolved to a URL are left out of the sequence, so an activated position
//! (0 = featured, 1..N = additional) has to be mapped to its slide index.
//!
//! The rendered viewer is plain HTML: each slide is a `:target`-able overlay
//! (`#lightbox-{i}`) with previous/next links that wrap around, plus a small
//! script for keyboard navigation.

use crate::image::{self, ImageOptions, ImageUrlBuilder};
use crate::render::image_or_placeholder;
use crate::types::ImageRef;
use maud::{Markup, PreEscaped, html};

const KEYBOARD_JS: &str = include_str!("../static/lightbox.js");

/// Element id the close link returns to.
pub const CLOSE_TARGET: &str = "content";

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub src: String,
    pub alt: String,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lightbox {
    slides: Vec<Slide>,
    /// Activated position to slide index; `None` for skipped entries.
    positions: Vec<Option<usize>>,
}

impl Lightbox {
    pub fn build(
        featured: Option<&ImageRef>,
        additional: &[ImageRef],
        images: &ImageUrlBuilder,
        options: &ImageOptions,
        title: &str,
    ) -> Self {
        let mut lightbox = Self::default();
        let sequence = std::iter::once(featured).chain(additional.iter().map(Some));
        for (position, img) in sequence.enumerate() {
            let slide = images.resolve(img, options).map(|src| Slide {
                src,
                alt: if position == 0 {
                    title.to_string()
                } else {
                    format!("Additional image for {title}")
                },
                placeholder: image::placeholder(img).map(String::from),
            });
            let index = slide.map(|s| {
                lightbox.slides.push(s);
                lightbox.slides.len() - 1
            });
            lightbox.positions.push(index);
        }
        lightbox
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// The slide a viewer opened from `position` shows first.
    pub fn slide_for(&self, position: usize) -> Option<usize> {
        self.positions.get(position).copied().flatten()
    }

    pub fn next(&self, index: usize) -> usize {
        if self.slides.is_empty() {
            return 0;
        }
        (index + 1) % self.slides.len()
    }

    pub fn prev(&self, index: usize) -> usize {
        if self.slides.is_empty() {
            return 0;
        }
        (index + self.slides.len() - 1) % self.slides.len()
    }

    /// Fragment link that opens the viewer at `position`.
    pub fn open_href(&self, position: usize) -> Option<String> {
        self.slide_for(position).map(|i| format!("#{}", anchor(i)))
    }

    pub fn render(&self) -> Markup {
        if self.slides.is_empty() {
            return html! {};
        }
        let count = self.slides.len();
        html! {
            div.lightbox-set {
                @for (i, slide) in self.slides.iter().enumerate() {
                    div.lightbox id=(anchor(i)) role="dialog" aria-modal="true"
                        aria-label={ "Image " (i + 1) " of " (count) } {
                        a.lightbox-backdrop href={ "#" (CLOSE_TARGET) } tabindex="-1" aria-hidden="true" {}
                        figure.lightbox-frame {
                            (image_or_placeholder(
                                Some(slide.src.clone()),
                                slide.placeholder.as_deref(),
                                &slide.alt,
                                "lightbox-image",
                            ))
                            figcaption.lightbox-counter { (i + 1) " / " (count) }
                        }
                        a.lightbox-close href={ "#" (CLOSE_TARGET) } aria-label="Close" { "×" }
                        @if count > 1 {
                            a.lightbox-prev href={ "#" (anchor(self.prev(i))) } aria-label="Previous image" { "‹" }
                            a.lightbox-next href={ "#" (anchor(self.next(i))) } aria-label="Next image" { "›" }
                        }
                    }
                }
            }
            script { (PreEscaped(KEYBOARD_JS)) }
        }
    }
}

pub fn anchor(index: usize) -> String {
    format!("lightbox-{index}")
}
