//! Rich text (Portable Text) decoding and HTML rendering.
//!
//! Rich text arrives as an array of blocks. Each text block has a style
//! (`normal`, `h2`, `blockquote`…), optional list membership, and a list of
//! spans. A span carries `marks`: either decorator names (`strong`, `em`) or
//! keys into the block's `markDefs`, which is where link annotations live.
//!
//! Consecutive list blocks are grouped into `<ul>`/`<ol>` elements, nesting
//! by `level`. Non-text blocks (embedded images, custom objects) are skipped.

use maud::{Markup, html};
use serde::Deserialize;

/// A rich text field: an ordered sequence of blocks.
pub type RichText = Vec<Block>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub children: Vec<Span>,
    #[serde(default)]
    pub mark_defs: Vec<MarkDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Number,
}

impl TextBlock {
    fn list_kind(&self) -> Option<ListKind> {
        match self.list_item.as_deref()? {
            "number" => Some(ListKind::Number),
            _ => Some(ListKind::Bullet),
        }
    }

    fn level(&self) -> u32 {
        self.level.unwrap_or(1).max(1)
    }

    fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|d| d.key == key)
    }

    /// Concatenated span text, for plain-text uses such as CLI previews.
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }
}

/// How a link should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// Absolute URL: new browsing context, no opener, no referrer.
    External,
    /// Relative or non-web URL: navigate in place.
    SameContext,
}

const EXTERNAL_SCHEMES: &[&str] = &["http://", "https://"];

pub fn link_target(href: &str) -> LinkTarget {
    let lowered = href.trim_start().to_ascii_lowercase();
    if EXTERNAL_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        LinkTarget::External
    } else {
        LinkTarget::SameContext
    }
}

/// Render an anchor following the shared link policy.
pub fn render_link(href: &str, content: Markup) -> Markup {
    match link_target(href) {
        LinkTarget::External => html! {
            a href=(href) target="_blank" rel="noopener noreferrer" { (content) }
        },
        LinkTarget::SameContext => html! {
            a href=(href) { (content) }
        },
    }
}

/// Render rich text blocks to HTML.
pub fn render(blocks: &[Block]) -> Markup {
    let text_blocks: Vec<&TextBlock> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Text(t) => Some(t),
            Block::Unsupported => None,
        })
        .collect();

    let mut parts = Vec::new();
    let mut i = 0;
    while i < text_blocks.len() {
        if text_blocks[i].list_kind().is_some() {
            let end = text_blocks[i..]
                .iter()
                .position(|b| b.list_kind().is_none())
                .map_or(text_blocks.len(), |p| i + p);
            parts.push(render_list(&text_blocks[i..end], 1));
            i = end;
        } else {
            parts.push(render_block(text_blocks[i]));
            i += 1;
        }
    }

    html! {
        @for part in &parts { (part) }
    }
}

/// True when there is at least one block with visible text.
pub fn has_content(blocks: &[Block]) -> bool {
    blocks.iter().any(|b| match b {
        Block::Text(t) => t.children.iter().any(|s| !s.text.trim().is_empty()),
        Block::Unsupported => false,
    })
}

fn render_block(block: &TextBlock) -> Markup {
    let inner = render_spans(block);
    match block.style.as_deref().unwrap_or("normal") {
        "h1" => html! { h1 { (inner) } },
        "h2" => html! { h2 { (inner) } },
        "h3" => html! { h3 { (inner) } },
        "h4" => html! { h4 { (inner) } },
        "blockquote" => html! { blockquote { (inner) } },
        _ => html! { p { (inner) } },
    }
}

/// Render a run of list blocks. Every item has `level >= level`.
fn render_list(items: &[&TextBlock], level: u32) -> Markup {
    // Each entry: a same-level item plus the deeper items nested under it.
    let mut entries: Vec<(&TextBlock, &[&TextBlock])> = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let end = items[i + 1..]
            .iter()
            .position(|b| b.level() <= level)
            .map_or(items.len(), |p| i + 1 + p);
        entries.push((items[i], &items[i + 1..end]));
        i = end;
    }

    // Adjacent items of a different list kind start a new list element.
    let mut groups: Vec<(ListKind, Vec<(&TextBlock, &[&TextBlock])>)> = Vec::new();
    for (item, nested) in entries {
        let kind = item.list_kind().unwrap_or(ListKind::Bullet);
        match groups.last_mut() {
            Some((k, members)) if *k == kind => members.push((item, nested)),
            _ => groups.push((kind, vec![(item, nested)])),
        }
    }

    html! {
        @for (kind, members) in &groups {
            @let list_items = html! {
                @for (item, nested) in members {
                    li {
                        (render_spans(item))
                        @if !nested.is_empty() {
                            (render_list(nested, level + 1))
                        }
                    }
                }
            };
            @match kind {
                ListKind::Bullet => {
                    ul { (list_items) }
                }
                ListKind::Number => {
                    ol { (list_items) }
                }
            }
        }
    }
}

fn render_spans(block: &TextBlock) -> Markup {
    html! {
        @for span in &block.children {
            (render_span(block, span))
        }
    }
}

fn render_span(block: &TextBlock, span: &Span) -> Markup {
    let lines: Vec<&str> = span.text.split('\n').collect();
    let mut out = html! {
        @for (i, line) in lines.iter().enumerate() {
            @if i > 0 { br; }
            (line)
        }
    };

    // Marks wrap from the inside out, so the first mark is innermost.
    for mark in &span.marks {
        out = match mark.as_str() {
            "strong" => html! { strong { (out) } },
            "em" => html! { em { (out) } },
            "code" => html! { code { (out) } },
            "underline" => html! { u { (out) } },
            "strike-through" => html! { s { (out) } },
            key => match block.mark_def(key) {
                Some(def) if def.kind == "link" => match def.href.as_deref() {
                    Some(href) if !href.trim().is_empty() => render_link(href, out),
                    _ => out,
                },
                _ => out,
            },
        };
    }
    out
}
