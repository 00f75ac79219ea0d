//! Navigation assembly.
//!
//! The header always leads with a static `Work` link to the home page,
//! followed by one link per content page that has a slug. Page links are
//! ordered by a priority list of paths (`["/", "/about", "/contact"]` by
//! default); paths not on the list keep their content order and come after
//! every listed path.

use crate::types::{NavLink, NavPage, non_empty};

/// Title of the static home link.
pub const HOME_TITLE: &str = "Work";
pub const HOME_HREF: &str = "/";

/// Build the ordered link list from the navigation page listing.
pub fn assemble_nav(pages: &[NavPage], priority: &[String]) -> Vec<NavLink> {
    let mut page_links: Vec<NavLink> = pages.iter().filter_map(page_link).collect();
    page_links.sort_by_key(|link| rank(&link.href, priority));

    let mut links = Vec::with_capacity(page_links.len() + 1);
    links.push(NavLink {
        title: HOME_TITLE.to_string(),
        href: HOME_HREF.to_string(),
    });
    links.extend(page_links);
    links
}

/// A page without a slug has no address and gets no link. Untitled pages
/// are labelled with their slug.
fn page_link(page: &NavPage) -> Option<NavLink> {
    let slug = non_empty(page.slug.as_deref())?;
    let title = non_empty(page.title.as_deref()).unwrap_or(slug);
    Some(NavLink {
        title: title.to_string(),
        href: format!("/{slug}"),
    })
}

/// Position in the priority list; unlisted paths share the last rank, so
/// the stable sort keeps them in content order.
fn rank(href: &str, priority: &[String]) -> usize {
    priority
        .iter()
        .position(|p| p == href)
        .unwrap_or(priority.len())
}

/// Exact path match. `/about` is not active on `/about/team`.
pub fn is_active(link: &NavLink, current_path: &str) -> bool {
    link.href == current_path
}

/// Open/closed state of the small-screen menu.
///
/// Every page render starts closed, and following a link always closes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Follow a link: the menu closes and the target is returned unchanged.
    pub fn navigate<'a>(&mut self, href: &'a str) -> &'a str {
        self.open = false;
        href
    }
}
