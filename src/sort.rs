//! Project list ordering.
//!
//! The home page lets visitors reorder the featured grid. Every reorder is
//! derived from the originally fetched set held by [`ProjectGallery`]; a view
//! is never re-sorted from a previous view, so repeated shuffles cannot
//! compound and date/title orders are always exact.

use crate::types::{ProjectCard, ProjectDocument};
use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
    Random,
}

impl SortOrder {
    /// Orders in the sequence the sort control presents them.
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Alphabetical,
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::Random,
    ];

    /// Query-string value.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Alphabetical => "alpha",
            SortOrder::Random => "random",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
            SortOrder::Alphabetical => "Alphabetical",
            SortOrder::Random => "Random",
        }
    }

    /// Parse a query-string value, falling back to the default order for
    /// anything unrecognized.
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "alpha" | "alphabetical" => Ok(SortOrder::Alphabetical),
            "random" => Ok(SortOrder::Random),
            _ => Err(UnknownSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields ordering looks at.
pub trait Sortable: Clone {
    fn sort_date(&self) -> NaiveDate;
    fn sort_title(&self) -> &str;
}

impl Sortable for ProjectCard {
    fn sort_date(&self) -> NaiveDate {
        self.date
    }
    fn sort_title(&self) -> &str {
        &self.title
    }
}

impl Sortable for ProjectDocument {
    fn sort_date(&self) -> NaiveDate {
        self.date
    }
    fn sort_title(&self) -> &str {
        &self.title
    }
}

/// Case-insensitive, accent-aware title comparison.
///
/// Titles are compared first on their base letters (decomposed, combining
/// marks dropped, lowercased), so "Éclair" files under "e" rather than after
/// "z". Ties are broken by the lowercased titles with accents kept, then by
/// a plain comparison so the order stays total.
pub fn title_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| {
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
        })
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase)
}

/// Produce a new ordered copy of `items`. The input is left untouched.
///
/// Date orders are stable: projects sharing a date keep their input order.
/// `Random` draws from `rng`; pass a seeded generator for reproducible output.
pub fn sort_projects<T, R>(items: &[T], order: SortOrder, rng: &mut R) -> Vec<T>
where
    T: Sortable,
    R: Rng + ?Sized,
{
    let mut sorted = items.to_vec();
    match order {
        SortOrder::Newest => sorted.sort_by(|a, b| b.sort_date().cmp(&a.sort_date())),
        SortOrder::Oldest => sorted.sort_by_key(Sortable::sort_date),
        SortOrder::Alphabetical => sorted.sort_by(|a, b| title_cmp(a.sort_title(), b.sort_title())),
        SortOrder::Random => sorted.shuffle(rng),
    }
    sorted
}

/// The fetched project set, kept immutable for the lifetime of a listing.
#[derive(Debug, Clone)]
pub struct ProjectGallery {
    original: Arc<[ProjectCard]>,
}

impl ProjectGallery {
    pub fn new(projects: Vec<ProjectCard>) -> Self {
        Self {
            original: projects.into(),
        }
    }

    /// The set as fetched, in source order.
    pub fn original(&self) -> &[ProjectCard] {
        &self.original
    }

    /// A fresh ordered view, always derived from the original set.
    pub fn view<R: Rng + ?Sized>(&self, order: SortOrder, rng: &mut R) -> Vec<ProjectCard> {
        sort_projects(&self.original, order, rng)
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}
