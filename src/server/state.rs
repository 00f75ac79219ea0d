//! Application state.
//!
//! Shared, immutable state for all request handlers. The only mutable part
//! of a running server is the revalidation cache inside the store.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::image::ImageUrlBuilder;
use crate::render::{Chrome, RenderContext};
use crate::types::{NavPage, SiteSettings};

pub struct AppState {
    /// Content source, usually a [`crate::content::CachedStore`].
    pub store: Arc<dyn ContentStore>,
    pub config: SiteConfig,
    pub images: ImageUrlBuilder,
    /// Fixed seed for the random project order. `None` draws a fresh
    /// shuffle per request.
    pub shuffle_seed: Option<u64>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, config: SiteConfig) -> Self {
        let images = ImageUrlBuilder::new(
            &config.images.cdn_url,
            &config.content.project_id,
            &config.content.dataset,
        );
        Self {
            store,
            config,
            images,
            shuffle_seed: None,
        }
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub(crate) fn chrome(&self, settings: Option<&SiteSettings>, nav_pages: &[NavPage]) -> Chrome {
        Chrome::build(settings, nav_pages, &self.config, &self.images)
    }

    pub(crate) fn context<'a>(&'a self, chrome: &'a Chrome) -> RenderContext<'a> {
        RenderContext {
            chrome,
            images: &self.images,
            sizes: &self.config.images,
        }
    }
}
