//! Site configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top, so a config
//! file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [content]
//! project_id = ""             # Content store project id (required to serve live)
//! dataset = "production"
//! api_version = "2024-01-01"
//! use_cdn = true              # Query the edge-cached API host
//! timeout_secs = 10
//! # token = "..."             # Or set FOLIO_SANITY_TOKEN
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! revalidate_secs = 60        # How long fetched content is reused
//!
//! [site]
//! fallback_title = "Portfolio"
//! # owner_name = "..."        # Header name, defaults to the site title
//! nav_priority = ["/", "/about", "/contact"]
//!
//! [images]
//! cdn_url = "https://cdn.sanity.io"
//! card_width = 500
//! grid_width = 800
//! detail_width = 1600
//! favicon_size = 32
//!
//! [theme]
//! background = "#000000"      # Used when site settings leave a color unset
//! text = "#FFFFFF"
//! link = "#FFFFFF"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{SiteSettings, non_empty};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable that supplies the content store token.
pub const TOKEN_ENV: &str = "FOLIO_SANITY_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `folio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content store connection.
    pub content: ContentConfig,
    /// HTTP listener and revalidation window.
    pub server: ServerConfig,
    /// Site identity fallbacks and navigation order.
    pub site: BrandingConfig,
    /// Asset CDN and display widths.
    pub images: ImagesConfig,
    /// Fallback colors.
    pub theme: ThemeConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.dataset.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content.dataset must not be empty".into(),
            ));
        }
        if self.content.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "content.timeout_secs must be non-zero".into(),
            ));
        }
        if !self
            .content
            .project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::Validation(
                "content.project_id may only contain letters, digits and '-'".into(),
            ));
        }
        let widths = [
            self.images.card_width,
            self.images.grid_width,
            self.images.detail_width,
            self.images.favicon_size,
        ];
        if widths.contains(&0) {
            return Err(ConfigError::Validation(
                "images widths must be non-zero".into(),
            ));
        }
        if self.site.nav_priority.iter().any(|p| !p.starts_with('/')) {
            return Err(ConfigError::Validation(
                "site.nav_priority entries must be paths starting with '/'".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides. Only the token is read from the
    /// environment so it never has to live in a checked-in file.
    pub fn apply_env(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.content.token = Some(token);
        }
    }
}

/// Content store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Project id, the first label of the API host name.
    pub project_id: String,
    pub dataset: String,
    /// Dated API version, with or without the leading `v`.
    pub api_version: String,
    /// Query the edge-cached host. Ignored when a token is set, since
    /// authenticated queries must hit the live API.
    pub use_cdn: bool,
    /// Read token for private datasets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            token: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds a fetched document is reused before the next request
    /// re-fetches it. Zero disables reuse.
    pub revalidate_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            revalidate_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandingConfig {
    /// Document title when site settings carry none.
    pub fallback_title: String,
    /// Name shown in the header. Defaults to the site title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// Navigation paths in display order. Unlisted paths follow, in
    /// content order.
    pub nav_priority: Vec<String>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            fallback_title: "Portfolio".to_string(),
            owner_name: None,
            nav_priority: vec!["/".into(), "/about".into(), "/contact".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Asset CDN base URL.
    pub cdn_url: String,
    /// Listing card image width.
    pub card_width: u32,
    /// Image grid width (additional images).
    pub grid_width: u32,
    /// Featured and lightbox image width.
    pub detail_width: u32,
    /// Favicon edge length.
    pub favicon_size: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            cdn_url: "https://cdn.sanity.io".to_string(),
            card_width: 500,
            grid_width: 800,
            detail_width: 1600,
            favicon_size: 32,
        }
    }
}

/// Colors used when site settings leave one unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub background: String,
    pub text: String,
    pub link: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#000000".to_string(),
            text: "#FFFFFF".to_string(),
            link: "#FFFFFF".to_string(),
        }
    }
}

/// The resolved color theme for a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: String,
    pub text: String,
    pub link: String,
}

impl Theme {
    /// Settings colors win; blank or missing ones fall back to config.
    pub fn resolve(settings: Option<&SiteSettings>, fallback: &ThemeConfig) -> Self {
        let pick = |value: Option<&String>, default: &str| {
            non_empty(value.map(String::as_str))
                .filter(|v| is_safe_css_value(v))
                .unwrap_or(default)
                .to_string()
        };
        Self {
            background: pick(
                settings.and_then(|s| s.background_color.as_ref()),
                &fallback.background,
            ),
            text: pick(settings.and_then(|s| s.font_color.as_ref()), &fallback.text),
            link: pick(
                settings.and_then(|s| s.font_link_color.as_ref()),
                &fallback.link,
            ),
        }
    }
}

/// Colors come from editable documents and end up inside a `<style>` block.
fn is_safe_css_value(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' '))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when the file is
/// absent, then apply the environment token override.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, overlay)?;
    config.apply_env(std::env::var(TOKEN_ENV).ok());
    Ok(config)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Content store
# ---------------------------------------------------------------------------
[content]
# Project id from the content studio (the first label of the API host).
project_id = ""

dataset = "production"

# Dated API version.
api_version = "2024-01-01"

# Query the edge-cached API host. Authenticated queries always use the
# live host regardless of this flag.
use_cdn = true

# Per-request timeout in seconds.
timeout_secs = 10

# Read token for private datasets. Prefer the FOLIO_SANITY_TOKEN
# environment variable over storing it here.
# token = ""

# ---------------------------------------------------------------------------
# Server
# ---------------------------------------------------------------------------
[server]
host = "127.0.0.1"
port = 3000

# Seconds fetched content is reused before being fetched again.
# 0 fetches on every request.
revalidate_secs = 60

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Document title used when site settings have no title.
fallback_title = "Portfolio"

# Name shown in the page header. Defaults to the site title.
# owner_name = ""

# Navigation order. Pages whose path is not listed come after these.
nav_priority = ["/", "/about", "/contact"]

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
cdn_url = "https://cdn.sanity.io"

# Requested widths in pixels.
card_width = 500
grid_width = 800
detail_width = 1600
favicon_size = 32

# ---------------------------------------------------------------------------
# Theme fallbacks (site settings colors take precedence)
# ---------------------------------------------------------------------------
[theme]
background = "#000000"
text = "#FFFFFF"
link = "#FFFFFF"
"##
}

/// Generate CSS custom properties from a resolved theme.
pub fn generate_theme_css(theme: &Theme) -> String {
    format!(
        r#":root {{
    --color-background: {background};
    --color-text: {text};
    --color-link: {link};
}}"#,
        background = theme.background,
        text = theme.text,
        link = theme.link,
    )
}
