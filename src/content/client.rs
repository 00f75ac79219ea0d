//! HTTP client for the hosted content store's GROQ query API.
//!
//! ```text
//! GET https://{project}.{api|apicdn}.sanity.io/v{version}/data/query/{dataset}
//!     ?query=<GROQ>&$slug="about"
//! ```
//!
//! Parameter values are JSON-encoded and sent as `$name` query-string
//! entries; they never touch the query text. Responses arrive wrapped as
//! `{"ms": 12, "query": "...", "result": ...}` and only `result` is kept.

use super::{ContentError, ContentStore, Query};
use crate::config::ContentConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Response bodies longer than this are cut down before landing in an error.
const MAX_ERROR_BODY: usize = 512;

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

/// Live content store client.
#[derive(Debug, Clone)]
pub struct SanityClient {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl SanityClient {
    pub fn new(config: &ContentConfig) -> Result<Self, ContentError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let endpoint = query_endpoint(config);
        info!(endpoint = %endpoint, authenticated = config.token.is_some(), "content store client ready");

        Ok(Self {
            http,
            endpoint,
            token: config.token.clone(),
        })
    }

    /// The dataset query URL, without parameters.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, query: &Query) -> Result<reqwest::RequestBuilder, ContentError> {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.groq().to_string())];
        for (name, value) in query.params() {
            pairs.push((format!("${name}"), serde_json::to_string(value)?));
        }

        let mut request = self.http.get(&self.endpoint).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }
}

/// Build the query endpoint. Token-authenticated clients always use the live
/// API host because the edge cache does not serve private data.
pub fn query_endpoint(config: &ContentConfig) -> String {
    let host = if config.use_cdn && config.token.is_none() {
        "apicdn"
    } else {
        "api"
    };
    let version = config.api_version.trim().trim_start_matches('v');
    format!(
        "https://{}.{}.sanity.io/v{}/data/query/{}",
        config.project_id, host, version, config.dataset
    )
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn fetch(&self, query: &Query) -> Result<Value, ContentError> {
        let started = Instant::now();
        let response = self.request(query)?.send().await.map_err(|e| {
            error!(kind = query.kind(), error = %e, "content request failed");
            ContentError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY);
            error!(kind = query.kind(), status = status.as_u16(), "content store error response");
            return Err(ContentError::HttpResponse {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: QueryResponse = serde_json::from_slice(&bytes)?;
        debug!(
            kind = query.kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = bytes.len(),
            "content query"
        );
        Ok(envelope.result)
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ContentConfig {
        ContentConfig {
            project_id: "abc123".into(),
            ..ContentConfig::default()
        }
    }

    #[test]
    fn endpoint_uses_cdn_host_by_default() {
        assert_eq!(
            query_endpoint(&config()),
            "https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production"
        );
    }

    #[test]
    fn endpoint_uses_live_host_with_token_or_without_cdn() {
        let mut with_token = config();
        with_token.token = Some("secret".into());
        assert!(query_endpoint(&with_token).starts_with("https://abc123.api.sanity.io/"));

        let mut no_cdn = config();
        no_cdn.use_cdn = false;
        assert!(query_endpoint(&no_cdn).starts_with("https://abc123.api.sanity.io/"));
    }

    #[test]
    fn endpoint_accepts_prefixed_version() {
        let mut cfg = config();
        cfg.api_version = "v2021-10-21".into();
        assert!(query_endpoint(&cfg).contains("/v2021-10-21/"));
    }

    #[test]
    fn parameters_are_json_encoded_not_interpolated() {
        let client = SanityClient::new(&config()).unwrap();
        let request = client
            .request(&Query::PageBySlug(r#"ab"out"#.into()))
            .unwrap()
            .build()
            .unwrap();
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(pairs[0].0, "query");
        assert!(pairs[0].1.contains("slug.current == $slug"));
        assert!(!pairs[0].1.contains("ab\"out"));
        assert_eq!(pairs[1], ("$slug".to_string(), r#""ab\"out""#.to_string()));
    }

    #[test]
    fn token_is_sent_as_bearer() {
        let mut cfg = config();
        cfg.token = Some("secret".into());
        let client = SanityClient::new(&cfg).unwrap();
        let request = client.request(&Query::NavPages).unwrap().build().unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer secret"
        );
    }

    #[test]
    fn truncates_long_error_bodies() {
        let mut body = "é".repeat(400);
        truncate_on_char_boundary(&mut body, 511);
        assert_eq!(body.len(), 510);
    }
}
