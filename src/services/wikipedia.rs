//! Article source backed by the Wikipedia REST API (`/page/html/{title}`).
//!
//! The endpoint returns Parsoid HTML, in which every section is a
//! `<section data-mw-section-id="N">` element. That is the structure the
//! segmenter relies on.

use super::{build_http_client, status_error, transport_error, ArticleSource};
use crate::error::{ServiceError, WikiTopicsError};
use async_trait::async_trait;
use tracing::debug;

/// Fetches article HTML from a Wikipedia REST endpoint.
pub struct WikipediaSource {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl WikipediaSource {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, WikiTopicsError> {
        Ok(Self {
            client: build_http_client("wikipedia", user_agent, timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    /// URL of the HTML rendering of `page`.
    pub fn page_url(&self, page: &str) -> String {
        page_url(&self.base_url, page)
    }
}

fn page_url(base_url: &str, page: &str) -> String {
    let title = page.trim().replace(' ', "_");
    format!("{}/page/html/{}", base_url, urlencoding::encode(&title))
}

#[async_trait]
impl ArticleSource for WikipediaSource {
    async fn fetch_html(&self, page: &str) -> Result<String, ServiceError> {
        let url = self.page_url(page);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        response
            .text()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}
