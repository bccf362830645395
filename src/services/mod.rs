//! Upstream collaborators: the article source and the topic extractor.
//!
//! Both are traits so the pipeline never knows whether it is talking to
//! Wikipedia and Rosette over HTTP or to an in-memory fake in a test. They
//! are bundled in [`Services`], which is constructed once and passed
//! explicitly to every stage that performs I/O. Request pacing is not a
//! property of the services; it comes from
//! [`PipelineConfig::request_delay_ms`].

pub mod rosette;
pub mod wikipedia;

use crate::config::PipelineConfig;
use crate::error::{ServiceError, WikiTopicsError};
use crate::output::Topic;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use rosette::RosetteClient;
pub use wikipedia::WikipediaSource;

/// Retrieves the raw markup of an article.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch the HTML for one page identifier.
    async fn fetch_html(&self, page: &str) -> Result<String, ServiceError>;
}

/// Extracts concepts from a block of plain text.
#[async_trait]
pub trait TopicExtractor: Send + Sync {
    /// Return the service's concept list, unfiltered and in service order.
    async fn extract_topics(&self, text: &str) -> Result<Vec<Topic>, ServiceError>;
}

/// The explicitly constructed bundle of upstream services.
#[derive(Clone)]
pub struct Services {
    articles: Arc<dyn ArticleSource>,
    topics: Arc<dyn TopicExtractor>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("articles", &"<dyn ArticleSource>")
            .field("topics", &"<dyn TopicExtractor>")
            .finish()
    }
}

impl Services {
    pub fn new(articles: Arc<dyn ArticleSource>, topics: Arc<dyn TopicExtractor>) -> Self {
        Self { articles, topics }
    }

    /// Build the HTTP-backed services described by `config`.
    ///
    /// # Errors
    /// `ServiceNotConfigured` when enrichment is enabled but no Rosette key
    /// is set, or when an HTTP client cannot be constructed.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, WikiTopicsError> {
        let api_key = match (&config.rosette_api_key, config.skip_enrichment) {
            (Some(key), _) if !key.is_empty() => key.clone(),
            // Never called when enrichment is skipped.
            (_, true) => String::new(),
            _ => {
                return Err(WikiTopicsError::ServiceNotConfigured {
                    service: "rosette".to_string(),
                    hint: "Set ROSETTE_API_KEY or pass --rosette-key.".to_string(),
                })
            }
        };

        let articles = WikipediaSource::new(
            &config.wikipedia_base_url,
            &config.user_agent,
            config.http_timeout_secs,
        )?;
        let topics = RosetteClient::new(
            &config.rosette_base_url,
            api_key,
            &config.user_agent,
            config.http_timeout_secs,
        )?;

        Ok(Self::new(Arc::new(articles), Arc::new(topics)))
    }

    pub fn articles(&self) -> &dyn ArticleSource {
        self.articles.as_ref()
    }

    pub fn topics(&self) -> &dyn TopicExtractor {
        self.topics.as_ref()
    }
}

/// Map a transport-level reqwest error onto [`ServiceError`].
pub(crate) fn transport_error(e: reqwest::Error, timeout_secs: u64) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout { secs: timeout_secs }
    } else {
        ServiceError::Transport(e.to_string())
    }
}

/// Turn a non-success response into [`ServiceError::Status`], keeping the
/// head of the body for the log line.
pub(crate) async fn status_error(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ServiceError::Status {
        status,
        body: body.chars().take(200).collect(),
    }
}

fn build_http_client(
    service: &str,
    user_agent: &str,
    timeout_secs: u64,
) -> Result<reqwest::Client, WikiTopicsError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(|e| WikiTopicsError::ServiceNotConfigured {
            service: service.to_string(),
            hint: format!("Failed to build HTTP client: {e}"),
        })
}
