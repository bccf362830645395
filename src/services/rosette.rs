//! Topic extractor backed by the Rosette `/topics` endpoint.
//!
//! Request body: `{"content": "<section text>"}`.
//! Response: `{"keyphrases": [...], "concepts": [{"phrase", "salience", "conceptId"}, ...]}`.
//! Only `concepts` is read; a body without it counts as a failed call.

use super::{build_http_client, status_error, transport_error, TopicExtractor};
use crate::error::{ServiceError, WikiTopicsError};
use crate::output::Topic;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "X-RosetteAPI-Key";

#[derive(Serialize)]
struct TopicsRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct TopicsResponse {
    concepts: Vec<Topic>,
}

/// Client for the Rosette topic-extraction endpoint.
pub struct RosetteClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl RosetteClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, WikiTopicsError> {
        Ok(Self {
            client: build_http_client("rosette", user_agent, timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_secs,
        })
    }
}

/// Decode a `/topics` response body into its concept list.
pub fn parse_topics_response(body: &str) -> Result<Vec<Topic>, ServiceError> {
    serde_json::from_str::<TopicsResponse>(body)
        .map(|r| r.concepts)
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

#[async_trait]
impl TopicExtractor for RosetteClient {
    async fn extract_topics(&self, text: &str) -> Result<Vec<Topic>, ServiceError> {
        let response = self
            .client
            .post(format!("{}/topics", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&TopicsRequest { content: text })
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        parse_topics_response(&body)
    }
}
