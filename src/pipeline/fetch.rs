//! Page retrieval: one concurrent request per page, joined in a single wait.

use crate::error::{FetchError, WikiTopicsError};
use crate::services::ArticleSource;
use futures::future::join_all;
use indexmap::{IndexMap, IndexSet};
use tracing::{info, warn};

/// Raw markup keyed by page identifier, in input order.
pub type PageMarkup = IndexMap<String, String>;

/// What the fetch phase produced.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub pages: PageMarkup,
    pub failures: Vec<FetchError>,
}

/// Remove duplicate page identifiers, keeping first occurrences in order.
pub fn dedup_pages<I, S>(pages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    pages
        .into_iter()
        .map(Into::into)
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Fetch every page concurrently and wait for all of them.
///
/// Failures are isolated per page unless `strict` is set, in which case the
/// first failure (in input order) aborts with `FetchFailed`. With no
/// successes at all the result is `AllPagesFailed`.
pub async fn fetch_pages(
    pages: &[String],
    source: &dyn ArticleSource,
    strict: bool,
) -> Result<FetchOutcome, WikiTopicsError> {
    if pages.is_empty() {
        return Err(WikiTopicsError::NoPages);
    }

    info!("Fetching {} pages", pages.len());
    let results = join_all(pages.iter().map(|page| async move {
        let html = source.fetch_html(page).await;
        (page, html)
    }))
    .await;

    let mut outcome = FetchOutcome::default();
    for (page, result) in results {
        match result {
            Ok(html) => {
                outcome.pages.insert(page.clone(), html);
            }
            Err(e) if strict => {
                return Err(WikiTopicsError::FetchFailed {
                    page: page.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!("Failed to fetch '{}': {}", page, e);
                outcome.failures.push(FetchError {
                    page: page.clone(),
                    detail: e.to_string(),
                });
            }
        }
    }

    if outcome.pages.is_empty() {
        let first_error = outcome
            .failures
            .first()
            .map(|f| f.detail.clone())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(WikiTopicsError::AllPagesFailed {
            total: pages.len(),
            first_error,
        });
    }

    Ok(outcome)
}
