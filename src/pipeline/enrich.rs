//! Topic enrichment for a single section.
//!
//! Throttling and ordering live in [`crate::stream`]; this module only
//! submits one section's text and ranks what comes back.

use crate::error::SectionError;
use crate::output::{Section, Topic};
use crate::services::TopicExtractor;

/// Keep concepts whose identifier starts with `prefix`, ordered by
/// descending salience. The sort is stable, so ties keep service order.
pub fn rank_topics(concepts: Vec<Topic>, prefix: &str) -> Vec<Topic> {
    let mut topics: Vec<Topic> = concepts
        .into_iter()
        .filter(|c| c.concept_id.starts_with(prefix))
        .collect();
    topics.sort_by(|a, b| b.salience.total_cmp(&a.salience));
    topics
}

/// Submit the section's text and return its ranked topics.
///
/// Never panics or aborts the run: every failure is returned as a
/// [`SectionError`] naming the page and section.
pub async fn enrich_section(
    section: &Section,
    extractor: &dyn TopicExtractor,
    prefix: &str,
) -> Result<Vec<Topic>, SectionError> {
    extractor
        .extract_topics(&section.content.text)
        .await
        .map(|concepts| rank_topics(concepts, prefix))
        .map_err(|e| SectionError {
            page: section.page.clone(),
            title: section.title.clone(),
            level: section.level,
            detail: e.to_string(),
        })
}
