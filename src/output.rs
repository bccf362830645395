//! Data model shared by every pipeline stage and written to the JSON snapshots.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Title given to the lead (introductory) block of every page.
pub const LEAD_TITLE: &str = "__intro__";

/// Mapping from page identifier to its sections, in input order.
///
/// Insertion order is preserved so that snapshots list pages in the order
/// they were requested.
pub type RunResult = IndexMap<String, Vec<Section>>;

/// One titled, leveled block of article content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the page this section belongs to.
    pub page: String,
    /// Heading text, or [`LEAD_TITLE`] for the lead block.
    pub title: String,
    /// 0 for the lead block, otherwise heading rank − 1.
    pub level: u32,
    pub content: SectionContent,
    /// Ranked topics, attached by the enricher. Absent when enrichment
    /// failed or has not run yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
}

impl Section {
    /// True for the page's lead block.
    pub fn is_lead(&self) -> bool {
        self.level == 0 && self.title == LEAD_TITLE
    }

    /// Length of the plain-text rendering, in characters.
    pub fn text_len(&self) -> usize {
        self.content.text.chars().count()
    }
}

/// Plain-text and markup renderings of a section block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContent {
    pub text: String,
    pub html: String,
}

/// A concept returned by the topic-extraction service.
///
/// Only `conceptId` and `salience` are interpreted; every other field the
/// service sends (`phrase`, …) is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(rename = "conceptId")]
    pub concept_id: String,
    pub salience: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Topic {
    pub fn new(concept_id: impl Into<String>, salience: f64) -> Self {
        Self {
            concept_id: concept_id.into(),
            salience,
            extra: serde_json::Map::new(),
        }
    }
}

/// Result of a full run: final sections plus statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub sections: RunResult,
    pub stats: RunStats,
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Distinct page identifiers requested.
    pub pages_requested: usize,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    /// Sections accepted by the segmenter, before the size filter.
    pub sections_segmented: usize,
    /// Sections dropped by the size filter.
    pub sections_oversized: usize,
    /// Sections written to the checkpoint.
    pub sections_kept: usize,
    /// Enrichment requests issued, successful or not.
    pub enrichment_requests: usize,
    pub enrichment_failures: usize,
    pub total_duration_ms: u64,
}

/// Total number of sections across all pages.
pub fn section_count(result: &RunResult) -> usize {
    result.values().map(Vec::len).sum()
}
