//! The enrichment phase as a stream of enriched sections.
//!
//! Sections are walked page by page, in document order, through a single
//! `then` chain: the next step starts only after the previous one resolved,
//! so exactly one topic request is outstanding at any time. Each step first
//! sleeps [`PipelineConfig::request_delay_ms`], whether or not the previous
//! request succeeded, then submits the section.
//!
//! [`crate::run::run_with_services`] drives this stream with one loop and
//! reassembles the enriched [`RunResult`]. Library callers can consume it
//! directly to persist or display sections as they arrive.

use crate::config::PipelineConfig;
use crate::error::SectionError;
use crate::output::{section_count, RunResult, Section};
use crate::pipeline::enrich;
use crate::services::Services;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use tokio_stream::Stream;
use tracing::{info, warn};

/// One section after its enrichment attempt.
#[derive(Debug, Clone)]
pub struct EnrichedSection {
    /// Page the section belongs to.
    pub page: String,
    /// 1-based position across the whole run.
    pub index: usize,
    /// Number of sections in the run.
    pub total: usize,
    /// The section, with `topics` set on success.
    pub section: Section,
    /// Number of topics attached, or why there are none.
    pub outcome: Result<usize, SectionError>,
}

/// A boxed stream of enriched sections, borrowing the services and config.
pub type EnrichmentStream<'a> = Pin<Box<dyn Stream<Item = EnrichedSection> + Send + 'a>>;

/// Enrich every section of `sections`, one request at a time.
pub fn enrich_stream<'a>(
    sections: RunResult,
    services: &'a Services,
    config: &'a PipelineConfig,
) -> EnrichmentStream<'a> {
    let total = section_count(&sections);
    let delay = Duration::from_millis(config.request_delay_ms);
    let items = sections.into_values().flatten().enumerate();

    let s = stream::iter(items).then(move |(i, mut section)| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let index = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_section_start(&section.page, &section.title, section.level, index, total);
        }
        info!(
            "Fetching topics: {} -> {} (level {})",
            section.page, section.title, section.level
        );

        let outcome =
            match enrich::enrich_section(&section, services.topics(), &config.concept_prefix).await
            {
                Ok(topics) => {
                    let n = topics.len();
                    info!(
                        "{} -> {} (level {}) -- Topics fetched: {}",
                        section.page, section.title, section.level, n
                    );
                    section.topics = Some(topics);
                    Ok(n)
                }
                Err(e) => {
                    warn!("Topic extraction failed ({}): {}", section.page, e.detail);
                    Err(e)
                }
            };

        EnrichedSection {
            page: section.page.clone(),
            index,
            total,
            section,
            outcome,
        }
    });

    Box::pin(s)
}
