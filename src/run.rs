//! Run entry points: fetch, segment, filter, checkpoint, enrich, write.
//!
//! A run either fails before writing anything (fatal fetch errors) or
//! produces both snapshots, with per-section enrichment failures recorded in
//! the stats and logged. Write failures are logged and do not stop the run.

use crate::config::PipelineConfig;
use crate::error::WikiTopicsError;
use crate::output::{section_count, RunOutput, RunResult, RunStats};
use crate::pipeline::segment::Segmenter;
use crate::pipeline::{fetch, filter, write};
use crate::services::Services;
use crate::stream::enrich_stream;
use futures::StreamExt;
use std::time::Instant;
use tracing::{debug, info};

/// Run the whole pipeline against the HTTP services named in `config`.
///
/// # Errors
/// Returns `Err(WikiTopicsError)` only for fatal errors:
/// - invalid or incomplete service configuration
/// - an empty page list
/// - every page failed to fetch (or any page, with `strict_fetch`)
///
/// # Example
/// ```rust,no_run
/// use wikitopics::{run, PipelineConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::builder()
///     .rosette_api_key(std::env::var("ROSETTE_API_KEY")?)
///     .build()?;
/// let output = run(["Albert Einstein", "Niels Bohr"], &config).await?;
/// eprintln!("{} requests", output.stats.enrichment_requests);
/// # Ok(())
/// # }
/// ```
pub async fn run<I, S>(pages: I, config: &PipelineConfig) -> Result<RunOutput, WikiTopicsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let services = Services::from_config(config)?;
    run_with_services(pages, config, &services).await
}

/// Run the whole pipeline with caller-supplied services.
pub async fn run_with_services<I, S>(
    pages: I,
    config: &PipelineConfig,
    services: &Services,
) -> Result<RunOutput, WikiTopicsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let total_start = Instant::now();

    // ── Steps 1–3: Fetch, segment, filter ────────────────────────────────
    let (sections, mut stats) = segment_pages(pages, config, services).await?;

    // ── Step 4: Checkpoint ───────────────────────────────────────────────
    write::write_snapshot(&sections, &config.checkpoint_path()).await;

    if config.skip_enrichment {
        info!("Enrichment skipped");
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        return Ok(RunOutput { sections, stats });
    }

    // ── Step 5: Enrich, one section at a time ────────────────────────────
    let mut enriched: RunResult = sections
        .keys()
        .map(|page| (page.clone(), Vec::new()))
        .collect();

    if let Some(ref cb) = config.progress_callback {
        cb.on_enrichment_start(section_count(&sections));
    }

    let mut stream = enrich_stream(sections, services, config);
    while let Some(item) = stream.next().await {
        stats.enrichment_requests += 1;
        let section = item.section;

        match &item.outcome {
            Ok(n) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_section_complete(&section.page, &section.title, section.level, *n);
                }
            }
            Err(e) => {
                stats.enrichment_failures += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_section_error(&section.page, &section.title, section.level, &e.detail);
                }
            }
        }

        enriched.entry(item.page).or_default().push(section);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_enrichment_complete(stats.enrichment_requests, stats.enrichment_failures);
    }
    info!("Total requests to Rosette: {}", stats.enrichment_requests);

    // ── Step 6: Final snapshot ───────────────────────────────────────────
    write::write_snapshot(&enriched, &config.enriched_path()).await;

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Run complete: {} pages, {} sections, {} enrichment failures, {}ms",
        stats.pages_fetched, stats.sections_kept, stats.enrichment_failures, stats.total_duration_ms
    );

    Ok(RunOutput {
        sections: enriched,
        stats,
    })
}

/// Fetch, segment and size-filter `pages` without writing or enriching.
///
/// The returned stats cover the fetch and segmentation counters only.
pub async fn segment_pages<I, S>(
    pages: I,
    config: &PipelineConfig,
    services: &Services,
) -> Result<(RunResult, RunStats), WikiTopicsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let pages = fetch::dedup_pages(pages);
    let mut stats = RunStats {
        pages_requested: pages.len(),
        ..Default::default()
    };

    info!("Grabbing data from Wikipedia.");
    let fetched = fetch::fetch_pages(&pages, services.articles(), config.strict_fetch).await?;
    stats.pages_fetched = fetched.pages.len();
    stats.pages_failed = fetched.failures.len();

    let segmenter = Segmenter::from_config(config);
    let mut sections: RunResult = fetched
        .pages
        .iter()
        .map(|(page, html)| (page.clone(), segmenter.segment(page, html)))
        .collect();
    stats.sections_segmented = section_count(&sections);
    debug!("Segmented {} sections", stats.sections_segmented);

    stats.sections_oversized = filter::drop_oversized(&mut sections, config.max_section_chars);
    stats.sections_kept = section_count(&sections);
    info!("Number of sections: {}", stats.sections_kept);

    Ok((sections, stats))
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync<I, S>(pages: I, config: &PipelineConfig) -> Result<RunOutput, WikiTopicsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tokio::runtime::Runtime::new()
        .map_err(|e| WikiTopicsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(pages, config))
}
