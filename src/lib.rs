//! # wikitopics
//!
//! Split Wikipedia articles into sections and annotate every section with
//! knowledge-base topics from a text-analytics service.
//!
//! ## Pipeline Overview
//!
//! ```text
//! page list
//!  │
//!  ├─ 1. Fetch     all pages concurrently from the Wikipedia REST API
//!  ├─ 2. Segment   <section data-mw-section-id> blocks → titled, leveled sections
//!  ├─ 3. Filter    drop sections of 50 000 characters or more
//!  ├─ 4. Write     output/wikisections-<name>.json (checkpoint)
//!  ├─ 5. Enrich    one Rosette /topics call per section, 1 s apart
//!  └─ 6. Write     output/sectionswithtopics-<name>.json
//! ```
//!
//! Only concepts with a Wikidata identifier (`Q…`) are kept, ranked by
//! descending salience. A failed enrichment call leaves that one section
//! without topics; the run carries on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wikitopics::{collections, run, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .name("science")
//!         .rosette_api_key(std::env::var("ROSETTE_API_KEY")?)
//!         .build()?;
//!     let output = run(collections::SCIENCE.iter().copied(), &config).await?;
//!     eprintln!("{} sections enriched", output.stats.sections_kept);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing with fakes
//!
//! Both upstream services are traits ([`ArticleSource`], [`TopicExtractor`])
//! bundled in [`Services`]. Pass your own implementations to
//! [`run_with_services`] to run the pipeline without network access.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wikitopics` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod collections;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod run;
pub mod services;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{FetchError, SectionError, ServiceError, WikiTopicsError, WriteError};
pub use output::{RunOutput, RunResult, RunStats, Section, SectionContent, Topic, LEAD_TITLE};
pub use pipeline::segment::{FirstChildHeadingClassifier, SectionClassifier, SectionHeading, Segmenter};
pub use progress::{EnrichmentProgressCallback, NoopProgressCallback, ProgressCallback};
pub use run::{run, run_sync, run_with_services, segment_pages};
pub use services::{ArticleSource, RosetteClient, Services, TopicExtractor, WikipediaSource};
pub use stream::{enrich_stream, EnrichedSection, EnrichmentStream};
