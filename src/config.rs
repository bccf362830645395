//! Configuration for a segmentation-and-enrichment run.
//!
//! Every knob lives in [`PipelineConfig`], built through
//! [`PipelineConfigBuilder`]. The defaults reproduce the historical fixed
//! behaviour: the `science` collection, a 50 000-character section limit,
//! one enrichment request per second, and `output/` as the destination.

use crate::error::WikiTopicsError;
use crate::pipeline::segment::SectionClassifier;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Section titles dropped as structural boilerplate.
pub const DEFAULT_EXCLUDED_TITLES: [&str; 4] =
    ["References", "External links", "Further reading", "See also"];

/// Configuration for one run.
///
/// # Example
/// ```rust
/// use wikitopics::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .name("physics")
///     .request_delay_ms(250)
///     .output_dir("/tmp/wikitopics")
///     .build()
///     .unwrap();
/// assert_eq!(config.checkpoint_path().file_name().unwrap(), "wikisections-physics.json");
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Collection name, used in output file names. Default: `science`.
    pub name: String,

    /// Directory the two snapshots are written to. Default: `output`.
    pub output_dir: PathBuf,

    /// Sections whose plain text is this many characters or longer are
    /// dropped before enrichment. Default: 50 000.
    pub max_section_chars: usize,

    /// Fixed delay before every enrichment request. Default: 1000 ms.
    pub request_delay_ms: u64,

    /// Exact section titles treated as boilerplate.
    pub excluded_titles: Vec<String>,

    /// Prefix that marks a knowledge-base concept identifier. Default: `Q`.
    pub concept_prefix: String,

    /// Base URL of the Wikipedia REST API.
    pub wikipedia_base_url: String,

    /// Base URL of the Rosette text-analytics API.
    pub rosette_base_url: String,

    /// Rosette API key. Required unless `skip_enrichment` is set or a
    /// custom topic extractor is supplied.
    pub rosette_api_key: Option<String>,

    /// `User-Agent` sent with every request.
    pub user_agent: String,

    /// Per-request timeout in seconds. Default: 60.
    pub http_timeout_secs: u64,

    /// Abort the run on the first failed page instead of skipping it.
    /// Default: false.
    pub strict_fetch: bool,

    /// Stop after writing the segmentation checkpoint. Default: false.
    pub skip_enrichment: bool,

    /// Replaces the first-child heading heuristic used to recognise
    /// content sections.
    pub section_classifier: Option<Arc<dyn SectionClassifier>>,

    /// Optional observer for enrichment progress.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "science".to_string(),
            output_dir: PathBuf::from("output"),
            max_section_chars: 50_000,
            request_delay_ms: 1000,
            excluded_titles: DEFAULT_EXCLUDED_TITLES.iter().map(|t| t.to_string()).collect(),
            concept_prefix: "Q".to_string(),
            wikipedia_base_url: "https://en.wikipedia.org/api/rest_v1".to_string(),
            rosette_base_url: "https://api.rosette.com/rest/v1".to_string(),
            rosette_api_key: None,
            user_agent: concat!("wikitopics/", env!("CARGO_PKG_VERSION")).to_string(),
            http_timeout_secs: 60,
            strict_fetch: false,
            skip_enrichment: false,
            section_classifier: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("name", &self.name)
            .field("output_dir", &self.output_dir)
            .field("max_section_chars", &self.max_section_chars)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("excluded_titles", &self.excluded_titles)
            .field("concept_prefix", &self.concept_prefix)
            .field("wikipedia_base_url", &self.wikipedia_base_url)
            .field("rosette_base_url", &self.rosette_base_url)
            .field("rosette_api_key", &self.rosette_api_key.as_ref().map(|_| "<redacted>"))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("strict_fetch", &self.strict_fetch)
            .field("skip_enrichment", &self.skip_enrichment)
            .field(
                "section_classifier",
                &self.section_classifier.as_ref().map(|_| "<dyn SectionClassifier>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn EnrichmentProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// `output/wikisections-<name>.json`: the post-filter checkpoint.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join(format!("wikisections-{}.json", self.name))
    }

    /// `output/sectionswithtopics-<name>.json`: the enriched result.
    pub fn enriched_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("sectionswithtopics-{}.json", self.name))
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn max_section_chars(mut self, n: usize) -> Self {
        self.config.max_section_chars = n;
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn excluded_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.excluded_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn concept_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.concept_prefix = prefix.into();
        self
    }

    pub fn wikipedia_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.wikipedia_base_url = url.into();
        self
    }

    pub fn rosette_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.rosette_base_url = url.into();
        self
    }

    pub fn rosette_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.rosette_api_key = Some(key.into());
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs.max(1);
        self
    }

    pub fn strict_fetch(mut self, v: bool) -> Self {
        self.config.strict_fetch = v;
        self
    }

    pub fn skip_enrichment(mut self, v: bool) -> Self {
        self.config.skip_enrichment = v;
        self
    }

    pub fn section_classifier(mut self, classifier: Arc<dyn SectionClassifier>) -> Self {
        self.config.section_classifier = Some(classifier);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, WikiTopicsError> {
        let c = &self.config;
        if c.name.trim().is_empty() {
            return Err(WikiTopicsError::InvalidConfig(
                "Collection name must not be empty".into(),
            ));
        }
        if c.name.contains(['/', '\\']) {
            return Err(WikiTopicsError::InvalidConfig(format!(
                "Collection name must not contain path separators, got '{}'",
                c.name
            )));
        }
        if c.max_section_chars == 0 {
            return Err(WikiTopicsError::InvalidConfig(
                "Section size threshold must be ≥ 1".into(),
            ));
        }
        if c.concept_prefix.is_empty() {
            return Err(WikiTopicsError::InvalidConfig(
                "Concept prefix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
