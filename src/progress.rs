//! Progress-callback trait for per-section enrichment events.
//!
//! Inject an [`Arc<dyn EnrichmentProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to observe the
//! enrichment phase as it walks through the sections one request at a time.
//! The library never touches the terminal itself; the CLI uses this hook to
//! drive an `indicatif` progress bar.
//!
//! # Example
//!
//! ```rust
//! use wikitopics::{EnrichmentProgressCallback, PipelineConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl EnrichmentProgressCallback for CountingCallback {
//!     fn on_section_complete(&self, page: &str, title: &str, _level: u32, topics: usize) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{page} -> {title}: {topics} topics");
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the enrichment loop as it processes each section.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive strictly in order because at most one
/// enrichment request is ever outstanding.
pub trait EnrichmentProgressCallback: Send + Sync {
    /// Called once before the first request, with the number of sections
    /// that will be submitted.
    fn on_enrichment_start(&self, total_sections: usize) {
        let _ = total_sections;
    }

    /// Called after the throttle delay, just before a request is sent.
    ///
    /// `index` is 1-based across the whole run.
    fn on_section_start(&self, page: &str, title: &str, level: u32, index: usize, total: usize) {
        let _ = (page, title, level, index, total);
    }

    /// Called when topics were attached to a section.
    fn on_section_complete(&self, page: &str, title: &str, level: u32, topics: usize) {
        let _ = (page, title, level, topics);
    }

    /// Called when a section's request failed; the section keeps no topics.
    fn on_section_error(&self, page: &str, title: &str, level: u32, error: &str) {
        let _ = (page, title, level, error);
    }

    /// Called once after every section has been attempted.
    fn on_enrichment_complete(&self, requests: usize, failures: usize) {
        let _ = (requests, failures);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl EnrichmentProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn EnrichmentProgressCallback>;
