//! Section segmentation: split one article's Parsoid HTML into titled,
//! leveled sections.
//!
//! Every `<section data-mw-section-id="N">` element is a candidate. Whether a
//! candidate is real content, and what it is called, is decided by a
//! [`SectionClassifier`]. The default, [`FirstChildHeadingClassifier`], looks
//! only at the block's first child element:
//!
//! | Block | Result |
//! |-------|--------|
//! | `data-mw-section-id="0"` | lead: title `__intro__`, level 0 |
//! | first child `<h2>`…`<h7>` | title = heading text, level = rank − 1 |
//! | anything else | discarded |
//!
//! This misfires on markup that wraps headings (e.g. in a `div`); such
//! blocks are dropped rather than guessed at.
//!
//! Sections nest in Parsoid output, so a parent's `text`/`html` include its
//! subsections. Blocks are emitted in document (pre-)order.

use crate::config::PipelineConfig;
use crate::output::{Section, SectionContent, LEAD_TITLE};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::debug;

/// Attribute carrying the section index.
pub const SECTION_ID_ATTR: &str = "data-mw-section-id";

/// Section index of the lead block.
pub const LEAD_SECTION_ID: &str = "0";

static SECTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("section[data-mw-section-id]").unwrap());

static RE_HEADING_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^h([2-7])$").unwrap());

/// Title and level of a block accepted as content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeading {
    pub title: String,
    pub level: u32,
}

/// Decides whether a section block is content and, if so, how it is titled.
pub trait SectionClassifier: Send + Sync {
    /// Return `None` to discard the block.
    fn classify(&self, block: ElementRef<'_>) -> Option<SectionHeading>;
}

/// Classifies blocks by the tag name of their first child element.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChildHeadingClassifier;

impl SectionClassifier for FirstChildHeadingClassifier {
    fn classify(&self, block: ElementRef<'_>) -> Option<SectionHeading> {
        if block.value().attr(SECTION_ID_ATTR) == Some(LEAD_SECTION_ID) {
            return Some(SectionHeading {
                title: LEAD_TITLE.to_string(),
                level: 0,
            });
        }

        let first = block.children().find_map(ElementRef::wrap)?;
        let caps = RE_HEADING_TAG.captures(first.value().name())?;
        let rank: u32 = caps[1].parse().ok()?;

        Some(SectionHeading {
            title: first.text().collect(),
            level: rank - 1,
        })
    }
}

/// Splits page markup into sections, dropping boilerplate titles.
#[derive(Clone)]
pub struct Segmenter {
    classifier: Arc<dyn SectionClassifier>,
    excluded_titles: Vec<String>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl Segmenter {
    pub fn new(classifier: Arc<dyn SectionClassifier>, excluded_titles: Vec<String>) -> Self {
        Self {
            classifier,
            excluded_titles,
        }
    }

    /// Use the configured classifier (or the first-child heuristic) and
    /// excluded titles.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let classifier = config
            .section_classifier
            .clone()
            .unwrap_or_else(|| Arc::new(FirstChildHeadingClassifier));
        Self::new(classifier, config.excluded_titles.clone())
    }

    fn is_excluded(&self, title: &str) -> bool {
        self.excluded_titles.iter().any(|t| t == title)
    }

    /// Segment one page. Pure and deterministic for a given input.
    pub fn segment(&self, page: &str, html: &str) -> Vec<Section> {
        let document = Html::parse_document(html);
        let mut sections = Vec::new();

        for block in document.select(&SECTION_SELECTOR) {
            let Some(heading) = self.classifier.classify(block) else {
                continue;
            };
            if self.is_excluded(&heading.title) {
                debug!("{} -> {}: boilerplate, skipped", page, heading.title);
                continue;
            }

            let markup = block.html();
            debug!(
                "{} -> {} (level {}) length: {}",
                page,
                heading.title,
                heading.level,
                markup.len()
            );

            sections.push(Section {
                page: page.to_string(),
                title: heading.title,
                level: heading.level,
                content: SectionContent {
                    text: block.text().collect(),
                    html: markup,
                },
                topics: None,
            });
        }

        sections
    }
}
