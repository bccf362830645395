//! Pipeline stages for article segmentation and enrichment.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the orchestration in [`crate::run`] stays a readable sequence.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ segment ──▶ filter ──▶ write ──▶ enrich ──▶ write
//! (HTTP,    (HTML,      (size)     (check-   (HTTP,     (final)
//!  parallel) pure)                  point)    serial)
//! ```
//!
//! 1. [`fetch`]  : one concurrent request per page, joined in a single wait
//! 2. [`segment`]: split Parsoid HTML into titled, leveled sections
//! 3. [`filter`] : drop sections at or above the character threshold
//! 4. [`write`]  : best-effort JSON snapshots
//! 5. [`enrich`] : submit one section and rank the returned topics; the
//!    throttled sequential loop lives in [`crate::stream`]

pub mod enrich;
pub mod fetch;
pub mod filter;
pub mod segment;
pub mod write;
