//! Size filter: drop sections too long to submit for enrichment.

use crate::output::RunResult;
use tracing::debug;

/// Keep only sections whose text is strictly shorter than `max_chars`
/// characters. Order within each page is preserved; pages left empty stay
/// in the result. Returns the number of sections removed.
pub fn drop_oversized(result: &mut RunResult, max_chars: usize) -> usize {
    let mut dropped = 0;
    for (page, sections) in result.iter_mut() {
        let before = sections.len();
        sections.retain(|s| {
            let keep = s.text_len() < max_chars;
            if !keep {
                debug!(
                    "{} -> {} (level {}): {} chars, dropped",
                    page,
                    s.title,
                    s.level,
                    s.text_len()
                );
            }
            keep
        });
        dropped += before - sections.len();
    }
    dropped
}
