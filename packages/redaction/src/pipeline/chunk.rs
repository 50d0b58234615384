//! Chunked scanning support for large texts.
//!
//! The text is cut into contiguous cores, one per chunk. Each chunk scans
//! a slice that extends a margin beyond its core on both sides, then keeps
//! only the matches that start inside the core, so every match is reported
//! by exactly one chunk. The margin is at least as long as the longest
//! possible match, which keeps every kept match strictly inside its slice:
//! the scanner sees the characters around it and cannot mistake a cut for
//! a word boundary.

use std::sync::Arc;

use crate::redactors::PatternRedactor;

/// The margin never shrinks below this, whatever the redactors report.
pub(crate) const MARGIN_FLOOR: usize = 256;

/// A scan window over the input. `text` is the slice starting at byte
/// `offset`; the chunk owns the matches that start inside
/// `[core_start, core_end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<'a> {
    pub offset: usize,
    pub core_start: usize,
    pub core_end: usize,
    pub text: &'a str,
}

impl Chunk<'_> {
    /// Whether a whole-text match offset falls inside this chunk's core.
    pub fn owns(&self, start: usize) -> bool {
        (self.core_start..self.core_end).contains(&start)
    }
}

/// Context margin for a redactor set.
pub fn margin_for(redactors: &[Arc<dyn PatternRedactor>]) -> usize {
    redactors
        .iter()
        .map(|r| r.max_match_len())
        .max()
        .unwrap_or(0)
        .max(MARGIN_FLOOR)
}

/// Splits `text` into chunks whose cores are `chunk_size` bytes and
/// together cover the text exactly once, each slice extended `margin`
/// bytes into the neighboring cores. All cuts land on character
/// boundaries; a core is never empty.
pub fn split_with_margin(text: &str, chunk_size: usize, margin: usize) -> Vec<Chunk<'_>> {
    if text.len() <= chunk_size {
        return vec![Chunk {
            offset: 0,
            core_start: 0,
            core_end: text.len(),
            text,
        }];
    }

    let mut chunks = Vec::new();
    let mut core_start = 0;
    while core_start < text.len() {
        let mut core_end = floor_char_boundary(text, core_start + chunk_size);
        if core_end <= core_start {
            core_end = ceil_char_boundary(text, core_start + chunk_size);
        }
        let slice_start = floor_char_boundary(text, core_start.saturating_sub(margin));
        let slice_end = ceil_char_boundary(text, core_end.saturating_add(margin));
        chunks.push(Chunk {
            offset: slice_start,
            core_start,
            core_end,
            text: &text[slice_start..slice_end],
        });
        core_start = core_end;
    }
    chunks
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}
