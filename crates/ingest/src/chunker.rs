//! Sliding-window text chunker.
//!
//! Splits text into windows of a fixed target size with fixed adjacent
//! overlap, so a relevance query spanning a window boundary still matches
//! at least one chunk. Window sizes are tunable, not contract details, but
//! chunking is **deterministic**: byte-identical content always yields the
//! same chunk count and the same per-chunk text.
//!
//! Windows step on `char` boundaries — multi-byte text never splits inside
//! a code point.

use confidant_core::error::{Error, Result};

/// A configured chunker. Stateless — create one and reuse it.
#[derive(Debug, Clone)]
pub struct Chunker {
    target_chars: usize,
    overlap_chars: usize,
}

impl Chunker {
    /// Default window size in characters.
    pub const DEFAULT_TARGET_CHARS: usize = 800;
    /// Default adjacent-window overlap in characters.
    pub const DEFAULT_OVERLAP_CHARS: usize = 100;

    /// Create a chunker with explicit window sizes.
    /// The overlap must be strictly smaller than the target so every step
    /// makes forward progress.
    pub fn new(target_chars: usize, overlap_chars: usize) -> Result<Self> {
        if target_chars == 0 {
            return Err(Error::validation("chunk target size must be positive"));
        }
        if overlap_chars >= target_chars {
            return Err(Error::validation(format!(
                "chunk overlap ({overlap_chars}) must be smaller than the target size ({target_chars})"
            )));
        }
        Ok(Self { target_chars, overlap_chars })
    }

    /// Split `content` into overlapping windows.
    ///
    /// Returns one window per step; the final window may be shorter than the
    /// target. Empty input yields no windows — callers validate emptiness
    /// before chunking.
    pub fn split(&self, content: &str) -> Vec<String> {
        let char_count = content.chars().count();
        if char_count == 0 {
            return Vec::new();
        }

        // Byte offset of each char start, plus the end of the string, so
        // char-indexed windows can slice without re-walking the text.
        let mut offsets: Vec<usize> = content.char_indices().map(|(i, _)| i).collect();
        offsets.push(content.len());

        let step = self.target_chars - self.overlap_chars;
        let mut windows = Vec::new();
        let mut start = 0usize;

        loop {
            let end = (start + self.target_chars).min(char_count);
            windows.push(content[offsets[start]..offsets[end]].to_string());
            if end == char_count {
                break;
            }
            start += step;
        }

        windows
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            target_chars: Self::DEFAULT_TARGET_CHARS,
            overlap_chars: Self::DEFAULT_OVERLAP_CHARS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Chunker {
        Chunker::new(10, 3).unwrap()
    }

    #[test]
    fn short_content_is_a_single_window() {
        let windows = small().split("tiny");
        assert_eq!(windows, vec!["tiny".to_string()]);
    }

    #[test]
    fn exact_target_is_a_single_window() {
        let windows = small().split("0123456789");
        assert_eq!(windows, vec!["0123456789".to_string()]);
    }

    #[test]
    fn adjacent_windows_overlap() {
        let content = "abcdefghijklmnopqrstuvwxyz";
        let windows = small().split(content);

        assert!(windows.len() > 1);
        for pair in windows.windows(2) {
            let prev_tail: String = pair[0].chars().rev().take(3).collect::<Vec<_>>()
                .into_iter().rev().collect();
            let next_head: String = pair[1].chars().take(3).collect();
            assert_eq!(prev_tail, next_head);
        }
    }

    #[test]
    fn windows_cover_all_content() {
        let content = "abcdefghijklmnopqrstuvwxyz0123456789";
        let windows = small().split(content);

        // First window starts at the start, last window ends at the end.
        assert!(content.starts_with(&windows[0]));
        assert!(content.ends_with(windows.last().unwrap()));
    }

    #[test]
    fn splitting_is_deterministic() {
        let content = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let a = Chunker::default().split(&content);
        let b = Chunker::default().split(&content);
        assert_eq!(a, b);
    }

    #[test]
    fn multibyte_text_never_splits_a_code_point() {
        // Each '語' is 3 bytes; a byte-offset window would panic mid-char.
        let content = "語".repeat(35);
        let windows = small().split(&content);
        assert!(windows.len() > 1);
        let total_overlapped: usize = windows.iter().map(|w| w.chars().count()).sum();
        // 35 chars with window 10 / step 7: windows at 0,7,14,21,28 → 10+10+10+10+7
        assert_eq!(total_overlapped, 47);
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(10, 10).is_err());
        assert!(Chunker::new(10, 20).is_err());
        assert!(Chunker::new(10, 9).is_ok());
    }

    #[test]
    fn empty_content_yields_no_windows() {
        assert!(small().split("").is_empty());
    }
}
