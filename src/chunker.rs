//! Sliding-window text chunker used by the ingestion job.
//!
//! Splits page text into fixed-size windows with overlap so that every
//! character lands in at least one chunk. Windows are measured in
//! characters, not bytes, so multi-byte UTF-8 text never splits inside a
//! code point.
//!
//! # Algorithm
//!
//! Starting at offset 0, emit `text[offset .. min(offset + size, len)]`.
//! If the emitted slice reaches the end of the text, stop. Otherwise
//! advance the offset by `max(size - overlap, 1)`; the `max(..., 1)`
//! keeps the loop finite even when `overlap >= size`.
//!
//! # Example
//!
//! ```rust
//! use campaign_copilot::chunker::sliding_chunks;
//!
//! let chunks = sliding_chunks("abcdefghij", 4, 1);
//! assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
//! ```

/// Split `text` into overlapping windows of at most `size` characters.
///
/// Returns an empty vector for empty text. A `size` of 0 is coerced to 1.
pub fn sliding_chunks(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.is_empty() {
        return chunks;
    }

    let size = size.max(1);
    let step = size.saturating_sub(overlap).max(1);

    // Byte offset of every char boundary, plus the end of the string, so
    // windows can be sliced without landing inside a code point.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    let mut offset = 0usize;
    loop {
        let end = (offset + size).min(char_len);
        chunks.push(text[bounds[offset]..bounds[end]].to_string());
        if end == char_len {
            break;
        }
        offset += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_example() {
        let chunks = sliding_chunks("abcdefghij", 4, 1);
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(sliding_chunks("", 1000, 200).is_empty());
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = sliding_chunks("hello", 1000, 200);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn exact_fit_has_no_trailing_empty_chunk() {
        let chunks = sliding_chunks("abcd", 4, 1);
        assert_eq!(chunks, vec!["abcd"]);
    }

    #[test]
    fn overlap_equal_to_size_still_terminates() {
        let chunks = sliding_chunks("abcdef", 3, 3);
        // Step degrades to one character; every window but the tail is full-size.
        assert_eq!(chunks, vec!["abc", "bcd", "cde", "def"]);
    }

    #[test]
    fn overlap_larger_than_size_still_terminates() {
        let chunks = sliding_chunks("abcdef", 2, 10);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], "ab");
        assert_eq!(chunks[4], "ef");
    }

    #[test]
    fn non_overlapping_prefixes_reconstruct_the_text() {
        let text = "The quick brown fox jumps over the lazy dog, twice around the square.";
        let size = 16;
        let overlap = 5;
        let chunks = sliding_chunks(text, size, overlap);

        let step = size - overlap;
        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 < chunks.len() {
                rebuilt.extend(chunk.chars().take(step));
            } else {
                // The final chunk contributes everything past the prefix
                // already covered by its overlap with the previous window.
                let covered = rebuilt.chars().count();
                rebuilt.extend(text.chars().skip(covered));
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn consecutive_chunks_overlap_exactly() {
        let chunks = sliding_chunks("abcdefghijklmnop", 6, 2);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(pair[0].chars().count() - 2).collect();
            let head: String = pair[1].chars().take(2).collect();
            if pair[1].chars().count() >= 2 {
                assert_eq!(tail, head);
            }
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "მშვიდობა და სამართლიანობა ყველასთვის";
        let chunks = sliding_chunks(text, 10, 3);
        assert!(!chunks.is_empty());
        let reconstructed_head: String = chunks[0].chars().collect();
        assert_eq!(reconstructed_head.chars().count(), 10);
    }

    #[test]
    fn zero_size_is_coerced() {
        let chunks = sliding_chunks("abc", 0, 0);
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }
}
