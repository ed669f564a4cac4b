/// Chunk size for files under 10 MB.
const SMALL_CHUNK: usize = 200_000;
/// Chunk size for files under 50 MB.
const MEDIUM_CHUNK: usize = 500_000;
/// Chunk size for files under 100 MB.
const LARGE_CHUNK: usize = 1_000_000;
/// Chunk size for anything bigger.
const HUGE_CHUNK: usize = 2_000_000;

/// Pick a chunk size (in characters) from the source file size in bytes.
#[must_use]
pub fn determine_chunk_size(file_size: u64) -> usize {
    match file_size {
        s if s < 10_000_000 => SMALL_CHUNK,
        s if s < 50_000_000 => MEDIUM_CHUNK,
        s if s < 100_000_000 => LARGE_CHUNK,
        _ => HUGE_CHUNK,
    }
}

/// Split `text` into consecutive pieces of at most `chunk_size` characters.
///
/// Pieces never overlap and concatenate back to `text`; only the last one may
/// be shorter. Boundaries fall on `char` boundaries, not word boundaries.
/// A `chunk_size` of zero is treated as one.
#[must_use]
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(text[start..].to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_thresholds() {
        assert_eq!(determine_chunk_size(0), 200_000);
        assert_eq!(determine_chunk_size(9_999_999), 200_000);
        assert_eq!(determine_chunk_size(10_000_000), 500_000);
        assert_eq!(determine_chunk_size(49_999_999), 500_000);
        assert_eq!(determine_chunk_size(50_000_000), 1_000_000);
        assert_eq!(determine_chunk_size(99_999_999), 1_000_000);
        assert_eq!(determine_chunk_size(100_000_000), 2_000_000);
        assert_eq!(determine_chunk_size(u64::MAX), 2_000_000);
    }

    #[test]
    fn chunks_concatenate_to_input() {
        let inputs = [
            "",
            "a",
            "hello world",
            "exactly8",
            "naïve café – ünïcödé text with mixed widths 🚀🚀🚀",
        ];
        for text in inputs {
            for size in 1..=9 {
                let chunks = chunk_text(text, size);
                assert_eq!(chunks.concat(), text, "size {size}");
                if let Some((last, rest)) = chunks.split_last() {
                    assert!(rest.iter().all(|c| c.chars().count() == size));
                    assert!(!last.is_empty());
                    assert!(last.chars().count() <= size);
                }
            }
        }
    }

    #[test]
    fn final_chunk_may_be_short() {
        let chunks = chunk_text("abcdefg", 3);
        assert_eq!(chunks, vec!["abc", "def", "g"]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn zero_size_falls_back_to_single_chars() {
        assert_eq!(chunk_text("ab", 0), vec!["a", "b"]);
    }
}
