//! Property tests for boundary-aware chunking.

use ragchat_rag::split_text;
use proptest::prelude::*;

/// Text made of words, sentence terminators, line breaks and some non-ASCII.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            4 => "[a-zA-Z]{1,8}",
            3 => Just(" ".to_string()),
            1 => Just(". ".to_string()),
            1 => Just("!".to_string()),
            1 => Just("\n".to_string()),
            1 => Just("  \n\n ".to_string()),
            1 => "[가-힣]{1,4}",
        ],
        0..80,
    )
    .prop_map(|parts| parts.concat())
}

/// A valid `(chunk_size, overlap)` pair.
fn arb_window() -> impl Strategy<Value = (usize, usize)> {
    (1usize..60).prop_flat_map(|size| (Just(size), 0..size))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every segment is the trimmed, non-empty text found at its recorded offsets.
    #[test]
    fn segments_are_substrings_at_their_offsets(text in arb_text(), (size, overlap) in arb_window()) {
        let segments = split_text(&text, size, overlap).unwrap();
        for segment in &segments {
            prop_assert_eq!(&text[segment.start..segment.end], segment.text);
            prop_assert!(!segment.text.is_empty());
            prop_assert_eq!(segment.text.trim(), segment.text);
            prop_assert!(segment.text.chars().count() <= size);
        }
    }

    /// Consecutive segments share at most `overlap` characters and only
    /// whitespace is left between them.
    #[test]
    fn segments_cover_text_with_bounded_overlap(text in arb_text(), (size, overlap) in arb_window()) {
        let segments = split_text(&text, size, overlap).unwrap();

        if segments.is_empty() {
            prop_assert!(text.trim().is_empty());
            return Ok(());
        }

        prop_assert!(text[..segments[0].start].trim().is_empty());
        prop_assert!(text[segments[segments.len() - 1].end..].trim().is_empty());

        for pair in segments.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.start < prev.end {
                let shared = text[next.start..prev.end].chars().count();
                prop_assert!(shared <= overlap, "shared {} > overlap {}", shared, overlap);
            } else {
                prop_assert!(text[prev.end..next.start].trim().is_empty());
            }
        }
    }

    /// A window larger than the text returns the whole trimmed text once.
    #[test]
    fn oversized_window_yields_single_segment(text in arb_text()) {
        let segments = split_text(&text, text.chars().count() + 100, 0).unwrap();
        if text.trim().is_empty() {
            prop_assert!(segments.is_empty());
        } else {
            prop_assert_eq!(segments.len(), 1);
            prop_assert_eq!(segments[0].text, text.trim());
        }
    }
}

#[test]
fn empty_text_has_no_segments() {
    assert!(split_text("", 30, 5).unwrap().is_empty());
}
