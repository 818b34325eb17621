//! Property-based tests - pragmatic approach testing the core extraction
//! guarantees across generated inputs: structural invariants of batch
//! output, agreement between the two escaping processors, and absence of
//! panics on arbitrary text.

use proptest::prelude::*;
use kv_extract::{
    extract_batch, DeferredUnescaping, Extractor, ExtractorBuilder, InlineUnescaping,
};

fn quoted_inline() -> Extractor<InlineUnescaping> {
    ExtractorBuilder::new()
        .with_enclosing_character('"')
        .build()
        .unwrap()
}

fn quoted_deferred() -> Extractor<DeferredUnescaping> {
    ExtractorBuilder::new()
        .with_enclosing_character('"')
        .with_escaping_processor::<DeferredUnescaping>()
        .build()
        .unwrap()
}

// Escape every value character so that delimiters and quotes are literal.
// The generated alphabet excludes the escape character itself, which keeps
// the inline and deferred paths equivalent.
fn escape_all(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    for ch in value.chars() {
        out.push('\\');
        out.push(ch);
    }
    out
}

fn build_row(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}:{}", escape_all(value)))
        .collect::<Vec<_>>()
        .join(",")
}

proptest! {
    // Escaped structural characters always come back verbatim.
    #[test]
    fn prop_escaped_values_round_trip(
        pairs in prop::collection::vec(("[a-z][a-z0-9]{0,5}", "[a-z0-9,:. \"]{0,8}"), 0..6)
    ) {
        let row = build_row(&pairs);
        let extracted: Vec<_> = quoted_inline()
            .extract(&row)
            .map(|p| (p.key, p.value))
            .collect();
        prop_assert_eq!(extracted, pairs);
    }

    // Running the inline processor per row equals running the no-op copy
    // followed by the batch-wide bulk pass, as long as the input never
    // escapes the escape character itself.
    #[test]
    fn prop_inline_equals_deferred_plus_bulk_pass(
        rows in prop::collection::vec(
            prop::collection::vec(("[a-z][a-z0-9]{0,5}", "[a-z0-9,:. \"]{0,8}"), 0..4),
            0..6,
        )
    ) {
        let rows: Vec<String> = rows.iter().map(|pairs| build_row(pairs)).collect();
        prop_assert_eq!(
            quoted_inline().extract_batch(&rows),
            quoted_deferred().extract_batch(&rows)
        );
    }

    // Offsets are monotone, one per row, and the last equals the total pair
    // count; extraction never panics, whatever the input.
    #[test]
    fn prop_offset_invariants_on_arbitrary_text(
        rows in prop::collection::vec(any::<String>(), 0..8)
    ) {
        let batch = extract_batch(&rows);
        prop_assert_eq!(batch.row_count(), rows.len());
        prop_assert!(batch.row_offsets().windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(batch.keys().len(), batch.values().len());
        let total = batch.row_offsets().last().copied().unwrap_or(0);
        prop_assert_eq!(total as usize, batch.pair_count());
    }

    // Sharded execution is observationally identical to sequential.
    #[test]
    fn prop_parallel_equals_sequential(
        rows in prop::collection::vec(any::<String>(), 0..32)
    ) {
        let extractor = quoted_inline();
        prop_assert_eq!(
            extractor.extract_batch_parallel(&rows),
            extractor.extract_batch(&rows)
        );
    }

    // Same input, same configuration, same output.
    #[test]
    fn prop_extraction_is_deterministic(row in any::<String>()) {
        let extractor = quoted_inline();
        let first: Vec<_> = extractor.extract(&row).collect();
        let second: Vec<_> = extractor.extract(&row).collect();
        prop_assert_eq!(first, second);
    }
}
