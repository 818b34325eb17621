//! # kv_extract
//!
//! Configurable key/value pair extraction from noisy, free-form text, with
//! columnar batch assembly.
//!
//! ## What does it do?
//!
//! Operational log lines and ad-hoc serialized records carry key/value data
//! in wildly varying punctuation conventions: `a=1, b="two words", c:3`.
//! This crate scans such rows with caller-configured delimiters, quoting,
//! and escaping, and flattens whole batches into columnar form — one flat
//! key sequence, one flat value sequence, and row-boundary offsets — ready
//! for an associative-array column.
//!
//! ## Key Features
//!
//! - **Configurable grammar**: single-character key-value delimiter, item
//!   delimiter, enclosing (quote) character, and escape character, validated
//!   once at build time
//! - **Best-effort parsing**: malformed segments are skipped, never fatal —
//!   a bad row just yields fewer pairs
//! - **Zero-copy scan**: the tokenizer captures borrowed spans and only
//!   copies when producing owned pairs
//! - **Deferred unescaping**: an optional processor that skips per-character
//!   escape handling during the scan and resolves escapes in one bulk pass
//!   per batch
//! - **Sharded batches**: batch extraction can run across a thread pool with
//!   byte-identical output
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! kv_extract = "0.1"
//! ```
//!
//! ### Extracting a row
//!
//! ```rust
//! use kv_extract::extract_pairs;
//!
//! let pairs = extract_pairs("level:error, code:500, path:/api/v1");
//!
//! assert_eq!(pairs.len(), 3);
//! assert_eq!(pairs[0].key, "level");
//! assert_eq!(pairs[0].value, "error");
//! ```
//!
//! ### Custom grammar
//!
//! ```rust
//! use kv_extract::ExtractorBuilder;
//!
//! let extractor = ExtractorBuilder::new()
//!     .with_key_value_delimiter('=')
//!     .with_item_delimiter(' ')
//!     .with_enclosing_character('"')
//!     .build()
//!     .unwrap();
//!
//! let pairs: Vec<_> = extractor.extract(r#"a=1 b="two words" c=3"#).collect();
//! assert_eq!(pairs[1].value, "two words");
//! ```
//!
//! ### Columnar batches
//!
//! ```rust
//! use kv_extract::extract_batch;
//!
//! let batch = extract_batch(["a:1,b:2", "garbage", "c:3"]);
//!
//! assert_eq!(batch.keys(), ["a", "b", "c"]);
//! assert_eq!(batch.values(), ["1", "2", "3"]);
//! assert_eq!(batch.row_offsets(), [2, 2, 3]);
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Extraction**: O(n) single left-to-right scan per row, no backtracking
//! - **Batch assembly**: output buffers grow incrementally; no second scan
//!   unless deferred unescaping is selected, which adds one linear bulk pass
//!   per flat sequence
//! - **Parallelism**: the extractor is immutable after build, so one
//!   instance serves any number of threads without synchronization
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - No panics on any row content; only configuration can fail, and only at
//!   build time
//! - Borrowed spans never escape the scan of their row

pub mod batch;
pub mod config;
pub mod error;
pub mod escape;
pub mod extractor;
pub mod grammar;
pub mod replace;

pub use batch::{BatchAssembler, BatchOutput};
pub use config::{
    ExtractorBuilder, ExtractorConfig, DEFAULT_ESCAPE_CHARACTER, DEFAULT_ITEM_DELIMITER,
    DEFAULT_KEY_VALUE_DELIMITER, DEFAULT_VALUE_SPECIAL_CHARACTERS,
};
pub use error::{CharRole, Error, Result};
pub use escape::{DeferredUnescaping, EscapingProcessor, InlineUnescaping};
pub use extractor::{Extractor, Pair, Pairs, RawPair};
pub use replace::bulk_replace_all;

/// Extracts the pairs of one row with the default configuration.
///
/// Defaults: escape `\`, key-value delimiter `:`, item delimiter `,`, no
/// enclosing character. Build an [`ExtractorBuilder`] for anything else.
///
/// # Examples
///
/// ```rust
/// use kv_extract::extract_pairs;
///
/// let pairs = extract_pairs("a:1,a:2");
/// assert_eq!(pairs.len(), 2);
/// ```
#[must_use]
pub fn extract_pairs(row: &str) -> Vec<Pair> {
    Extractor::<InlineUnescaping>::default().extract(row).collect()
}

/// Extracts a batch of rows into columnar output with the default
/// configuration.
///
/// # Examples
///
/// ```rust
/// use kv_extract::extract_batch;
///
/// let batch = extract_batch(["a:1", "", "b:2"]);
/// assert_eq!(batch.row_offsets(), [1, 1, 2]);
/// ```
#[must_use]
pub fn extract_batch<I, S>(rows: I) -> BatchOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Extractor::<InlineUnescaping>::default().extract_batch(rows)
}
