//! Escaping processors.
//!
//! The tokenizer never resolves escape sequences itself; it keeps each
//! `(escape, escaped-character)` pair verbatim inside the captured span and
//! hands the span to an [`EscapingProcessor`], which produces the owned
//! [`Pair`]. Two processors are provided:
//!
//! - [`InlineUnescaping`] (default): resolves escapes character-by-character
//!   while copying the span. Always correct.
//! - [`DeferredUnescaping`]: copies the span verbatim and leaves every escape
//!   character in place. The batch assembler then deletes all escape
//!   characters in one bulk pass per flat sequence, trading per-character
//!   branching in the hot scan loop for a single vectorized pass over the
//!   whole batch.
//!
//! The deferred variant is an optimization with a documented restriction: the
//! bulk pass deletes *every* occurrence of the escape character, so an input
//! that escapes the escape character itself (`\\`) loses both characters.
//! Inputs that only escape structural characters behave identically under
//! both processors.

use memchr::memchr;

use crate::extractor::{Pair, RawPair};

/// Turns a borrowed [`RawPair`] into an owned [`Pair`], resolving escape
/// sequences now or leaving them for the batch-wide bulk pass.
///
/// Selected at build time via
/// [`ExtractorBuilder::with_escaping_processor`](crate::ExtractorBuilder::with_escaping_processor);
/// the choice is part of the extractor's type, not a per-call branch.
pub trait EscapingProcessor {
    /// Whether escape resolution is deferred to the batch-wide bulk pass.
    const DEFERS_UNESCAPING: bool;

    /// Creates a processor bound to the configured escape character.
    fn with_escape(escape_character: Option<char>) -> Self;

    /// Copies the spans of `raw` into an owned pair.
    fn process(&self, raw: RawPair<'_>) -> Pair;
}

/// Resolves escape sequences while copying each captured span.
///
/// Each escape character is dropped and the character after it is kept
/// literally: `\,` becomes `,`, `\\` becomes `\`, and `\x` becomes `x`. A
/// lone escape at the end of a span is dropped.
///
/// # Examples
///
/// ```rust
/// use kv_extract::ExtractorBuilder;
///
/// let extractor = ExtractorBuilder::new().build().unwrap();
/// let pairs: Vec<_> = extractor.extract(r"path:a\,b").collect();
/// assert_eq!(pairs[0].value, "a,b");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InlineUnescaping {
    escape: Option<u8>,
}

impl InlineUnescaping {
    fn unescape(&self, span: &str) -> String {
        let Some(escape) = self.escape else {
            return span.to_string();
        };
        if memchr(escape, span.as_bytes()).is_none() {
            return span.to_string();
        }

        let mut out = String::with_capacity(span.len());
        let mut rest = span;
        while let Some(pos) = memchr(escape, rest.as_bytes()) {
            out.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];
            if let Some(ch) = rest.chars().next() {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl EscapingProcessor for InlineUnescaping {
    const DEFERS_UNESCAPING: bool = false;

    fn with_escape(escape_character: Option<char>) -> Self {
        // Configured characters are validated to be ASCII before any
        // processor is constructed.
        InlineUnescaping {
            escape: escape_character.map(|ch| ch as u8),
        }
    }

    fn process(&self, raw: RawPair<'_>) -> Pair {
        Pair {
            key: self.unescape(raw.key),
            value: self.unescape(raw.value),
        }
    }
}

/// Copies captured spans verbatim, leaving escape characters in place.
///
/// A no-op at the per-pair level; correctness is restored by the batch
/// assembler, which deletes every occurrence of the escape character from the
/// flat key and value sequences in one bulk pass each. Not suitable for
/// inputs that escape the escape character itself — use [`InlineUnescaping`]
/// for those.
///
/// # Examples
///
/// ```rust
/// use kv_extract::{DeferredUnescaping, ExtractorBuilder};
///
/// let extractor = ExtractorBuilder::new()
///     .with_escaping_processor::<DeferredUnescaping>()
///     .build()
///     .unwrap();
///
/// // Per-pair output still carries the escape character...
/// let pairs: Vec<_> = extractor.extract(r"a:1\,2").collect();
/// assert_eq!(pairs[0].value, r"1\,2");
///
/// // ...the batch path resolves it.
/// let batch = extractor.extract_batch([r"a:1\,2"]);
/// assert_eq!(batch.values()[0], "1,2");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DeferredUnescaping;

impl EscapingProcessor for DeferredUnescaping {
    const DEFERS_UNESCAPING: bool = true;

    fn with_escape(_escape_character: Option<char>) -> Self {
        DeferredUnescaping
    }

    fn process(&self, raw: RawPair<'_>) -> Pair {
        Pair {
            key: raw.key.to_string(),
            value: raw.value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline() -> InlineUnescaping {
        InlineUnescaping::with_escape(Some('\\'))
    }

    #[test]
    fn passes_spans_without_escapes_through() {
        assert_eq!(inline().unescape("plain"), "plain");
        assert_eq!(inline().unescape(""), "");
    }

    #[test]
    fn strips_escape_and_keeps_escaped_character() {
        assert_eq!(inline().unescape(r"a\,b"), "a,b");
        assert_eq!(inline().unescape(r"\:x"), ":x");
        assert_eq!(inline().unescape(r"\n"), "n");
    }

    #[test]
    fn escaped_escape_yields_one_escape() {
        assert_eq!(inline().unescape(r"a\\b"), r"a\b");
    }

    #[test]
    fn lone_trailing_escape_is_dropped() {
        assert_eq!(inline().unescape("a\\"), "a");
    }

    #[test]
    fn escaped_multibyte_character_survives() {
        assert_eq!(inline().unescape("a\\é"), "aé");
    }

    #[test]
    fn disabled_escape_copies_verbatim() {
        let processor = InlineUnescaping::with_escape(None);
        assert_eq!(processor.unescape(r"a\,b"), r"a\,b");
    }

    #[test]
    fn deferred_copies_verbatim() {
        let processor = DeferredUnescaping::with_escape(Some('\\'));
        let pair = processor.process(RawPair {
            key: r"k\:ey",
            value: r"v\,alue",
        });
        assert_eq!(pair.key, r"k\:ey");
        assert_eq!(pair.value, r"v\,alue");
    }
}
