//! The key/value tokenizer.
//!
//! [`Extractor`] turns one input row into a lazy sequence of [`Pair`]s via a
//! single left-to-right scan. The scan is driven by a closed set of states
//! with explicit transitions, which keeps the recovery rules for malformed
//! input auditable in one place:
//!
//! - a segment with no key-value delimiter is discarded
//! - an unterminated enclosed key or value is discarded
//! - a stray escape at end of input discards the pair being read
//!
//! Recovery always resumes after the next unescaped item delimiter, so bad
//! content never fails a row; the row just yields fewer pairs.
//!
//! The extractor holds no per-call state: the same instance can scan any
//! number of rows, concurrently, and identical input always produces
//! identical output.
//!
//! ## Examples
//!
//! ```rust
//! use kv_extract::ExtractorBuilder;
//!
//! let extractor = ExtractorBuilder::new()
//!     .with_enclosing_character('"')
//!     .build()
//!     .unwrap();
//!
//! let pairs: Vec<_> = extractor.extract(r#"a:1, b:"x,y", garbage, c:3"#).collect();
//! assert_eq!(pairs.len(), 3);
//! assert_eq!(pairs[1].value, "x,y");
//! ```

use crate::config::{ExtractorConfig, DEFAULT_VALUE_SPECIAL_CHARACTERS};
use crate::escape::EscapingProcessor;

/// A borrowed key/value pair referencing the row being scanned.
///
/// Spans are taken verbatim from the input, escape sequences included;
/// resolution happens when an
/// [`EscapingProcessor`](crate::EscapingProcessor) turns the spans into an
/// owned [`Pair`]. A `RawPair` never outlives the scan of its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPair<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// An owned key/value pair, the unit stored in batch output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

/// A reusable, immutable tokenizer bound to one configuration and one
/// escaping processor.
///
/// Built via [`ExtractorBuilder`](crate::ExtractorBuilder). Holds only
/// read-only state, so it is `Send + Sync` and freely shareable across
/// threads.
#[derive(Debug, Clone)]
pub struct Extractor<P: EscapingProcessor> {
    config: ExtractorConfig,
    processor: P,
    escape: Option<u8>,
    key_value_delimiter: u8,
    item_delimiter: u8,
    enclosing: Option<u8>,
    // Per-byte table of characters permitted inside plain values; structural
    // bytes are always cleared, non-ASCII bytes always set.
    value_allowed: [bool; 256],
}

impl<P: EscapingProcessor> Extractor<P> {
    pub(crate) fn from_config(config: ExtractorConfig) -> Self {
        let processor = P::with_escape(config.escape_character());

        let mut value_allowed = [false; 256];
        for (byte, allowed) in value_allowed.iter_mut().enumerate() {
            let byte = byte as u8;
            *allowed = byte.is_ascii_alphanumeric() || !byte.is_ascii();
        }
        for &ch in DEFAULT_VALUE_SPECIAL_CHARACTERS {
            value_allowed[ch as usize] = true;
        }
        for &ch in config.value_special_characters() {
            if ch.is_ascii() {
                value_allowed[ch as usize] = true;
            }
        }

        let escape = config.escape_character().map(|ch| ch as u8);
        let key_value_delimiter = config.key_value_delimiter() as u8;
        let item_delimiter = config.item_delimiter() as u8;
        let enclosing = config.enclosing_character().map(|ch| ch as u8);

        for byte in [escape, Some(key_value_delimiter), Some(item_delimiter), enclosing]
            .into_iter()
            .flatten()
        {
            value_allowed[byte as usize] = false;
        }

        Extractor {
            config,
            processor,
            escape,
            key_value_delimiter,
            item_delimiter,
            enclosing,
            value_allowed,
        }
    }

    /// The configuration this extractor was built from.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Scans one row, returning a lazy iterator over its pairs.
    ///
    /// Pairs appear in source order; duplicate keys are preserved as separate
    /// pairs. Malformed segments are skipped, never reported.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::ExtractorBuilder;
    ///
    /// let extractor = ExtractorBuilder::new().build().unwrap();
    /// let pairs: Vec<_> = extractor.extract("a:1,a:2").collect();
    ///
    /// assert_eq!(pairs[0].value, "1");
    /// assert_eq!(pairs[1].value, "2");
    /// ```
    pub fn extract<'e>(&'e self, row: &'e str) -> Pairs<'e, P> {
        Pairs {
            extractor: self,
            row,
            pos: 0,
            state: State::ExpectKey,
        }
    }
}

impl<P: EscapingProcessor> Default for Extractor<P> {
    fn default() -> Self {
        Extractor::from_config(ExtractorConfig::default())
    }
}

/// Scan states. Spans captured so far travel inside the variants, so every
/// transition is explicit in [`Pairs::next_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State<'a> {
    ExpectKey,
    ReadKey { start: usize },
    ReadEnclosedKey { start: usize },
    ExpectKeyValueDelimiter { key: &'a str },
    ExpectValue { key: &'a str },
    ReadValue { key: &'a str, start: usize },
    ReadEnclosedValue { key: &'a str, start: usize },
    // Malformed-input recovery and post-pair junk: advance past the next
    // unescaped item delimiter, emitting nothing.
    SkipSegment,
    End,
}

/// Lazy iterator over the pairs of one row.
///
/// Returned by [`Extractor::extract`]; yields owned [`Pair`]s produced by the
/// extractor's escaping processor.
#[derive(Debug)]
pub struct Pairs<'a, P: EscapingProcessor> {
    extractor: &'a Extractor<P>,
    row: &'a str,
    pos: usize,
    state: State<'a>,
}

impl<'a, P: EscapingProcessor> Pairs<'a, P> {
    // Stops at the item delimiter so that a whitespace delimiter (e.g. a
    // space-separated grammar) still marks segment boundaries.
    fn skip_whitespace(&mut self) {
        let bytes = self.row.as_bytes();
        let item = self.extractor.item_delimiter;
        while self.pos < bytes.len() {
            let byte = bytes[self.pos];
            if byte == item || !byte.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    fn next_raw(&mut self) -> Option<RawPair<'a>> {
        let bytes = self.row.as_bytes();
        let escape = self.extractor.escape;
        let key_value = self.extractor.key_value_delimiter;
        let item = self.extractor.item_delimiter;
        let enclosing = self.extractor.enclosing;

        loop {
            match self.state {
                State::End => return None,

                State::ExpectKey => {
                    self.skip_whitespace();
                    if self.pos >= bytes.len() {
                        self.state = State::End;
                    } else if bytes[self.pos] == item {
                        // Empty segment, tolerated.
                        self.pos += 1;
                    } else if Some(bytes[self.pos]) == enclosing {
                        self.pos += 1;
                        self.state = State::ReadEnclosedKey { start: self.pos };
                    } else if bytes[self.pos] == key_value {
                        // Empty key.
                        self.state = State::SkipSegment;
                    } else {
                        self.state = State::ReadKey { start: self.pos };
                    }
                }

                State::ReadKey { start } => {
                    if self.pos >= bytes.len() {
                        // No key-value delimiter before end of input.
                        self.state = State::End;
                    } else if Some(bytes[self.pos]) == escape {
                        if self.pos + 1 >= bytes.len() {
                            self.state = State::End;
                        } else {
                            self.pos += 2;
                        }
                    } else if bytes[self.pos] == key_value {
                        let key = self.row[start..self.pos].trim();
                        self.pos += 1;
                        self.state = if key.is_empty() {
                            State::SkipSegment
                        } else {
                            State::ExpectValue { key }
                        };
                    } else if bytes[self.pos] == item {
                        // No key-value delimiter in this segment.
                        self.pos += 1;
                        self.state = State::ExpectKey;
                    } else {
                        self.pos += 1;
                    }
                }

                State::ReadEnclosedKey { start } => {
                    if self.pos >= bytes.len() {
                        // Unterminated enclosed key.
                        self.state = State::End;
                    } else if Some(bytes[self.pos]) == escape {
                        if self.pos + 1 >= bytes.len() {
                            self.state = State::End;
                        } else {
                            self.pos += 2;
                        }
                    } else if Some(bytes[self.pos]) == enclosing {
                        let key = &self.row[start..self.pos];
                        self.pos += 1;
                        self.state = if key.is_empty() {
                            State::SkipSegment
                        } else {
                            State::ExpectKeyValueDelimiter { key }
                        };
                    } else {
                        self.pos += 1;
                    }
                }

                State::ExpectKeyValueDelimiter { key } => {
                    self.skip_whitespace();
                    if self.pos >= bytes.len() {
                        self.state = State::End;
                    } else if bytes[self.pos] == key_value {
                        self.pos += 1;
                        self.state = State::ExpectValue { key };
                    } else {
                        self.state = State::SkipSegment;
                    }
                }

                State::ExpectValue { key } => {
                    self.skip_whitespace();
                    if self.pos >= bytes.len() {
                        self.state = State::End;
                        return Some(RawPair { key, value: "" });
                    }
                    let byte = bytes[self.pos];
                    if Some(byte) == enclosing {
                        self.pos += 1;
                        self.state = State::ReadEnclosedValue {
                            key,
                            start: self.pos,
                        };
                    } else if byte == item {
                        self.pos += 1;
                        self.state = State::ExpectKey;
                        return Some(RawPair { key, value: "" });
                    } else if Some(byte) == escape || self.extractor.value_allowed[byte as usize] {
                        self.state = State::ReadValue {
                            key,
                            start: self.pos,
                        };
                    } else {
                        // Value starts with a non-permitted character.
                        self.state = State::SkipSegment;
                    }
                }

                State::ReadValue { key, start } => {
                    if self.pos >= bytes.len() {
                        let value = &self.row[start..self.pos];
                        self.state = State::End;
                        return Some(RawPair { key, value });
                    }
                    let byte = bytes[self.pos];
                    if Some(byte) == escape {
                        if self.pos + 1 >= bytes.len() {
                            // Stray escape at end of input.
                            self.state = State::End;
                        } else {
                            self.pos += 2;
                        }
                    } else if byte == item {
                        let value = &self.row[start..self.pos];
                        self.pos += 1;
                        self.state = State::ExpectKey;
                        return Some(RawPair { key, value });
                    } else if self.extractor.value_allowed[byte as usize] {
                        self.pos += 1;
                    } else {
                        // Value ends at the first non-permitted character;
                        // anything up to the next item delimiter is junk.
                        let value = &self.row[start..self.pos];
                        self.state = State::SkipSegment;
                        return Some(RawPair { key, value });
                    }
                }

                State::ReadEnclosedValue { key, start } => {
                    if self.pos >= bytes.len() {
                        // Unterminated enclosed value.
                        self.state = State::End;
                    } else if Some(bytes[self.pos]) == escape {
                        if self.pos + 1 >= bytes.len() {
                            self.state = State::End;
                        } else {
                            self.pos += 2;
                        }
                    } else if Some(bytes[self.pos]) == enclosing {
                        let value = &self.row[start..self.pos];
                        self.pos += 1;
                        self.state = State::SkipSegment;
                        return Some(RawPair { key, value });
                    } else {
                        self.pos += 1;
                    }
                }

                State::SkipSegment => {
                    if self.pos >= bytes.len() {
                        self.state = State::End;
                    } else if Some(bytes[self.pos]) == escape {
                        self.pos = (self.pos + 2).min(bytes.len());
                    } else if bytes[self.pos] == item {
                        self.pos += 1;
                        self.state = State::ExpectKey;
                    } else {
                        self.pos += 1;
                    }
                }
            }
        }
    }
}

impl<'a, P: EscapingProcessor> Iterator for Pairs<'a, P> {
    type Item = Pair;

    fn next(&mut self) -> Option<Pair> {
        let raw = self.next_raw()?;
        Some(self.extractor.processor.process(raw))
    }
}
