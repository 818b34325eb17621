//! The recognized line grammar.
//!
//! This module documents the syntax the extractor recognizes and the recovery
//! policy applied to text that does not fit it. There is no code here.
//!
//! # Overview
//!
//! A row is a sequence of *segments* separated by the item delimiter. Each
//! well-formed segment is one pair:
//!
//! ```text
//! key <key-value delimiter> value
//! ```
//!
//! With the default configuration (`:` between key and value, `,` between
//! pairs, escape `\`):
//!
//! ```text
//! status:200, path:/var/log/app.log, user:alice
//! ```
//!
//! # Keys
//!
//! A plain key runs to the first unescaped key-value delimiter and is trimmed
//! of surrounding whitespace; an empty key makes the segment malformed. When
//! an enclosing character is configured, a key may be enclosed instead:
//! everything between the quotes is taken verbatim, so delimiters and
//! whitespace are literal.
//!
//! ```text
//! "request id": 7f3a
//! ```
//!
//! # Values
//!
//! If the first non-whitespace character after the key-value delimiter is the
//! enclosing character, the value is enclosed: it runs to the matching
//! unescaped enclosing character and every character inside is literal,
//! delimiters included.
//!
//! Otherwise the value is plain and runs while its characters are permitted:
//!
//! - ASCII alphanumerics and all non-ASCII text, always
//! - the default special set `_ - . / + @`
//! - any configured allow-list characters (adding `' '` permits unenclosed
//!   multi-word values)
//!
//! A plain value ends at the first unescaped item delimiter, at end of input,
//! or at the first non-permitted character; in the last case the scanned
//! prefix is kept and the remainder of the segment is discarded. An empty
//! value (`a:,` or a trailing `a:`) is kept as the empty string.
//!
//! # Escaping
//!
//! The escape character makes the following character literal: `\,` inside a
//! plain value does not end it, `\"` inside an enclosed value does not close
//! it. Captured spans keep escape sequences verbatim; the selected
//! [`EscapingProcessor`](crate::EscapingProcessor) resolves them when pairs
//! are copied out (or, for deferred unescaping, once per batch).
//!
//! # Malformed input
//!
//! Extraction is best-effort and never fails on content. A malformed segment
//! is discarded and scanning resumes after the next unescaped item delimiter:
//!
//! - segment with no key-value delimiter (`garbage` between two pairs)
//! - empty key (`:1`)
//! - unterminated enclosed key or value (`a:"oops` at end of input)
//! - stray escape at end of input (`a:1\`)
//! - value starting with a non-permitted character (`a:$1` without `$`
//!   allow-listed)
//!
//! ```text
//! input:  a:1, garbage, b:2
//! output: (a, 1), (b, 2)
//! ```
//!
//! # Defaults
//!
//! | Role                | Default |
//! |---------------------|---------|
//! | Escape character    | `\`     |
//! | Key-value delimiter | `:`     |
//! | Item delimiter      | `,`     |
//! | Enclosing character | none    |
//! | Value allow-list    | empty   |
//!
//! All structural characters are single printable-ASCII characters and must
//! be pairwise distinct; this is validated once when the extractor is built.
