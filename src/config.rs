//! Extractor configuration.
//!
//! This module provides the types that describe *how* a row is tokenized:
//!
//! - [`ExtractorConfig`]: validated, immutable set of structural characters
//! - [`ExtractorBuilder`]: fluent builder that validates and produces an
//!   [`Extractor`]
//!
//! All structural characters are single printable-ASCII characters and must
//! be pairwise distinct; both rules are checked once in
//! [`ExtractorBuilder::build`], never per row.
//!
//! ## Examples
//!
//! ```rust
//! use kv_extract::ExtractorBuilder;
//!
//! let extractor = ExtractorBuilder::new()
//!     .with_key_value_delimiter('=')
//!     .with_item_delimiter(';')
//!     .with_enclosing_character('"')
//!     .build()
//!     .unwrap();
//!
//! let pairs: Vec<_> = extractor.extract("a=1;b=\"x;y\"").collect();
//! assert_eq!(pairs.len(), 2);
//! ```

use std::marker::PhantomData;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{CharRole, Error, Result};
use crate::escape::{EscapingProcessor, InlineUnescaping};
use crate::extractor::Extractor;

/// Default escape character (`\`).
pub const DEFAULT_ESCAPE_CHARACTER: char = '\\';

/// Default key-value delimiter (`:`).
pub const DEFAULT_KEY_VALUE_DELIMITER: char = ':';

/// Default item delimiter (`,`).
pub const DEFAULT_ITEM_DELIMITER: char = ',';

/// Punctuation permitted inside plain (unenclosed) values without any
/// allow-list entry.
///
/// Alphanumerics and non-ASCII text are always permitted; this set covers the
/// punctuation that commonly appears in log values such as paths, versions,
/// and addresses. Anything else must be enclosed, escaped, or added via
/// [`ExtractorBuilder::with_value_special_characters`].
pub const DEFAULT_VALUE_SPECIAL_CHARACTERS: &[char] = &['_', '-', '.', '/', '+', '@'];

/// A validated, immutable extraction configuration.
///
/// Built through [`ExtractorBuilder`]; once built it never changes, so it can
/// be shared freely across threads and reused for any number of rows.
///
/// # Examples
///
/// ```rust
/// use kv_extract::ExtractorBuilder;
///
/// let extractor = ExtractorBuilder::new().with_key_value_delimiter('=').build().unwrap();
/// assert_eq!(extractor.config().key_value_delimiter(), '=');
/// assert_eq!(extractor.config().item_delimiter(), ',');
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    escape_character: Option<char>,
    key_value_delimiter: char,
    item_delimiter: char,
    enclosing_character: Option<char>,
    value_special_characters: IndexSet<char>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            escape_character: Some(DEFAULT_ESCAPE_CHARACTER),
            key_value_delimiter: DEFAULT_KEY_VALUE_DELIMITER,
            item_delimiter: DEFAULT_ITEM_DELIMITER,
            enclosing_character: None,
            value_special_characters: IndexSet::new(),
        }
    }
}

impl ExtractorConfig {
    /// The configured escape character, if escaping is enabled.
    #[must_use]
    pub fn escape_character(&self) -> Option<char> {
        self.escape_character
    }

    /// The character separating a key from its value.
    #[must_use]
    pub fn key_value_delimiter(&self) -> char {
        self.key_value_delimiter
    }

    /// The character separating successive pairs.
    #[must_use]
    pub fn item_delimiter(&self) -> char {
        self.item_delimiter
    }

    /// The quote character for enclosed keys and values, if configured.
    #[must_use]
    pub fn enclosing_character(&self) -> Option<char> {
        self.enclosing_character
    }

    /// Extra characters permitted inside plain values, beyond the built-in
    /// set (alphanumerics, non-ASCII, [`DEFAULT_VALUE_SPECIAL_CHARACTERS`]).
    #[must_use]
    pub fn value_special_characters(&self) -> &IndexSet<char> {
        &self.value_special_characters
    }

    /// Converts this configuration back into a builder.
    ///
    /// Useful for tweaking a deserialized configuration; validation runs
    /// again on [`ExtractorBuilder::build`], so a hand-edited or deserialized
    /// configuration cannot smuggle colliding characters into an extractor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::ExtractorBuilder;
    ///
    /// let config = ExtractorBuilder::new().with_item_delimiter(';').build().unwrap().config().clone();
    /// let extractor = config.into_builder().with_key_value_delimiter('=').build().unwrap();
    /// assert_eq!(extractor.config().item_delimiter(), ';');
    /// ```
    #[must_use]
    pub fn into_builder(self) -> ExtractorBuilder {
        ExtractorBuilder {
            escape_character: self.escape_character,
            key_value_delimiter: self.key_value_delimiter,
            item_delimiter: self.item_delimiter,
            enclosing_character: self.enclosing_character,
            value_special_characters: self.value_special_characters,
            _processor: PhantomData,
        }
    }

    fn validate(&self) -> Result<()> {
        let configured = [
            (self.escape_character, CharRole::Escape),
            (Some(self.key_value_delimiter), CharRole::KeyValueDelimiter),
            (Some(self.item_delimiter), CharRole::ItemDelimiter),
            (self.enclosing_character, CharRole::Enclosing),
        ];

        for (ch, role) in configured {
            if let Some(ch) = ch {
                if !is_supported(ch) {
                    return Err(Error::unsupported(ch, role));
                }
            }
        }

        for (i, (a, first)) in configured.iter().enumerate() {
            for (b, second) in configured.iter().skip(i + 1) {
                if let (Some(a), Some(b)) = (a, b) {
                    if a == b {
                        return Err(Error::collision(*a, *first, *second));
                    }
                }
            }
        }

        for entry in &self.value_special_characters {
            for (ch, role) in configured {
                if ch == Some(*entry) {
                    return Err(Error::AllowListCollision {
                        character: *entry,
                        role,
                    });
                }
            }
        }

        Ok(())
    }
}

// The tokenizer compares single bytes; control characters (including tab and
// newline) are reserved as plain-value terminators and cannot be structural.
fn is_supported(ch: char) -> bool {
    ch.is_ascii() && !ch.is_ascii_control()
}

/// Fluent builder for [`Extractor`].
///
/// Every setter is optional; unset fields take the documented defaults
/// (escape `\`, key-value delimiter `:`, item delimiter `,`, no enclosing
/// character, empty allow-list). The escaping processor is chosen at build
/// time via the type parameter and defaults to [`InlineUnescaping`].
///
/// # Examples
///
/// ```rust
/// use kv_extract::{DeferredUnescaping, ExtractorBuilder};
///
/// // Inline unescaping (default)
/// let extractor = ExtractorBuilder::new().build().unwrap();
/// let pairs: Vec<_> = extractor.extract("a:1,b:2").collect();
/// assert_eq!(pairs.len(), 2);
///
/// // Deferred unescaping, resolved by the batch-wide bulk pass
/// let extractor = ExtractorBuilder::new()
///     .with_escaping_processor::<DeferredUnescaping>()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ExtractorBuilder<P: EscapingProcessor = InlineUnescaping> {
    escape_character: Option<char>,
    key_value_delimiter: char,
    item_delimiter: char,
    enclosing_character: Option<char>,
    value_special_characters: IndexSet<char>,
    _processor: PhantomData<P>,
}

impl ExtractorBuilder<InlineUnescaping> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        ExtractorConfig::default().into_builder()
    }

    /// Creates a builder from positional character arguments, applying
    /// defaults for absent trailing arguments.
    ///
    /// Argument order matches the call convention of the surrounding engine:
    /// escape character, key-value delimiter, item delimiter, enclosing
    /// character. Each argument must be exactly one character; arguments past
    /// the fourth are ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::ExtractorBuilder;
    ///
    /// let extractor = ExtractorBuilder::from_args(&["\\", "=", ";"]).unwrap().build().unwrap();
    /// assert_eq!(extractor.config().key_value_delimiter(), '=');
    /// assert_eq!(extractor.config().enclosing_character(), None);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is empty or longer than one character.
    pub fn from_args(args: &[&str]) -> Result<Self> {
        let roles = [
            CharRole::Escape,
            CharRole::KeyValueDelimiter,
            CharRole::ItemDelimiter,
            CharRole::Enclosing,
        ];

        let mut builder = Self::new();
        for (arg, role) in args.iter().zip(roles) {
            let ch = single_char(arg, role)?;
            builder = match role {
                CharRole::Escape => builder.with_escape_character(ch),
                CharRole::KeyValueDelimiter => builder.with_key_value_delimiter(ch),
                CharRole::ItemDelimiter => builder.with_item_delimiter(ch),
                CharRole::Enclosing => builder.with_enclosing_character(ch),
            };
        }
        Ok(builder)
    }
}

impl Default for ExtractorBuilder<InlineUnescaping> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: EscapingProcessor> ExtractorBuilder<P> {
    /// Sets the escape character.
    ///
    /// An escape character makes the following character literal rather than
    /// structural. Default is `\`.
    #[must_use]
    pub fn with_escape_character(mut self, ch: char) -> Self {
        self.escape_character = Some(ch);
        self
    }

    /// Disables escaping entirely.
    ///
    /// Useful for inputs where backslashes are ordinary data, such as Windows
    /// paths.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::ExtractorBuilder;
    ///
    /// let extractor = ExtractorBuilder::new()
    ///     .without_escape_character()
    ///     .with_value_special_characters(['\\'])
    ///     .build()
    ///     .unwrap();
    ///
    /// let pairs: Vec<_> = extractor.extract(r"path:C\dir\file").collect();
    /// assert_eq!(pairs[0].value, r"C\dir\file");
    /// ```
    #[must_use]
    pub fn without_escape_character(mut self) -> Self {
        self.escape_character = None;
        self
    }

    /// Sets the character separating a key from its value. Default is `:`.
    #[must_use]
    pub fn with_key_value_delimiter(mut self, ch: char) -> Self {
        self.key_value_delimiter = ch;
        self
    }

    /// Sets the character separating successive pairs. Default is `,`.
    #[must_use]
    pub fn with_item_delimiter(mut self, ch: char) -> Self {
        self.item_delimiter = ch;
        self
    }

    /// Sets the enclosing (quote) character. No enclosing character is
    /// configured by default.
    #[must_use]
    pub fn with_enclosing_character(mut self, ch: char) -> Self {
        self.enclosing_character = Some(ch);
        self
    }

    /// Sets extra characters permitted inside plain values.
    ///
    /// Extends the built-in set rather than replacing it. Adding `' '`
    /// permits unenclosed multi-word values. Entries outside ASCII are
    /// redundant (non-ASCII input is always permitted) and ignored by the
    /// scanner.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::ExtractorBuilder;
    ///
    /// let extractor = ExtractorBuilder::new()
    ///     .with_key_value_delimiter('=')
    ///     .with_value_special_characters([' ', '$'])
    ///     .build()
    ///     .unwrap();
    ///
    /// let pairs: Vec<_> = extractor.extract("price=30 $US").collect();
    /// assert_eq!(pairs[0].value, "30 $US");
    /// ```
    #[must_use]
    pub fn with_value_special_characters<I>(mut self, chars: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        self.value_special_characters.extend(chars);
        self
    }

    /// Selects the escaping processor the extractor will use.
    ///
    /// [`InlineUnescaping`] (the default) resolves escapes while copying each
    /// pair; [`DeferredUnescaping`](crate::DeferredUnescaping) copies spans
    /// verbatim and leaves resolution to the batch-wide bulk pass.
    #[must_use]
    pub fn with_escaping_processor<Q: EscapingProcessor>(self) -> ExtractorBuilder<Q> {
        ExtractorBuilder {
            escape_character: self.escape_character,
            key_value_delimiter: self.key_value_delimiter,
            item_delimiter: self.item_delimiter,
            enclosing_character: self.enclosing_character,
            value_special_characters: self.value_special_characters,
            _processor: PhantomData,
        }
    }

    /// Validates the configuration and builds an immutable [`Extractor`].
    ///
    /// # Errors
    ///
    /// Returns an error if any two configured characters collide, if a
    /// configured character is not printable ASCII, or if an allow-list entry
    /// shadows a structural character. No extractor is produced on error.
    pub fn build(self) -> Result<Extractor<P>> {
        let config = ExtractorConfig {
            escape_character: self.escape_character,
            key_value_delimiter: self.key_value_delimiter,
            item_delimiter: self.item_delimiter,
            enclosing_character: self.enclosing_character,
            value_special_characters: self.value_special_characters,
        };
        config.validate()?;
        Ok(Extractor::from_config(config))
    }
}

fn single_char(arg: &str, role: CharRole) -> Result<char> {
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        (None, _) => Err(Error::EmptyCharacterArgument { role }),
        (Some(_), Some(_)) => Err(Error::NotASingleCharacter {
            role,
            argument: arg.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let config = ExtractorConfig::default();
        assert_eq!(config.escape_character(), Some('\\'));
        assert_eq!(config.key_value_delimiter(), ':');
        assert_eq!(config.item_delimiter(), ',');
        assert_eq!(config.enclosing_character(), None);
        assert!(config.value_special_characters().is_empty());
    }

    #[test]
    fn collision_between_delimiters() {
        let err = ExtractorBuilder::new()
            .with_key_value_delimiter(';')
            .with_item_delimiter(';')
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::collision(';', CharRole::KeyValueDelimiter, CharRole::ItemDelimiter)
        );
    }

    #[test]
    fn collision_between_escape_and_item_delimiter() {
        let err = ExtractorBuilder::new()
            .with_escape_character(',')
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::CharacterCollision { character: ',', .. }));
    }

    #[test]
    fn collision_between_enclosing_and_escape() {
        let err = ExtractorBuilder::new()
            .with_enclosing_character('\\')
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::CharacterCollision { character: '\\', .. }));
    }

    #[test]
    fn non_ascii_delimiter_rejected() {
        let err = ExtractorBuilder::new()
            .with_key_value_delimiter('→')
            .build()
            .unwrap_err();
        assert_eq!(err, Error::unsupported('→', CharRole::KeyValueDelimiter));
    }

    #[test]
    fn control_character_rejected() {
        let err = ExtractorBuilder::new()
            .with_item_delimiter('\n')
            .build()
            .unwrap_err();
        assert_eq!(err, Error::unsupported('\n', CharRole::ItemDelimiter));
    }

    #[test]
    fn allow_list_cannot_shadow_structural_characters() {
        let err = ExtractorBuilder::new()
            .with_value_special_characters([','])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::AllowListCollision {
                character: ',',
                role: CharRole::ItemDelimiter,
            }
        );
    }

    #[test]
    fn disabled_escape_never_collides() {
        let extractor = ExtractorBuilder::new()
            .without_escape_character()
            .with_enclosing_character('"')
            .build()
            .unwrap();
        assert_eq!(extractor.config().escape_character(), None);
    }

    #[test]
    fn from_args_applies_trailing_defaults() {
        let builder = ExtractorBuilder::from_args(&["#", "="]).unwrap();
        let extractor = builder.build().unwrap();
        assert_eq!(extractor.config().escape_character(), Some('#'));
        assert_eq!(extractor.config().key_value_delimiter(), '=');
        assert_eq!(extractor.config().item_delimiter(), ',');
        assert_eq!(extractor.config().enclosing_character(), None);
    }

    #[test]
    fn from_args_rejects_empty_argument() {
        let err = ExtractorBuilder::from_args(&["\\", ""]).unwrap_err();
        assert_eq!(
            err,
            Error::EmptyCharacterArgument {
                role: CharRole::KeyValueDelimiter,
            }
        );
    }

    #[test]
    fn from_args_rejects_multi_character_argument() {
        let err = ExtractorBuilder::from_args(&["\\", "=>"]).unwrap_err();
        assert!(matches!(err, Error::NotASingleCharacter { .. }));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = ExtractorBuilder::new()
            .with_key_value_delimiter('=')
            .with_enclosing_character('\'')
            .with_value_special_characters(['$'])
            .build()
            .unwrap()
            .config()
            .clone();

        let json = serde_json::to_string(&config).unwrap();
        let back: ExtractorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn deserialized_config_is_revalidated() {
        let json = r#"{
            "escape_character": ",",
            "key_value_delimiter": ":",
            "item_delimiter": ",",
            "enclosing_character": null,
            "value_special_characters": []
        }"#;
        let config: ExtractorConfig = serde_json::from_str(json).unwrap();
        assert!(config.into_builder().build().is_err());
    }
}
