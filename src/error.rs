//! Error types for extractor configuration.
//!
//! Extraction itself is best-effort and never fails on row content: malformed
//! segments are skipped and the row simply yields fewer pairs. Every error in
//! this crate is therefore a *configuration* error, surfaced from
//! [`ExtractorBuilder::build`](crate::ExtractorBuilder::build) (or
//! [`ExtractorBuilder::from_args`](crate::ExtractorBuilder::from_args)) before
//! any row is touched.
//!
//! ## Error Categories
//!
//! - **Character collisions**: two structural characters configured to the
//!   same value, or an allow-list entry shadowing a structural character
//! - **Unsupported characters**: configured characters outside the printable
//!   ASCII set the tokenizer assumes
//! - **Argument-shape errors**: empty or multi-character positional arguments
//!
//! ## Examples
//!
//! ```rust
//! use kv_extract::{Error, ExtractorBuilder};
//!
//! let result = ExtractorBuilder::new()
//!     .with_item_delimiter(',')
//!     .with_escape_character(',')
//!     .build();
//!
//! assert!(matches!(result, Err(Error::CharacterCollision { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Which configured character a diagnostic refers to.
///
/// Used in error messages so that a collision between, say, the escape
/// character and the item delimiter names both roles explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharRole {
    Escape,
    KeyValueDelimiter,
    ItemDelimiter,
    Enclosing,
}

impl fmt::Display for CharRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CharRole::Escape => "escape character",
            CharRole::KeyValueDelimiter => "key-value delimiter",
            CharRole::ItemDelimiter => "item delimiter",
            CharRole::Enclosing => "enclosing character",
        };
        f.write_str(name)
    }
}

/// Represents all possible errors produced while building an extractor.
///
/// No variant is ever returned for malformed row content; content issues are
/// recovered during the scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Two structural characters were configured to the same value.
    #[error("{first} and {second} are both {character:?}; configured characters must be pairwise distinct")]
    CharacterCollision {
        character: char,
        first: CharRole,
        second: CharRole,
    },

    /// A configured character falls outside the printable ASCII set.
    #[error("{role} must be printable ASCII, got {character:?}")]
    UnsupportedCharacter { character: char, role: CharRole },

    /// An allow-list entry shadows a structural character.
    #[error("allow-list entry {character:?} collides with the configured {role}")]
    AllowListCollision { character: char, role: CharRole },

    /// A positional character argument was empty.
    #[error("empty argument for {role}")]
    EmptyCharacterArgument { role: CharRole },

    /// A positional character argument held more than one character.
    #[error("expected a single character for {role}, got {argument:?}")]
    NotASingleCharacter { role: CharRole, argument: String },
}

impl Error {
    /// Creates a collision error between two configured roles.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kv_extract::{CharRole, Error};
    ///
    /// let err = Error::collision(':', CharRole::KeyValueDelimiter, CharRole::ItemDelimiter);
    /// assert!(err.to_string().contains("pairwise distinct"));
    /// ```
    pub fn collision(character: char, first: CharRole, second: CharRole) -> Self {
        Error::CharacterCollision {
            character,
            first,
            second,
        }
    }

    /// Creates an unsupported-character error for the given role.
    pub fn unsupported(character: char, role: CharRole) -> Self {
        Error::UnsupportedCharacter { character, role }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
