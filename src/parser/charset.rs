//! Special character configuration for the tokenizer

use serde::Deserialize;

use crate::error::ConfigError;

/// Governs which form of the opening delimiter starts a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscapingMode {
    /// `\{key}` is a placeholder, `{key}` is plain text.
    ///
    /// Templates written before a new key was introduced keep their meaning.
    #[default]
    UnescapedIsText,
    /// `{key}` is a placeholder, `\{key}` is the plain text `{key}`.
    UnescapedIsPlaceholder,
}

impl EscapingMode {
    /// Whether the opening delimiter must be escaped to start a placeholder
    pub fn requires_escape(self) -> bool {
        matches!(self, EscapingMode::UnescapedIsText)
    }
}

/// The five special characters of the template grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterSet {
    opening: char,
    closing: char,
    argument_delimiter: char,
    exclusion: char,
    escape: char,
}

impl Default for CharacterSet {
    fn default() -> Self {
        Self {
            opening: '{',
            closing: '}',
            argument_delimiter: ':',
            exclusion: '!',
            escape: '\\',
        }
    }
}

impl CharacterSet {
    /// Start from the default `{ } : ! \` set
    pub fn builder() -> CharacterSetBuilder {
        CharacterSetBuilder {
            chars: Self::default(),
        }
    }

    /// Build a validated character set
    pub fn new(
        opening: char,
        closing: char,
        argument_delimiter: char,
        exclusion: char,
        escape: char,
    ) -> Result<Self, ConfigError> {
        let chars = Self {
            opening,
            closing,
            argument_delimiter,
            exclusion,
            escape,
        };
        chars.validate()?;
        Ok(chars)
    }

    pub fn opening(&self) -> char {
        self.opening
    }

    pub fn closing(&self) -> char {
        self.closing
    }

    pub fn argument_delimiter(&self) -> char {
        self.argument_delimiter
    }

    pub fn exclusion(&self) -> char {
        self.exclusion
    }

    pub fn escape(&self) -> char {
        self.escape
    }

    /// Whether `c` plays any special role
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        c == self.opening
            || c == self.closing
            || c == self.argument_delimiter
            || c == self.exclusion
            || c == self.escape
    }

    fn roles(&self) -> [(&'static str, char); 5] {
        [
            ("opening", self.opening),
            ("closing", self.closing),
            ("argument delimiter", self.argument_delimiter),
            ("exclusion", self.exclusion),
            ("escape", self.escape),
        ]
    }

    /// Every role needs its own character. The only exception is a single
    /// character closure, where opening and closing coincide.
    fn validate(&self) -> Result<(), ConfigError> {
        let roles = self.roles();
        for (i, (first, a)) in roles.iter().enumerate() {
            for (second, b) in &roles[i + 1..] {
                let closure = *first == "opening" && *second == "closing";
                if a == b && !closure {
                    return Err(ConfigError::DuplicateCharacter {
                        first,
                        second,
                        character: *a,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`CharacterSet`]; validation happens in [`CharacterSetBuilder::build`]
#[derive(Debug, Clone)]
pub struct CharacterSetBuilder {
    chars: CharacterSet,
}

impl CharacterSetBuilder {
    /// Set both placeholder delimiters
    pub fn with_closure(mut self, opening: char, closing: char) -> Self {
        self.chars.opening = opening;
        self.chars.closing = closing;
        self
    }

    pub fn with_opening(mut self, opening: char) -> Self {
        self.chars.opening = opening;
        self
    }

    pub fn with_closing(mut self, closing: char) -> Self {
        self.chars.closing = closing;
        self
    }

    pub fn with_argument_delimiter(mut self, delimiter: char) -> Self {
        self.chars.argument_delimiter = delimiter;
        self
    }

    pub fn with_exclusion(mut self, exclusion: char) -> Self {
        self.chars.exclusion = exclusion;
        self
    }

    pub fn with_escape(mut self, escape: char) -> Self {
        self.chars.escape = escape;
        self
    }

    pub fn build(self) -> Result<CharacterSet, ConfigError> {
        self.chars.validate()?;
        Ok(self.chars)
    }
}
