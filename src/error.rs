//! Error types for tokenizing templates and validating character sets

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Fatal tokenizer errors. Parsing stops at the first one, no partial result is kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An escape character was applied to a character that is not special
    #[error("escaped regular character '{character}' at {index}")]
    RegularCharacterEscaped { index: usize, character: char },

    /// A special character appeared where the grammar does not allow it
    #[error("unexpected special character '{character}' at {index}")]
    UnexpectedSpecialCharacter { index: usize, character: char },
}

impl ParseError {
    /// Byte offset of the offending character
    pub fn index(&self) -> usize {
        match self {
            ParseError::RegularCharacterEscaped { index, .. }
            | ParseError::UnexpectedSpecialCharacter { index, .. } => *index,
        }
    }

    /// Byte range of the offending character in `source`.
    ///
    /// Falls back to one byte when `index` does not land on a character of `source`.
    pub fn span(&self, source: &str) -> Span {
        let start = self.index();
        let width = source
            .get(start..)
            .and_then(|rest| rest.chars().next())
            .map_or(1, char::len_utf8);
        start..start + width
    }

    fn hint(&self) -> &'static str {
        match self {
            ParseError::RegularCharacterEscaped { .. } => {
                "only special characters may follow the escape character"
            }
            ParseError::UnexpectedSpecialCharacter { .. } => {
                "escape this character to use it inside a placeholder key"
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        // ariadne counts characters, spans here are bytes
        let span = self.span(source);
        let start = char_offset(source, span.start);
        let end = char_offset(source, span.end);
        let message = self.to_string();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_message(&message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(self.hint())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}

fn char_offset(source: &str, byte: usize) -> usize {
    source
        .get(..byte)
        .map_or_else(|| source.chars().count(), |prefix| prefix.chars().count())
}

/// Invalid character set configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two roles share the same character
    #[error("{first} and {second} characters are both '{character}'")]
    DuplicateCharacter {
        first: &'static str,
        second: &'static str,
        character: char,
    },
}
