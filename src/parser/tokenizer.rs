//! Single-pass tokenizer for template strings
//!
//! The scan runs a three-state machine (`Text`, `Id`, `Argument`) over the
//! characters of the template. Escaping is a one-character lookahead: an
//! unescaped escape character marks only the character right after it.

use crate::error::ParseError;
use crate::sequence::TokenSequence;

use super::charset::{CharacterSet, EscapingMode};
use super::token::{Placeholder, PlaceholderData, Text, Token};

/// Parse with the default character set and [`EscapingMode::UnescapedIsText`]
pub fn parse(template: &str) -> Result<TokenSequence, ParseError> {
    Tokenizer::default().tokenize(template)
}

/// Parse with an explicit character set and escaping mode
pub fn parse_with(
    template: &str,
    charset: &CharacterSet,
    mode: EscapingMode,
) -> Result<TokenSequence, ParseError> {
    Tokenizer::new(*charset, mode).tokenize(template)
}

/// Reusable tokenizer configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tokenizer {
    charset: CharacterSet,
    mode: EscapingMode,
}

impl Tokenizer {
    pub fn new(charset: CharacterSet, mode: EscapingMode) -> Self {
        Self { charset, mode }
    }

    pub fn charset(&self) -> &CharacterSet {
        &self.charset
    }

    pub fn mode(&self) -> EscapingMode {
        self.mode
    }

    /// Split `template` into text and placeholder tokens.
    ///
    /// A placeholder still open at the end of input is emitted with
    /// `end_expected == false` rather than rejected.
    pub fn tokenize(&self, template: &str) -> Result<TokenSequence, ParseError> {
        let mut scan = Scan::new(&self.charset, self.mode);
        for (index, c) in template.char_indices() {
            scan.step(index, c)?;
        }
        let tokens = scan.finish();
        tracing::trace!(
            tokens = tokens.len(),
            bytes = template.len(),
            "tokenized template"
        );
        Ok(tokens)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Id,
    Argument,
}

struct Scan<'c> {
    charset: &'c CharacterSet,
    mode: EscapingMode,
    tokens: TokenSequence,
    state: State,
    /// Offset of an escape character that applies to the next character
    pending_escape: Option<usize>,

    text: String,
    text_start: usize,

    key: String,
    argument: Option<String>,
    original: String,
    placeholder_start: usize,
    exclusion: bool,
}

impl<'c> Scan<'c> {
    fn new(charset: &'c CharacterSet, mode: EscapingMode) -> Self {
        Self {
            charset,
            mode,
            tokens: TokenSequence::new(),
            state: State::Text,
            pending_escape: None,
            text: String::new(),
            text_start: 0,
            key: String::new(),
            argument: None,
            original: String::new(),
            placeholder_start: 0,
            exclusion: false,
        }
    }

    fn step(&mut self, index: usize, c: char) -> Result<(), ParseError> {
        let escaped_by = self.pending_escape.take();

        if c == self.charset.escape() && escaped_by.is_none() {
            self.pending_escape = Some(index);
            if self.state != State::Text {
                self.original.push(c);
            }
            return Ok(());
        }

        let special = self.charset.contains(c);
        if escaped_by.is_some() && !special {
            return Err(ParseError::RegularCharacterEscaped {
                index,
                character: c,
            });
        }

        match self.state {
            State::Text => self.text_char(index, c, escaped_by),
            State::Id => self.id_char(index, c, escaped_by.is_some(), special)?,
            State::Argument => self.argument_char(index, c, escaped_by.is_some()),
        }
        Ok(())
    }

    fn text_char(&mut self, index: usize, c: char, escaped_by: Option<usize>) {
        let opens = c == self.charset.opening()
            && escaped_by.is_some() == self.mode.requires_escape();
        if !opens {
            self.text.push(c);
            return;
        }

        self.flush_text();
        self.placeholder_start = escaped_by.unwrap_or(index);
        if escaped_by.is_some() {
            self.original.push(self.charset.escape());
        }
        self.original.push(c);
        self.state = State::Id;
    }

    fn id_char(
        &mut self,
        index: usize,
        c: char,
        escaped: bool,
        special: bool,
    ) -> Result<(), ParseError> {
        if !escaped {
            if c == self.charset.exclusion() && self.key.is_empty() && !self.exclusion {
                self.original.push(c);
                self.exclusion = true;
                return Ok(());
            }
            if c == self.charset.argument_delimiter() {
                self.original.push(c);
                self.argument = Some(String::new());
                self.state = State::Argument;
                return Ok(());
            }
            if c == self.charset.closing() {
                self.close(index, c);
                return Ok(());
            }
            if special {
                return Err(ParseError::UnexpectedSpecialCharacter {
                    index,
                    character: c,
                });
            }
        }
        self.original.push(c);
        self.key.push(c);
        Ok(())
    }

    fn argument_char(&mut self, index: usize, c: char, escaped: bool) {
        if !escaped && c == self.charset.closing() {
            self.close(index, c);
            return;
        }
        self.original.push(c);
        if let Some(argument) = self.argument.as_mut() {
            argument.push(c);
        }
    }

    fn close(&mut self, index: usize, closing: char) {
        self.original.push(closing);
        self.emit_placeholder(true);
        self.text_start = index + closing.len_utf8();
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let content = std::mem::take(&mut self.text);
            self.tokens.push(Token::Text(Text::new(self.text_start, content)));
        }
    }

    fn emit_placeholder(&mut self, end_expected: bool) {
        let placeholder = Placeholder {
            data: PlaceholderData {
                key: std::mem::take(&mut self.key),
                argument: self.argument.take(),
                original: Text::new(
                    self.placeholder_start,
                    std::mem::take(&mut self.original),
                ),
            },
            exclusion: std::mem::replace(&mut self.exclusion, false),
            end_expected,
        };
        self.tokens.push(Token::Placeholder(placeholder));
        self.state = State::Text;
    }

    fn finish(mut self) -> TokenSequence {
        match self.state {
            // a trailing escape has nothing to mark and is dropped
            State::Text => self.flush_text(),
            State::Id | State::Argument => self.emit_placeholder(false),
        }
        self.tokens
    }
}
