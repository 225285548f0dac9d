//! Token types produced by the tokenizer

use crate::error::Span;

/// A literal span of the source template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Text {
    /// Byte offset where this span starts in the template
    pub index: usize,
    pub content: String,
}

impl Text {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }

    /// Range starting at `index`, sized by `content`.
    ///
    /// Literal text is stored with its escape characters removed, so for text
    /// that contained escapes this is shorter than the source it was read
    /// from. Placeholder originals keep every escape and span their source
    /// exactly.
    pub fn span(&self) -> Span {
        self.index..self.index + self.content.len()
    }
}

/// What a value handler gets to see of a placeholder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderData {
    pub key: String,
    /// Present whenever the argument delimiter was seen, possibly empty
    pub argument: Option<String>,
    /// The exact source of the placeholder and where it starts
    pub original: Text,
}

impl PlaceholderData {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub data: PlaceholderData,
    /// Inline `!` marker: produce no output
    pub exclusion: bool,
    /// False when the template ended before the closing delimiter
    pub end_expected: bool,
}

impl Placeholder {
    /// A closed `\{foo}` placeholder at offset 0
    pub fn dummy() -> Self {
        Self {
            data: PlaceholderData {
                key: "foo".to_string(),
                argument: None,
                original: Text::new(0, "\\{foo}"),
            },
            exclusion: false,
            end_expected: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.data.key
    }

    pub fn argument(&self) -> Option<&str> {
        self.data.argument()
    }

    pub fn original(&self) -> &Text {
        &self.data.original
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Text(Text),
    Placeholder(Placeholder),
}

impl Token {
    /// The source this token was read from
    pub fn source(&self) -> &Text {
        match self {
            Token::Text(text) => text,
            Token::Placeholder(placeholder) => placeholder.original(),
        }
    }

    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            Token::Placeholder(placeholder) => Some(placeholder),
            Token::Text(_) => None,
        }
    }
}

impl From<Text> for Token {
    fn from(text: Text) -> Self {
        Token::Text(text)
    }
}

impl From<Placeholder> for Token {
    fn from(placeholder: Placeholder) -> Self {
        Token::Placeholder(placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_span_counts_unescaped_content() {
        let tokens = crate::parser::parse("a\\}b").expect("escaped closing");
        let text = tokens.first().expect("one text token").source();
        assert_eq!(text.content, "a}b");
        assert_eq!(text.span(), 0..3);
    }

    #[test]
    fn test_text_span() {
        let text = Text::new(3, "эава");
        assert_eq!(text.span(), 3..11);
    }

    #[test]
    fn test_dummy_placeholder() {
        let dummy = Placeholder::dummy();
        assert_eq!(dummy.key(), "foo");
        assert_eq!(dummy.argument(), None);
        assert_eq!(dummy.original().content, "\\{foo}");
        assert!(dummy.end_expected);
        assert!(!dummy.exclusion);
    }

    #[test]
    fn test_token_source() {
        let token = Token::from(Placeholder::dummy());
        assert_eq!(token.source().content, "\\{foo}");
        assert!(token.as_placeholder().is_some());

        let token = Token::from(Text::new(0, "plain"));
        assert_eq!(token.source().content, "plain");
        assert!(token.as_placeholder().is_none());
    }
}
