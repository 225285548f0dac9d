//! Tokenizer for template strings

pub mod charset;
pub mod token;
mod tokenizer;

pub use charset::{CharacterSet, CharacterSetBuilder, EscapingMode};
pub use token::{Placeholder, PlaceholderData, Text, Token};
pub use tokenizer::{parse, parse_with, Tokenizer};
