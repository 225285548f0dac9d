//! GST - a small string templating engine
//!
//! Templates are plain text with placeholders such as `\{name}` or
//! `\{greet:formal}`. The [`parser`] splits a template into text and
//! placeholder tokens, and a [`terminator::Terminator`] replaces each
//! placeholder with the value produced by its declared handler.
//!
//! # Example
//!
//! ```rust
//! use gst_template::{render, Profile};
//!
//! let profile = Profile::default().with_declaration("name", "world");
//! let output = render("Hello, \\{name}!", &profile).unwrap();
//! assert_eq!(output, "Hello, world!");
//! ```

pub mod error;
pub mod parser;
pub mod profile;
pub mod sequence;
pub mod terminator;

pub use error::{ConfigError, ParseError, Span};
pub use parser::{parse, parse_with, CharacterSet, EscapingMode, Placeholder, Token, Tokenizer};
pub use profile::{PolicyBundle, Profile, ProfileError};
pub use sequence::{LinkedSequence, NodeId, TokenSequence};
pub use terminator::{Terminator, TerminatorConfig, TerminatorError};

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template could not be tokenized
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A policy rejected the template or its declarations
    #[error("termination error: {0}")]
    Terminate(#[from] TerminatorError),
}

/// Render a template with the settings and literal declarations of `profile`
pub fn render(template: &str, profile: &Profile) -> Result<String, RenderError> {
    render_excluding(template, profile, &[])
}

/// Render a template, not reporting the declared keys in `excluded_keys`
/// when the template leaves them unused
///
/// # Example
///
/// ```rust
/// use gst_template::{render_excluding, Profile};
///
/// let profile = Profile::default()
///     .with_declaration("name", "world")
///     .with_declaration("footer", "--");
/// let output = render_excluding("Hi \\{name}", &profile, &["footer"]).unwrap();
/// assert_eq!(output, "Hi world");
/// ```
pub fn render_excluding(
    template: &str,
    profile: &Profile,
    excluded_keys: &[&str],
) -> Result<String, RenderError> {
    let tokens = profile.tokenizer().tokenize(template)?;
    let terminator = profile.terminator()?;
    Ok(terminator.terminate_excluding(&tokens, excluded_keys)?)
}
