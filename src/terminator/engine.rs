//! The terminator: resolves every placeholder of a token sequence into a string

use std::collections::HashSet;

use crate::parser::{Placeholder, PlaceholderData, Token};
use crate::sequence::TokenSequence;

use super::error::{HandlerError, TerminatorError};
use super::policy::{OptionalPolicy, TerminatorConfig};
use super::registry::{Declaration, DeclarationTable, Handler, RawHandler};

/// Substitution engine owning a declaration table and a policy configuration.
///
/// `terminate` and `find_declaration` take `&self`, so a fully declared
/// terminator can be shared between threads. Declaring needs `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct Terminator {
    declarations: DeclarationTable,
    config: TerminatorConfig,
}

impl Terminator {
    pub fn new(config: TerminatorConfig) -> Self {
        Self {
            declarations: DeclarationTable::new(),
            config,
        }
    }

    pub fn strict() -> Self {
        Self::new(TerminatorConfig::strict())
    }

    pub fn lenient() -> Self {
        Self::new(TerminatorConfig::lenient())
    }

    pub fn warning() -> Self {
        Self::new(TerminatorConfig::warning())
    }

    pub fn config(&self) -> &TerminatorConfig {
        &self.config
    }

    pub fn declarations(&self) -> &DeclarationTable {
        &self.declarations
    }

    /// Declare a literal replacement or a [`Handler`]
    pub fn declare(
        &mut self,
        key: impl Into<String>,
        handler: impl Into<Handler>,
    ) -> Result<(), TerminatorError> {
        self.declare_raw_declaration(key.into(), Declaration::Managed(handler.into()))
    }

    /// Declare a value handler from a closure
    pub fn declare_fn<F>(&mut self, key: impl Into<String>, handler: F) -> Result<(), TerminatorError>
    where
        F: Fn(&PlaceholderData) -> Result<String, HandlerError> + Send + Sync + 'static,
    {
        self.declare(key, Handler::new(handler))
    }

    /// Declare a handler whose output bypasses the insertion safer and the
    /// processing-error policy
    pub fn declare_raw<F>(&mut self, key: impl Into<String>, handler: F) -> Result<(), TerminatorError>
    where
        F: Fn(&Placeholder) -> String + Send + Sync + 'static,
    {
        self.declare_raw_declaration(key.into(), Declaration::Raw(RawHandler::new(handler)))
    }

    fn declare_raw_declaration(
        &mut self,
        key: String,
        declaration: Declaration,
    ) -> Result<(), TerminatorError> {
        if let OptionalPolicy::Enabled(on_override) = &self.config.on_override {
            if let Some(previous) = self.declarations.get(&key) {
                if !on_override(&key, previous, &declaration)? {
                    tracing::debug!(key = %key, "override declined, keeping previous declaration");
                    return Ok(());
                }
            }
        }
        self.declarations.insert(key, declaration);
        Ok(())
    }

    pub fn find_declaration(&self, key: &str) -> Option<&Declaration> {
        self.declarations.get(key)
    }

    /// Resolve every placeholder in `tokens`
    pub fn terminate(&self, tokens: &TokenSequence) -> Result<String, TerminatorError> {
        self.terminate_excluding(tokens, &[])
    }

    /// Resolve every placeholder in `tokens`; declared keys listed in
    /// `excluded_keys` are not reported when the template never uses them
    pub fn terminate_excluding(
        &self,
        tokens: &TokenSequence,
        excluded_keys: &[&str],
    ) -> Result<String, TerminatorError> {
        if tokens.is_empty() {
            return Ok(String::new());
        }

        if let OptionalPolicy::Enabled(on_unexpected_end) = &self.config.on_unexpected_end {
            if let Some(Token::Placeholder(last)) = tokens.last() {
                if !last.end_expected {
                    on_unexpected_end(tokens)?;
                }
            }
        }

        let mut remaining: HashSet<&str> = self.declarations.keys().collect();
        let mut output = String::new();

        for token in tokens {
            match token {
                Token::Text(text) => output.push_str(&text.content),
                Token::Placeholder(placeholder) => {
                    remaining.remove(placeholder.key());
                    if placeholder.exclusion {
                        continue;
                    }
                    let value = match self.declarations.get(placeholder.key()) {
                        Some(declaration) => self.substitute(declaration, placeholder)?,
                        None => {
                            let fallback = (self.config.on_unhandled)(placeholder)?;
                            (self.config.insertion_safer)(fallback)
                        }
                    };
                    output.push_str(&value);
                }
            }
        }

        if let OptionalPolicy::Enabled(on_setup_to_nowhere) = &self.config.on_setup_to_nowhere {
            let mut unused: Vec<&str> = remaining
                .into_iter()
                .filter(|key| !excluded_keys.contains(key))
                .collect();
            unused.sort_unstable();
            for key in unused {
                if let Some(declaration) = self.declarations.get(key) {
                    on_setup_to_nowhere(key, declaration)?;
                }
            }
        }

        tracing::trace!(tokens = tokens.len(), bytes = output.len(), "terminated template");
        Ok(output)
    }

    fn substitute(
        &self,
        declaration: &Declaration,
        placeholder: &Placeholder,
    ) -> Result<String, TerminatorError> {
        match declaration {
            Declaration::Raw(handler) => Ok(handler.handle(placeholder)),
            Declaration::Managed(handler) => match handler.handle(&placeholder.data) {
                Ok(value) => Ok((self.config.insertion_safer)(value)),
                Err(source) => (self.config.on_processing_error)(&placeholder.data, source),
            },
        }
    }
}
