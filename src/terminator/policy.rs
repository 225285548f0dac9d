//! Failure policies and the canonical Strict, Lenient and Warning bundles

use std::fmt;
use std::sync::Arc;

use crate::parser::{Placeholder, PlaceholderData, Token};
use crate::sequence::TokenSequence;

use super::error::{HandlerError, TerminatorError};
use super::registry::Declaration;
use super::warning;

/// Applied to every substituted value before it enters the output
pub type InsertionSafer = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Fallback text for a handler that failed
pub type ProcessingErrorPolicy =
    Arc<dyn Fn(&PlaceholderData, HandlerError) -> Result<String, TerminatorError> + Send + Sync>;

/// Fallback text for a placeholder nobody declared
pub type UnhandledPlaceholderPolicy =
    Arc<dyn Fn(&Placeholder) -> Result<String, TerminatorError> + Send + Sync>;

/// Called for each declared key the template never referenced
pub type SetupToNowherePolicy =
    Arc<dyn Fn(&str, &Declaration) -> Result<(), TerminatorError> + Send + Sync>;

/// Decides whether a re-declaration replaces the previous one
pub type OverridePolicy =
    Arc<dyn Fn(&str, &Declaration, &Declaration) -> Result<bool, TerminatorError> + Send + Sync>;

/// Called when the last token is a placeholder that was never closed
pub type UnexpectedEndPolicy =
    Arc<dyn Fn(&TokenSequence) -> Result<(), TerminatorError> + Send + Sync>;

/// Receives every anomaly a Warning bundle swallows
pub type WarningSink = Arc<dyn Fn(&TerminatorError) + Send + Sync>;

/// A check that is either switched off or runs `T`
#[derive(Clone, Default)]
pub enum OptionalPolicy<T> {
    #[default]
    Disabled,
    Enabled(T),
}

impl<T> OptionalPolicy<T> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, OptionalPolicy::Enabled(_))
    }

    pub fn as_enabled(&self) -> Option<&T> {
        match self {
            OptionalPolicy::Enabled(policy) => Some(policy),
            OptionalPolicy::Disabled => None,
        }
    }
}

impl<T> fmt::Debug for OptionalPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionalPolicy::Disabled => f.write_str("Disabled"),
            OptionalPolicy::Enabled(_) => f.write_str("Enabled(..)"),
        }
    }
}

/// Full policy configuration of a terminator.
///
/// The default is the Strict bundle: every anomaly is an error, including
/// re-declaring a key.
#[derive(Clone)]
pub struct TerminatorConfig {
    pub insertion_safer: InsertionSafer,
    pub on_processing_error: ProcessingErrorPolicy,
    pub on_unhandled: UnhandledPlaceholderPolicy,
    pub on_setup_to_nowhere: OptionalPolicy<SetupToNowherePolicy>,
    pub on_override: OptionalPolicy<OverridePolicy>,
    pub on_unexpected_end: OptionalPolicy<UnexpectedEndPolicy>,
}

impl Default for TerminatorConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl fmt::Debug for TerminatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminatorConfig")
            .field("on_setup_to_nowhere", &self.on_setup_to_nowhere)
            .field("on_override", &self.on_override)
            .field("on_unexpected_end", &self.on_unexpected_end)
            .finish_non_exhaustive()
    }
}

impl TerminatorConfig {
    /// Every anomaly is raised as an error
    pub fn strict() -> Self {
        Self {
            insertion_safer: identity_safer(),
            on_processing_error: Arc::new(
                |data: &PlaceholderData, source: HandlerError| -> Result<String, TerminatorError> {
                    Err(processing_error(data, source))
                },
            ),
            on_unhandled: Arc::new(
                |placeholder: &Placeholder| -> Result<String, TerminatorError> {
                    Err(unhandled_error(placeholder))
                },
            ),
            on_setup_to_nowhere: OptionalPolicy::Enabled(Arc::new(
                |key: &str, _: &Declaration| -> Result<(), TerminatorError> {
                    Err(TerminatorError::SetupToNowhere {
                        key: key.to_string(),
                    })
                },
            )),
            on_override: OptionalPolicy::Enabled(Arc::new(
                |key: &str, _: &Declaration, _: &Declaration| -> Result<bool, TerminatorError> {
                    Err(TerminatorError::Override {
                        key: key.to_string(),
                    })
                },
            )),
            on_unexpected_end: OptionalPolicy::Enabled(Arc::new(
                |tokens: &TokenSequence| -> Result<(), TerminatorError> {
                    Err(unexpected_end_error(tokens))
                },
            )),
        }
    }

    /// Never raises: broken placeholders are echoed as written, overrides are allowed
    pub fn lenient() -> Self {
        Self {
            insertion_safer: identity_safer(),
            on_processing_error: Arc::new(
                |data: &PlaceholderData, _: HandlerError| -> Result<String, TerminatorError> {
                    Ok(data.original.content.clone())
                },
            ),
            on_unhandled: Arc::new(
                |placeholder: &Placeholder| -> Result<String, TerminatorError> {
                    Ok(placeholder.original().content.clone())
                },
            ),
            on_setup_to_nowhere: OptionalPolicy::Disabled,
            on_override: OptionalPolicy::Disabled,
            on_unexpected_end: OptionalPolicy::Disabled,
        }
    }

    /// Lenient behaviour, but every anomaly is reported first.
    ///
    /// Built by the process-wide factory, see [`warning::set_warning_factory`].
    pub fn warning() -> Self {
        warning::warning_config()
    }

    /// Lenient behaviour reporting every anomaly to `sink`
    pub fn warning_with(sink: WarningSink) -> Self {
        let processing_sink = Arc::clone(&sink);
        let unhandled_sink = Arc::clone(&sink);
        let nowhere_sink = Arc::clone(&sink);
        let override_sink = Arc::clone(&sink);
        let end_sink = sink;

        Self {
            insertion_safer: identity_safer(),
            on_processing_error: Arc::new(
                move |data: &PlaceholderData, source: HandlerError| -> Result<String, TerminatorError> {
                    processing_sink(&processing_error(data, source));
                    Ok(data.original.content.clone())
                },
            ),
            on_unhandled: Arc::new(
                move |placeholder: &Placeholder| -> Result<String, TerminatorError> {
                    unhandled_sink(&unhandled_error(placeholder));
                    Ok(placeholder.original().content.clone())
                },
            ),
            on_setup_to_nowhere: OptionalPolicy::Enabled(Arc::new(
                move |key: &str, _: &Declaration| -> Result<(), TerminatorError> {
                    nowhere_sink(&TerminatorError::SetupToNowhere {
                        key: key.to_string(),
                    });
                    Ok(())
                },
            )),
            on_override: OptionalPolicy::Enabled(Arc::new(
                move |key: &str, _: &Declaration, _: &Declaration| -> Result<bool, TerminatorError> {
                    override_sink(&TerminatorError::Override {
                        key: key.to_string(),
                    });
                    Ok(true)
                },
            )),
            on_unexpected_end: OptionalPolicy::Enabled(Arc::new(
                move |tokens: &TokenSequence| -> Result<(), TerminatorError> {
                    end_sink(&unexpected_end_error(tokens));
                    Ok(())
                },
            )),
        }
    }

    pub fn with_insertion_safer<F>(mut self, safer: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.insertion_safer = Arc::new(safer);
        self
    }

    pub fn with_processing_error_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&PlaceholderData, HandlerError) -> Result<String, TerminatorError>
            + Send
            + Sync
            + 'static,
    {
        self.on_processing_error = Arc::new(policy);
        self
    }

    pub fn with_unhandled_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&Placeholder) -> Result<String, TerminatorError> + Send + Sync + 'static,
    {
        self.on_unhandled = Arc::new(policy);
        self
    }

    pub fn with_setup_to_nowhere_policy(
        mut self,
        policy: OptionalPolicy<SetupToNowherePolicy>,
    ) -> Self {
        self.on_setup_to_nowhere = policy;
        self
    }

    pub fn with_override_policy(mut self, policy: OptionalPolicy<OverridePolicy>) -> Self {
        self.on_override = policy;
        self
    }

    pub fn with_unexpected_end_policy(
        mut self,
        policy: OptionalPolicy<UnexpectedEndPolicy>,
    ) -> Self {
        self.on_unexpected_end = policy;
        self
    }
}

/// Passes values through unchanged
pub fn identity_safer() -> InsertionSafer {
    Arc::new(|value: String| value)
}

/// The default Warning sink: one `warn` event per anomaly
pub fn tracing_sink() -> WarningSink {
    Arc::new(|err: &TerminatorError| {
        tracing::warn!(kind = err.kind(), key = err.key(), error = %err, "template anomaly");
    })
}

fn processing_error(data: &PlaceholderData, source: HandlerError) -> TerminatorError {
    TerminatorError::Processing {
        key: data.key.clone(),
        index: data.original.index,
        source,
    }
}

fn unhandled_error(placeholder: &Placeholder) -> TerminatorError {
    TerminatorError::UnhandledPlaceholder {
        key: placeholder.key().to_string(),
        index: placeholder.original().index,
        original: placeholder.original().content.clone(),
    }
}

fn unexpected_end_error(tokens: &TokenSequence) -> TerminatorError {
    match tokens.last() {
        Some(Token::Placeholder(placeholder)) => TerminatorError::UnexpectedEndOfInput {
            key: placeholder.key().to_string(),
            index: placeholder.original().index,
            original: placeholder.original().content.clone(),
        },
        _ => TerminatorError::UnexpectedEndOfInput {
            key: String::new(),
            index: 0,
            original: String::new(),
        },
    }
}
