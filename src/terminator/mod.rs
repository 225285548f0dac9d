//! Placeholder substitution
//!
//! A [`Terminator`] owns a table of declarations and a [`TerminatorConfig`]
//! deciding what happens on each anomaly: an undeclared key, a failing
//! handler, a declared key the template never uses, a re-declaration, or a
//! template ending inside a placeholder.
//!
//! ```
//! use gst_template::parser::parse;
//! use gst_template::terminator::Terminator;
//!
//! let mut terminator = Terminator::strict();
//! terminator.declare("name", "world").unwrap();
//! let tokens = parse("Hello, \\{name}!").unwrap();
//! assert_eq!(terminator.terminate(&tokens).unwrap(), "Hello, world!");
//! ```

mod engine;
mod error;
mod policy;
mod registry;
mod warning;

pub use engine::Terminator;
pub use error::{HandlerError, TerminatorError};
pub use policy::{
    identity_safer, tracing_sink, InsertionSafer, OptionalPolicy, OverridePolicy,
    ProcessingErrorPolicy, SetupToNowherePolicy, TerminatorConfig, UnexpectedEndPolicy,
    UnhandledPlaceholderPolicy, WarningSink,
};
pub use registry::{Declaration, DeclarationTable, Handler, RawHandler};
pub use warning::{
    default_warning_config, reset_warning_factory, set_warning_factory, WarningFactory,
};
