//! Declaration table mapping placeholder keys to value handlers

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::parser::{Placeholder, PlaceholderData};

use super::error::HandlerError;

type HandlerFn = dyn Fn(&PlaceholderData) -> Result<String, HandlerError> + Send + Sync;
type RawHandlerFn = dyn Fn(&Placeholder) -> String + Send + Sync;

/// Produces the value for a placeholder.
///
/// Output goes through the insertion safer and failures are routed to the
/// processing-error policy.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&PlaceholderData) -> Result<String, HandlerError> + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Always yields `replacement`
    pub fn literal(replacement: impl Into<String>) -> Self {
        let replacement = replacement.into();
        Self::new(move |_| Ok(replacement.clone()))
    }

    pub fn handle(&self, data: &PlaceholderData) -> Result<String, HandlerError> {
        (self.0)(data)
    }
}

impl From<&str> for Handler {
    fn from(replacement: &str) -> Self {
        Handler::literal(replacement)
    }
}

impl From<String> for Handler {
    fn from(replacement: String) -> Self {
        Handler::literal(replacement)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Sees the whole placeholder and writes its output verbatim
#[derive(Clone)]
pub struct RawHandler(Arc<RawHandlerFn>);

impl RawHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Placeholder) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    pub fn handle(&self, placeholder: &Placeholder) -> String {
        (self.0)(placeholder)
    }
}

impl fmt::Debug for RawHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawHandler(..)")
    }
}

/// A value stored under a placeholder key
#[derive(Debug, Clone)]
pub enum Declaration {
    Managed(Handler),
    Raw(RawHandler),
}

impl Declaration {
    /// Call the handler directly, without any policy involved
    pub fn invoke(&self, placeholder: &Placeholder) -> Result<String, HandlerError> {
        match self {
            Declaration::Managed(handler) => handler.handle(&placeholder.data),
            Declaration::Raw(handler) => Ok(handler.handle(placeholder)),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Declaration::Raw(_))
    }
}

/// Key to declaration map, one entry per key
#[derive(Debug, Clone, Default)]
pub struct DeclarationTable {
    entries: HashMap<String, Declaration>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Declaration> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Store `declaration`, returning the one it replaced
    pub fn insert(&mut self, key: String, declaration: Declaration) -> Option<Declaration> {
        self.entries.insert(key, declaration)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|key| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
