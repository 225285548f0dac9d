//! Process-wide factory behind [`TerminatorConfig::warning`]
//!
//! Warnings are usually routed the same way for a whole program rather than
//! per call, so the Warning bundle is produced by one replaceable factory.
//! Replacement swaps an `Arc` under a write lock: a reader sees either the old
//! or the new factory, never a partially updated one.

use std::sync::{Arc, PoisonError, RwLock};

use super::policy::{tracing_sink, TerminatorConfig};

/// Builds the Warning bundle
pub type WarningFactory = Arc<dyn Fn() -> TerminatorConfig + Send + Sync>;

static WARNING_FACTORY: RwLock<Option<WarningFactory>> = RwLock::new(None);

/// Replace the factory used by [`TerminatorConfig::warning`], returning the previous one
pub fn set_warning_factory<F>(factory: F) -> Option<WarningFactory>
where
    F: Fn() -> TerminatorConfig + Send + Sync + 'static,
{
    let mut slot = WARNING_FACTORY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    slot.replace(Arc::new(factory))
}

/// Go back to the built-in factory reporting through `tracing`
pub fn reset_warning_factory() -> Option<WarningFactory> {
    let mut slot = WARNING_FACTORY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    slot.take()
}

/// The built-in Warning bundle: Lenient fallbacks plus a `tracing` warning per anomaly
pub fn default_warning_config() -> TerminatorConfig {
    TerminatorConfig::warning_with(tracing_sink())
}

pub(crate) fn warning_config() -> TerminatorConfig {
    // Clone out of the lock so a factory may itself read the registry
    let factory = WARNING_FACTORY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match factory {
        Some(factory) => factory(),
        None => default_warning_config(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_warning_config_enables_reports() {
        let config = default_warning_config();
        assert!(config.on_setup_to_nowhere.is_enabled());
        assert!(config.on_override.is_enabled());
        assert!(config.on_unexpected_end.is_enabled());
    }
}
