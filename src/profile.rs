//! Template profiles loaded from TOML
//!
//! A profile bundles everything needed to render a template without writing
//! code: the special characters, the escaping mode, a policy bundle and a set
//! of literal declarations.
//!
//! ```toml
//! policy = "lenient"
//! mode = "unescaped-is-placeholder"
//!
//! [characters]
//! opening = "("
//! closing = ")"
//! argument_delimiter = "_"
//!
//! [declarations]
//! name = "world"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ConfigError;
use crate::parser::{CharacterSet, EscapingMode, Tokenizer};
use crate::terminator::{Terminator, TerminatorConfig, TerminatorError};

/// Errors that can occur when loading a profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to read profile file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse profile TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid character set: {0}")]
    Config(#[from] ConfigError),
    #[error("unknown policy '{0}', expected strict, lenient or warning")]
    InvalidPolicy(String),
}

/// The three canonical policy configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyBundle {
    #[default]
    Strict,
    Lenient,
    Warning,
}

impl PolicyBundle {
    pub fn config(self) -> TerminatorConfig {
        match self {
            PolicyBundle::Strict => TerminatorConfig::strict(),
            PolicyBundle::Lenient => TerminatorConfig::lenient(),
            PolicyBundle::Warning => TerminatorConfig::warning(),
        }
    }
}

impl FromStr for PolicyBundle {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PolicyBundle::Strict),
            "lenient" => Ok(PolicyBundle::Lenient),
            "warning" => Ok(PolicyBundle::Warning),
            _ => Err(ProfileError::InvalidPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyBundle::Strict => "strict",
            PolicyBundle::Lenient => "lenient",
            PolicyBundle::Warning => "warning",
        };
        f.write_str(name)
    }
}

/// Everything needed to tokenize and terminate a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub charset: CharacterSet,
    pub mode: EscapingMode,
    pub policy: PolicyBundle,
    /// Literal replacements, key to value
    pub declarations: BTreeMap<String, String>,
}

/// TOML structure for deserializing profiles
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlProfile {
    policy: Option<String>,
    mode: Option<EscapingMode>,
    characters: Option<TomlCharacters>,
    #[serde(default)]
    declarations: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlCharacters {
    opening: Option<char>,
    closing: Option<char>,
    argument_delimiter: Option<char>,
    exclusion: Option<char>,
    escape: Option<char>,
}

impl TomlCharacters {
    fn build(self) -> Result<CharacterSet, ConfigError> {
        let mut builder = CharacterSet::builder();
        if let Some(c) = self.opening {
            builder = builder.with_opening(c);
        }
        if let Some(c) = self.closing {
            builder = builder.with_closing(c);
        }
        if let Some(c) = self.argument_delimiter {
            builder = builder.with_argument_delimiter(c);
        }
        if let Some(c) = self.exclusion {
            builder = builder.with_exclusion(c);
        }
        if let Some(c) = self.escape {
            builder = builder.with_escape(c);
        }
        builder.build()
    }
}

impl Profile {
    /// Load a profile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a profile from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ProfileError> {
        let parsed: TomlProfile = toml::from_str(content)?;

        let charset = match parsed.characters {
            Some(characters) => characters.build()?,
            None => CharacterSet::default(),
        };
        let policy = match parsed.policy {
            Some(policy) => policy.parse()?,
            None => PolicyBundle::default(),
        };

        Ok(Profile {
            charset,
            mode: parsed.mode.unwrap_or_default(),
            policy,
            declarations: parsed.declarations,
        })
    }

    pub fn with_policy(mut self, policy: PolicyBundle) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: EscapingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add or replace a literal declaration
    pub fn with_declaration(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.declarations.insert(key.into(), value.into());
        self
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.charset, self.mode)
    }

    /// A terminator with the profile's policy bundle and every literal declared
    pub fn terminator(&self) -> Result<Terminator, TerminatorError> {
        let mut terminator = Terminator::new(self.policy.config());
        for (key, value) in &self.declarations {
            terminator.declare(key.as_str(), value.as_str())?;
        }
        Ok(terminator)
    }
}
