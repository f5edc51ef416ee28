//! Credential resolution
//!
//! Bearer tokens for the inference endpoint and the tool host are resolved
//! from an ordered list of sources. Each source either yields a token or a
//! specific reason it could not; when every source fails the aggregate
//! error carries all of those reasons.
//!
//! # Example
//!
//! ```
//! use gm_core::{CredentialChain, CredentialSource};
//!
//! let chain = CredentialChain::new()
//!     .with(CredentialSource::Explicit(Some("secret".to_string())))
//!     .with(CredentialSource::Env("GM_AUTH_TOKEN".to_string()));
//!
//! let resolved = chain.resolve().unwrap();
//! assert_eq!(resolved.token, "secret");
//! ```

use crate::{Error, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

/// A single place a token may come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A value taken from the configuration file
    Explicit(Option<String>),
    /// An environment variable
    Env(String),
    /// A file whose trimmed contents are the token
    File(PathBuf),
}

impl CredentialSource {
    /// Human-readable label used in logs and in aggregate failures
    pub fn describe(&self) -> String {
        match self {
            CredentialSource::Explicit(_) => "config value".to_string(),
            CredentialSource::Env(name) => format!("environment variable {}", name),
            CredentialSource::File(path) => format!("token file {}", path.display()),
        }
    }

    /// Returns the token, or the reason this source has none
    pub fn resolve(&self) -> std::result::Result<String, String> {
        let raw = match self {
            CredentialSource::Explicit(value) => value.clone().ok_or("not set")?,
            CredentialSource::Env(name) => env::var(name).map_err(|e| match e {
                env::VarError::NotPresent => "not set".to_string(),
                env::VarError::NotUnicode(_) => "not valid unicode".to_string(),
            })?,
            CredentialSource::File(path) => {
                fs::read_to_string(path).map_err(|e| format!("unreadable ({})", e))?
            }
        };

        let token = raw.trim();
        if token.is_empty() {
            return Err("empty".to_string());
        }
        Ok(token.to_string())
    }
}

/// A token together with where it was found
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub token: String,
    pub source: String,
}

/// Ordered list of credential sources, tried first to last
#[derive(Debug, Clone, Default)]
pub struct CredentialChain {
    sources: Vec<CredentialSource>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: CredentialSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    /// Resolves the first source that yields a token.
    ///
    /// # Errors
    ///
    /// Returns `Error::Credentials` listing the failure reason of every
    /// source that was tried.
    pub fn resolve(&self) -> Result<ResolvedCredential> {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.resolve() {
                Ok(token) => {
                    tracing::debug!(source = %source.describe(), "Resolved credential");
                    return Ok(ResolvedCredential {
                        token,
                        source: source.describe(),
                    });
                }
                Err(reason) => attempts.push(format!("{}: {}", source.describe(), reason)),
            }
        }

        if attempts.is_empty() {
            attempts.push("no credential sources configured".to_string());
        }
        Err(Error::Credentials { attempts })
    }
}
