//! Provider credential loading.
//!
//! The API key is read once at startup from the process environment, after
//! an optional `.env` file in the working directory has been merged in.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

/// Provider credential captured at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    /// Build credentials from an optional key. Blank keys count as absent.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Read the key named `key_env` using a custom env resolver.
    pub fn from_env_with(key_env: &str, env: impl Fn(&str) -> Option<String>) -> Self {
        let credentials = Self::new(env(key_env));
        if credentials.api_key.is_none() {
            warn!(
                var = key_env,
                "API key not set; every draft request will fail authentication"
            );
        }
        credentials
    }

    /// Read the key named `key_env` from the process environment.
    pub fn from_env(key_env: &str) -> Self {
        Self::from_env_with(key_env, |key| std::env::var(key).ok())
    }

    /// The API key, if one was provided.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// Merge a `.env` file into the process environment when it exists.
///
/// Variables already set in the environment are not overridden.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_dotenv(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        debug!(path = %path.display(), "no .env file found");
        return Ok(());
    }
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load environment file {}", path.display()))?;
    debug!(path = %path.display(), "loaded .env file");
    Ok(())
}
