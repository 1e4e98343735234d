use diary_common::AuthorizationGate;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding an access token.
pub const TOKEN_ENV: &str = "DIARY_TOKEN";

/// Authorised while a non-empty access token is available.
///
/// The token is looked up on every check, in the environment first and then
/// in the token file, so signing in or out takes effect immediately.
#[derive(Debug, Clone)]
pub struct TokenGate {
    env_var: Option<String>,
    token_path: PathBuf,
}

impl TokenGate {
    pub fn new(token_path: impl Into<PathBuf>) -> Self {
        Self {
            env_var: Some(TOKEN_ENV.to_string()),
            token_path: token_path.into(),
        }
    }

    /// Consults only the token file.
    pub fn from_file(token_path: impl Into<PathBuf>) -> Self {
        Self {
            env_var: None,
            token_path: token_path.into(),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    fn token(&self) -> Option<String> {
        let from_env = self
            .env_var
            .as_deref()
            .and_then(|name| std::env::var(name).ok());

        from_env
            .or_else(|| std::fs::read_to_string(&self.token_path).ok())
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

impl AuthorizationGate for TokenGate {
    fn is_authorized(&self) -> bool {
        let authorized = self.token().is_some();
        debug!(authorized, "Token check");
        authorized
    }
}
