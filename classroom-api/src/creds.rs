use std::env::{self, VarError};
use std::fmt;

/// Supplies the bearer token attached to every outgoing request. Implementations own any refresh
/// policy; callers ask for a token per request and never cache it.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> String;
}

/// A fixed token, typically a personal access token read from the environment.
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn from_env(var: &str) -> Result<Self, VarError> {
        let token = env::var(var)?;
        Ok(Self::new(token))
    }

    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl CredentialProvider for BearerToken {
    fn bearer_token(&self) -> String {
        self.token.clone()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"<hidden>")
            .finish()
    }
}
