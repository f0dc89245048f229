use crate::error::MonsterError;
use std::env;
use std::time::Duration;

pub const API_KEY_ENV: &str = "MONSTER_API_KEY";
pub const BEARER_TOKEN_ENV: &str = "MONSTER_BEARER_TOKEN";

/// The two static credentials attached to every request.
#[derive(Clone)]
pub struct Credentials {
    /// Sent as `x-api-key`.
    pub api_key: String,
    /// Sent verbatim as `Authorization`.
    pub bearer_token: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            bearer_token: bearer_token.into(),
        }
    }

    /// Reads `MONSTER_API_KEY` and `MONSTER_BEARER_TOKEN`.
    ///
    /// # Errors
    ///
    /// - `MonsterError::MissingCredentials` naming the first variable that is unset.
    pub fn from_env() -> Result<Self, MonsterError> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| MonsterError::MissingCredentials(API_KEY_ENV))?;
        let bearer_token =
            env::var(BEARER_TOKEN_ENV).map_err(|_| MonsterError::MissingCredentials(BEARER_TOKEN_ENV))?;
        Ok(Self::new(api_key, bearer_token))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// Controls the status polling loop.
///
/// The default polls immediately and without limit, waiting only on each
/// round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between a non-terminal status and the next request.
    pub interval: Duration,
    /// Maximum number of status requests. `None` polls until completion.
    pub max_attempts: Option<u32>,
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}
