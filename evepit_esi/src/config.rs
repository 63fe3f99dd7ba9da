use std::time::Duration;

use crate::{EsiError, EsiResult};

pub const DEFAULT_CALLBACK_URL: &str = "http://localhost:8888";
pub const DEFAULT_BASE_URL: &str = "https://esi.evetech.net/latest";
pub const DEFAULT_DATASOURCE: &str = "tranquility";
pub const DEFAULT_SSO_METADATA_URL: &str =
    "https://login.eveonline.com/.well-known/oauth-authorization-server";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EsiConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub user_agent: String,
    pub base_url: String,
    pub datasource: String,
    /// OAuth server metadata document; its `jwks_uri` names the token signing keys.
    pub sso_metadata_url: String,
    pub retry: RetryPolicy,
}

/// Transport-level retry applied by the HTTP client to connection failures and
/// gateway statuses. Application errors are never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
    /// Percent of the backoff to randomize in either direction.
    pub jitter_percent: u8,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_initial: Duration::from_secs(1),
            backoff_max: Duration::from_secs(30),
            jitter_percent: 20,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = 1_u128 << exponent;
        let backoff_ms = self
            .backoff_initial
            .as_millis()
            .saturating_mul(factor)
            .min(self.backoff_max.as_millis());
        Duration::from_millis(backoff_ms as u64)
    }
}

impl EsiConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: DEFAULT_CALLBACK_URL.to_owned(),
            user_agent: user_agent.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            datasource: DEFAULT_DATASOURCE.to_owned(),
            sso_metadata_url: DEFAULT_SSO_METADATA_URL.to_owned(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn validate(&self) -> EsiResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(EsiError::InvalidConfig("EVE_CLIENT_ID must be set"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(EsiError::InvalidConfig("EVE_CLIENT_SECRET must be set"));
        }
        if self.callback_url.trim().is_empty() {
            return Err(EsiError::InvalidConfig("EVE_CALLBACK_URL must be set"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(EsiError::InvalidConfig("user_agent must be set"));
        }
        if self.base_url.trim().is_empty() {
            return Err(EsiError::InvalidConfig("ESI base url must be set"));
        }
        if self.sso_metadata_url.trim().is_empty() {
            return Err(EsiError::InvalidConfig("sso metadata url must be set"));
        }
        if self.retry.max_attempts == 0 {
            return Err(EsiError::InvalidConfig(
                "retry policy must allow at least one attempt",
            ));
        }
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
