use std::time::Duration;

use evepit_core::{CharacterId, Timestamp};

use super::claims::parse_character_id;
use crate::{EsiError, EsiResult, client::SsoClient};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// The character a session is authenticated as.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
    pub character_id: CharacterId,
    pub character_name: String,
    pub scopes: Vec<String>,
    pub raw_claims: serde_json::Value,
}

#[derive(Debug)]
struct ActiveGrant {
    principal: Principal,
    access_expires_at: Timestamp,
    refresh_token: String,
}

impl ActiveGrant {
    fn should_refresh(&self, now: Timestamp, refresh_skew: Duration) -> bool {
        match now.checked_add(refresh_skew) {
            Some(deadline) => self.access_expires_at <= deadline,
            None => true,
        }
    }
}

/// Authentication state for one character at a time.
pub struct Session<C, T = SystemClock>
where
    C: SsoClient,
    T: Clock,
{
    client: C,
    clock: T,
    refresh_skew: Duration,
    active: Option<ActiveGrant>,
}

impl<C> Session<C, SystemClock>
where
    C: SsoClient,
{
    pub fn new(client: C) -> Self {
        Self::with_clock(client, SystemClock)
    }
}

impl<C, T> Session<C, T>
where
    C: SsoClient,
    T: Clock,
{
    pub fn with_clock(client: C, clock: T) -> Self {
        Self {
            client,
            clock,
            refresh_skew: Duration::from_secs(60),
            active: None,
        }
    }

    pub fn with_refresh_skew(mut self, refresh_skew: Duration) -> Self {
        self.refresh_skew = refresh_skew;
        self
    }

    /// Exchanges `refresh_token` and makes its character the active one.
    ///
    /// Any previously active character is dropped first, so a failed
    /// activation always leaves the session empty.
    pub async fn activate(&mut self, refresh_token: &str) -> EsiResult<&Principal> {
        self.deactivate();

        let grant = self
            .establish(refresh_token)
            .await
            .map_err(EsiError::authentication_failed)?;
        log::info!(
            "activated character {} ({})",
            grant.principal.character_name,
            grant.principal.character_id
        );

        Ok(&self.active.insert(grant).principal)
    }

    pub fn deactivate(&mut self) {
        if self.active.take().is_some() {
            log::debug!("deactivated session");
        }
        self.client.hydrate_access_token(None);
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn require_principal(&self) -> EsiResult<&Principal> {
        self.active
            .as_ref()
            .map(|grant| &grant.principal)
            .ok_or(EsiError::NotAuthenticated)
    }

    pub fn character_id(&self) -> EsiResult<CharacterId> {
        self.require_principal()
            .map(|principal| principal.character_id)
    }

    /// Refreshes the access token when it expires within the refresh skew.
    /// The refreshed token must still belong to the same character.
    pub async fn ensure_fresh(&mut self) -> EsiResult<()> {
        let now = self.clock.now();
        let grant = self.active.as_ref().ok_or(EsiError::NotAuthenticated)?;
        if !grant.should_refresh(now, self.refresh_skew) {
            return Ok(());
        }

        let expected = grant.principal.character_id;
        let refresh_token = grant.refresh_token.clone();
        log::debug!("access token for character {expected} is expiring; refreshing");
        self.deactivate();

        let grant = self
            .establish(&refresh_token)
            .await
            .map_err(EsiError::authentication_failed)?;
        if grant.principal.character_id != expected {
            self.client.hydrate_access_token(None);
            return Err(EsiError::authentication_failed(EsiError::message(format!(
                "refreshed token belongs to character {}, expected {expected}",
                grant.principal.character_id
            ))));
        }

        self.active = Some(grant);
        Ok(())
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn establish(&mut self, refresh_token: &str) -> EsiResult<ActiveGrant> {
        let tokens = self.client.refresh(refresh_token).await?;
        let verifier = self.client.token_verifier().await?;
        let claims = verifier.verify(&tokens.access_token, self.clock.now())?;
        let character_id = parse_character_id(&claims.sub)?;

        self.client.hydrate_access_token(Some(&tokens.access_token));

        Ok(ActiveGrant {
            principal: Principal {
                character_id,
                character_name: claims.name,
                scopes: claims.scopes,
                raw_claims: claims.raw,
            },
            access_expires_at: tokens.access_expires_at,
            refresh_token: tokens.refresh_token,
        })
    }
}
