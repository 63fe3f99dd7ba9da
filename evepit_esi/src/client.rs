use async_trait::async_trait;
use evepit_core::{
    CharacterId, PlanetId, Timestamp, TypeId,
    planets::{Planet, PlanetInfo, PlanetLayout, TypeInfo},
};

use crate::{EsiError, EsiResult, auth::TokenVerifier};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub access_expires_at: Timestamp,
    pub refresh_token: String,
}

/// Refresh-token half of the SSO flow.
#[async_trait]
pub trait SsoClient {
    async fn refresh(&mut self, refresh_token: &str) -> EsiResult<RefreshedTokens>;

    /// Verifier bound to this application's client id and the SSO's current
    /// signing key.
    async fn token_verifier(&mut self) -> EsiResult<TokenVerifier>;

    /// Installs (or with `None`, drops) the bearer token used by authenticated calls.
    fn hydrate_access_token(&mut self, access_token: Option<&str>);
}

/// ESI answer as seen by the caller: the status, the decoded payload for 2xx
/// answers, and the raw body for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct EsiResponse<T> {
    pub status: u16,
    pub data: Option<T>,
    pub raw: String,
}

impl<T> EsiResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_data(self) -> EsiResult<T> {
        if !self.is_success() {
            return Err(EsiError::RemoteCallFailed {
                status: self.status,
                body: self.raw,
            });
        }

        self.data
            .ok_or_else(|| EsiError::MissingPayload(format!("status {}", self.status)))
    }
}

#[async_trait]
pub trait EsiApiClient {
    async fn list_planets(&self, character_id: CharacterId) -> EsiResult<EsiResponse<Vec<Planet>>>;

    async fn get_planet_layout(
        &self,
        character_id: CharacterId,
        planet_id: PlanetId,
    ) -> EsiResult<EsiResponse<PlanetLayout>>;

    async fn get_planet_info(&self, planet_id: PlanetId) -> EsiResult<EsiResponse<PlanetInfo>>;

    async fn get_type_info(&self, type_id: TypeId) -> EsiResult<EsiResponse<TypeInfo>>;
}
