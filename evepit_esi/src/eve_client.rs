use std::time::Duration;

use async_trait::async_trait;
use evepit_core::{
    CharacterId, PlanetId, Timestamp, TypeId,
    planets::{Planet, PlanetInfo, PlanetLayout, TypeInfo},
};
use jsonwebtoken::jwk::JwkSet;
use rand::Rng;
use rfesi::prelude::{Esi, EsiBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::time::sleep;

use crate::{
    EsiError, EsiResult,
    auth::TokenVerifier,
    client::{EsiApiClient, EsiResponse, RefreshedTokens, SsoClient},
    config::{EsiConfig, RetryPolicy},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Live ESI client: rfesi drives the SSO refresh exchange, plain HTTP GETs
/// fetch the data so callers see the real status and body.
pub struct EveClient {
    config: EsiConfig,
    sso: Esi,
    http: reqwest::Client,
    access_token: Option<String>,
    verifier: Option<TokenVerifier>,
}

#[derive(Deserialize)]
struct SsoMetadata {
    jwks_uri: String,
}

impl EveClient {
    pub fn new(config: EsiConfig) -> EsiResult<Self> {
        config.validate()?;

        let sso = EsiBuilder::new()
            .user_agent(&config.user_agent)
            .client_id(&config.client_id)
            .client_secret(&config.client_secret)
            .callback_url(&config.callback_url)
            .build()?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            config,
            sso,
            http,
            access_token: None,
            verifier: None,
        })
    }

    async fn fetch_verifier(&self) -> EsiResult<TokenVerifier> {
        let metadata: SsoMetadata = self.get_document(&self.config.sso_metadata_url).await?;
        let keys: JwkSet = self.get_document(&metadata.jwks_uri).await?;
        log::debug!(
            "loaded {} sso signing key(s) from {}",
            keys.keys.len(),
            metadata.jwks_uri
        );
        TokenVerifier::from_jwk_set(&self.config.client_id, &keys)
    }

    async fn get_document<T>(&self, url: &str) -> EsiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let raw = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(EsiError::SigningKeys(format!("{url} answered {status}")));
        }
        serde_json::from_str(&raw).map_err(|source| EsiError::MalformedResponse {
            context: url.to_owned(),
            source,
        })
    }

    fn bearer(&self) -> EsiResult<&str> {
        self.access_token
            .as_deref()
            .ok_or(EsiError::NotAuthenticated)
    }

    async fn get<T>(&self, path: &str, bearer: Option<&str>) -> EsiResult<EsiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let retry = &self.config.retry;
        let mut attempt = 0_u32;

        loop {
            attempt += 1;
            log::trace!("GET {url} (attempt {attempt})");

            let mut request = self
                .http
                .get(&url)
                .query(&[("datasource", self.config.datasource.as_str())]);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if is_gateway_status(status) && attempt < retry.max_attempts {
                        let wait = jittered(retry, attempt);
                        log::warn!(
                            "GET {path} answered {status}; retrying in {wait:?} (attempt {attempt}/{})",
                            retry.max_attempts
                        );
                        sleep(wait).await;
                        continue;
                    }

                    let raw = response.text().await?;
                    log::trace!("GET {path} -> {status} ({} bytes)", raw.len());
                    return decode_response(path, status, raw);
                }
                Err(err) if is_transient(&err) && attempt < retry.max_attempts => {
                    let wait = jittered(retry, attempt);
                    log::warn!(
                        "GET {path} transport failure ({err}); retrying in {wait:?} (attempt {attempt}/{})",
                        retry.max_attempts
                    );
                    sleep(wait).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[async_trait]
impl SsoClient for EveClient {
    async fn refresh(&mut self, refresh_token: &str) -> EsiResult<RefreshedTokens> {
        self.sso.refresh_access_token(Some(refresh_token)).await?;

        let access_token = self
            .sso
            .access_token
            .clone()
            .ok_or(EsiError::MissingAccessToken)?;
        let expiry_ms = self
            .sso
            .access_expiration
            .ok_or(EsiError::MissingAccessExpiration)?;
        let access_expires_at =
            Timestamp::from_epoch_millis(expiry_ms).ok_or(EsiError::MissingAccessExpiration)?;
        let refresh_token = self
            .sso
            .refresh_token
            .clone()
            .ok_or(EsiError::MissingRefreshToken)?;

        Ok(RefreshedTokens {
            access_token,
            access_expires_at,
            refresh_token,
        })
    }

    async fn token_verifier(&mut self) -> EsiResult<TokenVerifier> {
        if let Some(verifier) = &self.verifier {
            return Ok(verifier.clone());
        }

        let verifier = self.fetch_verifier().await?;
        self.verifier = Some(verifier.clone());
        Ok(verifier)
    }

    fn hydrate_access_token(&mut self, access_token: Option<&str>) {
        self.access_token = access_token.map(ToOwned::to_owned);
    }
}

#[async_trait]
impl EsiApiClient for EveClient {
    async fn list_planets(&self, character_id: CharacterId) -> EsiResult<EsiResponse<Vec<Planet>>> {
        let bearer = self.bearer()?;
        self.get(&format!("characters/{character_id}/planets/"), Some(bearer))
            .await
    }

    async fn get_planet_layout(
        &self,
        character_id: CharacterId,
        planet_id: PlanetId,
    ) -> EsiResult<EsiResponse<PlanetLayout>> {
        let bearer = self.bearer()?;
        self.get(
            &format!("characters/{character_id}/planets/{planet_id}/"),
            Some(bearer),
        )
        .await
    }

    async fn get_planet_info(&self, planet_id: PlanetId) -> EsiResult<EsiResponse<PlanetInfo>> {
        self.get(&format!("universe/planets/{planet_id}/"), None)
            .await
    }

    async fn get_type_info(&self, type_id: TypeId) -> EsiResult<EsiResponse<TypeInfo>> {
        self.get(&format!("universe/types/{type_id}/"), None).await
    }
}

fn decode_response<T>(path: &str, status: u16, raw: String) -> EsiResult<EsiResponse<T>>
where
    T: DeserializeOwned,
{
    let data = if (200..300).contains(&status) {
        let parsed = serde_json::from_str(&raw).map_err(|source| EsiError::MalformedResponse {
            context: path.to_owned(),
            source,
        })?;
        Some(parsed)
    } else {
        None
    };

    Ok(EsiResponse { status, data, raw })
}

fn is_gateway_status(status: u16) -> bool {
    matches!(status, 502..=504)
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

fn jittered(policy: &RetryPolicy, attempt: u32) -> Duration {
    let base = policy.backoff_for(attempt);
    let percent = f64::from(policy.jitter_percent.min(100)) / 100.0;
    if percent <= 0.0 {
        return base;
    }

    let multiplier = rand::thread_rng().gen_range((1.0 - percent)..=(1.0 + percent));
    base.mul_f64(multiplier)
}
