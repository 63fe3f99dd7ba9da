use evepit_core::{CharacterId, Timestamp};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode,
    jwk::{Jwk, JwkSet, KeyAlgorithm},
};
use serde::Deserialize;

use crate::{EsiError, EsiResult};

const ACCEPTED_ISSUERS: [&str; 2] = ["login.eveonline.com", "https://login.eveonline.com"];
const EVE_AUDIENCE: &str = "EVE Online";

/// Claims carried by an EVE SSO access token.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub name: String,
    pub iss: String,
    pub aud: Vec<String>,
    pub exp: i64,
    pub scopes: Vec<String>,
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
struct ClaimsPayload {
    sub: String,
    name: String,
    iss: String,
    #[serde(default)]
    aud: Option<OneOrMany>,
    exp: i64,
    #[serde(default)]
    scp: Option<OneOrMany>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(single) => vec![single],
            Self::Many(many) => many,
        }
    }
}

/// Checks SSO access tokens against the SSO's RS256 signing key on behalf of
/// one application.
#[derive(Clone)]
pub struct TokenVerifier {
    client_id: String,
    key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(client_id: impl Into<String>, key: DecodingKey) -> Self {
        Self {
            client_id: client_id.into(),
            key,
        }
    }

    /// Picks the RS256 key out of the SSO's published key set.
    pub fn from_jwk_set(client_id: impl Into<String>, keys: &JwkSet) -> EsiResult<Self> {
        let jwk = keys
            .keys
            .iter()
            .find(|jwk| is_rs256(jwk))
            .ok_or_else(|| EsiError::SigningKeys("no RS256 key published".to_string()))?;
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|err| EsiError::SigningKeys(format!("unusable RS256 key: {err}")))?;
        Ok(Self::new(client_id, key))
    }

    /// Verifies signature, issuer, audience and expiry. Expiry is judged
    /// against `now` rather than the system clock.
    pub fn verify(&self, token: &str, now: Timestamp) -> EsiResult<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["sub", "exp"]);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let raw = decode::<serde_json::Value>(token, &self.key, &validation)?.claims;
        let payload: ClaimsPayload = serde_json::from_value(raw.clone())
            .map_err(|err| EsiError::InvalidAccessToken(format!("unexpected claim shape: {err}")))?;

        if !ACCEPTED_ISSUERS.contains(&payload.iss.as_str()) {
            return Err(EsiError::InvalidAccessToken(format!(
                "unexpected issuer {}",
                payload.iss
            )));
        }

        let aud = payload.aud.map(OneOrMany::into_vec).unwrap_or_default();
        for required in [self.client_id.as_str(), EVE_AUDIENCE] {
            if !aud.iter().any(|audience| audience == required) {
                return Err(EsiError::InvalidAccessToken(format!(
                    "audience {aud:?} does not include {required}"
                )));
            }
        }

        if payload.exp <= now.as_epoch_secs() {
            return Err(EsiError::InvalidAccessToken(format!(
                "token expired at {}",
                payload.exp
            )));
        }

        Ok(AccessTokenClaims {
            sub: payload.sub,
            name: payload.name,
            iss: payload.iss,
            aud,
            exp: payload.exp,
            scopes: payload.scp.map(OneOrMany::into_vec).unwrap_or_default(),
            raw,
        })
    }
}

fn is_rs256(jwk: &Jwk) -> bool {
    jwk.common.key_algorithm == Some(KeyAlgorithm::RS256)
}

/// Character id is the last colon-delimited segment of the subject,
/// e.g. `CHARACTER:EVE:12345`.
pub fn parse_character_id(sub: &str) -> EsiResult<CharacterId> {
    sub.rsplit(':')
        .next()
        .filter(|segment| !segment.is_empty())
        .and_then(|segment| segment.parse::<u64>().ok())
        .map(CharacterId)
        .ok_or_else(|| EsiError::InvalidTokenSubject(sub.to_owned()))
}
