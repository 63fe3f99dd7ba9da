#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use evepit_app::PiAggregator;
use evepit_core::{
    CharacterId, PlanetId, Timestamp, TypeId,
    planets::{Planet, PlanetInfo, PlanetLayout, TypeInfo},
};
use evepit_esi::{
    Clock, EsiApiClient, EsiError, EsiResponse, EsiResult, RefreshedTokens, Session, SsoClient,
    TokenVerifier,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub const NOW: i64 = 1_700_000_000;
pub const CLIENT_ID: &str = "client-id";

const PRIVATE_KEY: &str = include_str!("../../../evepit_esi/resources/test/keys/jwt_rs256.key");
const PUBLIC_KEY: &str = include_str!("../../../evepit_esi/resources/test/keys/jwt_rs256.key.pub");

#[derive(Clone, Copy)]
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        ts(NOW)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ListPlanets(CharacterId),
    PlanetLayout(CharacterId, PlanetId),
    PlanetInfo(PlanetId),
    TypeInfo(TypeId),
}

#[derive(Clone, Debug)]
pub enum Scripted {
    Ok(Value),
    Status(u16, String),
    Transport(String),
}

#[derive(Default)]
pub struct MockEsi {
    grants: HashMap<String, (String, String)>,
    planets: HashMap<CharacterId, Scripted>,
    layouts: HashMap<PlanetId, Scripted>,
    planet_names: HashMap<PlanetId, Scripted>,
    type_names: HashMap<TypeId, Scripted>,
    access_token: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockEsi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a refresh token that resolves to `sub`/`name`.
    pub fn with_character(mut self, refresh_token: &str, sub: &str, name: &str) -> Self {
        self.grants
            .insert(refresh_token.to_owned(), (sub.to_owned(), name.to_owned()));
        self
    }

    pub fn with_planets(mut self, character_id: u64, planets: Scripted) -> Self {
        self.planets.insert(CharacterId(character_id), planets);
        self
    }

    pub fn with_layout(mut self, planet_id: i32, layout: Scripted) -> Self {
        self.layouts.insert(PlanetId(planet_id), layout);
        self
    }

    pub fn with_planet_name(mut self, planet_id: i32, name: &str) -> Self {
        self.planet_names.insert(
            PlanetId(planet_id),
            Scripted::Ok(json!({ "planet_id": planet_id, "name": name })),
        );
        self
    }

    pub fn with_planet_name_failure(mut self, planet_id: i32, failure: Scripted) -> Self {
        self.planet_names.insert(PlanetId(planet_id), failure);
        self
    }

    pub fn with_type_name(mut self, type_id: i32, name: &str) -> Self {
        self.type_names.insert(
            TypeId(type_id),
            Scripted::Ok(json!({ "type_id": type_id, "name": name })),
        );
        self
    }

    pub fn with_type_failure(mut self, type_id: i32, failure: Scripted) -> Self {
        self.type_names.insert(TypeId(type_id), failure);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn require_token(&self) -> EsiResult<()> {
        self.access_token
            .as_ref()
            .map(|_| ())
            .ok_or(EsiError::NotAuthenticated)
    }
}

fn respond<T: DeserializeOwned>(scripted: Option<&Scripted>) -> EsiResult<EsiResponse<T>> {
    match scripted {
        Some(Scripted::Ok(value)) => Ok(EsiResponse {
            status: 200,
            data: Some(serde_json::from_value(value.clone()).expect("scripted payload shape")),
            raw: value.to_string(),
        }),
        Some(Scripted::Status(status, body)) => Ok(EsiResponse {
            status: *status,
            data: None,
            raw: body.clone(),
        }),
        Some(Scripted::Transport(reason)) => Err(EsiError::message(reason.clone())),
        None => Ok(EsiResponse {
            status: 404,
            data: None,
            raw: r#"{"error":"not scripted"}"#.to_string(),
        }),
    }
}

#[async_trait]
impl SsoClient for MockEsi {
    async fn refresh(&mut self, refresh_token: &str) -> EsiResult<RefreshedTokens> {
        let (sub, name) = self
            .grants
            .get(refresh_token)
            .cloned()
            .ok_or_else(|| EsiError::message("invalid_grant"))?;

        Ok(RefreshedTokens {
            access_token: access_token_for(&sub, &name, NOW + 1_200),
            access_expires_at: ts(NOW + 1_200),
            refresh_token: format!("{refresh_token}-rotated"),
        })
    }

    async fn token_verifier(&mut self) -> EsiResult<TokenVerifier> {
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).expect("test public key");
        Ok(TokenVerifier::new(CLIENT_ID, key))
    }

    fn hydrate_access_token(&mut self, access_token: Option<&str>) {
        self.access_token = access_token.map(ToOwned::to_owned);
    }
}

#[async_trait]
impl EsiApiClient for MockEsi {
    async fn list_planets(&self, character_id: CharacterId) -> EsiResult<EsiResponse<Vec<Planet>>> {
        self.require_token()?;
        self.record(Call::ListPlanets(character_id));
        respond(self.planets.get(&character_id))
    }

    async fn get_planet_layout(
        &self,
        character_id: CharacterId,
        planet_id: PlanetId,
    ) -> EsiResult<EsiResponse<PlanetLayout>> {
        self.require_token()?;
        self.record(Call::PlanetLayout(character_id, planet_id));
        respond(self.layouts.get(&planet_id))
    }

    async fn get_planet_info(&self, planet_id: PlanetId) -> EsiResult<EsiResponse<PlanetInfo>> {
        self.record(Call::PlanetInfo(planet_id));
        respond(self.planet_names.get(&planet_id))
    }

    async fn get_type_info(&self, type_id: TypeId) -> EsiResult<EsiResponse<TypeInfo>> {
        self.record(Call::TypeInfo(type_id));
        respond(self.type_names.get(&type_id))
    }
}

pub fn aggregator(mock: MockEsi) -> PiAggregator<MockEsi, FixedClock> {
    let _ = pretty_env_logger::try_init();
    PiAggregator::new(Session::with_clock(mock, FixedClock))
}

pub fn planet(planet_id: i32, planet_type: &str, last_update: &str) -> Value {
    json!({
        "planet_id": planet_id,
        "planet_type": planet_type,
        "last_update": last_update,
        "solar_system_id": 30000142,
        "upgrade_level": 4,
        "num_pins": 3
    })
}

pub fn access_token_for(sub: &str, name: &str, exp: i64) -> String {
    let claims = json!({
        "sub": sub,
        "name": name,
        "iss": "https://login.eveonline.com",
        "aud": [CLIENT_ID, "EVE Online"],
        "exp": exp,
        "scp": ["esi-planets.manage_planets.v1"]
    });
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).expect("test private key");
    encode(&Header::new(Algorithm::RS256), &claims, &key).expect("sign test token")
}

pub fn ts(epoch_secs: i64) -> Timestamp {
    Timestamp::from_epoch_secs(epoch_secs).expect("valid epoch seconds")
}
