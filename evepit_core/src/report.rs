use serde::Serialize;

use crate::{
    ids::{CharacterId, PinId, PlanetId, TypeId},
    planets::PlanetType,
    time::Timestamp,
};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CharacterReport {
    pub character_id: CharacterId,
    pub character_name: String,
    pub planets: Vec<PlanetReport>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlanetReport {
    pub planet_id: PlanetId,
    pub planet_name: String,
    pub planet_type: PlanetType,
    pub last_update: Timestamp,
    pub installations: Vec<InstallationReport>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct InstallationReport {
    pub pin_id: PinId,
    pub type_id: TypeId,
    pub installation_name: String,
    pub products: Vec<ProductReport>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ProductReport {
    pub type_id: TypeId,
    pub product_name: String,
    pub amount: i64,
}

impl CharacterReport {
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}
