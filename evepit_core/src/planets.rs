use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    ids::{CharacterId, PinId, PlanetId, SchematicId, SolarSystemId, TypeId},
    time::Timestamp,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanetType {
    Barren,
    Gas,
    Ice,
    Lava,
    Oceanic,
    Plasma,
    Storm,
    Temperate,
    #[serde(other)]
    Unknown,
}

impl PlanetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Barren => "barren",
            Self::Gas => "gas",
            Self::Ice => "ice",
            Self::Lava => "lava",
            Self::Oceanic => "oceanic",
            Self::Plasma => "plasma",
            Self::Storm => "storm",
            Self::Temperate => "temperate",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlanetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One colonized planet as listed for a character.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Planet {
    pub planet_id: PlanetId,
    pub planet_type: PlanetType,
    pub last_update: Timestamp,
    #[serde(default)]
    pub solar_system_id: Option<SolarSystemId>,
    #[serde(default)]
    pub upgrade_level: Option<i32>,
    #[serde(default)]
    pub num_pins: Option<i32>,
    #[serde(default)]
    pub owner_id: Option<CharacterId>,
}

/// Planet detail payload. Links and routes are not used for reporting.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanetLayout {
    #[serde(default)]
    pub pins: Vec<Pin>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Pin {
    pub pin_id: PinId,
    pub type_id: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schematic_id: Option<SchematicId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<PinContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cycle_start: Option<Timestamp>,
}

impl Pin {
    /// Storage and extraction pins: they hold contents and do not run a schematic.
    pub fn is_reportable(&self) -> bool {
        self.contents.is_some() && self.schematic_id.is_none()
    }

    pub fn contents(&self) -> &[PinContent] {
        self.contents.as_deref().unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinContent {
    pub type_id: TypeId,
    pub amount: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanetInfo {
    #[serde(default)]
    pub planet_id: Option<PlanetId>,
    pub name: String,
    #[serde(default)]
    pub system_id: Option<SolarSystemId>,
    #[serde(default)]
    pub type_id: Option<TypeId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeInfo {
    #[serde(default)]
    pub type_id: Option<TypeId>,
    pub name: String,
}

/// A planet paired with the pins fetched for it.
#[derive(Clone, Debug, PartialEq)]
pub struct InstallationSet {
    pub planet: Planet,
    pub pins: Vec<Pin>,
}

impl InstallationSet {
    pub fn new(planet: Planet, layout: PlanetLayout) -> Self {
        Self {
            planet,
            pins: layout.pins,
        }
    }

    pub fn reportable_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|pin| pin.is_reportable())
    }
}
