pub mod ids;
pub mod planets;
pub mod report;
pub mod time;

pub use ids::{CharacterId, PinId, PlanetId, SchematicId, SolarSystemId, TypeId};
pub use planets::{
    InstallationSet, Pin, PinContent, Planet, PlanetInfo, PlanetLayout, PlanetType, TypeInfo,
};
pub use report::{CharacterReport, InstallationReport, PlanetReport, ProductReport};
pub use time::Timestamp;
