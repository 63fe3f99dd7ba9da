use std::fmt;

use evepit_core::{PinId, PlanetId};
use evepit_esi::EsiError;

/// The unit of work that was dropped from a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailedItem {
    PlanetLayout(PlanetId),
    PlanetName(PlanetId),
    Installation { planet_id: PlanetId, pin_id: PinId },
}

impl fmt::Display for FailedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlanetLayout(planet_id) => write!(f, "installations of planet {planet_id}"),
            Self::PlanetName(planet_id) => write!(f, "name of planet {planet_id}"),
            Self::Installation { planet_id, pin_id } => {
                write!(f, "installation {pin_id} on planet {planet_id}")
            }
        }
    }
}

#[derive(Debug)]
pub struct ItemFailure {
    pub item: FailedItem,
    pub error: EsiError,
}

impl ItemFailure {
    pub fn new(item: FailedItem, error: EsiError) -> Self {
        Self { item, error }
    }

    pub fn status(&self) -> Option<u16> {
        self.error.remote_status()
    }

    pub(crate) fn log_omission(&self) {
        log::warn!("omitting {}: {}", self.item, self.error.display_chain());
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.error.display_chain())
    }
}
