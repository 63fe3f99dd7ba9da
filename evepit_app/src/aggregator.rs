use evepit_core::{
    CharacterReport, InstallationReport, InstallationSet, Pin, Planet, PlanetId, PlanetReport,
    ProductReport, TypeId,
};
use evepit_esi::{Clock, EsiApiClient, EsiError, EsiResult, Session, SsoClient, SystemClock};

use crate::failure::{FailedItem, ItemFailure};

/// Values that survived a step, plus what was dropped along the way.
#[derive(Debug)]
pub struct Collected<V> {
    pub value: V,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug)]
pub struct PlanetAssembly {
    pub report: PlanetReport,
    pub skipped: Vec<ItemFailure>,
}

#[derive(Debug)]
pub struct AggregationRun {
    pub report: CharacterReport,
    pub omissions: Vec<ItemFailure>,
}

/// Builds planetary interaction reports for whichever character the owned
/// session has active. Remote calls are issued one at a time.
pub struct PiAggregator<C, T = SystemClock>
where
    C: SsoClient + EsiApiClient,
    T: Clock,
{
    session: Session<C, T>,
}

impl<C, T> PiAggregator<C, T>
where
    C: SsoClient + EsiApiClient,
    T: Clock,
{
    pub fn new(session: Session<C, T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<C, T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<C, T> {
        &mut self.session
    }

    pub fn into_session(self) -> Session<C, T> {
        self.session
    }

    fn api(&self) -> &C {
        self.session.client()
    }

    /// Planets of the active character. A failed listing is logged and
    /// treated as "no planets".
    pub async fn list_planets(&self) -> EsiResult<Vec<Planet>> {
        let character_id = self.session.character_id()?;

        let listing = match self.api().list_planets(character_id).await {
            Ok(response) => response.into_data(),
            Err(err) => Err(err),
        };

        match listing {
            Ok(planets) => {
                log::debug!(
                    "character {character_id} has {} colonized planets",
                    planets.len()
                );
                Ok(planets)
            }
            Err(err @ EsiError::NotAuthenticated) => Err(err),
            Err(err) => {
                log::warn!(
                    "listing planets for character {character_id} failed: {}",
                    err.display_chain()
                );
                Ok(Vec::new())
            }
        }
    }

    pub async fn fetch_installations(&self, planet: &Planet) -> EsiResult<InstallationSet> {
        let character_id = self.session.character_id()?;
        let layout = self
            .api()
            .get_planet_layout(character_id, planet.planet_id)
            .await?
            .into_data()?;

        log::trace!(
            "planet {} has {} pins",
            planet.planet_id,
            layout.pins.len()
        );
        Ok(InstallationSet::new(planet.clone(), layout))
    }

    /// Fetches every planet's installations; a planet whose fetch fails is
    /// left out and recorded, the rest keep their listing order.
    pub async fn collect_installations(
        &self,
        planets: &[Planet],
    ) -> EsiResult<Collected<Vec<InstallationSet>>> {
        self.session.require_principal()?;

        let mut sets = Vec::with_capacity(planets.len());
        let mut failures = Vec::new();
        for planet in planets {
            match self.fetch_installations(planet).await {
                Ok(set) => sets.push(set),
                Err(err @ EsiError::NotAuthenticated) => return Err(err),
                Err(err) => {
                    let failure = ItemFailure::new(FailedItem::PlanetLayout(planet.planet_id), err);
                    failure.log_omission();
                    failures.push(failure);
                }
            }
        }

        Ok(Collected {
            value: sets,
            failures,
        })
    }

    /// Resolves names for one planet. Losing the planet name loses the
    /// planet; losing an installation or product name loses that installation.
    pub async fn assemble_planet(
        &self,
        set: &InstallationSet,
    ) -> Result<PlanetAssembly, ItemFailure> {
        let planet_id = set.planet.planet_id;
        let planet_name = self
            .planet_name(planet_id)
            .await
            .map_err(|err| ItemFailure::new(FailedItem::PlanetName(planet_id), err))?;

        let mut installations = Vec::new();
        let mut skipped = Vec::new();
        for pin in set.reportable_pins() {
            match self.assemble_installation(pin).await {
                Ok(installation) => installations.push(installation),
                Err(err) => {
                    let failure = ItemFailure::new(
                        FailedItem::Installation {
                            planet_id,
                            pin_id: pin.pin_id,
                        },
                        err,
                    );
                    failure.log_omission();
                    skipped.push(failure);
                }
            }
        }

        Ok(PlanetAssembly {
            report: PlanetReport {
                planet_id,
                planet_name,
                planet_type: set.planet.planet_type,
                last_update: set.planet.last_update,
                installations,
            },
            skipped,
        })
    }

    pub async fn run(&mut self) -> EsiResult<AggregationRun> {
        self.session.ensure_fresh().await?;
        let principal = self.session.require_principal()?.clone();

        let planets = self.list_planets().await?;
        let Collected {
            value: sets,
            failures: mut omissions,
        } = self.collect_installations(&planets).await?;

        let mut planet_reports = Vec::with_capacity(sets.len());
        for set in &sets {
            match self.assemble_planet(set).await {
                Ok(assembly) => {
                    planet_reports.push(assembly.report);
                    omissions.extend(assembly.skipped);
                }
                Err(failure) => {
                    failure.log_omission();
                    omissions.push(failure);
                }
            }
        }

        log::info!(
            "report for {} ({}): {} planets, {} omissions",
            principal.character_name,
            principal.character_id,
            planet_reports.len(),
            omissions.len()
        );

        Ok(AggregationRun {
            report: CharacterReport {
                character_id: principal.character_id,
                character_name: principal.character_name,
                planets: planet_reports,
            },
            omissions,
        })
    }

    pub async fn generate_report(&mut self) -> EsiResult<CharacterReport> {
        self.run().await.map(|run| run.report)
    }

    async fn assemble_installation(&self, pin: &Pin) -> EsiResult<InstallationReport> {
        let installation_name = self.type_name(pin.type_id).await?;

        let mut products = Vec::with_capacity(pin.contents().len());
        for content in pin.contents() {
            products.push(ProductReport {
                type_id: content.type_id,
                product_name: self.type_name(content.type_id).await?,
                amount: content.amount,
            });
        }

        Ok(InstallationReport {
            pin_id: pin.pin_id,
            type_id: pin.type_id,
            installation_name,
            products,
        })
    }

    async fn planet_name(&self, planet_id: PlanetId) -> EsiResult<String> {
        let info = self.api().get_planet_info(planet_id).await?.into_data()?;
        Ok(info.name)
    }

    async fn type_name(&self, type_id: TypeId) -> EsiResult<String> {
        let info = self.api().get_type_info(type_id).await?.into_data()?;
        Ok(info.name)
    }
}
