//! World state and the season pipeline.
//!
//! The world is a band of people, a setlist, a tree, and eight spirits,
//! advanced one season at a time. Verses live only in the people who
//! hold them; the pipeline in [`tick`] moves them between generations,
//! and [`crossing`] carries what survives into the next era.
//!
//! [`Sim`] bundles the catalog, the tuning, the verse registry for the
//! journey so far, and the current [`WorldState`] behind one handle.

pub mod actions;
pub mod blood;
pub mod config;
pub mod crossing;
pub mod emergence;
pub mod error;
pub mod lifecycle;
pub mod person;
pub mod setlist;
pub mod spirits;
pub mod state;
pub mod tick;
pub mod transmission;

use std::collections::BTreeMap;
use std::path::Path;

use firesong_catalog::{Catalog, VerseRegistry};
use firesong_types::{EraId, Event};
use rand::Rng;

pub use config::SimConfig;
pub use crossing::BridgeOption;
pub use error::{ActionError, SnapshotError};
pub use person::Person;
pub use state::{EraRecord, Fragment, SpiritState, TreeState, WorldState};

/// The era every journey starts in.
pub const STARTING_ERA: &str = "stone";

/// One running world: catalog, tuning, the verse registry for the eras
/// visited so far, and the current state.
pub struct Sim {
    catalog: Catalog,
    config: SimConfig,
    registry: VerseRegistry,
    state: WorldState,
}

impl Sim {
    /// A fresh world in the starting era.
    pub fn new(config: SimConfig, rng: &mut impl Rng) -> Self {
        let catalog = Catalog::standard();
        let era = EraId::from(STARTING_ERA);
        let state = WorldState::new(
            &catalog,
            &config,
            &era,
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            rng,
        );
        Self::from_state(catalog, config, state)
    }

    /// Resume from a previously saved state.
    pub fn from_state(catalog: Catalog, config: SimConfig, state: WorldState) -> Self {
        let visited: Vec<EraId> = state.previous_eras.iter().map(|r| r.key.clone()).collect();
        let registry = VerseRegistry::for_journey(catalog.eras(), &visited, &state.era);
        Self { catalog, config, registry, state }
    }

    /// Load a snapshot from disk.
    pub fn load(path: &Path, config: SimConfig) -> Result<Self, SnapshotError> {
        let state = WorldState::load(path)?;
        Ok(Self::from_state(Catalog::standard(), config, state))
    }

    /// Save the current state to disk.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        self.state.save(path)
    }

    /// The current world, read-only.
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// The catalog backing this world.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The verse registry for the journey so far.
    pub fn registry(&self) -> &VerseRegistry {
        &self.registry
    }

    /// The tuning in effect.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // The turn
    // -----------------------------------------------------------------------

    /// Run one season of the world.
    pub fn advance_season(&mut self, rng: &mut impl Rng) -> Vec<Event> {
        tick::advance_season(&mut self.state, &self.catalog, &self.registry, &self.config, rng)
    }

    // -----------------------------------------------------------------------
    // Player actions
    // -----------------------------------------------------------------------

    /// Replace the setlist with the named verses.
    pub fn set_setlist(&mut self, ids: &[String]) -> Result<Vec<Event>, ActionError> {
        actions::set_setlist(&mut self.state, &self.registry, &self.config, ids)
    }

    /// Move a verse to the front of the setlist.
    pub fn prioritize(&mut self, id: &str) -> Result<Vec<Event>, ActionError> {
        actions::prioritize(&mut self.state, &self.registry, &self.config, id)
    }

    /// Carve a verse onto the tree.
    pub fn carve(&mut self, id: &str) -> Result<Vec<Event>, ActionError> {
        actions::carve(&mut self.state, &self.registry, &self.config, id)
    }

    /// Fell the tree, scattering or losing what was carved.
    pub fn fell(&mut self, rng: &mut impl Rng) -> Result<Vec<Event>, ActionError> {
        actions::fell(&mut self.state, &self.registry, &self.config, rng)
    }

    /// Gather the fragments of a felled tree.
    pub fn gather(&mut self) -> Result<Vec<Event>, ActionError> {
        actions::gather(&mut self.state, &self.registry, &self.config)
    }

    /// Take the waiting stranger into the band.
    pub fn welcome(&mut self) -> Result<Vec<Event>, ActionError> {
        actions::welcome(&mut self.state, &self.catalog, &self.registry, &self.config)
    }

    /// Turn the waiting stranger away.
    pub fn ignore(&mut self) -> Result<Vec<Event>, ActionError> {
        actions::ignore(&mut self.state)
    }

    /// Study a verse heard in the ashes of a felling.
    pub fn study_ash(&mut self, id: &str) -> Result<Vec<Event>, ActionError> {
        actions::study_ash(&mut self.state, &self.registry, &self.config, id)
    }

    /// One focused teaching session between two named people.
    pub fn teach(
        &mut self,
        teacher: &str,
        student: &str,
        id: &str,
    ) -> Result<Vec<Event>, ActionError> {
        actions::teach(
            &mut self.state,
            &self.catalog,
            &self.registry,
            &self.config,
            teacher,
            student,
            id,
        )
    }

    // -----------------------------------------------------------------------
    // Crossings
    // -----------------------------------------------------------------------

    /// The bridges out of the current era.
    pub fn bridges(&self) -> Vec<BridgeOption> {
        crossing::available_bridges(&self.state, &self.catalog, &self.config)
    }

    /// Cross into the named era, replacing the world with the next one.
    pub fn cross(&mut self, target: &EraId, rng: &mut impl Rng) -> Result<Vec<Event>, ActionError> {
        let (next, events) = crossing::cross(
            &self.state,
            &self.catalog,
            &self.registry,
            &self.config,
            target,
            rng,
        )?;
        self.state = next;
        let visited: Vec<EraId> =
            self.state.previous_eras.iter().map(|r| r.key.clone()).collect();
        self.registry =
            VerseRegistry::for_journey(self.catalog.eras(), &visited, &self.state.era);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesong_types::VerseId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn a_new_world_starts_in_stone() {
        let mut rng = SmallRng::seed_from_u64(3);
        let sim = Sim::new(SimConfig::default(), &mut rng);
        assert_eq!(sim.state().era.as_str(), STARTING_ERA);
        assert_eq!(sim.state().people.len(), 7);
        assert!(sim.registry().contains("heartbeat"));
    }

    #[test]
    fn crossing_rebuilds_the_registry_for_the_new_era() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut sim = Sim::new(SimConfig::default(), &mut rng);
        for p in &mut sim.state.people {
            if p.is_singer() {
                p.raise_verse(&VerseId::from("deep_fire"), 0.8);
            }
        }
        let Ok(_) = sim.cross(&EraId::from("caves"), &mut rng) else {
            return assert!(false, "crossing should succeed");
        };
        assert_eq!(sim.state().era.as_str(), "caves");
        assert_eq!(sim.state().previous_eras.len(), 1);
        assert!(!sim.state().people.is_empty());
    }

    #[test]
    fn the_registry_grows_with_the_journey() {
        let catalog = Catalog::standard();
        let visited = vec![EraId::from("ice")];
        let registry =
            VerseRegistry::for_journey(catalog.eras(), &visited, &EraId::from("grain"));
        assert!(registry.contains("dog"));
        assert!(registry.contains("writing"));
        assert!(!registry.contains("book"));
    }
}
