//! Static definitions for the Firesong simulation.
//!
//! Everything here is data, not state: verse tables, blood traits, people
//! patterns, spirit definitions, the era graph, and the name pools. The
//! simulation crate owns the mutable world; this crate answers what exists
//! and how it is connected.
//!
//! # Modules
//!
//! - [`verses`] -- verse definitions and the base table
//! - [`registry`] -- the growing set of verses in play for one journey
//! - [`blood`] -- blood traits, people patterns, identity reading
//! - [`spirits`] -- spirit definitions and per-kind behavior
//! - [`eras`] -- the era graph, bridges, apocalypses
//! - [`names`] -- name pools for births and strangers

pub mod blood;
pub mod eras;
pub mod names;
pub mod registry;
pub mod spirits;
pub mod verses;

use std::collections::BTreeMap;

use firesong_types::{EraId, PeopleId, SpiritId, TraitId};

pub use blood::{BloodTraitDef, PeoplePattern};
pub use eras::{ApocalypseDef, BridgeDef, EraDef};
pub use registry::VerseRegistry;
pub use spirits::{SpiritBehavior, SpiritDef};
pub use verses::{ShadowLink, VerseDef};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The full static catalog, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Catalog {
    eras: BTreeMap<EraId, EraDef>,
    spirits: BTreeMap<SpiritId, SpiritDef>,
    blood: BTreeMap<TraitId, BloodTraitDef>,
    peoples: BTreeMap<PeopleId, PeoplePattern>,
    apocalypses: Vec<ApocalypseDef>,
}

impl Catalog {
    /// Build the standard catalog.
    pub fn standard() -> Self {
        Self {
            eras: eras::eras(),
            spirits: spirits::spirits().into_iter().map(|s| (s.id.clone(), s)).collect(),
            blood: blood::blood_traits().into_iter().map(|t| (t.id.clone(), t)).collect(),
            peoples: blood::people_patterns().into_iter().map(|p| (p.id.clone(), p)).collect(),
            apocalypses: eras::apocalypses(),
        }
    }

    /// The era graph.
    pub fn eras(&self) -> &BTreeMap<EraId, EraDef> {
        &self.eras
    }

    /// Look up one era.
    pub fn era(&self, key: &str) -> Option<&EraDef> {
        self.eras.get(key)
    }

    /// The spirit table.
    pub fn spirits(&self) -> &BTreeMap<SpiritId, SpiritDef> {
        &self.spirits
    }

    /// The blood-trait table.
    pub fn blood(&self) -> &BTreeMap<TraitId, BloodTraitDef> {
        &self.blood
    }

    /// The people patterns.
    pub fn peoples(&self) -> &BTreeMap<PeopleId, PeoplePattern> {
        &self.peoples
    }

    /// Display name for a people, falling back to the raw key.
    pub fn people_name(&self, key: &str) -> String {
        self.peoples.get(key).map_or_else(|| String::from(key), |p| p.name.clone())
    }

    /// The ways an era can end.
    pub fn apocalypses(&self) -> &[ApocalypseDef] {
        &self.apocalypses
    }
}
