//! The mutable world.
//!
//! Everything a snapshot needs to round-trip lives here. Collections are
//! ordered maps keyed by id, so serializing the same state twice yields
//! identical bytes.

use std::collections::BTreeMap;
use std::path::Path;

use firesong_catalog::Catalog;
use firesong_catalog::blood::pure_blood;
use firesong_types::{EraId, Season, SpiritId, VerseId};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::SnapshotError;
use crate::person::Person;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// The tree of carved knowledge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeState {
    /// Current height.
    pub height: u32,
    /// Verses carved into the trunk, in carving order.
    pub carved: Vec<VerseId>,
}

/// A scattered piece of a felled verse, waiting to be gathered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// The verse.
    pub verse: VerseId,
    /// How intact the fragment is.
    pub fidelity: f64,
}

/// One spirit's standing toward the band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiritState {
    /// Relationship quality, 0.0–1.0.
    pub spirit: f64,
    /// Current danger level.
    pub danger: f64,
}

/// What one finished era left behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraRecord {
    /// Display name of the era.
    pub name: String,
    /// Era key.
    pub key: EraId,
    /// Years before present at which it opened.
    pub years_bp: i64,
    /// Fellings during the era.
    pub fellings: u32,
    /// Verses that crossed the bridge.
    pub songs_carried: Vec<VerseId>,
    /// Verses lost forever during the era.
    pub songs_lost: Vec<VerseId>,
    /// The bridge that ended it.
    pub bridge_taken: EraId,
}

// ---------------------------------------------------------------------------
// WorldState
// ---------------------------------------------------------------------------

/// The complete mutable state of one journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Current season.
    pub season: Season,
    /// Year within the current era.
    pub year: u32,
    /// Years before present.
    pub years_bp: i64,
    /// Current era key.
    pub era: EraId,
    /// The living band.
    pub people: Vec<Person>,
    /// Best surviving fidelities carried into this era.
    pub inherited_songs: BTreeMap<VerseId, f64>,
    /// Finished eras, in visit order.
    pub previous_eras: Vec<EraRecord>,
    /// Hidden eras that have been earned.
    pub unlocked_eras: Vec<EraId>,
    /// The tree.
    pub tree: TreeState,
    /// Fragments on the ground from past fellings.
    pub fragments: Vec<Fragment>,
    /// Sunlight reaching the world, 0.0–1.0.
    pub sunlight: f64,
    /// Band food supply.
    pub food: i64,
    /// A stranger waiting at the edge of camp, if any.
    pub encounter: Option<Person>,
    /// What the community sings this season, in performance order.
    pub setlist: Vec<VerseId>,
    /// Consecutive seasons each setlist verse has been sung.
    pub setlist_history: BTreeMap<VerseId, u32>,
    /// Shadow accumulators, 0.0–1.0.
    pub shadows: BTreeMap<VerseId, f64>,
    /// Spirit relationships.
    pub spirits: BTreeMap<SpiritId, SpiritState>,
    /// Verses that emerged from past fellings, open to study.
    pub ash_verses: Vec<VerseId>,
    /// Total fellings this era.
    pub fellings: u32,
    /// Verses permanently lost this era.
    pub total_lost: Vec<VerseId>,
    /// Setlist slots lost to the next season after a starless night.
    pub night_penalty: u32,
    /// Set when the band is gone; only a crossing remains.
    pub collapsed: bool,
}

impl WorldState {
    /// A fresh world at the start of the given era.
    pub fn new(
        catalog: &Catalog,
        config: &SimConfig,
        era_key: &EraId,
        inherited: BTreeMap<VerseId, f64>,
        previous: Vec<EraRecord>,
        unlocked: Vec<EraId>,
        rng: &mut impl Rng,
    ) -> Self {
        let (years_bp, people) = match catalog.era(era_key.as_str()) {
            Some(era) => {
                (era.years_bp, starting_band(catalog, config, era_key, &inherited, rng))
            }
            None => (0, Vec::new()),
        };
        let spirits = catalog
            .spirits()
            .values()
            .map(|def| (def.id.clone(), SpiritState { spirit: 1.0, danger: def.base_danger }))
            .collect();
        Self {
            season: Season::Spring,
            year: 0,
            years_bp,
            era: era_key.clone(),
            people,
            inherited_songs: inherited,
            previous_eras: previous,
            unlocked_eras: unlocked,
            tree: TreeState::default(),
            fragments: Vec::new(),
            sunlight: 1.0,
            food: config.population.starting_food,
            encounter: None,
            setlist: Vec::new(),
            setlist_history: BTreeMap::new(),
            shadows: BTreeMap::new(),
            spirits,
            ash_verses: Vec::new(),
            fellings: 0,
            total_lost: Vec::new(),
            night_penalty: 0,
            collapsed: false,
        }
    }

    /// Whether any band member holds the verse at or above the threshold.
    pub fn band_knows(&self, verse: &str, threshold: f64) -> bool {
        self.people.iter().any(|p| p.knows(verse, threshold))
    }

    /// Best fidelity of a verse among the living.
    pub fn best_fidelity(&self, verse: &str) -> f64 {
        self.people.iter().map(|p| p.fidelity(verse)).fold(0.0, f64::max)
    }

    /// Whether the verse is carved on the tree.
    pub fn is_carved(&self, verse: &str) -> bool {
        self.tree.carved.iter().any(|c| c.as_str() == verse)
    }

    /// The non-youth singer holding the verse best, if any singer holds
    /// it at all.
    pub fn best_singer(&self, verse: &str) -> Option<usize> {
        let mut best = None;
        let mut best_fid = 0.0;
        for (i, p) in self.people.iter().enumerate() {
            if !p.is_singer() {
                continue;
            }
            let f = p.fidelity(verse);
            if f > best_fid {
                best_fid = f;
                best = Some(i);
            }
        }
        best
    }

    /// Whether a non-youth literate reader is present: someone holding
    /// the writing song above the garble threshold.
    pub fn has_literate(&self, garble_threshold: f64) -> bool {
        self.people.iter().any(|p| p.is_singer() && p.knows("writing", garble_threshold))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write a snapshot, atomically: the JSON lands in a sibling temp
    /// file first and is renamed over the target.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read a snapshot back.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// ---------------------------------------------------------------------------
// Starting bands
// ---------------------------------------------------------------------------

fn fixed_member(
    catalog: &Catalog,
    name: &str,
    age: u32,
    people: &str,
    verses: &[(&str, f64)],
    rng: &mut impl Rng,
) -> Person {
    let mut person =
        Person::new(name, age, pure_blood(catalog.peoples(), people, rng), BTreeMap::new());
    for (v, f) in verses {
        person.raise_verse(&VerseId::from(*v), *f);
    }
    person
}

/// Generate the seven people an era starts with.
///
/// The bear and stone eras have fixed rosters; everywhere else the band
/// gets the era's base songs plus a few degraded inherited verses each.
fn starting_band(
    catalog: &Catalog,
    config: &SimConfig,
    era_key: &EraId,
    inherited: &BTreeMap<VerseId, f64>,
    rng: &mut impl Rng,
) -> Vec<Person> {
    if era_key.as_str() == "bears" {
        return vec![
            fixed_member(
                catalog,
                "Great-Paw",
                20,
                "bear",
                &[("den_memory", 1.0), ("long_sleep", 0.7), ("salmon_run", 0.6)],
                rng,
            ),
            fixed_member(catalog, "Honey-Dream", 16, "bear", &[("den_memory", 0.9), ("cub_call", 0.8)], rng),
            fixed_member(
                catalog,
                "Old-Den",
                22,
                "bear",
                &[("den_memory", 1.0), ("long_sleep", 0.9), ("root_dig", 0.7), ("star_bear", 0.4)],
                rng,
            ),
            fixed_member(catalog, "River-Watch", 12, "bear", &[("den_memory", 0.8), ("salmon_run", 0.7)], rng),
            fixed_member(catalog, "Snow-Sleep", 8, "bear", &[("den_memory", 0.6)], rng),
            fixed_member(catalog, "Cub-Cry", 3, "bear", &[], rng),
            fixed_member(
                catalog,
                "Root-Dig",
                18,
                "bear",
                &[("den_memory", 1.0), ("root_dig", 0.8), ("cub_call", 0.7)],
                rng,
            ),
        ];
    }

    if era_key.as_str() == "stone" && inherited.is_empty() {
        return vec![
            fixed_member(catalog, "Grok", 20, "troll", &[("heartbeat", 1.0)], rng),
            fixed_member(catalog, "Thud", 16, "troll", &[("heartbeat", 0.9)], rng),
            fixed_member(catalog, "Rumble", 12, "troll", &[("heartbeat", 0.8)], rng),
            fixed_member(catalog, "Ember-Eye", 8, "troll", &[("heartbeat", 0.7)], rng),
            fixed_member(catalog, "Stone-Hand", 4, "troll", &[], rng),
            fixed_member(catalog, "Old-Walk", 22, "troll", &[("heartbeat", 1.0), ("old_track", 0.6)], rng),
            fixed_member(catalog, "Still-One", 18, "troll", &[("heartbeat", 1.0), ("stone_sleep", 0.5)], rng),
        ];
    }

    let Some(era) = catalog.era(era_key.as_str()) else {
        return Vec::new();
    };
    let lost = config.transmission.lost_threshold;
    let inherited_keys: Vec<&VerseId> = inherited.keys().collect();
    let ages = [20, 16, 14, 10, 8, 4, 1];
    let mut band = Vec::with_capacity(ages.len());
    for (i, age) in ages.iter().enumerate() {
        let name = era
            .name_pool
            .get(i % era.name_pool.len().max(1))
            .cloned()
            .unwrap_or_else(|| format!("Singer-{i}"));
        let mut person = Person::new(
            name,
            *age,
            pure_blood(catalog.peoples(), era.start_people.as_str(), rng),
            BTreeMap::new(),
        );
        for (v, f) in &era.base_songs {
            person.raise_verse(v, *f);
        }
        if !inherited_keys.is_empty() {
            let count = 2 + rng.random_range(0..4);
            for _ in 0..count {
                let pick = inherited_keys[rng.random_range(0..inherited_keys.len())];
                let base = inherited.get(pick.as_str()).copied().unwrap_or(0.0);
                let degraded = base * (0.6 + rng.random::<f64>() * 0.2);
                if degraded >= lost {
                    person.raise_verse(pick, degraded);
                }
            }
        }
        band.push(person);
    }
    band
}
