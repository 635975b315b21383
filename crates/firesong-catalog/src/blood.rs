//! Blood traits and people patterns.
//!
//! Blood is the other channel of inheritance: a map of trait levels in
//! `0.0..=1.0` carried by every person. Traits ease the learning of the
//! verses their ancestors sang, and some carry allergies to animal
//! spirits. People identity is not stored; it is read back out of the
//! blood by pattern matching.

use std::collections::BTreeMap;

use firesong_types::{PeopleId, TraitId, VerseId};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A heritable blood trait.
#[derive(Debug, Clone)]
pub struct BloodTraitDef {
    /// Catalog key.
    pub id: TraitId,
    /// Display name.
    pub name: String,
    /// Spirit ids this trait is allergic to.
    pub triggers: Vec<firesong_types::SpiritId>,
    /// Verses this trait eases learning of.
    pub eases: Vec<VerseId>,
    /// Peoples whose pure-blooded members carry this trait.
    pub patterns: Vec<PeopleId>,
}

/// A people, defined by the blood traits its pure members carry.
#[derive(Debug, Clone)]
pub struct PeoplePattern {
    /// Catalog key.
    pub id: PeopleId,
    /// Display name.
    pub name: String,
    /// Primary traits: all must dominate for a person to read as this people.
    pub primary: Vec<TraitId>,
    /// A people this one is a later relabelling of, if any.
    pub relabel_of: Option<PeopleId>,
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn trait_def(
    id: &str,
    name: &str,
    triggers: &[&str],
    eases: &[&str],
    patterns: &[&str],
) -> BloodTraitDef {
    BloodTraitDef {
        id: TraitId::from(id),
        name: String::from(name),
        triggers: triggers.iter().map(|s| firesong_types::SpiritId::from(*s)).collect(),
        eases: eases.iter().map(|s| VerseId::from(*s)).collect(),
        patterns: patterns.iter().map(|s| PeopleId::from(*s)).collect(),
    }
}

/// The full blood-trait table.
pub(crate) fn blood_traits() -> Vec<BloodTraitDef> {
    vec![
        trait_def(
            "deep_blood",
            "Deep Blood",
            &["bear"],
            &["heartbeat", "deep_fire", "old_track", "stone_sleep"],
            &["troll"],
        ),
        trait_def(
            "stone_blood",
            "Stone Blood",
            &["bear", "wolf", "cat"],
            &["stone_sleep", "flake", "blade"],
            &["troll", "dwarf"],
        ),
        trait_def(
            "craft_blood",
            "Craft Blood",
            &["wolf"],
            &["flake", "blade", "ember", "forge"],
            &["dwarf"],
        ),
        trait_def(
            "cave_blood",
            "Cave Blood",
            &["wolf", "bear"],
            &["cave_song", "bear", "ochre", "burial"],
            &["dwarf"],
        ),
        trait_def(
            "thin_air_blood",
            "Thin Air Blood",
            &["cat"],
            &["thin_air", "far_sight", "ghost_walk"],
            &["elf"],
        ),
        trait_def("ghost_blood", "Ghost Blood", &["cat"], &["ghost_walk", "loom", "jade"], &["elf"]),
        trait_def(
            "island_blood",
            "Island Blood",
            &[],
            &["island", "small_hunt", "tide", "feast", "shelter"],
            &["halfling"],
        ),
        trait_def(
            "song_blood",
            "Song Blood",
            &[],
            &["lullaby", "elder_song", "tree_song", "ledger", "rune", "writing"],
            &["human"],
        ),
        trait_def(
            "change_blood",
            "Change Blood",
            &[],
            &["spark", "track", "seasons", "herd", "migration"],
            &["human"],
        ),
        trait_def(
            "shaman_blood",
            "Shaman Blood",
            &["bear", "wolf", "cat"],
            &["bear", "burial", "dream_walk", "ghost_walk", "bone_flute"],
            &["dwarf", "elf"],
        ),
        trait_def(
            "coastal_blood",
            "Coastal Blood",
            &[],
            &["tide", "sea_cross", "salmon_song", "weir", "sail", "kelp"],
            &["halfling"],
        ),
        trait_def(
            "den_blood",
            "Den Blood",
            &["bear"],
            &["den_memory", "long_sleep", "salmon_run", "cub_call", "root_dig"],
            &["bear"],
        ),
        trait_def(
            "dog_blood",
            "Dog Blood",
            &["wolf"],
            &["dog", "dog_guard", "dog_hunt", "dog_sled", "dog_burial"],
            &["dog"],
        ),
        trait_def(
            "yeast_blood",
            "Yeast Blood",
            &["yeast"],
            &["brew", "bake", "sourdough", "mead"],
            &["yeast"],
        ),
    ]
}

fn people(id: &str, name: &str, primary: &[&str]) -> PeoplePattern {
    PeoplePattern {
        id: PeopleId::from(id),
        name: String::from(name),
        primary: primary.iter().map(|s| TraitId::from(*s)).collect(),
        relabel_of: None,
    }
}

/// The full people table.
pub(crate) fn people_patterns() -> Vec<PeoplePattern> {
    let mut orc = people("orc", "orc", &["deep_blood", "stone_blood"]);
    orc.relabel_of = Some(PeopleId::from("troll"));
    vec![
        people("bear", "bear-folk", &["den_blood"]),
        people("troll", "troll", &["deep_blood", "stone_blood"]),
        orc,
        people("dwarf", "dwarf", &["craft_blood", "cave_blood", "shaman_blood"]),
        people("elf", "elf", &["thin_air_blood", "ghost_blood", "shaman_blood"]),
        people("halfling", "halfling", &["island_blood", "coastal_blood"]),
        people("human", "human", &["song_blood", "change_blood"]),
        people("dog", "dog", &["dog_blood"]),
        people("yeast", "yeast", &["yeast_blood"]),
    ]
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Minimum trait level for a blood trait to count at all.
pub const BLOOD_THRESHOLD: f64 = 0.01;

/// Minimum trait level for a spirit allergy to bite.
pub const BLOOD_ALLERGY_THRESHOLD: f64 = 0.05;

/// Eras in which old troll blood reads as orc to the people around it.
const ORC_ERAS: [&str; 3] = ["iron", "remembering", "apocalypse"];

/// Which verses a blood map eases, and by how much. Only traits at or
/// above the allergy threshold contribute; overlapping traits keep the
/// strongest level per verse.
pub fn eased_verses(
    traits: &BTreeMap<TraitId, BloodTraitDef>,
    blood: &BTreeMap<TraitId, f64>,
) -> BTreeMap<VerseId, f64> {
    let mut eased: BTreeMap<VerseId, f64> = BTreeMap::new();
    for (id, level) in blood {
        if *level < BLOOD_ALLERGY_THRESHOLD {
            continue;
        }
        let Some(def) = traits.get(id.as_str()) else {
            continue;
        };
        for verse in &def.eases {
            let slot = eased.entry(verse.clone()).or_insert(0.0);
            if *level > *slot {
                *slot = *level;
            }
        }
    }
    eased
}

/// Whether any triggering trait in a blood map is strong enough for the
/// spirit to notice.
pub fn is_allergic(
    traits: &BTreeMap<TraitId, BloodTraitDef>,
    blood: &BTreeMap<TraitId, f64>,
    spirit: &str,
) -> bool {
    blood.iter().any(|(id, level)| {
        *level >= BLOOD_ALLERGY_THRESHOLD
            && traits
                .get(id.as_str())
                .is_some_and(|def| def.triggers.iter().any(|t| t.as_str() == spirit))
    })
}

/// Total allergy strength in a blood map toward the given spirit,
/// capped at 1.0.
pub fn allergy_strength(
    traits: &BTreeMap<TraitId, BloodTraitDef>,
    blood: &BTreeMap<TraitId, f64>,
    spirit: &str,
) -> f64 {
    let mut total = 0.0;
    for (id, level) in blood {
        let Some(def) = traits.get(id.as_str()) else {
            continue;
        };
        if def.triggers.iter().any(|t| t.as_str() == spirit) {
            total += *level;
        }
    }
    total.min(1.0)
}

/// Read a people identity out of a blood map.
///
/// Each people scores as the mean level of its primary traits; the best
/// score wins, defaulting to human. Trolls read as orcs in later eras
/// once the shaman thread has thinned out of them: same blood,
/// different telling.
pub fn identify(
    peoples: &BTreeMap<PeopleId, PeoplePattern>,
    blood: &BTreeMap<TraitId, f64>,
    era: &str,
) -> PeopleId {
    let level = |id: &TraitId| blood.get(id.as_str()).copied().unwrap_or(0.0);
    let mut best = PeopleId::from("human");
    let mut best_score = 0.0;
    for pattern in peoples.values() {
        if pattern.relabel_of.is_some() || pattern.primary.is_empty() {
            continue;
        }
        let score: f64 =
            pattern.primary.iter().map(level).sum::<f64>() / pattern.primary.len() as f64;
        if score > best_score {
            best_score = score;
            best = pattern.id.clone();
        }
    }
    if best.as_str() == "troll"
        && ORC_ERAS.contains(&era)
        && blood.get("shaman_blood").copied().unwrap_or(0.0) < 0.1
    {
        return PeopleId::from("orc");
    }
    best
}

/// What folklore calls a person, as a short roster label.
///
/// Unlike [`identify`], which names a single winner, this reads mixed
/// blood as mixed: every people scoring at least 0.1 counts, and a
/// close call shows the top three initials joined with `/`. Orc never
/// appears here; it is a context label, not a blood label.
pub fn heritage_label(
    peoples: &BTreeMap<PeopleId, PeoplePattern>,
    blood: &BTreeMap<TraitId, f64>,
) -> String {
    let level = |id: &TraitId| blood.get(id.as_str()).copied().unwrap_or(0.0);
    let mut matches: Vec<(&PeoplePattern, f64)> = Vec::new();
    for pattern in peoples.values() {
        if pattern.relabel_of.is_some() || pattern.primary.is_empty() {
            continue;
        }
        let score: f64 =
            pattern.primary.iter().map(level).sum::<f64>() / pattern.primary.len() as f64;
        if score >= 0.1 {
            matches.push((pattern, score));
        }
    }
    matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(core::cmp::Ordering::Equal));
    let initial = |p: &PeoplePattern| {
        p.id.as_str().chars().next().map_or('?', |c| c.to_ascii_uppercase())
    };
    match matches.as_slice() {
        [] => String::from("?"),
        [(only, _)] => initial(only).to_string(),
        [(first, _), (_, runner_up), ..] if *runner_up < 0.1 => initial(first).to_string(),
        _ => {
            let initials: Vec<String> =
                matches.iter().take(3).map(|(p, _)| initial(p).to_string()).collect();
            initials.join("/")
        }
    }
}

/// A detailed blood reading: every trait above the silence threshold,
/// strongest first, as sorted percentages. Empty blood reads empty.
pub fn blood_reading(
    traits: &BTreeMap<TraitId, BloodTraitDef>,
    blood: &BTreeMap<TraitId, f64>,
) -> String {
    let mut held: Vec<(&TraitId, f64)> = blood
        .iter()
        .filter(|(_, level)| **level >= BLOOD_THRESHOLD)
        .map(|(id, level)| (id, *level))
        .collect();
    held.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(core::cmp::Ordering::Equal));
    let parts: Vec<String> = held
        .iter()
        .map(|(id, level)| {
            let name = traits
                .get(id.as_str())
                .map_or_else(|| id.to_string(), |def| def.name.clone());
            format!("{name} {:.0}%", level * 100.0)
        })
        .collect();
    parts.join(", ")
}

/// Pure blood for a people: every primary trait near full strength.
pub fn pure_blood(
    peoples: &BTreeMap<PeopleId, PeoplePattern>,
    people: &str,
    rng: &mut impl rand::Rng,
) -> BTreeMap<TraitId, f64> {
    let mut blood = BTreeMap::new();
    if let Some(pattern) = peoples.get(people) {
        for id in &pattern.primary {
            blood.insert(id.clone(), 0.9 + rng.random::<f64>() * 0.1);
        }
    }
    blood
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn every_pattern_trait_exists() {
        let catalog = Catalog::standard();
        for pattern in catalog.peoples().values() {
            for id in &pattern.primary {
                assert!(
                    catalog.blood().contains_key(id.as_str()),
                    "unknown trait {id} for people {}",
                    pattern.id
                );
            }
        }
    }

    #[test]
    fn eased_keeps_strongest_level() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        // stone_blood and craft_blood both ease flake and blade.
        blood.insert(TraitId::from("stone_blood"), 0.3);
        blood.insert(TraitId::from("craft_blood"), 0.8);
        let eased = eased_verses(catalog.blood(), &blood);
        assert!((eased.get("flake").copied().unwrap_or(0.0) - 0.8).abs() < 1e-12);
        assert!((eased.get("stone_sleep").copied().unwrap_or(0.0) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn faint_blood_eases_nothing() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        blood.insert(TraitId::from("craft_blood"), 0.04);
        assert!(eased_verses(catalog.blood(), &blood).is_empty());
    }

    #[test]
    fn allergy_reads_the_triggers() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        blood.insert(TraitId::from("den_blood"), 0.7);
        assert!(is_allergic(catalog.blood(), &blood, "bear"));
        assert!(!is_allergic(catalog.blood(), &blood, "wolf"));
        assert!((allergy_strength(catalog.blood(), &blood, "bear") - 0.7).abs() < 1e-12);
        assert!(allergy_strength(catalog.blood(), &blood, "wolf") < 1e-12);
    }

    #[test]
    fn allergy_strength_sums_and_caps() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        blood.insert(TraitId::from("deep_blood"), 0.9);
        blood.insert(TraitId::from("stone_blood"), 0.8);
        blood.insert(TraitId::from("cave_blood"), 0.6);
        assert!((allergy_strength(catalog.blood(), &blood, "bear") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pure_troll_reads_as_troll_early_and_orc_late() {
        let catalog = Catalog::standard();
        let mut rng = SmallRng::seed_from_u64(42);
        let blood = pure_blood(catalog.peoples(), "troll", &mut rng);
        assert_eq!(identify(catalog.peoples(), &blood, "stone").as_str(), "troll");
        assert_eq!(identify(catalog.peoples(), &blood, "iron").as_str(), "orc");
    }

    #[test]
    fn shaman_thread_keeps_the_old_name() {
        let catalog = Catalog::standard();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut blood = pure_blood(catalog.peoples(), "troll", &mut rng);
        blood.insert(TraitId::from("shaman_blood"), 0.2);
        assert_eq!(identify(catalog.peoples(), &blood, "iron").as_str(), "troll");
    }

    #[test]
    fn mixed_blood_reads_as_best_average() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        // human averages over two traits, dwarf over three.
        blood.insert(TraitId::from("song_blood"), 0.3);
        blood.insert(TraitId::from("craft_blood"), 0.3);
        assert_eq!(identify(catalog.peoples(), &blood, "grain").as_str(), "human");
    }

    #[test]
    fn empty_blood_reads_human() {
        let catalog = Catalog::standard();
        assert_eq!(identify(catalog.peoples(), &BTreeMap::new(), "stone").as_str(), "human");
    }

    #[test]
    fn pure_blood_labels_with_a_single_initial() {
        let catalog = Catalog::standard();
        let mut rng = SmallRng::seed_from_u64(3);
        let blood = pure_blood(catalog.peoples(), "human", &mut rng);
        assert_eq!(heritage_label(catalog.peoples(), &blood), "H");
    }

    #[test]
    fn mixed_blood_labels_as_a_hybrid() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        blood.insert(TraitId::from("song_blood"), 0.6);
        blood.insert(TraitId::from("change_blood"), 0.6);
        blood.insert(TraitId::from("deep_blood"), 0.4);
        blood.insert(TraitId::from("stone_blood"), 0.4);
        // human 0.6, troll 0.4: a close call shows both initials
        assert_eq!(heritage_label(catalog.peoples(), &blood), "H/T");
    }

    #[test]
    fn faint_runners_up_do_not_hybridize_the_label() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        blood.insert(TraitId::from("den_blood"), 0.9);
        blood.insert(TraitId::from("song_blood"), 0.1);
        // human averages over two traits: 0.05 is below the match floor
        assert_eq!(heritage_label(catalog.peoples(), &blood), "B");
    }

    #[test]
    fn a_hybrid_label_caps_at_three_initials() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        for id in ["den_blood", "dog_blood", "yeast_blood", "island_blood", "coastal_blood"] {
            blood.insert(TraitId::from(id), 0.8);
        }
        let label = heritage_label(catalog.peoples(), &blood);
        assert_eq!(label.split('/').count(), 3);
    }

    #[test]
    fn blankness_labels_as_a_question() {
        let catalog = Catalog::standard();
        assert_eq!(heritage_label(catalog.peoples(), &BTreeMap::new()), "?");
    }

    #[test]
    fn a_blood_reading_lists_named_traits_strongest_first() {
        let catalog = Catalog::standard();
        let mut blood = BTreeMap::new();
        blood.insert(TraitId::from("cave_blood"), 0.3);
        blood.insert(TraitId::from("craft_blood"), 0.85);
        blood.insert(TraitId::from("ghost_blood"), 0.004);
        assert_eq!(
            blood_reading(catalog.blood(), &blood),
            "Craft Blood 85%, Cave Blood 30%"
        );
        assert!(blood_reading(catalog.blood(), &BTreeMap::new()).is_empty());
    }
}
