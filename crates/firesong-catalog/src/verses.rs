//! The verse tables: every piece of singable knowledge in the simulation.
//!
//! Verses have names, not numbers. Each belongs to a tradition, may require
//! other verses (AND semantics), and three special families carry extra
//! linkage:
//!
//! - shadow verses record which light song casts them and which absent
//!   foundation lets them grow ([`ShadowLink`])
//! - redemption verses are ordinary defs reached through a shadow's
//!   `redeems_into` pointer
//! - ash verses record the carved combination they emerge from after a
//!   felling (`emerges_from`)
//!
//! The base table here contains everything available from the start of
//! history. Era-specific verses live in the era table and are merged into a
//! [`crate::VerseRegistry`] as eras are visited.

use firesong_types::{PeopleId, Tradition, VerseId};

// ---------------------------------------------------------------------------
// VerseDef
// ---------------------------------------------------------------------------

/// The shadow linkage carried by a shadow verse.
///
/// A shadow accumulates while `shadow_of` is actively sung but `shadow_when`
/// is absent from setlist, tree, and living memory. Once crystallized, the
/// shadow can later be redeemed: with `redeems_with` beside it on the
/// setlist, `redeems_into` can emerge.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowLink {
    /// The light song that casts this shadow.
    pub shadow_of: VerseId,
    /// The foundation whose absence lets the shadow grow.
    pub shadow_when: VerseId,
    /// Accumulation per season while the condition holds.
    pub shadow_rate: f64,
    /// The root that, sung beside the shadow, can redeem it.
    pub redeems_with: VerseId,
    /// The third thing that emerges from the redemption.
    pub redeems_into: VerseId,
}

/// Definition of a single verse.
#[derive(Debug, Clone, PartialEq)]
pub struct VerseDef {
    /// Stable catalog key.
    pub id: VerseId,
    /// Display name.
    pub name: String,
    /// The family of knowledge this verse belongs to.
    pub tradition: Tradition,
    /// The people whose tradition this is.
    pub people: PeopleId,
    /// Verses required before this one can be absorbed (AND semantics).
    pub prereqs: Vec<VerseId>,
    /// Relative difficulty, 1–5. Informational.
    pub difficulty: u8,
    /// Present only on shadow verses.
    pub shadow: Option<ShadowLink>,
    /// Present only on ash verses: the carved set this emerges from.
    pub emerges_from: Vec<VerseId>,
}

impl VerseDef {
    /// Whether this verse is a shadow verse.
    pub const fn is_shadow(&self) -> bool {
        self.shadow.is_some()
    }

    /// Whether this verse can only grow from the ash of a felling.
    pub fn is_ash(&self) -> bool {
        !self.emerges_from.is_empty()
    }
}

/// Shorthand constructor for an ordinary verse.
pub(crate) fn verse(
    id: &str,
    name: &str,
    tradition: Tradition,
    people: &str,
    prereqs: &[&str],
    difficulty: u8,
) -> VerseDef {
    VerseDef {
        id: VerseId::from(id),
        name: String::from(name),
        tradition,
        people: PeopleId::from(people),
        prereqs: prereqs.iter().map(|p| VerseId::from(*p)).collect(),
        difficulty,
        shadow: None,
        emerges_from: Vec::new(),
    }
}

/// Shorthand constructor for a shadow verse.
fn shadow_verse(
    id: &str,
    name: &str,
    difficulty: u8,
    shadow_of: &str,
    shadow_when: &str,
    shadow_rate: f64,
    redeems_with: &str,
    redeems_into: &str,
) -> VerseDef {
    VerseDef {
        id: VerseId::from(id),
        name: String::from(name),
        tradition: Tradition::Shadow,
        people: PeopleId::from("human"),
        prereqs: Vec::new(),
        difficulty,
        shadow: Some(ShadowLink {
            shadow_of: VerseId::from(shadow_of),
            shadow_when: VerseId::from(shadow_when),
            shadow_rate,
            redeems_with: VerseId::from(redeems_with),
            redeems_into: VerseId::from(redeems_into),
        }),
        emerges_from: Vec::new(),
    }
}

/// Shorthand constructor for an ash verse.
fn ash_verse(id: &str, name: &str, prereqs: &[&str], emerges_from: &[&str]) -> VerseDef {
    VerseDef {
        id: VerseId::from(id),
        name: String::from(name),
        tradition: Tradition::Ash,
        people: PeopleId::from("ash"),
        prereqs: prereqs.iter().map(|p| VerseId::from(*p)).collect(),
        difficulty: 3,
        shadow: None,
        emerges_from: emerges_from.iter().map(|v| VerseId::from(*v)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Base table
// ---------------------------------------------------------------------------

/// Every verse available from the start of history.
///
/// Era-specific verses (dog songs, writing, books, and so on) are defined
/// on their eras and merged in when the era is visited.
pub(crate) fn base_verses() -> Vec<VerseDef> {
    use Tradition::{Bear, Dwarf, Elf, Halfling, Human, Mixed, Redeemed, Troll};
    vec![
        // --- Bear songs: patterns older than language ---
        verse("den_memory", "Den Memory", Bear, "bear", &[], 1),
        verse("long_sleep", "The Long Sleep", Bear, "bear", &["den_memory"], 2),
        verse("salmon_run", "The Salmon Run", Bear, "bear", &["den_memory"], 2),
        verse("cub_call", "The Cub Call", Bear, "bear", &[], 1),
        verse("root_dig", "Root Digging", Bear, "bear", &["den_memory"], 2),
        verse("star_bear", "The Star Bear", Bear, "bear", &["long_sleep", "salmon_run"], 3),
        verse("spirit_mark", "Spirit Marking", Bear, "bear", &["den_memory", "cub_call"], 3),
        // --- Troll songs: barely songs, rhythms felt in bone ---
        verse("heartbeat", "The Heartbeat", Troll, "troll", &[], 1),
        verse("stone_sleep", "Stone Sleep", Troll, "troll", &["heartbeat"], 2),
        verse("deep_fire", "The Deep Fire", Troll, "troll", &["heartbeat"], 2),
        verse("old_track", "The Old Track", Troll, "troll", &["heartbeat"], 2),
        // --- Dwarf songs: craft, cave, earth, bears ---
        verse("flake", "Flake Knapping", Dwarf, "dwarf", &[], 1),
        verse("blade", "Blade Singing", Dwarf, "dwarf", &["flake"], 2),
        verse("ember", "Ember Keeping", Dwarf, "dwarf", &[], 1),
        verse("cave_song", "The Cave Song", Dwarf, "dwarf", &["ember"], 2),
        verse("bear", "The Bear Song", Dwarf, "dwarf", &["cave_song", "old_track"], 3),
        verse("ochre", "The Ochre Song", Dwarf, "dwarf", &["cave_song"], 2),
        verse("wolf_song", "The Wolf Song", Dwarf, "dwarf", &["cave_song", "old_track"], 3),
        verse("burial", "The Burial Song", Dwarf, "dwarf", &["ochre", "bear"], 3),
        // --- Elf songs: thin air, hard to hold in memory ---
        verse("thin_air", "The Thin Air Song", Elf, "elf", &[], 1),
        verse("far_sight", "Far Sight", Elf, "elf", &["thin_air"], 2),
        verse("ghost_walk", "The Ghost Walk", Elf, "elf", &["thin_air"], 2),
        verse("jade", "The Jade Song", Elf, "elf", &["far_sight", "flake"], 3),
        verse("loom", "The Loom Song", Elf, "elf", &["ghost_walk"], 3),
        // --- Halfling songs: making do, cozy and clever ---
        verse("island", "The Island Song", Halfling, "halfling", &[], 1),
        verse("small_hunt", "The Small Hunt", Halfling, "halfling", &["island"], 2),
        verse("tide", "The Tide Song", Halfling, "halfling", &["island"], 2),
        verse("feast", "The Feast Song", Halfling, "halfling", &["small_hunt", "tide"], 3),
        verse("shelter", "The Shelter Song", Halfling, "halfling", &["island"], 2),
        // --- Human songs: mixing, change, language, fire, sky ---
        verse("spark", "Spark Striking", Human, "human", &["ember"], 2),
        verse("lullaby", "The First Lullaby", Human, "human", &[], 1),
        verse("elder_song", "The Elder Song", Human, "human", &["lullaby"], 2),
        verse("polestar", "The Nail of the Sky", Human, "human", &[], 1),
        verse("seasons", "The Turning Song", Human, "human", &["polestar"], 2),
        verse("root", "Root Finding", Human, "human", &[], 1),
        verse("track", "Track Reading", Human, "human", &[], 1),
        verse("herd", "Herd Following", Human, "human", &["track", "seasons"], 2),
        verse("tree_song", "The Carving Song", Human, "human", &["elder_song", "blade"], 3),
        // The first agriculture is the shadow of nomadism: grain needs ash_song.
        verse("grain", "The Grain Song", Human, "human", &["ash_song", "seasons"], 4),
        verse("ore", "Ore Reading", Human, "human", &["blade", "spark"], 3),
        verse("forge", "The Forging Song", Human, "human", &["spark", "ore"], 4),
        verse(
            "precession",
            "The Long Drift",
            Human,
            "human",
            &["seasons", "elder_song", "far_sight"],
            5,
        ),
        // --- Salmon songs: the bridge animal, river meets coast ---
        verse("salmon_song", "The Salmon Song", Mixed, "mixed", &["salmon_run", "tide"], 3),
        verse("weir", "The Weir Song", Mixed, "mixed", &["salmon_song", "blade"], 3),
        verse("kelp", "The Kelp Song", Mixed, "mixed", &["tide", "root"], 2),
        verse("smoke_song", "The Smoke Song", Mixed, "mixed", &["salmon_song", "ember"], 3),
        verse("canoe", "The Canoe Song", Mixed, "mixed", &["salmon_song", "tree_song"], 4),
        verse("potlatch", "The Potlatch Song", Mixed, "mixed", &["salmon_song", "feast"], 4),
        verse(
            "salmon_return",
            "The Return Song",
            Mixed,
            "mixed",
            &["salmon_song", "star_bear"],
            5,
        ),
        // --- Mixed songs: where traditions cross ---
        verse("bear_gift", "The Bear Gift", Mixed, "mixed", &["den_memory", "heartbeat"], 3),
        verse("fire_cave", "Fire in the Cave", Mixed, "mixed", &["ember", "cave_song"], 3),
        verse("dream_walk", "The Dream Walk", Mixed, "mixed", &["ghost_walk", "elder_song"], 4),
        verse("bone_flute", "The Bone Flute", Mixed, "mixed", &["bear", "lullaby"], 3),
        verse("sea_cross", "The Sea Crossing", Mixed, "mixed", &["tide", "far_sight"], 4),
        verse("deep_time", "The Deep Time Song", Mixed, "mixed", &["stone_sleep", "precession"], 5),
        // --- Ash verses: grow only from the stump of a felling ---
        ash_verse("phoenix_song", "The Phoenix Song", &["ember", "elder_song"], &["ember", "lullaby"]),
        ash_verse("deep_root", "The Deep Root Song", &["root", "bear"], &["root", "bear"]),
        ash_verse("star_map", "The Scar Map", &["polestar", "tree_song"], &["polestar", "tree_song"]),
        ash_verse("seed_song", "The Seed Song", &["ash_song", "grain"], &["ash_song", "grain"]),
        ash_verse("iron_song", "The Iron Song", &["forge", "blade"], &["forge", "blade"]),
        ash_verse("troll_echo", "The Troll Echo", &["heartbeat", "bone_flute"], &["heartbeat", "bone_flute"]),
        // --- Shadow verses: what songs become when sung without roots ---
        shadow_verse("ash_song", "The Ash Song", 3, "root", "track", 0.12, "herd", "rotation"),
        shadow_verse("wall", "The Wall Song", 3, "grain", "ash_song", 0.15, "ash_song", "irrigation"),
        shadow_verse("temple", "The Temple Song", 4, "wall", "burial", 0.12, "burial", "sanctuary"),
        shadow_verse("empire", "The Empire Song", 5, "writing", "rune", 0.08, "rune", "law"),
        shadow_verse("ban", "The Ban", 2, "book", "elder_song", 0.15, "elder_song", "archive"),
        shadow_verse("algorithm", "The Algorithm", 3, "ledger", "grain", 0.10, "grain", "model"),
        shadow_verse("extraction", "The Extraction Song", 3, "ore", "root", 0.10, "root", "stewardship"),
        shadow_verse("platform", "The Platform", 4, "algorithm", "book", 0.10, "book", "commons"),
        shadow_verse("cancel", "The Cancellation", 1, "ban", "book", 0.15, "elder_song", "restoration"),
        // --- Redemption verses: the third thing, shadow meets root ---
        verse("irrigation", "The Irrigation Song", Redeemed, "mixed", &["wall", "ash_song"], 4),
        verse("sanctuary", "The Sanctuary Song", Redeemed, "mixed", &["temple", "burial"], 4),
        verse("law", "The Law Song", Redeemed, "mixed", &["empire", "rune"], 5),
        verse("archive", "The Archive Song", Redeemed, "mixed", &["ban", "elder_song"], 3),
        verse("model", "The Model Song", Redeemed, "mixed", &["algorithm", "grain"], 4),
        verse("stewardship", "The Stewardship Song", Redeemed, "mixed", &["extraction", "root"], 4),
        verse("commons", "The Commons Song", Redeemed, "mixed", &["platform", "book"], 5),
        verse("restoration", "The Restoration Song", Redeemed, "mixed", &["cancel", "elder_song"], 3),
        verse("rotation", "The Rotation Song", Redeemed, "mixed", &["ash_song", "herd"], 4),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_table_has_no_duplicate_ids() {
        let verses = base_verses();
        let mut seen = std::collections::BTreeSet::new();
        for v in &verses {
            assert!(seen.insert(v.id.clone()), "duplicate verse id {}", v.id);
        }
    }

    #[test]
    fn shadow_verses_carry_linkage() {
        let verses = base_verses();
        let wall = verses.iter().find(|v| v.id.as_str() == "wall");
        let link = wall.and_then(|v| v.shadow.as_ref());
        assert!(link.is_some());
        if let Some(link) = link {
            assert_eq!(link.shadow_of.as_str(), "grain");
            assert_eq!(link.shadow_when.as_str(), "ash_song");
            assert_eq!(link.redeems_into.as_str(), "irrigation");
        }
    }

    #[test]
    fn every_redemption_target_exists() {
        let verses = base_verses();
        let ids: std::collections::BTreeSet<&str> =
            verses.iter().map(|v| v.id.as_str()).collect();
        for v in &verses {
            if let Some(link) = &v.shadow {
                assert!(
                    ids.contains(link.redeems_into.as_str()),
                    "missing redemption {}",
                    link.redeems_into
                );
            }
        }
    }

    #[test]
    fn ash_verses_emerge_from_something() {
        for v in base_verses() {
            if v.tradition == firesong_types::Tradition::Ash {
                assert!(v.is_ash(), "{} has no emergence set", v.id);
            }
        }
    }
}
