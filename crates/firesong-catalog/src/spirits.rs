//! Spirit definitions.
//!
//! Each spirit is a relationship kept alive by singing its song. The
//! relationship decays if nobody sings well, and a restless spirit turns
//! dangerous. Three animal spirits hunt people; the great spirits move
//! through food, fire, weather, darkness, and death. One of them gives.

use firesong_types::{Season, SpiritId, VerseId};

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// What a spirit does when it strikes, beyond the shared food/kill rolls.
#[derive(Debug, Clone)]
pub enum SpiritBehavior {
    /// Hunts people. Old blood both attracts and warns.
    Animal {
        /// Extra kill chance against people whose blood triggers it.
        allergy_kill_bonus: f64,
        /// Chance an allergic adult or elder senses it and dodges.
        allergy_warning: f64,
        /// A verse that, when known, replaces this spirit's song outright.
        superseded_by: Option<VerseId>,
    },
    /// The stolen one. Half-known fire songs feed its danger, and its
    /// attacks can burn carved verses off the tree.
    Stolen {
        /// Verses whose garbled copies add danger, per copy per person.
        fuel_songs: Vec<VerseId>,
        /// Danger added per garbled fuel song per person.
        fuel_danger: f64,
        /// Chance an attack burns a carved verse.
        tree_burn_chance: f64,
    },
    /// The one above. Metal songs draw it, and its strikes feed the fire.
    Storm {
        /// Danger added when the forging song is known.
        forge_danger: f64,
        /// Danger added when the ore song is known.
        ore_danger: f64,
        /// Danger added when mountain blood runs strong in the band.
        thin_air_danger: f64,
        /// Danger fed into the fire spirit by a strike.
        fire_feed: f64,
    },
    /// The singing dark. Star knowledge turns night from threat to gift.
    SingingDark {
        /// Verses that unlock the gift.
        star_songs: Vec<VerseId>,
        /// Fidelity boost per held verse on a starlit night.
        song_boost: f64,
        /// Setlist capacity penalty after a lost night.
        night_penalty: u32,
    },
    /// The invisible one. It never attacks; it multiplies.
    Invisible {
        /// Food bonus per known yeast song.
        surplus_per_song: f64,
        /// Relationship growth per known yeast song per season.
        spirit_per_song: f64,
        /// Food per person above which surplus births roll.
        surplus_threshold: f64,
        /// Chance of a surplus birth when the threshold is crossed.
        surplus_birth_chance: f64,
    },
    /// The one that waits. Targets elders, and a strong burial song lets
    /// the dying teach before they go.
    EldersFirst {
        /// Fidelity share a youth receives from a well-buried victim.
        teaching_share: f64,
    },
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// A spirit and the terms of its relationship with the band.
#[derive(Debug, Clone)]
pub struct SpiritDef {
    /// Catalog key.
    pub id: SpiritId,
    /// Display name.
    pub name: String,
    /// The verse that keeps the relationship.
    pub song: VerseId,
    /// A verse that half-covers the relationship when the song is garbled.
    pub fallback_song: Option<VerseId>,
    /// Danger floor, before fellings.
    pub base_danger: f64,
    /// Danger added per tree felling.
    pub danger_per_felling: f64,
    /// How much a well-kept relationship damps the danger.
    pub song_protection: f64,
    /// Food taken by an attack.
    pub attack_food_loss: i64,
    /// Chance an attack kills.
    pub kill_chance: f64,
    /// Seasons in which the spirit moves.
    pub seasons: Vec<Season>,
    /// What the spirit does beyond the shared rolls.
    pub behavior: SpiritBehavior,
}

impl SpiritDef {
    /// Whether this spirit moves in the given season.
    pub fn active_in(&self, season: Season) -> bool {
        self.seasons.contains(&season)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

fn verses(ids: &[&str]) -> Vec<VerseId> {
    ids.iter().map(|s| VerseId::from(*s)).collect()
}

/// The full spirit table.
pub(crate) fn spirits() -> Vec<SpiritDef> {
    vec![
        SpiritDef {
            id: SpiritId::from("bear"),
            name: String::from("Bear"),
            song: VerseId::from("bear"),
            fallback_song: None,
            base_danger: 0.1,
            danger_per_felling: 0.08,
            song_protection: 0.8,
            attack_food_loss: 3,
            kill_chance: 0.2,
            seasons: vec![Season::Spring, Season::Autumn],
            behavior: SpiritBehavior::Animal {
                allergy_kill_bonus: 0.3,
                allergy_warning: 0.5,
                superseded_by: None,
            },
        },
        SpiritDef {
            id: SpiritId::from("wolf"),
            name: String::from("Wolf"),
            song: VerseId::from("wolf_song"),
            fallback_song: Some(VerseId::from("bear")),
            base_danger: 0.08,
            danger_per_felling: 0.05,
            song_protection: 0.5,
            attack_food_loss: 2,
            kill_chance: 0.15,
            seasons: vec![Season::Winter, Season::Spring],
            behavior: SpiritBehavior::Animal {
                allergy_kill_bonus: 0.25,
                allergy_warning: 0.5,
                // The Dog Song is the Wolf Song perfected.
                superseded_by: Some(VerseId::from("dog")),
            },
        },
        SpiritDef {
            id: SpiritId::from("cat"),
            name: String::from("Saber Cat"),
            song: VerseId::from("bear"),
            fallback_song: None,
            base_danger: 0.06,
            danger_per_felling: 0.04,
            song_protection: 0.4,
            attack_food_loss: 1,
            kill_chance: 0.35,
            seasons: vec![Season::Summer, Season::Autumn],
            behavior: SpiritBehavior::Animal {
                allergy_kill_bonus: 0.2,
                allergy_warning: 0.4,
                superseded_by: None,
            },
        },
        SpiritDef {
            id: SpiritId::from("fire"),
            name: String::from("Fire"),
            song: VerseId::from("ember"),
            fallback_song: Some(VerseId::from("deep_fire")),
            base_danger: 0.05,
            danger_per_felling: 0.12,
            song_protection: 0.7,
            attack_food_loss: 4,
            kill_chance: 0.15,
            seasons: vec![Season::Summer, Season::Autumn],
            behavior: SpiritBehavior::Stolen {
                fuel_songs: verses(&["ember", "spark", "deep_fire", "forge"]),
                fuel_danger: 0.03,
                tree_burn_chance: 0.3,
            },
        },
        SpiritDef {
            id: SpiritId::from("sky"),
            name: String::from("Sky"),
            song: VerseId::from("polestar"),
            fallback_song: Some(VerseId::from("seasons")),
            base_danger: 0.04,
            danger_per_felling: 0.03,
            song_protection: 0.6,
            attack_food_loss: 2,
            kill_chance: 0.1,
            seasons: vec![Season::Spring, Season::Summer],
            behavior: SpiritBehavior::Storm {
                forge_danger: 0.04,
                ore_danger: 0.02,
                thin_air_danger: 0.02,
                fire_feed: 0.03,
            },
        },
        SpiritDef {
            id: SpiritId::from("night"),
            name: String::from("Night"),
            song: VerseId::from("polestar"),
            fallback_song: Some(VerseId::from("elder_song")),
            base_danger: 0.08,
            danger_per_felling: 0.04,
            song_protection: 0.6,
            attack_food_loss: 2,
            kill_chance: 0.08,
            seasons: vec![Season::Winter, Season::Spring],
            behavior: SpiritBehavior::SingingDark {
                star_songs: verses(&["polestar", "seasons", "precession", "star_bear"]),
                song_boost: 0.04,
                night_penalty: 2,
            },
        },
        SpiritDef {
            id: SpiritId::from("yeast"),
            name: String::from("Yeast"),
            song: VerseId::from("brew"),
            fallback_song: Some(VerseId::from("bake")),
            base_danger: 0.0,
            danger_per_felling: 0.0,
            song_protection: 0.0,
            attack_food_loss: 0,
            kill_chance: 0.0,
            seasons: vec![Season::Spring, Season::Summer, Season::Autumn, Season::Winter],
            behavior: SpiritBehavior::Invisible {
                surplus_per_song: 2.0,
                spirit_per_song: 0.05,
                surplus_threshold: 4.0,
                surplus_birth_chance: 0.25,
            },
        },
        SpiritDef {
            id: SpiritId::from("death"),
            name: String::from("Death"),
            song: VerseId::from("burial"),
            fallback_song: Some(VerseId::from("ochre")),
            base_danger: 0.03,
            danger_per_felling: 0.1,
            song_protection: 0.6,
            attack_food_loss: 0,
            kill_chance: 0.25,
            seasons: vec![Season::Autumn, Season::Winter],
            behavior: SpiritBehavior::EldersFirst { teaching_share: 0.7 },
        },
    ]
}
