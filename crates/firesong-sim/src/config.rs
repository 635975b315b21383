//! Simulation tuning.
//!
//! Every threshold and rate the season pipeline uses lives here, grouped
//! by concern. All fields have defaults matching the canonical balance;
//! a partial config file overrides only what it names.

use serde::{Deserialize, Serialize};

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fidelity thresholds and transmission rates.
    pub transmission: TransmissionConfig,
    /// Tree growth, sunlight, carving, felling.
    pub tree: TreeConfig,
    /// Blood drift, song sinking, blood memory.
    pub blood: BloodConfig,
    /// Shadow, redemption, and adjacency emergence.
    pub emergence: EmergenceConfig,
    /// Births, food, population limits.
    pub population: PopulationConfig,
    /// Stranger encounters.
    pub encounter: EncounterConfig,
}

/// Fidelity thresholds and transmission rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionConfig {
    /// Below this, a held verse spreads errors when taught.
    pub garble_threshold: f64,
    /// Below this, a verse is effectively gone from its holder.
    pub lost_threshold: f64,
    /// Per-session gain factor for focused apprenticeship.
    pub learn_rate_focused: f64,
    /// Flat fidelity at which a literate person reads a carved verse.
    pub writing_integrity: f64,
    /// Share of the remaining gap a youth closes per season of listening.
    pub absorption_rate: f64,
    /// Absorption bonus per extra consecutive season on the setlist.
    pub rep_bonus_per_season: f64,
    /// Cap on the repetition bonus.
    pub rep_bonus_max: f64,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            garble_threshold: 0.3,
            lost_threshold: 0.1,
            learn_rate_focused: 0.25,
            writing_integrity: 0.5,
            absorption_rate: 0.3,
            rep_bonus_per_season: 0.02,
            rep_bonus_max: 0.1,
        }
    }
}

/// Tree growth, sunlight, carving, felling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Height added per carved verse.
    pub growth_per_verse: u32,
    /// Height at which the canopy starts dimming the sun.
    pub sun_blocked_height: u32,
    /// Height at which the sun is effectively gone.
    pub sun_dead_height: u32,
    /// Minimum fidelity a carver needs in the verse being carved.
    pub carve_threshold: f64,
    /// Chance a felled carved verse scatters as a fragment.
    pub scatter_chance: f64,
    /// Relationship lost by every spirit at each felling.
    pub felling_spirit_cost: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            growth_per_verse: 1,
            sun_blocked_height: 6,
            sun_dead_height: 12,
            carve_threshold: 0.7,
            scatter_chance: 0.4,
            felling_spirit_cost: 0.15,
        }
    }
}

/// Blood drift, song sinking, blood memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BloodConfig {
    /// Per-season drift applied to every blood trait.
    pub drift: f64,
    /// Below this, a trait falls silent and is dropped.
    pub threshold: f64,
    /// Minimum fidelity both parents need in a song for it to sink.
    pub sink_threshold: f64,
    /// Trait gain per qualifying parental song.
    pub sink_amount: f64,
    /// Chance multiplier per point of easing blood for spontaneous recall.
    pub memory_chance: f64,
    /// Fidelity gained by one act of blood memory.
    pub memory_gain: f64,
}

impl Default for BloodConfig {
    fn default() -> Self {
        Self {
            drift: 0.005,
            threshold: 0.01,
            sink_threshold: 0.5,
            sink_amount: 0.03,
            memory_chance: 0.02,
            memory_gain: 0.1,
        }
    }
}

/// Shadow, redemption, and adjacency emergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergenceConfig {
    /// Shadow accumulator decay per season while the foundation holds.
    pub shadow_decay: f64,
    /// Accumulator level above which shadow growth is reported.
    pub shadow_report: f64,
    /// Share of the light song's fidelity a crystallized shadow starts at.
    pub shadow_start_share: f64,
    /// Chance per season that shadow and root on the setlist redeem.
    pub redemption_chance: f64,
    /// Share of combined fidelity a redemption starts at.
    pub redemption_start_share: f64,
    /// Base chance that an adjacent pair discovers a combination.
    pub adjacency_base_chance: f64,
    /// Additional chance per season the pair has repeated.
    pub adjacency_rep_chance: f64,
    /// Share of the weaker parent's fidelity the discovery starts at.
    pub adjacency_start_share: f64,
}

impl Default for EmergenceConfig {
    fn default() -> Self {
        Self {
            shadow_decay: 0.05,
            shadow_report: 0.5,
            shadow_start_share: 0.8,
            redemption_chance: 0.08,
            redemption_start_share: 0.4,
            adjacency_base_chance: 0.05,
            adjacency_rep_chance: 0.03,
            adjacency_start_share: 0.7,
        }
    }
}

/// Births, food, population limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Band size above which no seasonal births happen.
    pub max_people: usize,
    /// Food required for a seasonal birth.
    pub birth_food_min: i64,
    /// Food a fresh era starts with.
    pub starting_food: i64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { max_people: 15, birth_food_min: 3, starting_food: 14 }
    }
}

/// Stranger encounters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Chance per summer or autumn season that a stranger appears.
    pub chance: f64,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self { chance: 0.15 }
    }
}
