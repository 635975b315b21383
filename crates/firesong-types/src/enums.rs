//! Enumeration types for the Firesong simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// A season of the year. One tick of the simulation is one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// Lean gathering, births, waking animals.
    Spring,
    /// Plenty, encounters, dry-season dangers.
    Summer,
    /// Harvest, stalking animals, the dying time.
    Autumn,
    /// Scarcity, pack hunts, the longest nights.
    Winter,
}

impl Season {
    /// The season that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Autumn,
            Self::Autumn => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }

    /// Whether advancing past this season wraps into a new year.
    pub const fn is_last_of_year(self) -> bool {
        matches!(self, Self::Winter)
    }
}

impl core::fmt::Display for Season {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// AgeClass
// ---------------------------------------------------------------------------

/// Life stage of a person, derived from their age in seasons.
///
/// Youth absorb songs but cannot teach or act. Adults act and teach.
/// Elders teach at double rate but are close to the end. Past the elder
/// band a person dies and their unshared verses die with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeClass {
    /// 0–4 seasons. Learns from the setlist, cannot teach.
    Youth,
    /// 5–16 seasons. Full participant.
    Adult,
    /// 17–24 seasons. Best teachers, most fragile.
    Elder,
    /// Past 24 seasons. Removed from the band at the next turn.
    Dead,
}

impl AgeClass {
    /// Upper bound (inclusive) of the youth band, in seasons.
    pub const YOUTH_MAX: u32 = 4;
    /// Upper bound (inclusive) of the adult band, in seasons.
    pub const ADULT_MAX: u32 = 16;
    /// Upper bound (inclusive) of the elder band, in seasons.
    pub const ELDER_MAX: u32 = 24;

    /// Classify an age in seasons into its life stage.
    pub const fn from_age(age: u32) -> Self {
        if age <= Self::YOUTH_MAX {
            Self::Youth
        } else if age <= Self::ADULT_MAX {
            Self::Adult
        } else if age <= Self::ELDER_MAX {
            Self::Elder
        } else {
            Self::Dead
        }
    }

    /// Teaching multiplier for focused apprenticeship.
    ///
    /// Elders teach at double rate. Youth (and the dead) cannot teach.
    pub const fn teaching_power(self) -> f64 {
        match self {
            Self::Elder => 2.0,
            Self::Adult => 1.0,
            Self::Youth | Self::Dead => 0.0,
        }
    }

    /// Whether this life stage sings at the fire (everyone but youth).
    pub const fn is_singer(self) -> bool {
        matches!(self, Self::Adult | Self::Elder)
    }
}

// ---------------------------------------------------------------------------
// FidelityBand
// ---------------------------------------------------------------------------

/// Qualitative band of a verse fidelity value.
///
/// The numeric cut points live in the simulation config; this type only
/// names the bands the rest of the system reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FidelityBand {
    /// Below the lost threshold: the verse is gone from this holder.
    Lost,
    /// Between lost and garble: held, but teaching it spreads errors.
    Garbled,
    /// At or above the garble threshold: held soundly.
    Sound,
}

impl FidelityBand {
    /// Classify a fidelity value against the given thresholds.
    pub fn classify(fidelity: f64, lost_threshold: f64, garble_threshold: f64) -> Self {
        if fidelity < lost_threshold {
            Self::Lost
        } else if fidelity < garble_threshold {
            Self::Garbled
        } else {
            Self::Sound
        }
    }
}

// ---------------------------------------------------------------------------
// Tradition
// ---------------------------------------------------------------------------

/// The family of knowledge a verse belongs to.
///
/// Most traditions are named for the people that originated them. Three are
/// structural: [`Tradition::Mixed`] verses emerge where traditions cross,
/// [`Tradition::Shadow`] verses are what songs become when sung without
/// their roots, and [`Tradition::Redeemed`] verses emerge when a shadow
/// meets its missing root again. [`Tradition::Ash`] verses grow only from
/// the stump of a felled tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tradition {
    /// The oldest patterns, older than language.
    Bear,
    /// Wordless rhythms of deep earth.
    Troll,
    /// Craft songs sung while working with the hands.
    Dwarf,
    /// Songs of high places, hard to hold in memory.
    Elf,
    /// Songs of small spaces and abundance.
    Halfling,
    /// The newest songs; learned fast, changed fast.
    Human,
    /// Combinations that emerge where traditions meet.
    Mixed,
    /// What a song becomes when sung without its foundation.
    Shadow,
    /// A third thing, born when a shadow meets its root.
    Redeemed,
    /// Grows only in the ash of a felling.
    Ash,
}

impl Tradition {
    /// Whether verses of this tradition can emerge from setlist adjacency.
    pub const fn emerges_from_adjacency(self) -> bool {
        matches!(self, Self::Mixed | Self::Ash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_cycle_wraps() {
        assert_eq!(Season::Spring.next(), Season::Summer);
        assert_eq!(Season::Winter.next(), Season::Spring);
        assert!(Season::Winter.is_last_of_year());
        assert!(!Season::Autumn.is_last_of_year());
    }

    #[test]
    fn age_bands() {
        assert_eq!(AgeClass::from_age(0), AgeClass::Youth);
        assert_eq!(AgeClass::from_age(4), AgeClass::Youth);
        assert_eq!(AgeClass::from_age(5), AgeClass::Adult);
        assert_eq!(AgeClass::from_age(16), AgeClass::Adult);
        assert_eq!(AgeClass::from_age(17), AgeClass::Elder);
        assert_eq!(AgeClass::from_age(24), AgeClass::Elder);
        assert_eq!(AgeClass::from_age(25), AgeClass::Dead);
    }

    #[test]
    fn teaching_power_by_stage() {
        assert!((AgeClass::Elder.teaching_power() - 2.0).abs() < f64::EPSILON);
        assert!((AgeClass::Adult.teaching_power() - 1.0).abs() < f64::EPSILON);
        assert!(AgeClass::Youth.teaching_power() < f64::EPSILON);
    }

    #[test]
    fn fidelity_band_cut_points() {
        assert_eq!(FidelityBand::classify(0.05, 0.1, 0.3), FidelityBand::Lost);
        assert_eq!(FidelityBand::classify(0.1, 0.1, 0.3), FidelityBand::Garbled);
        assert_eq!(FidelityBand::classify(0.29, 0.1, 0.3), FidelityBand::Garbled);
        assert_eq!(FidelityBand::classify(0.3, 0.1, 0.3), FidelityBand::Sound);
    }
}
