//! Bridges between eras.
//!
//! An era ends when the band crosses a bridge. Bridges are songs: each
//! one names the verses that must be carved on the tree or held well in
//! living memory. What crosses with you is whatever survives above the
//! lost threshold, plus everything carved, and it arrives on the other
//! side degraded and scattered among a fresh band.

use std::collections::BTreeMap;

use firesong_catalog::eras::determine_apocalypse;
use firesong_catalog::{Catalog, VerseRegistry};
use firesong_types::{EraId, Event, Tradition, VerseId};
use rand::Rng;

use crate::config::SimConfig;
use crate::error::ActionError;
use crate::state::{EraRecord, WorldState};

/// One bridge out of the current era, with its requirement status.
#[derive(Debug, Clone)]
pub struct BridgeOption {
    /// Destination era key.
    pub target: EraId,
    /// Destination display name.
    pub target_name: String,
    /// Verses the crossing requires.
    pub requires: Vec<VerseId>,
    /// The bridge's narration.
    pub desc: String,
    /// Whether every requirement is carved or well known.
    pub met: bool,
}

/// The verses that would survive a crossing right now: everything held
/// above the lost threshold at its best fidelity, and everything carved
/// at no less than half.
pub fn surviving_songs(state: &WorldState, config: &SimConfig) -> BTreeMap<VerseId, f64> {
    let lost = config.transmission.lost_threshold;
    let mut surviving: BTreeMap<VerseId, f64> = BTreeMap::new();
    for p in &state.people {
        for (v, f) in p.verses() {
            if f >= lost {
                let slot = surviving.entry(v.clone()).or_insert(0.0);
                if f > *slot {
                    *slot = f;
                }
            }
        }
    }
    for v in &state.tree.carved {
        let slot = surviving.entry(v.clone()).or_insert(0.0);
        if *slot < 0.5 {
            *slot = 0.5;
        }
    }
    surviving
}

/// Every bridge out of the current era, hidden destinations excluded
/// until unlocked.
pub fn available_bridges(
    state: &WorldState,
    catalog: &Catalog,
    config: &SimConfig,
) -> Vec<BridgeOption> {
    let garble = config.transmission.garble_threshold;
    let Some(era) = catalog.era(state.era.as_str()) else {
        return Vec::new();
    };
    let mut options = Vec::new();
    for (target, bridge) in &era.bridges {
        let Some(target_era) = catalog.era(target.as_str()) else {
            continue;
        };
        if target_era.hidden && !state.unlocked_eras.contains(target) {
            continue;
        }
        let met = bridge
            .requires
            .iter()
            .all(|v| state.is_carved(v.as_str()) || state.band_knows(v.as_str(), garble));
        options.push(BridgeOption {
            target: target.clone(),
            target_name: target_era.name.clone(),
            requires: bridge.requires.clone(),
            desc: bridge.desc.clone(),
            met,
        });
    }
    options
}

/// Cross a bridge. Consumes the old world and returns the new one,
/// together with the crossing's events.
pub fn cross(
    state: &WorldState,
    catalog: &Catalog,
    registry: &VerseRegistry,
    config: &SimConfig,
    target: &EraId,
    rng: &mut impl Rng,
) -> Result<(WorldState, Vec<Event>), ActionError> {
    let current = catalog
        .era(state.era.as_str())
        .ok_or_else(|| ActionError::UnknownEra(state.era.to_string()))?;
    let target_era = catalog
        .era(target.as_str())
        .ok_or_else(|| ActionError::UnknownEra(target.to_string()))?;

    let bridges = available_bridges(state, catalog, config);
    let bridge = bridges
        .iter()
        .find(|b| b.target == *target)
        .ok_or_else(|| ActionError::NoBridge(target_era.name.clone()))?;
    if !bridge.met {
        return Err(ActionError::BridgeNotMet {
            era: target_era.name.clone(),
            requires: bridge
                .requires
                .iter()
                .map(|v| registry.name_of(v.as_str()))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let surviving = surviving_songs(state, config);
    let mut events = vec![Event::EraCrossed {
        from: current.name.clone(),
        to: target_era.name.clone(),
        bridge: bridge.desc.clone(),
        songs_carried: surviving.len(),
    }];

    // The ending takes its shape from what was carved.
    if !state.tree.carved.is_empty() {
        let mut carved_traditions: BTreeMap<Tradition, usize> = BTreeMap::new();
        for v in &state.tree.carved {
            if let Some(def) = registry.get(v.as_str()) {
                *carved_traditions.entry(def.tradition).or_insert(0) += 1;
            }
        }
        if let Some(apoc) = determine_apocalypse(catalog.apocalypses(), &carved_traditions) {
            events.push(Event::ApocalypseNamed {
                name: apoc.name.clone(),
                desc: apoc.desc.clone(),
            });
        }
    }

    // Tending the bear song across eras opens the oldest door.
    let mut unlocked = state.unlocked_eras.clone();
    let bears = EraId::from("bears");
    if !unlocked.contains(&bears) {
        let bear_history = state
            .previous_eras
            .iter()
            .filter(|r| r.songs_carried.iter().any(|v| v.as_str() == "bear"))
            .count();
        let bear_fidelity = surviving.get("bear").copied().unwrap_or(0.0);
        if bear_history >= 2 && bear_fidelity >= 0.7 {
            if let Some(bear_era) = catalog.era("bears") {
                events.push(Event::HiddenEraUnlocked { era: bear_era.name.clone() });
            }
            unlocked.push(bears);
        }
    }

    let mut previous = state.previous_eras.clone();
    previous.push(EraRecord {
        name: current.name.clone(),
        key: state.era.clone(),
        years_bp: current.years_bp,
        fellings: state.fellings,
        songs_carried: surviving.keys().cloned().collect(),
        songs_lost: state.total_lost.clone(),
        bridge_taken: target.clone(),
    });

    let next = WorldState::new(catalog, config, target, surviving, previous, unlocked, rng);
    Ok((next, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::Person;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn stone_world_with(verses: &[(&str, f64)]) -> (WorldState, Catalog, VerseRegistry, SimConfig) {
        let catalog = Catalog::standard();
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(31);
        let mut state = WorldState::new(
            &catalog,
            &config,
            &EraId::from("stone"),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            &mut rng,
        );
        state.people.clear();
        let mut p = Person::new("Carrier", 12, BTreeMap::new(), BTreeMap::new());
        for (v, f) in verses {
            p.raise_verse(&VerseId::from(*v), *f);
        }
        state.people.push(p);
        let registry =
            VerseRegistry::for_journey(catalog.eras(), &[], &EraId::from("stone"));
        (state, catalog, registry, config)
    }

    #[test]
    fn hidden_eras_stay_off_the_bridge_list() {
        let (state, catalog, _, config) = stone_world_with(&[]);
        let bridges = available_bridges(&state, &catalog, &config);
        assert!(bridges.iter().all(|b| b.target.as_str() != "bears"));
        assert!(bridges.iter().any(|b| b.target.as_str() == "caves"));
    }

    #[test]
    fn an_unmet_bridge_refuses_the_crossing() {
        let (state, catalog, registry, config) = stone_world_with(&[]);
        let mut rng = SmallRng::seed_from_u64(1);
        let err = cross(
            &state,
            &catalog,
            &registry,
            &config,
            &EraId::from("caves"),
            &mut rng,
        );
        assert!(matches!(err, Err(ActionError::BridgeNotMet { .. })));
    }

    #[test]
    fn carved_songs_cross_at_half_or_better() {
        let (mut state, _, _, config) = stone_world_with(&[("heartbeat", 0.9), ("ember", 0.2)]);
        state.tree.carved.push(VerseId::from("lullaby"));
        state.tree.carved.push(VerseId::from("heartbeat"));
        let surviving = surviving_songs(&state, &config);
        assert!((surviving.get("heartbeat").copied().unwrap_or(0.0) - 0.9).abs() < 1e-12);
        assert!((surviving.get("lullaby").copied().unwrap_or(0.0) - 0.5).abs() < 1e-12);
        assert!((surviving.get("ember").copied().unwrap_or(0.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn crossing_records_the_era_and_reseeds_the_band() {
        let (mut state, catalog, registry, config) =
            stone_world_with(&[("heartbeat", 0.9), ("deep_fire", 0.8)]);
        state.fellings = 2;
        state.total_lost.push(VerseId::from("ochre"));
        let mut rng = SmallRng::seed_from_u64(1);
        let crossed = cross(
            &state,
            &catalog,
            &registry,
            &config,
            &EraId::from("caves"),
            &mut rng,
        );
        let Ok((next, events)) = crossed else {
            return assert!(false, "crossing should succeed");
        };
        assert_eq!(next.era.as_str(), "caves");
        assert_eq!(next.people.len(), 7);
        assert_eq!(next.previous_eras.len(), 1);
        let record = &next.previous_eras[0];
        assert_eq!(record.key.as_str(), "stone");
        assert_eq!(record.fellings, 2);
        assert!(record.songs_lost.iter().any(|v| v.as_str() == "ochre"));
        assert_eq!(record.bridge_taken.as_str(), "caves");
        assert!(events.iter().any(|e| matches!(e, Event::EraCrossed { .. })));
        // nothing carved, so the ending goes unnamed
        assert!(events.iter().all(|e| !matches!(e, Event::ApocalypseNamed { .. })));
    }

    #[test]
    fn the_bear_door_opens_after_three_tended_crossings() {
        let (mut state, catalog, registry, config) =
            stone_world_with(&[("heartbeat", 0.9), ("deep_fire", 0.8), ("bear", 0.85)]);
        for key in ["caves", "meeting"] {
            state.previous_eras.push(EraRecord {
                name: String::from(key),
                key: EraId::from(key),
                years_bp: 0,
                fellings: 0,
                songs_carried: vec![VerseId::from("bear")],
                songs_lost: Vec::new(),
                bridge_taken: EraId::from("stone"),
            });
        }
        let mut rng = SmallRng::seed_from_u64(1);
        let crossed = cross(
            &state,
            &catalog,
            &registry,
            &config,
            &EraId::from("caves"),
            &mut rng,
        );
        let Ok((next, events)) = crossed else {
            return assert!(false, "crossing should succeed");
        };
        assert!(events.iter().any(|e| matches!(e, Event::HiddenEraUnlocked { .. })));
        assert!(next.unlocked_eras.iter().any(|e| e.as_str() == "bears"));
    }
}
