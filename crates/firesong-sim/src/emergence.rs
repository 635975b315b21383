//! Verses nobody composes: shadows, redemptions, adjacency discoveries.
//!
//! Shadows grow when a light song is sung without its foundation.
//! Redemptions happen when a crystallized shadow is deliberately sung
//! beside its missing root. Adjacency discoveries fall out of the
//! arrangement itself: two songs sung back to back, season after season,
//! until someone hears the third thing between them.

use firesong_catalog::VerseRegistry;
use firesong_types::{Event, VerseId};
use rand::Rng;

use crate::config::SimConfig;
use crate::state::WorldState;

/// Best non-youth combined holder of a pair of verses. Returns the
/// person index and the combined score.
fn best_combined(state: &WorldState, a: &str, b: &str) -> Option<(usize, f64)> {
    let mut best = None;
    let mut best_score = 0.0;
    for (i, p) in state.people.iter().enumerate() {
        if !p.is_singer() {
            continue;
        }
        let score = p.fidelity(a) + p.fidelity(b);
        if score > best_score {
            best_score = score;
            best = Some((i, score));
        }
    }
    best
}

/// Advance every shadow accumulator one season.
pub fn grow_shadows(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
) -> Vec<Event> {
    let garble = config.transmission.garble_threshold;
    let mut events = Vec::new();

    let shadows: Vec<(VerseId, String, VerseId, VerseId, f64)> = registry
        .shadows()
        .filter_map(|def| {
            def.shadow.as_ref().map(|link| {
                (
                    def.id.clone(),
                    def.name.clone(),
                    link.shadow_of.clone(),
                    link.shadow_when.clone(),
                    link.shadow_rate,
                )
            })
        })
        .collect();

    for (shadow_id, shadow_name, light, foundation, rate) in shadows {
        if state.band_knows(shadow_id.as_str(), garble) {
            continue;
        }
        let light_active = state.setlist.contains(&light)
            || state.band_knows(light.as_str(), garble);
        if !light_active {
            continue;
        }
        let foundation_present = state.setlist.contains(&foundation)
            || state.is_carved(foundation.as_str())
            || state.band_knows(foundation.as_str(), garble);
        if foundation_present {
            let level = state.shadows.get(shadow_id.as_str()).copied().unwrap_or(0.0);
            state.shadows.insert(shadow_id.clone(), (level - config.emergence.shadow_decay).max(0.0));
            continue;
        }

        let level = state.shadows.get(shadow_id.as_str()).copied().unwrap_or(0.0) + rate;
        state.shadows.insert(shadow_id.clone(), level);
        if level >= 1.0 {
            // The strongest singer of the light song is the one the
            // shadow falls on.
            if let Some(i) = state.best_singer(light.as_str()) {
                let best_light = state.people[i].fidelity(light.as_str());
                let fidelity = best_light * config.emergence.shadow_start_share;
                state.people[i].raise_verse(&shadow_id, fidelity);
                events.push(Event::ShadowCrystallized {
                    shadow: shadow_name,
                    learner: state.people[i].name.clone(),
                    fidelity,
                });
                state.shadows.insert(shadow_id.clone(), 0.0);
            }
        } else if level > config.emergence.shadow_report {
            events.push(Event::ShadowGrows { shadow: shadow_name, level });
        }
    }
    events
}

/// Look for redemptions: a known shadow and its missing root, both on
/// the setlist, can resolve into a third verse.
pub fn discover_redemptions(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Vec<Event> {
    let garble = config.transmission.garble_threshold;
    let mut events = Vec::new();

    let links: Vec<(VerseId, VerseId, VerseId)> = registry
        .shadows()
        .filter_map(|def| {
            def.shadow
                .as_ref()
                .map(|l| (def.id.clone(), l.redeems_with.clone(), l.redeems_into.clone()))
        })
        .collect();

    for (shadow_id, root, redemption) in links {
        if state.band_knows(redemption.as_str(), garble) {
            continue;
        }
        if !state.band_knows(shadow_id.as_str(), garble)
            || !state.band_knows(root.as_str(), garble)
        {
            continue;
        }
        if !state.setlist.contains(&shadow_id) || !state.setlist.contains(&root) {
            continue;
        }
        if rng.random::<f64>() >= config.emergence.redemption_chance {
            continue;
        }
        if let Some((i, score)) = best_combined(state, shadow_id.as_str(), root.as_str()) {
            let fidelity = score * config.emergence.redemption_start_share;
            state.people[i].raise_verse(&redemption, fidelity);
            events.push(Event::RedemptionEmerged {
                verse: registry.name_of(redemption.as_str()),
                learner: state.people[i].name.clone(),
                fidelity,
            });
        }
    }
    events
}

/// Look for adjacency discoveries along the setlist: each neighbouring
/// pair is checked against every combination verse that lists both as
/// prerequisites.
pub fn discover_adjacencies(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Vec<Event> {
    let garble = config.transmission.garble_threshold;
    let mut events = Vec::new();
    if state.setlist.len() < 2 {
        return events;
    }

    let candidates: Vec<(VerseId, Vec<VerseId>)> = registry
        .adjacency_candidates()
        .map(|def| (def.id.clone(), def.prereqs.clone()))
        .collect();

    for i in 0..state.setlist.len() - 1 {
        let first = state.setlist[i].clone();
        let second = state.setlist[i + 1].clone();
        for (song, prereqs) in &candidates {
            if !prereqs.contains(&first) || !prereqs.contains(&second) {
                continue;
            }
            let pair_held = state.people.iter().any(|p| {
                p.is_singer()
                    && p.knows(first.as_str(), garble)
                    && p.knows(second.as_str(), garble)
            });
            if !pair_held {
                continue;
            }
            if !prereqs.iter().all(|pr| state.band_knows(pr.as_str(), garble)) {
                continue;
            }
            if state.band_knows(song.as_str(), garble) {
                continue;
            }
            let reps = state
                .setlist_history
                .get(first.as_str())
                .copied()
                .unwrap_or(0)
                .min(state.setlist_history.get(second.as_str()).copied().unwrap_or(0));
            let chance = config.emergence.adjacency_base_chance
                + f64::from(reps) * config.emergence.adjacency_rep_chance;
            if rng.random::<f64>() >= chance {
                continue;
            }
            if let Some((idx, _)) = best_combined(state, first.as_str(), second.as_str()) {
                let discoverer = &mut state.people[idx];
                let fidelity = discoverer
                    .fidelity(first.as_str())
                    .min(discoverer.fidelity(second.as_str()))
                    * config.emergence.adjacency_start_share;
                discoverer.raise_verse(song, fidelity);
                events.push(Event::AdjacencyEmerged {
                    verse: registry.name_of(song.as_str()),
                    learner: state.people[idx].name.clone(),
                    first: registry.name_of(first.as_str()),
                    second: registry.name_of(second.as_str()),
                    fidelity,
                });
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::Person;
    use firesong_catalog::Catalog;
    use firesong_types::EraId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeMap;

    fn bare_world(era: &str) -> (WorldState, VerseRegistry, SimConfig) {
        let catalog = Catalog::standard();
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut state = WorldState::new(
            &catalog,
            &config,
            &EraId::from(era),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            &mut rng,
        );
        state.people.clear();
        let registry =
            VerseRegistry::for_journey(catalog.eras(), &[], &EraId::from(era));
        (state, registry, config)
    }

    fn adult(name: &str, verses: &[(&str, f64)]) -> Person {
        let mut p = Person::new(name, 12, BTreeMap::new(), BTreeMap::new());
        for (v, f) in verses {
            p.raise_verse(&VerseId::from(*v), *f);
        }
        p
    }

    #[test]
    fn a_rootless_song_casts_a_growing_shadow() {
        let (mut state, registry, config) = bare_world("stone");
        // root sung while nobody holds track: the ash song stirs
        state.people.push(adult("Burner", &[("root", 0.9)]));
        state.setlist = vec![VerseId::from("root")];
        let events = grow_shadows(&mut state, &registry, &config);
        let after = state.shadows.get("ash_song").copied().unwrap_or(0.0);
        assert!((after - 0.12).abs() < 1e-12, "got {after}");
        assert!(events.is_empty(), "no report below the threshold");
    }

    #[test]
    fn a_present_foundation_makes_the_shadow_recede() {
        let (mut state, registry, config) = bare_world("stone");
        state.people.push(adult("Burner", &[("root", 0.9), ("track", 0.5)]));
        state.setlist = vec![VerseId::from("root")];
        state.shadows.insert(VerseId::from("ash_song"), 0.4);
        grow_shadows(&mut state, &registry, &config);
        let after = state.shadows.get("ash_song").copied().unwrap_or(0.0);
        assert!((after - 0.35).abs() < 1e-12);
    }

    #[test]
    fn a_full_shadow_crystallizes_on_the_best_light_singer() {
        let (mut state, registry, config) = bare_world("stone");
        state.people.push(adult("Burner", &[("root", 0.9)]));
        state.people.push(adult("Half", &[("root", 0.4)]));
        state.setlist = vec![VerseId::from("root")];
        state.shadows.insert(VerseId::from("ash_song"), 0.95);
        let events = grow_shadows(&mut state, &registry, &config);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::ShadowCrystallized { learner, fidelity, .. }
                if learner == "Burner" && (fidelity - 0.72).abs() < 1e-9
        )));
        assert!((state.people[0].fidelity("ash_song") - 0.72).abs() < 1e-9);
        let reset = state.shadows.get("ash_song").copied().unwrap_or(1.0);
        assert!(reset.abs() < 1e-12);
    }

    #[test]
    fn redemption_needs_both_on_the_setlist() {
        let (mut state, registry, mut config) = bare_world("stone");
        config.emergence.redemption_chance = 1.0;
        state.people.push(adult("Mender", &[("ash_song", 0.6), ("herd", 0.6)]));
        let mut rng = SmallRng::seed_from_u64(2);
        // known but not arranged together: nothing happens
        state.setlist = vec![VerseId::from("ash_song")];
        let none = discover_redemptions(&mut state, &registry, &config, &mut rng);
        assert!(none.is_empty());

        state.setlist = vec![VerseId::from("ash_song"), VerseId::from("herd")];
        let events = discover_redemptions(&mut state, &registry, &config, &mut rng);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::RedemptionEmerged { learner, fidelity, .. }
                if learner == "Mender" && (fidelity - 0.48).abs() < 1e-9
        )));
        assert!((state.people[0].fidelity("rotation") - 0.48).abs() < 1e-9);
    }

    #[test]
    fn adjacent_prerequisites_can_become_a_mixed_song() {
        let (mut state, registry, mut config) = bare_world("caves");
        config.emergence.adjacency_base_chance = 1.0;
        // fire_cave emerges from ember beside cave_song
        state.people.push(adult("Weaver", &[("ember", 0.8), ("cave_song", 0.6)]));
        state.setlist = vec![VerseId::from("ember"), VerseId::from("cave_song")];
        let mut rng = SmallRng::seed_from_u64(2);
        let events = discover_adjacencies(&mut state, &registry, &config, &mut rng);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AdjacencyEmerged { learner, fidelity, .. }
                if learner == "Weaver" && (fidelity - 0.42).abs() < 1e-9
        )));
        assert!((state.people[0].fidelity("fire_cave") - 0.42).abs() < 1e-9);
    }

    #[test]
    fn discovery_needs_one_singer_holding_both() {
        let (mut state, registry, mut config) = bare_world("caves");
        config.emergence.adjacency_base_chance = 1.0;
        // the pair is known across the band but by no single person
        state.people.push(adult("One", &[("ember", 0.8)]));
        state.people.push(adult("Other", &[("cave_song", 0.6)]));
        state.setlist = vec![VerseId::from("ember"), VerseId::from("cave_song")];
        let mut rng = SmallRng::seed_from_u64(2);
        let events = discover_adjacencies(&mut state, &registry, &config, &mut rng);
        assert!(events.is_empty());
        assert!(state.people[0].fidelity("fire_cave") < 1e-12);
    }
}
