//! Integration tests: whole seasons and whole crossings, end to end.
//!
//! These drive the public surface the way the CLI does: build a world,
//! run the pipeline, take actions, cross bridges, and round-trip the
//! snapshot through disk.

// Integration tests use unwrap/expect freely; panicking on failure is the
// correct behavior in test code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::BTreeMap;

use firesong_catalog::{Catalog, VerseRegistry};
use firesong_sim::config::SimConfig;
use firesong_sim::state::WorldState;
use firesong_sim::{Sim, actions, crossing, tick};
use firesong_types::{EraId, Event, VerseId};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn journey_registry(catalog: &Catalog, state: &WorldState) -> VerseRegistry {
    let visited: Vec<EraId> = state.previous_eras.iter().map(|r| r.key.clone()).collect();
    VerseRegistry::for_journey(catalog.eras(), &visited, &state.era)
}

#[test]
fn a_guided_band_crosses_two_eras() {
    let catalog = Catalog::standard();
    let config = SimConfig::default();
    let mut rng = SmallRng::seed_from_u64(1234);
    let mut state = WorldState::new(
        &catalog,
        &config,
        &EraId::from("stone"),
        BTreeMap::new(),
        Vec::new(),
        Vec::new(),
        &mut rng,
    );

    for target in ["caves", "meeting"] {
        let era = catalog.era(state.era.as_str()).unwrap();
        let bridge = era.bridges.get(target).unwrap();
        let requires = bridge.requires.clone();
        let singer = state.people.iter_mut().find(|p| p.is_singer()).unwrap();
        for v in &requires {
            singer.raise_verse(v, 0.9);
        }
        let registry = journey_registry(&catalog, &state);
        let (next, events) =
            crossing::cross(&state, &catalog, &registry, &config, &EraId::from(target), &mut rng)
                .unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::EraCrossed { .. })));
        state = next;
        assert_eq!(state.era.as_str(), target);
        assert!(!state.people.is_empty());
    }

    assert_eq!(state.previous_eras.len(), 2);
    assert_eq!(state.previous_eras[0].key.as_str(), "stone");
    assert_eq!(state.previous_eras[1].key.as_str(), "caves");
    // bridge songs survive the crossing in the record
    assert!(state.previous_eras[0].songs_carried.iter().any(|v| v.as_str() == "deep_fire"));
}

#[test]
fn the_tree_lifecycle_holds_through_carve_and_fell() {
    let catalog = Catalog::standard();
    let config = SimConfig::default();
    let mut rng = SmallRng::seed_from_u64(5);
    let mut state = WorldState::new(
        &catalog,
        &config,
        &EraId::from("stone"),
        BTreeMap::new(),
        Vec::new(),
        Vec::new(),
        &mut rng,
    );
    let registry = journey_registry(&catalog, &state);

    let carver = state.people.iter_mut().find(|p| p.is_singer()).unwrap();
    carver.raise_verse(&VerseId::from("heartbeat"), 0.95);
    carver.raise_verse(&VerseId::from("tree_song"), 0.6);
    carver.raise_verse(&VerseId::from("blade"), 0.5);

    actions::carve(&mut state, &registry, &config, "heartbeat").unwrap();
    assert_eq!(state.tree.height, 1);
    assert!(state.is_carved("heartbeat"));

    let events = actions::fell(&mut state, &registry, &config, &mut rng).unwrap();
    assert_eq!(state.tree.height, 0);
    assert!(state.tree.carved.is_empty());
    assert_eq!(state.fellings, 1);
    assert!(events.iter().any(|e| matches!(e, Event::TreeFelled { .. })));
    // the spirits remember
    assert!(state.spirits.values().all(|s| s.spirit < 1.0));
}

#[test]
fn a_snapshot_survives_the_disk_and_keeps_running() {
    let config = SimConfig::default();
    let mut rng = SmallRng::seed_from_u64(42);
    let mut sim = Sim::new(SimConfig::default(), &mut rng);
    for _ in 0..6 {
        sim.advance_season(&mut rng);
        if sim.state().collapsed {
            break;
        }
    }

    let path = std::env::temp_dir().join(format!("firesong-journey-{}.json", std::process::id()));
    sim.save(&path).unwrap();
    let reloaded = Sim::load(&path, config).unwrap();
    std::fs::remove_file(&path).ok();

    let a = serde_json::to_string(sim.state()).unwrap();
    let b = serde_json::to_string(reloaded.state()).unwrap();
    assert_eq!(a, b);

    // the reloaded world keeps running
    let mut sim = reloaded;
    if !sim.state().collapsed {
        let events = sim.advance_season(&mut rng);
        assert!(matches!(events.first(), Some(Event::SeasonBegins { .. })));
    }
}

#[test]
fn many_seasons_never_break_the_world_invariants() {
    let catalog = Catalog::standard();
    let config = SimConfig::default();
    let mut rng = SmallRng::seed_from_u64(2026);
    let mut state = WorldState::new(
        &catalog,
        &config,
        &EraId::from("stone"),
        BTreeMap::new(),
        Vec::new(),
        Vec::new(),
        &mut rng,
    );
    let registry = journey_registry(&catalog, &state);

    for _ in 0..80 {
        // per-person fidelities before the tick, keyed by name+verse
        let before: BTreeMap<String, f64> = state
            .people
            .iter()
            .flat_map(|p| {
                p.verses().map(move |(v, f)| (format!("{}/{}", p.name, v.as_str()), f))
            })
            .collect();

        tick::advance_season(&mut state, &catalog, &registry, &config, &mut rng);

        assert!(state.food >= 0, "food never goes negative");
        assert!((0.1..=1.0).contains(&state.sunlight));
        let mut ids: Vec<&str> = state.setlist.iter().map(VerseId::as_str).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), state.setlist.len(), "setlist holds no duplicates");

        // fidelity is monotone within a lifetime
        for p in &state.people {
            for (v, f) in p.verses() {
                if let Some(prev) = before.get(&format!("{}/{}", p.name, v.as_str())) {
                    assert!(f >= *prev - 1e-12, "{} lost fidelity on {}", p.name, v.as_str());
                }
            }
        }

        if state.collapsed {
            break;
        }
    }
}
