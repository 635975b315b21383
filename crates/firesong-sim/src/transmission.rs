//! How verses move between people.
//!
//! The main channel is ambient: youth at the edge of the firelight
//! absorb whatever the setlist carries, slot by slot. A verse early on
//! the list, repeated for seasons, sung by a strong holder, to a youth
//! whose blood eases it, transfers almost whole. Anything else arrives
//! garbled. Blood memory is the strange second channel: a verse nobody
//! taught surfacing from deep heritage, always garbled at first.

use firesong_catalog::{Catalog, VerseRegistry, blood::eased_verses};
use firesong_types::{Event, VerseId};
use rand::Rng;

use crate::config::SimConfig;
use crate::setlist::{position_factor, rep_bonus};
use crate::state::WorldState;

struct Slot {
    verse: VerseId,
    prereqs: Vec<VerseId>,
    teacher: f64,
    factor: f64,
}

/// One season of ambient absorption: every youth listens to every
/// setlist slot they have the foundation for.
pub fn absorb_setlist(
    state: &mut WorldState,
    catalog: &Catalog,
    registry: &VerseRegistry,
    config: &SimConfig,
) {
    let garble = config.transmission.garble_threshold;
    let lost = config.transmission.lost_threshold;
    let literate = state.has_literate(garble);
    let len = state.setlist.len();

    let mut slots = Vec::with_capacity(len);
    for (i, v) in state.setlist.iter().enumerate() {
        let Some(def) = registry.get(v.as_str()) else {
            continue;
        };
        let mut teacher = state
            .people
            .iter()
            .filter(|p| p.is_singer())
            .map(|p| p.fidelity(v.as_str()))
            .fold(0.0, f64::max);
        // A literate singer can read a carved verse off the tree:
        // accurate but flat, and still subject to the setlist pipeline.
        if literate && state.is_carved(v.as_str()) {
            teacher = teacher.max(config.transmission.writing_integrity);
        }
        if teacher < lost {
            continue;
        }
        let reps = state.setlist_history.get(v.as_str()).copied().unwrap_or(1);
        slots.push(Slot {
            verse: v.clone(),
            prereqs: def.prereqs.clone(),
            teacher,
            factor: position_factor(i, len) + rep_bonus(reps, config),
        });
    }

    for student in &mut state.people {
        if student.is_singer() {
            continue;
        }
        let eased = eased_verses(catalog.blood(), &student.blood);
        for slot in &slots {
            if !slot.prereqs.is_empty()
                && !slot.prereqs.iter().all(|p| student.knows(p.as_str(), garble))
            {
                continue;
            }
            let blood = eased.get(slot.verse.as_str()).copied().unwrap_or(0.0);
            let target = (slot.teacher * slot.factor * (1.0 + blood * 0.5)).min(slot.teacher);
            let current = student.fidelity(slot.verse.as_str());
            if target > current {
                let gain = (target - current) * config.transmission.absorption_rate;
                student.raise_verse(&slot.verse, current + gain);
            }
        }
    }
}

/// Blood memory: a rare spontaneous recall of a verse the blood eases.
/// The recalled version is always garbled; the chain of prerequisites
/// cannot be skipped entirely.
pub fn blood_memory(
    state: &mut WorldState,
    catalog: &Catalog,
    registry: &VerseRegistry,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Vec<Event> {
    let garble = config.transmission.garble_threshold;
    let lost = config.transmission.lost_threshold;
    let mut events = Vec::new();
    for person in &mut state.people {
        if !person.is_singer() {
            continue;
        }
        let eased = eased_verses(catalog.blood(), &person.blood);
        for (verse, blood_level) in eased {
            let Some(def) = registry.get(verse.as_str()) else {
                continue;
            };
            if person.knows(verse.as_str(), garble) {
                continue;
            }
            if !def.prereqs.is_empty()
                && !def.prereqs.iter().all(|p| person.knows(p.as_str(), lost))
            {
                continue;
            }
            if rng.random::<f64>() < blood_level * config.blood.memory_chance {
                let current = person.fidelity(verse.as_str());
                let remembered = (current + config.blood.memory_gain).min(garble - 0.01);
                person.raise_verse(&verse, remembered);
                events.push(Event::BloodRemembered {
                    name: person.name.clone(),
                    verse: registry.name_of(verse.as_str()),
                    fidelity: remembered,
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
    use firesong_types::{EraId, TraitId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeMap;

    fn empty_world(era: &str) -> (WorldState, Catalog, VerseRegistry, SimConfig) {
        let catalog = Catalog::standard();
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
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
        (state, catalog, registry, config)
    }

    fn person_with(name: &str, age: u32, verses: &[(&str, f64)]) -> Person {
        let mut p = Person::new(name, age, BTreeMap::new(), BTreeMap::new());
        for (v, f) in verses {
            p.raise_verse(&VerseId::from(*v), *f);
        }
        p
    }

    #[test]
    fn a_youth_closes_a_third_of_the_gap() {
        let (mut state, catalog, registry, config) = empty_world("stone");
        state.people.push(person_with("Elder", 20, &[("heartbeat", 1.0)]));
        state.people.push(person_with("Child", 2, &[]));
        state.setlist = vec![VerseId::from("heartbeat")];
        absorb_setlist(&mut state, &catalog, &registry, &config);
        // single slot: 1.0 * 0.90 target, 30% of the gap in one season
        let got = state.people[1].fidelity("heartbeat");
        assert!((got - 0.27).abs() < 1e-9, "got {got}");
    }

    #[test]
    fn missing_prerequisites_block_absorption() {
        let (mut state, catalog, registry, config) = empty_world("caves");
        // deep_fire requires heartbeat
        state.people.push(person_with("Elder", 20, &[("deep_fire", 1.0)]));
        state.people.push(person_with("Child", 2, &[]));
        state.setlist = vec![VerseId::from("deep_fire")];
        absorb_setlist(&mut state, &catalog, &registry, &config);
        assert!(state.people[1].fidelity("deep_fire") < 1e-12);
    }

    #[test]
    fn a_carved_verse_reads_at_writing_integrity() {
        let (mut state, catalog, registry, config) = empty_world("grain");
        state.people.push(person_with("Reader", 20, &[("writing", 0.6)]));
        state.people.push(person_with("Child", 2, &[]));
        state.tree.carved.push(VerseId::from("lullaby"));
        state.setlist = vec![VerseId::from("lullaby")];
        absorb_setlist(&mut state, &catalog, &registry, &config);
        // teacher floor is 0.5 from the tree: 0.5 * 0.90 * 0.3 = 0.135
        let got = state.people[1].fidelity("lullaby");
        assert!((got - 0.135).abs() < 1e-9, "got {got}");
    }

    #[test]
    fn blood_memory_surfaces_garbled() {
        let (mut state, catalog, registry, mut config) = empty_world("stone");
        config.blood.memory_chance = 1.0;
        // a faint hold on ember satisfies cave_song's prerequisite chain
        let mut p = person_with("Digger", 20, &[("ember", 0.2)]);
        p.blood.insert(TraitId::from("cave_blood"), 1.0);
        state.people.push(p);
        let mut rng = SmallRng::seed_from_u64(5);
        let events = blood_memory(&mut state, &catalog, &registry, &config, &mut rng);
        assert!(!events.is_empty());
        let got = state.people[0].fidelity("cave_song");
        assert!((got - 0.1).abs() < 1e-9, "got {got}");
        assert!(got < config.transmission.garble_threshold);
    }

    #[test]
    fn blood_memory_skips_what_is_already_known() {
        let (mut state, catalog, registry, mut config) = empty_world("stone");
        config.blood.memory_chance = 1.0;
        let mut p = person_with("Digger", 20, &[("cave_song", 0.8)]);
        p.blood.insert(TraitId::from("cave_blood"), 1.0);
        state.people.push(p);
        let mut rng = SmallRng::seed_from_u64(5);
        let events = blood_memory(&mut state, &catalog, &registry, &config, &mut rng);
        assert!(events.iter().all(|e| !matches!(
            e,
            Event::BloodRemembered { verse, .. } if verse.contains("Cave")
        )));
        assert!((state.people[0].fidelity("cave_song") - 0.8).abs() < 1e-12);
    }
}
