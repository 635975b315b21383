//! The band's seasonal life: aging, births, food, sunlight, strangers,
//! and the end of the world.
//!
//! Verses never decay in their holder. Loss happens here, at death:
//! whatever the next generation failed to absorb goes with the body.

use firesong_catalog::blood::{identify, pure_blood};
use firesong_catalog::names::{
    BEAR_BIRTH_NAMES, BIRTH_NAMES, stranger_age_range, stranger_names, stranger_verse_pool,
};
use firesong_catalog::{Catalog, VerseRegistry};
use firesong_types::{Event, Season, VerseId};
use rand::Rng;

use crate::blood::{drift_blood, mix_blood, song_sink};
use crate::config::SimConfig;
use crate::person::Person;
use crate::state::WorldState;

// ---------------------------------------------------------------------------
// Aging and death
// ---------------------------------------------------------------------------

/// Age everyone a season and bury the dead. A verse whose only carrier
/// dies is reported but not struck from the record: it still lives on
/// the tree or in fragments if it was carved.
pub fn age_and_mourn(state: &mut WorldState, registry: &VerseRegistry, config: &SimConfig) -> Vec<Event> {
    let lost = config.transmission.lost_threshold;
    let mut events = Vec::new();
    for p in &mut state.people {
        p.age += 1;
    }
    let mut survivors = Vec::with_capacity(state.people.len());
    let mut dead = Vec::new();
    for p in state.people.drain(..) {
        if p.age_class() == firesong_types::AgeClass::Dead {
            dead.push(p);
        } else {
            survivors.push(p);
        }
    }
    state.people = survivors;
    for p in dead {
        let carried: Vec<VerseId> = p.verses_at(lost).cloned().collect();
        events.push(Event::Died {
            name: p.name.clone(),
            carried: carried.iter().map(|v| registry.name_of(v.as_str())).collect(),
        });
        for v in &carried {
            if !state.band_knows(v.as_str(), lost) {
                events.push(Event::SoleCarrierLost {
                    name: p.name.clone(),
                    verse: registry.name_of(v.as_str()),
                });
            }
        }
    }
    events
}

/// Drift everyone's blood toward the era's dominant people.
pub fn drift_band_blood(state: &mut WorldState, catalog: &Catalog, config: &SimConfig) {
    let dominant = catalog
        .era(state.era.as_str())
        .and_then(|era| catalog.peoples().get(era.start_people.as_str()))
        .map(|p| p.primary.clone())
        .unwrap_or_else(|| vec![firesong_types::TraitId::from("song_blood")]);
    for p in &mut state.people {
        drift_blood(p, &dominant, &config.blood);
    }
}

// ---------------------------------------------------------------------------
// Births
// ---------------------------------------------------------------------------

/// Spring and summer births: enough adults, enough food, and room at
/// the fire.
pub fn births(
    state: &mut WorldState,
    catalog: &Catalog,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Vec<Event> {
    if !matches!(state.season, Season::Spring | Season::Summer) {
        return Vec::new();
    }
    let adults: Vec<usize> = state
        .people
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_singer())
        .map(|(i, _)| i)
        .collect();
    if adults.len() < 2
        || state.people.len() >= config.population.max_people
        || state.food < config.population.birth_food_min
    {
        return Vec::new();
    }

    let has_bears = state
        .people
        .iter()
        .any(|p| identify(catalog.peoples(), &p.blood, state.era.as_str()).as_str() == "bear");
    let pool: &[&str] = if has_bears { &BEAR_BIRTH_NAMES } else { &BIRTH_NAMES };
    let available: Vec<&str> = pool
        .iter()
        .copied()
        .filter(|n| !state.people.iter().any(|p| p.name == *n))
        .collect();
    if available.is_empty() {
        return Vec::new();
    }
    let name = available[rng.random_range(0..available.len())];

    // Two random parents; the draw can land on the same person twice.
    let parent_a = adults[rng.random_range(0..adults.len())];
    let parent_b = adults[rng.random_range(0..adults.len())];
    let mut blood = mix_blood(
        &state.people[parent_a].blood,
        &state.people[parent_b].blood,
        &config.blood,
    );
    let mut sunk = Vec::new();
    for (trait_id, amount) in
        song_sink(catalog, &state.people[parent_a], &state.people[parent_b], &config.blood)
    {
        let slot = blood.entry(trait_id.clone()).or_insert(0.0);
        *slot = (*slot + amount).min(1.0);
        if amount >= config.blood.sink_amount * 0.5 {
            sunk.push(trait_id.to_string());
        }
    }
    state.people.push(Person::new(name, 0, blood, std::collections::BTreeMap::new()));
    vec![Event::ChildBorn { name: String::from(name), sunk_traits: sunk }]
}

// ---------------------------------------------------------------------------
// Food and light
// ---------------------------------------------------------------------------

const FOOD_SONGS: [(&str, i64); 18] = [
    ("root", 1),
    ("herd", 2),
    ("ash_song", 2),
    ("grain", 3),
    ("feast", 2),
    ("shelter", 1),
    ("deep_fire", 1),
    ("salmon_song", 2),
    ("weir", 2),
    ("kelp", 1),
    ("smoke_song", 2),
    ("potlatch", 3),
    ("dog", 1),
    ("dog_hunt", 3),
    ("dog_sled", 2),
    ("bake", 2),
    ("brew", 3),
    ("mead", 2),
];

/// Seasonal gathering, eating, and, when the larder runs dry, the
/// first starvation. The youngest starves first.
pub fn gather_food(state: &mut WorldState, config: &SimConfig) -> Vec<Event> {
    let garble = config.transmission.garble_threshold;
    let mouths = state.people.len() as i64;
    let base = match state.season {
        Season::Spring => 3,
        Season::Summer => 5,
        Season::Autumn => 4,
        Season::Winter => 1,
    };
    // The light this food grew under is last season's.
    let mut gather = (base as f64 * state.sunlight).floor() as i64;
    for (song, bonus) in FOOD_SONGS {
        if state.band_knows(song, garble) {
            gather += bonus;
        }
    }
    // The mother keeps the starter keeps the band.
    if state.band_knows("sourdough", garble) {
        gather += 2;
    }

    let mut events = Vec::new();
    state.food += gather - mouths;
    if state.food < 0 {
        if let Some(youngest) = state
            .people
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.age)
            .map(|(i, _)| i)
        {
            let starved = state.people.remove(youngest);
            events.push(Event::Starved { name: starved.name });
        }
        state.food = 0;
    }
    events.push(Event::FoodTally { gathered: gather, mouths, food: state.food });
    events
}

/// Recompute sunlight from the tree's height. Runs after food so that
/// this season's growth dims next season's gathering.
pub fn update_sunlight(state: &mut WorldState, config: &SimConfig) -> Vec<Event> {
    let blocked = config.tree.sun_blocked_height;
    let dead = config.tree.sun_dead_height;
    if state.tree.height >= blocked {
        let blockage =
            f64::from(state.tree.height - blocked) / f64::from(dead - blocked);
        state.sunlight = (1.0 - blockage).max(0.1);
        if state.sunlight < 0.5 {
            return vec![Event::TreeShadesWorld { sunlight: state.sunlight }];
        }
    } else {
        state.sunlight = 1.0;
    }
    Vec::new()
}

// ---------------------------------------------------------------------------
// Strangers
// ---------------------------------------------------------------------------

/// Warm-season wanderers. Which peoples can appear depends on the era.
pub fn encounters(
    state: &mut WorldState,
    catalog: &Catalog,
    registry: &VerseRegistry,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Vec<Event> {
    if !matches!(state.season, Season::Summer | Season::Autumn)
        || state.encounter.is_some()
        || rng.random::<f64>() >= config.encounter.chance
    {
        return Vec::new();
    }
    let peoples = catalog
        .era(state.era.as_str())
        .map(|era| era.encounter_peoples.clone())
        .unwrap_or_default();
    if peoples.is_empty() {
        return Vec::new();
    }
    let people = peoples[rng.random_range(0..peoples.len())].clone();

    let pool = stranger_verse_pool(people.as_str(), registry);
    if pool.is_empty() {
        return Vec::new();
    }
    let mut verses = std::collections::BTreeMap::new();
    let count = 2 + rng.random_range(0..3);
    for _ in 0..count {
        let v = pool[rng.random_range(0..pool.len())].clone();
        verses.insert(v, 0.5 + rng.random::<f64>() * 0.5);
    }

    let names = stranger_names(people.as_str());
    let name = names[rng.random_range(0..names.len())];
    let (age_base, age_spread) = stranger_age_range(people.as_str());
    let age = age_base + rng.random_range(0..age_spread);
    let stranger = Person::new(
        name,
        age,
        pure_blood(catalog.peoples(), people.as_str(), rng),
        verses.clone(),
    );
    state.encounter = Some(stranger);
    vec![Event::StrangerArrives {
        name: String::from(name),
        people: catalog.people_name(people.as_str()),
        verses: verses.keys().map(|v| registry.name_of(v.as_str())).collect(),
    }]
}

// ---------------------------------------------------------------------------
// Collapse and time
// ---------------------------------------------------------------------------

/// Check for the end of the era's world.
pub fn collapse_check(state: &mut WorldState) -> Vec<Event> {
    if state.people.is_empty() {
        state.collapsed = true;
        return vec![Event::BandGone];
    }
    if state.sunlight <= 0.1 && state.food <= 0 {
        return vec![Event::WorldDying];
    }
    Vec::new()
}

/// Turn the wheel one season.
pub fn advance_time(state: &mut WorldState) {
    state.season = state.season.next();
    if state.season == Season::Spring {
        state.year += 1;
        state.years_bp -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesong_types::EraId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeMap;

    fn bare_world(era: &str) -> (WorldState, Catalog, VerseRegistry, SimConfig) {
        let catalog = Catalog::standard();
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(23);
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

    fn someone(name: &str, age: u32, verses: &[(&str, f64)]) -> Person {
        let mut p = Person::new(name, age, BTreeMap::new(), BTreeMap::new());
        for (v, f) in verses {
            p.raise_verse(&VerseId::from(*v), *f);
        }
        p
    }

    #[test]
    fn the_old_die_and_sole_carried_songs_die_with_them() {
        let (mut state, _, registry, config) = bare_world("stone");
        state.people.push(someone("Last-Voice", 24, &[("heartbeat", 0.9)]));
        state.people.push(someone("Quiet", 10, &[]));
        let events = age_and_mourn(&mut state, &registry, &config);
        assert_eq!(state.people.len(), 1);
        assert!(events.iter().any(|e| matches!(e, Event::Died { name, .. } if name == "Last-Voice")));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SoleCarrierLost { verse, .. } if verse == "The Heartbeat"
        )));
    }

    #[test]
    fn a_shared_song_is_not_mourned_twice() {
        let (mut state, _, registry, config) = bare_world("stone");
        state.people.push(someone("Last-Voice", 24, &[("heartbeat", 0.9)]));
        state.people.push(someone("Heir", 10, &[("heartbeat", 0.4)]));
        let events = age_and_mourn(&mut state, &registry, &config);
        assert!(events.iter().all(|e| !matches!(e, Event::SoleCarrierLost { .. })));
    }

    #[test]
    fn spring_plenty_brings_a_child() {
        let (mut state, catalog, _, mut config) = bare_world("stone");
        state.people.push(someone("A", 10, &[]));
        state.people.push(someone("B", 12, &[]));
        state.food = 10;
        state.season = Season::Spring;
        // guaranteed by pool: run until a birth lands
        let mut rng = SmallRng::seed_from_u64(4);
        config.population.max_people = 15;
        let events = births(&mut state, &catalog, &config, &mut rng);
        assert_eq!(state.people.len(), 3);
        assert!(events.iter().any(|e| matches!(e, Event::ChildBorn { .. })));
    }

    #[test]
    fn no_birth_in_the_hungry_dark() {
        let (mut state, catalog, _, config) = bare_world("stone");
        state.people.push(someone("A", 10, &[]));
        state.people.push(someone("B", 12, &[]));
        state.food = 2;
        state.season = Season::Spring;
        let mut rng = SmallRng::seed_from_u64(4);
        assert!(births(&mut state, &catalog, &config, &mut rng).is_empty());
        state.food = 10;
        state.season = Season::Winter;
        assert!(births(&mut state, &catalog, &config, &mut rng).is_empty());
    }

    #[test]
    fn knowledge_feeds_the_band() {
        let (mut state, _, _, config) = bare_world("stone");
        state.people.push(someone("Gatherer", 10, &[("root", 0.8), ("herd", 0.5)]));
        state.food = 0;
        state.season = Season::Summer;
        let events = gather_food(&mut state, &config);
        // 5 base + 1 root + 2 herd - 1 mouth
        assert_eq!(state.food, 7);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::FoodTally { gathered: 8, mouths: 1, food: 7 }
        )));
    }

    #[test]
    fn starvation_takes_the_youngest() {
        let (mut state, _, _, config) = bare_world("stone");
        state.people.push(someone("Old", 20, &[]));
        state.people.push(someone("Young", 2, &[]));
        state.food = 0;
        state.season = Season::Winter;
        state.sunlight = 0.0;
        let events = gather_food(&mut state, &config);
        assert!(events.iter().any(|e| matches!(e, Event::Starved { name } if name == "Young")));
        assert_eq!(state.food, 0);
        assert_eq!(state.people.len(), 1);
    }

    #[test]
    fn the_tree_dims_the_sun_as_it_climbs() {
        let (mut state, _, _, config) = bare_world("stone");
        state.people.push(someone("Witness", 10, &[]));
        state.tree.height = 5;
        update_sunlight(&mut state, &config);
        assert!((state.sunlight - 1.0).abs() < 1e-12);
        state.tree.height = 9;
        let events = update_sunlight(&mut state, &config);
        assert!((state.sunlight - 0.5).abs() < 1e-12);
        assert!(events.is_empty());
        state.tree.height = 12;
        let events = update_sunlight(&mut state, &config);
        assert!((state.sunlight - 0.1).abs() < 1e-12);
        assert!(events.iter().any(|e| matches!(e, Event::TreeShadesWorld { .. })));
    }

    #[test]
    fn an_empty_band_collapses_the_era() {
        let (mut state, _, _, _) = bare_world("stone");
        let events = collapse_check(&mut state);
        assert!(state.collapsed);
        assert!(events.iter().any(|e| matches!(e, Event::BandGone)));
    }

    #[test]
    fn the_wheel_turns_and_the_years_count_down() {
        let (mut state, _, _, _) = bare_world("stone");
        let bp = state.years_bp;
        state.season = Season::Winter;
        advance_time(&mut state);
        assert_eq!(state.season, Season::Spring);
        assert_eq!(state.year, 1);
        assert_eq!(state.years_bp, bp - 1);
    }
}
