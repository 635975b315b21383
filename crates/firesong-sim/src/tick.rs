//! The season pipeline.
//!
//! One call to [`advance_season`] runs everything that happens between
//! two player turns, in a fixed order: mourning, blood drift, the new
//! setlist, absorption around the fire, shadows and discoveries, blood
//! memory, births, food, sunlight, the spirits, emigration, strangers,
//! and finally the turning of the season itself.

use firesong_catalog::{Catalog, VerseRegistry};
use firesong_types::Event;
use rand::Rng;
use tracing::debug;

use crate::config::SimConfig;
use crate::state::WorldState;
use crate::{emergence, lifecycle, setlist, spirits, transmission};

/// Run one full season. Returns everything that happened, in order.
/// A collapsed world stays still.
pub fn advance_season(
    state: &mut WorldState,
    catalog: &Catalog,
    registry: &VerseRegistry,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Vec<Event> {
    if state.collapsed {
        return Vec::new();
    }

    let mut events = vec![Event::SeasonBegins {
        season: state.season,
        year: state.year,
        years_bp: state.years_bp,
    }];

    events.extend(lifecycle::age_and_mourn(state, registry, config));
    lifecycle::drift_band_blood(state, catalog, config);

    setlist::rebuild(state, registry, config);
    transmission::absorb_setlist(state, catalog, registry, config);

    events.extend(emergence::grow_shadows(state, registry, config));
    events.extend(emergence::discover_redemptions(state, registry, config, rng));
    events.extend(emergence::discover_adjacencies(state, registry, config, rng));
    events.extend(transmission::blood_memory(state, catalog, registry, config, rng));

    events.extend(lifecycle::births(state, catalog, config, rng));
    events.extend(lifecycle::gather_food(state, config));
    events.extend(lifecycle::update_sunlight(state, config));

    events.extend(spirits::visit_spirits(state, catalog, registry, config, rng));
    events.extend(spirits::dog_emigration(state, catalog, registry, config, rng));

    events.extend(lifecycle::encounters(state, catalog, registry, config, rng));
    events.extend(lifecycle::collapse_check(state));

    lifecycle::advance_time(state);

    debug!(
        season = %state.season,
        year = state.year,
        people = state.people.len(),
        food = state.food,
        events = events.len(),
        "season advanced"
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesong_types::{EraId, Season};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeMap;

    fn stone_world(seed: u64) -> (WorldState, Catalog, VerseRegistry, SimConfig, SmallRng) {
        let catalog = Catalog::standard();
        let config = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = WorldState::new(
            &catalog,
            &config,
            &EraId::from("stone"),
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            &mut rng,
        );
        let registry = VerseRegistry::for_journey(catalog.eras(), &[], &EraId::from("stone"));
        (state, catalog, registry, config, rng)
    }

    #[test]
    fn a_season_opens_with_its_own_announcement() {
        let (mut state, catalog, registry, config, mut rng) = stone_world(7);
        let events = advance_season(&mut state, &catalog, &registry, &config, &mut rng);
        assert!(matches!(
            events.first(),
            Some(Event::SeasonBegins { season: Season::Spring, year: 1, .. })
        ));
        assert_eq!(state.season, Season::Summer);
    }

    #[test]
    fn four_seasons_turn_the_year() {
        let (mut state, catalog, registry, config, mut rng) = stone_world(7);
        for _ in 0..4 {
            advance_season(&mut state, &catalog, &registry, &config, &mut rng);
        }
        assert_eq!(state.season, Season::Spring);
        assert_eq!(state.year, 2);
    }

    #[test]
    fn a_collapsed_world_stays_still() {
        let (mut state, catalog, registry, config, mut rng) = stone_world(7);
        state.collapsed = true;
        let year = state.year;
        let season = state.season;
        let events = advance_season(&mut state, &catalog, &registry, &config, &mut rng);
        assert!(events.is_empty());
        assert_eq!(state.year, year);
        assert_eq!(state.season, season);
    }

    #[test]
    fn the_world_holds_together_over_many_seasons() {
        let (mut state, catalog, registry, config, mut rng) = stone_world(99);
        for _ in 0..60 {
            advance_season(&mut state, &catalog, &registry, &config, &mut rng);
            assert!(state.food >= 0);
            assert!(state.sunlight >= 0.1 && state.sunlight <= 1.0);
            assert!(state.people.len() <= config.population.max_people + 1);
            if state.collapsed {
                break;
            }
        }
    }
}
