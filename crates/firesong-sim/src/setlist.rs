//! The seasonal setlist: what the community sings, in what order.
//!
//! The setlist is the only transmission channel youth have, and it is
//! small. Capacity grows logarithmically with the number of singers, so
//! a band twice the size does not carry twice the songs. Mnemonic
//! technology (rune singing, the tally song) widens it; sleepless nights
//! narrow it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use firesong_catalog::VerseRegistry;
use firesong_types::VerseId;

use crate::config::SimConfig;
use crate::state::WorldState;

/// How many verses the band can hold on the list this season, before
/// any night penalty.
pub fn capacity(state: &WorldState, config: &SimConfig) -> usize {
    let singers = state.people.iter().filter(|p| p.is_singer()).count();
    if singers == 0 {
        return 0;
    }
    let garble = config.transmission.garble_threshold;
    let mut cap = ((singers as f64).log2() * 2.0).floor() as usize + 1;
    if state.band_knows("rune", garble) {
        cap += 2;
    }
    if state.band_knows("ledger", garble) {
        cap += 1;
    }
    cap
}

/// Earlier slots transmit better. A single-verse list sits at 0.90; a
/// longer list slopes from 0.95 down to 0.55.
pub fn position_factor(index: usize, len: usize) -> f64 {
    if len <= 1 {
        return 0.90;
    }
    0.95 - (index as f64 / (len - 1) as f64) * 0.40
}

/// Repetition bonus for a verse sung several seasons running.
pub fn rep_bonus(reps: u32, config: &SimConfig) -> f64 {
    (f64::from(reps.saturating_sub(1)) * config.transmission.rep_bonus_per_season)
        .min(config.transmission.rep_bonus_max)
}

/// Bring the setlist up to date for the new season.
///
/// Drops verses nobody can still sing (unless carved and a literate
/// reader is present), fills free slots with the best-held verses off
/// the list, trims to capacity, and advances the repetition history.
pub fn rebuild(state: &mut WorldState, registry: &VerseRegistry, config: &SimConfig) {
    let lost = config.transmission.lost_threshold;
    let garble = config.transmission.garble_threshold;
    let literate = state.has_literate(garble);

    let mut cap = capacity(state, config);
    if state.night_penalty > 0 {
        cap = cap.saturating_sub(state.night_penalty as usize).max(1);
        state.night_penalty = 0;
    }

    let kept: Vec<VerseId> = state
        .setlist
        .iter()
        .filter(|v| {
            state.band_knows(v.as_str(), lost) || (literate && state.is_carved(v.as_str()))
        })
        .cloned()
        .collect();
    state.setlist = kept;

    // Free slots go to whatever the singers hold best.
    if state.setlist.len() < cap {
        let mut candidates: Vec<(VerseId, f64)> = registry
            .iter()
            .filter(|def| !state.setlist.contains(&def.id))
            .filter_map(|def| {
                let mut best = state
                    .people
                    .iter()
                    .filter(|p| p.is_singer())
                    .map(|p| p.fidelity(def.id.as_str()))
                    .fold(0.0, f64::max);
                if literate && state.is_carved(def.id.as_str()) {
                    best = best.max(config.transmission.writing_integrity);
                }
                (best >= lost).then(|| (def.id.clone(), best))
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
        });
        for (id, _) in candidates {
            if state.setlist.len() >= cap {
                break;
            }
            state.setlist.push(id);
        }
    }

    state.setlist.truncate(cap);

    let mut history = BTreeMap::new();
    for v in &state.setlist {
        let reps = state.setlist_history.get(v.as_str()).copied().unwrap_or(0) + 1;
        history.insert(v.clone(), reps);
    }
    state.setlist_history = history;
}
