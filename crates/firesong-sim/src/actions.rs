//! Player actions.
//!
//! Everything here is all-or-nothing: an [`ActionError`] leaves the
//! world untouched. The season pipeline does the passive work; these
//! are the deliberate moves: arranging the setlist, carving and
//! felling the tree, gathering what scattered, welcoming strangers,
//! and sitting an apprentice down with a master.

use firesong_catalog::blood::{eased_verses, identify};
use firesong_catalog::{Catalog, VerseRegistry};
use firesong_types::{Event, VerseId};
use rand::Rng;

use crate::config::SimConfig;
use crate::error::ActionError;
use crate::setlist;
use crate::state::WorldState;

// ---------------------------------------------------------------------------
// Arranging the song
// ---------------------------------------------------------------------------

/// Replace the setlist with the given arrangement. Order matters: the
/// opening verse transmits best. Duplicates collapse, and anything past
/// capacity is dropped.
pub fn set_setlist(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
    ids: &[String],
) -> Result<Vec<Event>, ActionError> {
    let lost = config.transmission.lost_threshold;
    let cap = setlist::capacity(state, config);
    let mut arranged: Vec<VerseId> = Vec::new();
    for id in ids {
        if !registry.contains(id) {
            return Err(ActionError::UnknownVerse(id.clone()));
        }
        if !state.band_knows(id, lost) {
            return Err(ActionError::VerseUnknownToBand(registry.name_of(id)));
        }
        let verse = VerseId::from(id.as_str());
        if arranged.contains(&verse) {
            continue;
        }
        if arranged.len() >= cap {
            break;
        }
        arranged.push(verse);
    }
    state.setlist = arranged;
    Ok(Vec::new())
}

/// Move a verse to the opening slot, inserting it if absent, and trim
/// to capacity.
pub fn prioritize(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
    id: &str,
) -> Result<Vec<Event>, ActionError> {
    if !registry.contains(id) {
        return Err(ActionError::UnknownVerse(String::from(id)));
    }
    let verse = VerseId::from(id);
    state.setlist.retain(|v| *v != verse);
    state.setlist.insert(0, verse);
    let cap = setlist::capacity(state, config);
    state.setlist.truncate(cap);
    Ok(Vec::new())
}

// ---------------------------------------------------------------------------
// The tree
// ---------------------------------------------------------------------------

/// Carve a verse into the tree. Permanent, and the tree grows.
pub fn carve(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
    id: &str,
) -> Result<Vec<Event>, ActionError> {
    if !registry.contains(id) {
        return Err(ActionError::UnknownVerse(String::from(id)));
    }
    let name = registry.name_of(id);
    if state.is_carved(id) {
        return Err(ActionError::AlreadyCarved(name));
    }
    let garble = config.transmission.garble_threshold;
    let carver = state
        .people
        .iter()
        .find(|p| {
            p.knows(id, config.tree.carve_threshold) && p.knows("tree_song", garble)
        })
        .map(|p| p.name.clone())
        .ok_or_else(|| ActionError::NoQualifiedCarver(name.clone()))?;

    state.tree.carved.push(VerseId::from(id));
    state.tree.height += config.tree.growth_per_verse;

    let mut events =
        vec![Event::Carved { name: carver, verse: name, height: state.tree.height }];
    if state.tree.height >= config.tree.sun_blocked_height {
        events.push(Event::CanopyDarkens);
    }
    if state.tree.height >= config.tree.sun_dead_height {
        events.push(Event::SunBlocked);
    }
    Ok(events)
}

/// Fell the tree. Carved verses scatter, survive in memory, or die;
/// certain carved combinations leave new growth in the ash; the sun
/// returns; every spirit takes offence.
pub fn fell(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Result<Vec<Event>, ActionError> {
    if state.tree.height == 0 {
        return Err(ActionError::TreeNotGrown);
    }
    let garble = config.transmission.garble_threshold;
    let lost = config.transmission.lost_threshold;
    if !state.band_knows("blade", garble) {
        return Err(ActionError::NoFeller);
    }

    let mut events = vec![Event::TreeFelled {
        height: state.tree.height,
        carved_count: state.tree.carved.len(),
    }];

    let carved = std::mem::take(&mut state.tree.carved);
    for v in &carved {
        if rng.random::<f64>() < config.tree.scatter_chance {
            let fidelity = 0.3 + rng.random::<f64>() * 0.4;
            state.fragments.push(crate::state::Fragment { verse: v.clone(), fidelity });
            events.push(Event::FragmentScattered {
                verse: registry.name_of(v.as_str()),
                fidelity,
            });
        } else {
            let carriers: Vec<String> = state
                .people
                .iter()
                .filter(|p| p.knows(v.as_str(), lost))
                .map(|p| p.name.clone())
                .collect();
            if carriers.is_empty() {
                state.total_lost.push(v.clone());
                events.push(Event::VerseLostForever { verse: registry.name_of(v.as_str()) });
            } else {
                events.push(Event::SurvivesInMemory {
                    verse: registry.name_of(v.as_str()),
                    carriers,
                });
            }
        }
    }

    // What was carved together grows together.
    for def in registry.ash_verses() {
        if state.ash_verses.contains(&def.id) {
            continue;
        }
        if def.emerges_from.iter().all(|v| carved.contains(v)) {
            state.ash_verses.push(def.id.clone());
            events.push(Event::AshEmerges { verse: def.name.clone() });
        }
    }

    state.tree.height = 0;
    state.sunlight = 1.0;
    state.fellings += 1;
    for ss in state.spirits.values_mut() {
        ss.spirit = (ss.spirit - config.tree.felling_spirit_cost).max(0.0);
    }
    events.push(Event::SpiritsDisturbed);
    events.push(Event::SunReturns { fellings: state.fellings });
    Ok(events)
}

/// Gather the fragments a felling left on the ground. Each fragment
/// goes to the first non-youth who has its prerequisites; the rest
/// crumble.
pub fn gather(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
) -> Result<Vec<Event>, ActionError> {
    if state.fragments.is_empty() {
        return Err(ActionError::NoFragments);
    }
    let garble = config.transmission.garble_threshold;
    let lost = config.transmission.lost_threshold;
    let mut events = Vec::new();
    let fragments = std::mem::take(&mut state.fragments);
    for frag in fragments {
        let Some(def) = registry.get(frag.verse.as_str()) else {
            continue;
        };
        let learner = state.people.iter().position(|p| {
            p.is_singer() && def.prereqs.iter().all(|pr| p.knows(pr.as_str(), garble))
        });
        match learner {
            Some(i) => {
                state.people[i].raise_verse(&frag.verse, frag.fidelity);
                events.push(Event::FragmentGathered {
                    name: state.people[i].name.clone(),
                    verse: def.name.clone(),
                    fidelity: frag.fidelity,
                });
            }
            None => {
                events.push(Event::FragmentCrumbles { verse: def.name.clone() });
                if !state.total_lost.contains(&frag.verse)
                    && !state.band_knows(frag.verse.as_str(), lost)
                {
                    state.total_lost.push(frag.verse);
                }
            }
        }
    }
    Ok(events)
}

// ---------------------------------------------------------------------------
// Strangers
// ---------------------------------------------------------------------------

/// Take the waiting stranger into the band.
pub fn welcome(
    state: &mut WorldState,
    catalog: &Catalog,
    registry: &VerseRegistry,
    config: &SimConfig,
) -> Result<Vec<Event>, ActionError> {
    let stranger = state.encounter.take().ok_or(ActionError::NoEncounter)?;
    let lost = config.transmission.lost_threshold;
    let people = identify(catalog.peoples(), &stranger.blood, state.era.as_str());
    let event = Event::StrangerJoins {
        name: stranger.name.clone(),
        people: catalog.people_name(people.as_str()),
        verses: stranger.verses_at(lost).map(|v| registry.name_of(v.as_str())).collect(),
    };
    state.people.push(stranger);
    Ok(vec![event])
}

/// Turn the stranger away. Their songs go with them.
pub fn ignore(state: &mut WorldState) -> Result<Vec<Event>, ActionError> {
    let stranger = state.encounter.take().ok_or(ActionError::NoEncounter)?;
    Ok(vec![Event::StrangerLeaves { name: stranger.name }])
}

// ---------------------------------------------------------------------------
// Study and apprenticeship
// ---------------------------------------------------------------------------

/// Study a verse out of the ash. Learning from ash is partial; singing
/// must finish the job.
pub fn study_ash(
    state: &mut WorldState,
    registry: &VerseRegistry,
    config: &SimConfig,
    id: &str,
) -> Result<Vec<Event>, ActionError> {
    if !state.ash_verses.iter().any(|v| v.as_str() == id) {
        return Err(ActionError::NotInAsh(String::from(id)));
    }
    let def = registry.get(id).ok_or_else(|| ActionError::UnknownVerse(String::from(id)))?;
    let garble = config.transmission.garble_threshold;
    let learner = state
        .people
        .iter()
        .position(|p| {
            p.is_singer()
                && !p.knows(id, 0.5)
                && def.prereqs.iter().all(|pr| p.knows(pr.as_str(), garble))
        })
        .ok_or_else(|| ActionError::NoQualifiedStudent(def.name.clone()))?;

    let from = state.people[learner].fidelity(id);
    let to = (from + 0.3).min(0.6);
    state.people[learner].raise_verse(&def.id, to);
    Ok(vec![Event::AshStudied {
        name: state.people[learner].name.clone(),
        verse: def.name.clone(),
        from,
        to,
    }])
}

/// Focused apprenticeship: one teacher, one student, one verse. A
/// direct transfer, capped at the teacher's own fidelity.
pub fn teach(
    state: &mut WorldState,
    catalog: &Catalog,
    registry: &VerseRegistry,
    config: &SimConfig,
    teacher_name: &str,
    student_name: &str,
    id: &str,
) -> Result<Vec<Event>, ActionError> {
    let find = |name: &str| {
        state.people.iter().position(|p| p.name.eq_ignore_ascii_case(name))
    };
    let teacher = find(teacher_name)
        .ok_or_else(|| ActionError::NoSuchPerson(String::from(teacher_name)))?;
    let student = find(student_name)
        .ok_or_else(|| ActionError::NoSuchPerson(String::from(student_name)))?;
    let def = registry.get(id).ok_or_else(|| ActionError::UnknownVerse(String::from(id)))?;

    let lost = config.transmission.lost_threshold;
    let garble = config.transmission.garble_threshold;
    let teacher_fidelity = state.people[teacher].fidelity(id);
    if teacher_fidelity < lost {
        return Err(ActionError::TeacherLacksVerse {
            teacher: state.people[teacher].name.clone(),
            verse: def.name.clone(),
        });
    }
    let power = state.people[teacher].age_class().teaching_power();
    if power == 0.0 {
        return Err(ActionError::TooYoungToTeach(state.people[teacher].name.clone()));
    }
    if !def.prereqs.is_empty()
        && !def.prereqs.iter().all(|pr| state.people[student].knows(pr.as_str(), garble))
    {
        return Err(ActionError::MissingPrerequisites {
            student: state.people[student].name.clone(),
            verse: def.name.clone(),
        });
    }

    let blood_bonus = eased_verses(catalog.blood(), &state.people[student].blood)
        .get(id)
        .copied()
        .unwrap_or(0.0);
    let gain = config.transmission.learn_rate_focused * power * (1.0 + blood_bonus);
    let from = state.people[student].fidelity(id);
    let to = (from + gain).min(teacher_fidelity).max(from);
    state.people[student].raise_verse(&def.id, to);
    Ok(vec![Event::Taught {
        teacher: state.people[teacher].name.clone(),
        student: state.people[student].name.clone(),
        verse: def.name.clone(),
        from,
        to,
        garbled: teacher_fidelity < garble,
    }])
}
