//! Blood mechanics: mixing, drift, and song sinking.
//!
//! Blood is the slow channel. Verses drift generationally through
//! imperfect absorption; blood drifts at 0.005 a season. Song sinking is
//! the bridge between them: a song both parents hold well leaves a mark
//! in the child's blood, so over generations culture becomes heritage.

use std::collections::BTreeMap;

use firesong_catalog::Catalog;
use firesong_types::TraitId;

use crate::config::BloodConfig;
use crate::person::Person;

/// Average two parents' blood. Traits that average below the silence
/// threshold are dropped.
pub fn mix_blood(
    a: &BTreeMap<TraitId, f64>,
    b: &BTreeMap<TraitId, f64>,
    config: &BloodConfig,
) -> BTreeMap<TraitId, f64> {
    let mut child = BTreeMap::new();
    for key in a.keys().chain(b.keys()) {
        if child.contains_key(key.as_str()) {
            continue;
        }
        let avg = (a.get(key.as_str()).copied().unwrap_or(0.0)
            + b.get(key.as_str()).copied().unwrap_or(0.0))
            / 2.0;
        if avg >= config.threshold {
            child.insert(key.clone(), avg);
        }
    }
    child
}

/// Drift one person's blood a season. The era's dominant traits drift up
/// (gene flow toward the people around you), everything else drifts down
/// and falls silent below the threshold.
pub fn drift_blood(person: &mut Person, dominant: &[TraitId], config: &BloodConfig) {
    let mut drifted = BTreeMap::new();
    for (key, level) in &person.blood {
        if dominant.iter().any(|d| d == key) {
            drifted.insert(key.clone(), (level + config.drift).min(1.0));
        } else {
            let down = level - config.drift;
            if down >= config.threshold {
                drifted.insert(key.clone(), down);
            }
        }
    }
    for key in dominant {
        drifted.entry(key.clone()).or_insert(config.drift);
    }
    person.blood = drifted;
}

/// Blood boosts a child receives from songs both parents hold well.
/// Each qualifying song sinks a fixed amount into every trait that eases
/// it, regardless of how well it is sung.
pub fn song_sink(
    catalog: &Catalog,
    parent_a: &Person,
    parent_b: &Person,
    config: &BloodConfig,
) -> BTreeMap<TraitId, f64> {
    let mut boost: BTreeMap<TraitId, f64> = BTreeMap::new();
    for (verse, fid_a) in parent_a.verses() {
        if fid_a < config.sink_threshold
            || parent_b.fidelity(verse.as_str()) < config.sink_threshold
        {
            continue;
        }
        for def in catalog.blood().values() {
            if def.eases.iter().any(|v| v == verse) {
                *boost.entry(def.id.clone()).or_insert(0.0) += config.sink_amount;
            }
        }
    }
    boost
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesong_types::VerseId;

    fn person_with(verses: &[(&str, f64)], blood: &[(&str, f64)]) -> Person {
        let mut p = Person::new(
            "Otso",
            10,
            blood.iter().map(|(k, v)| (TraitId::from(*k), *v)).collect(),
            BTreeMap::new(),
        );
        for (v, f) in verses {
            p.raise_verse(&VerseId::from(*v), *f);
        }
        p
    }

    #[test]
    fn mixing_drops_faint_traits() {
        let config = BloodConfig::default();
        let mut a = BTreeMap::new();
        a.insert(TraitId::from("song_blood"), 0.8);
        a.insert(TraitId::from("craft_blood"), 0.01);
        let b = BTreeMap::new();
        let child = mix_blood(&a, &b, &config);
        assert!((child.get("song_blood").copied().unwrap_or(0.0) - 0.4).abs() < 1e-12);
        assert!(!child.contains_key("craft_blood"));
    }

    #[test]
    fn drift_raises_dominant_and_silences_the_rest() {
        let config = BloodConfig::default();
        let mut p = person_with(&[], &[("song_blood", 0.5), ("craft_blood", 0.012)]);
        drift_blood(&mut p, &[TraitId::from("song_blood")], &config);
        assert!((p.blood.get("song_blood").copied().unwrap_or(0.0) - 0.505).abs() < 1e-12);
        // 0.012 - 0.005 = 0.007 < threshold, silenced
        assert!(!p.blood.contains_key("craft_blood"));
    }

    #[test]
    fn drift_seeds_missing_dominant_traits() {
        let config = BloodConfig::default();
        let mut p = person_with(&[], &[]);
        drift_blood(&mut p, &[TraitId::from("den_blood")], &config);
        assert!((p.blood.get("den_blood").copied().unwrap_or(0.0) - config.drift).abs() < 1e-12);
    }

    #[test]
    fn shared_songs_sink_a_fixed_amount() {
        let catalog = Catalog::standard();
        let config = BloodConfig::default();
        // cave_song is eased by cave_blood only.
        let a = person_with(&[("cave_song", 0.9)], &[]);
        let b = person_with(&[("cave_song", 0.6)], &[]);
        let boost = song_sink(&catalog, &a, &b, &config);
        assert!((boost.get("cave_blood").copied().unwrap_or(0.0) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn one_sided_songs_do_not_sink() {
        let catalog = Catalog::standard();
        let config = BloodConfig::default();
        let a = person_with(&[("cave_song", 0.9)], &[]);
        let b = person_with(&[("cave_song", 0.4)], &[]);
        assert!(song_sink(&catalog, &a, &b, &config).is_empty());
    }
}
