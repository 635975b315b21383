//! People: the carriers of verses and blood.
//!
//! A person's held verses never decay. Loss is generational: what the
//! youth fail to absorb dies with the holder. Fidelity changes are
//! therefore monotonic within a lifetime, which [`Person::raise_verse`]
//! enforces.

use std::collections::BTreeMap;

use firesong_types::{AgeClass, TraitId, VerseId};
use serde::{Deserialize, Serialize};

/// One member of the band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Display name, unique within the band.
    pub name: String,
    /// Age in seasons.
    pub age: u32,
    /// Blood trait levels, 0.0–1.0.
    pub blood: BTreeMap<TraitId, f64>,
    verses: BTreeMap<VerseId, f64>,
}

impl Person {
    /// A person with the given verses.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        blood: BTreeMap<TraitId, f64>,
        verses: BTreeMap<VerseId, f64>,
    ) -> Self {
        Self { name: name.into(), age, blood, verses }
    }

    /// Life stage for the current age.
    pub fn age_class(&self) -> AgeClass {
        AgeClass::from_age(self.age)
    }

    /// Whether this person joins the singing (adult or elder).
    pub fn is_singer(&self) -> bool {
        self.age_class().is_singer()
    }

    /// Fidelity of a held verse, 0.0 when unknown.
    pub fn fidelity(&self, verse: &str) -> f64 {
        self.verses.get(verse).copied().unwrap_or(0.0)
    }

    /// Whether the verse is held at or above the threshold.
    pub fn knows(&self, verse: &str, threshold: f64) -> bool {
        self.fidelity(verse) >= threshold
    }

    /// Raise a verse to the given fidelity. Never lowers; caps at 1.0.
    pub fn raise_verse(&mut self, verse: &VerseId, fidelity: f64) {
        let slot = self.verses.entry(verse.clone()).or_insert(0.0);
        if fidelity > *slot {
            *slot = fidelity.min(1.0);
        }
    }

    /// Iterate over all held verses and their fidelities.
    pub fn verses(&self) -> impl Iterator<Item = (&VerseId, f64)> {
        self.verses.iter().map(|(v, f)| (v, *f))
    }

    /// Ids of verses held at or above the threshold.
    pub fn verses_at(&self, threshold: f64) -> impl Iterator<Item = &VerseId> {
        self.verses.iter().filter(move |(_, f)| **f >= threshold).map(|(v, _)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn someone(age: u32) -> Person {
        Person::new("Aino", age, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn fidelity_is_monotonic() {
        let mut p = someone(10);
        let v = VerseId::from("lullaby");
        p.raise_verse(&v, 0.6);
        p.raise_verse(&v, 0.4);
        assert!((p.fidelity("lullaby") - 0.6).abs() < 1e-12);
        p.raise_verse(&v, 0.9);
        assert!((p.fidelity("lullaby") - 0.9).abs() < 1e-12);
    }

    #[test]
    fn fidelity_caps_at_one() {
        let mut p = someone(10);
        let v = VerseId::from("lullaby");
        p.raise_verse(&v, 1.4);
        assert!((p.fidelity("lullaby") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn age_classes() {
        assert_eq!(someone(3).age_class(), AgeClass::Youth);
        assert_eq!(someone(10).age_class(), AgeClass::Adult);
        assert_eq!(someone(20).age_class(), AgeClass::Elder);
        assert!(!someone(3).is_singer());
        assert!(someone(20).is_singer());
    }
}
