//! The verse registry: the append-only set of verses that exist so far.
//!
//! History starts with the base table. Each era visited merges its own
//! verse delta. The registry is rebuilt on snapshot load by replaying the
//! deltas of every recorded era plus the current one, so a saved world
//! never forgets a verse it has already met.

use std::collections::BTreeMap;

use firesong_types::{EraId, Tradition, VerseId};

use crate::eras::EraDef;
use crate::verses::{VerseDef, base_verses};

/// The set of verse definitions currently in play.
#[derive(Debug, Clone)]
pub struct VerseRegistry {
    verses: BTreeMap<VerseId, VerseDef>,
}

impl VerseRegistry {
    /// The base registry: everything available from the start of history.
    pub fn base() -> Self {
        let mut verses = BTreeMap::new();
        for v in base_verses() {
            verses.insert(v.id.clone(), v);
        }
        Self { verses }
    }

    /// Merge an era's verse delta. Existing entries are kept; merges only
    /// ever add.
    pub fn merge_era(&mut self, era: &EraDef) {
        for v in &era.new_songs {
            self.verses.entry(v.id.clone()).or_insert_with(|| v.clone());
        }
    }

    /// Rebuild the registry for a journey: base table plus the deltas of
    /// every visited era and the current one, in visit order.
    ///
    /// Unknown era ids are skipped with a warning. A stale snapshot is
    /// degraded, never fatal.
    pub fn for_journey(
        eras: &BTreeMap<EraId, EraDef>,
        visited: &[EraId],
        current: &EraId,
    ) -> Self {
        let mut registry = Self::base();
        for key in visited.iter().chain(core::iter::once(current)) {
            match eras.get(key.as_str()) {
                Some(era) => registry.merge_era(era),
                None => tracing::warn!(era = %key, "snapshot references unknown era; skipping"),
            }
        }
        registry
    }

    /// Look up a verse definition.
    pub fn get(&self, id: &str) -> Option<&VerseDef> {
        self.verses.get(id)
    }

    /// Whether the verse exists in the registry.
    pub fn contains(&self, id: &str) -> bool {
        self.verses.contains_key(id)
    }

    /// Display name of a verse, falling back to the raw id.
    pub fn name_of(&self, id: &str) -> String {
        self.verses
            .get(id)
            .map_or_else(|| String::from(id), |v| v.name.clone())
    }

    /// Iterate over all definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &VerseDef> {
        self.verses.values()
    }

    /// Iterate over all shadow verses in id order.
    pub fn shadows(&self) -> impl Iterator<Item = &VerseDef> {
        self.verses.values().filter(|v| v.is_shadow())
    }

    /// Iterate over verses that can emerge from setlist adjacency
    /// (mixed and ash traditions with at least two prerequisites).
    pub fn adjacency_candidates(&self) -> impl Iterator<Item = &VerseDef> {
        self.verses
            .values()
            .filter(|v| v.tradition.emerges_from_adjacency() && v.prereqs.len() >= 2)
    }

    /// Iterate over ash verses in id order.
    pub fn ash_verses(&self) -> impl Iterator<Item = &VerseDef> {
        self.verses.values().filter(|v| v.tradition == Tradition::Ash)
    }

    /// Number of verses in the registry.
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    /// Whether the registry is empty. It never is in practice.
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}
