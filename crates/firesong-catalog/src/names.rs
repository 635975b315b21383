//! Name pools and stranger templates.
//!
//! Births draw from a shared pool (a bear band uses bear names, a yeast
//! surplus child gets a brewing name). Strangers arrive with a name, an
//! age, and a handful of verses drawn from their people's pool.

use firesong_types::{PeopleId, VerseId};

use crate::VerseRegistry;

/// Default pool for children born into the band.
pub const BIRTH_NAMES: [&str; 17] = [
    "Kyllikki", "Marjatta", "Annikki", "Tuoni", "Seppo", "Ahti", "Mielikki", "Tapio", "Pellervo",
    "Nyyrikki", "Tuulikki", "Otso", "Kave", "Untamo", "Kalervo", "Sampo", "Antero",
];

/// Pool used instead when any bear-folk live in the band.
pub const BEAR_BIRTH_NAMES: [&str; 6] =
    ["Little-Paw", "Bark-Nose", "Berry-Find", "Cave-Born", "Ice-Cub", "Moon-Watcher"];

/// Pool for children born of yeast surplus.
pub const YEAST_BIRTH_NAMES: [&str; 15] = [
    "Barley", "Hops", "Malt", "Leaven", "Foam", "Crust", "Rise", "Starter", "Kvass", "Kumiss",
    "Barm", "Must", "Wort", "Dregs", "Crumb",
];

/// Names a stranger of the given people might carry.
pub fn stranger_names(people: &str) -> &'static [&'static str] {
    match people {
        "troll" => &["Hrungnir", "Geirrod", "Ymir-kin", "Bergelmir"],
        "dwarf" => &["Durin", "Andvari", "Alviss", "Dvalin", "Sindri", "Brokk"],
        "elf" => &["Luthien", "Thingol", "Nienna", "Varda", "Ilmare"],
        "halfling" => &["Ebu", "Liang", "Flores", "Mata"],
        _ => &[
            "Pohjan Akka",
            "Tiera",
            "Iku-Turso",
            "Surma",
            "Kiputytt\u{f6}",
            "Elias",
            "Akseli",
            "Minna",
            "Johan",
            "Kristina",
        ],
    }
}

/// Verses a stranger of the given people might know. Humans draw from
/// every human verse currently in the registry; the older peoples carry
/// fixed repertoires.
pub fn stranger_verse_pool(people: &str, registry: &VerseRegistry) -> Vec<VerseId> {
    let fixed: &[&str] = match people {
        "troll" => &["heartbeat", "stone_sleep", "deep_fire", "old_track"],
        "dwarf" => &["flake", "blade", "ember", "cave_song", "bear", "wolf_song", "ochre", "burial"],
        "elf" => &["thin_air", "far_sight", "ghost_walk", "jade", "loom"],
        "halfling" => &["island", "small_hunt", "tide", "feast", "shelter"],
        _ => &[],
    };
    if fixed.is_empty() {
        registry
            .iter()
            .filter(|v| v.people == PeopleId::from("human"))
            .map(|v| v.id.clone())
            .collect()
    } else {
        fixed.iter().map(|s| VerseId::from(*s)).collect()
    }
}

/// Age range (base, spread) for a stranger of the given people.
pub fn stranger_age_range(people: &str) -> (u32, u32) {
    match people {
        "troll" => (20, 4),
        "elf" => (12, 10),
        _ => (8, 12),
    }
}
