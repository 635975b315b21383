//! The era graph.
//!
//! Eras are not a line; they are places the song can take you. Each era
//! carries its own verse delta, its own encounter pool, and bridges to
//! other eras. A bridge opens when its required songs are carved on the
//! tree or well known by the living. One era is hidden and must be earned.

use std::collections::BTreeMap;

use firesong_types::{EraId, PeopleId, Tradition, VerseId};

use crate::verses::{VerseDef, verse};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A song-bridge from one era to another.
#[derive(Debug, Clone)]
pub struct BridgeDef {
    /// Verses that must be carved or well known for the crossing.
    pub requires: Vec<VerseId>,
    /// Narration shown when the bridge is listed.
    pub desc: String,
}

/// A single era.
#[derive(Debug, Clone)]
pub struct EraDef {
    /// Catalog key.
    pub id: EraId,
    /// Display name.
    pub name: String,
    /// Narration shown when the era begins.
    pub desc: String,
    /// Years before present at which the era opens.
    pub years_bp: i64,
    /// The people a fresh band in this era belongs to.
    pub start_people: PeopleId,
    /// Songs a fresh band in this era is guaranteed, with fidelities.
    pub base_songs: Vec<(VerseId, f64)>,
    /// Verses this era adds to the registry.
    pub new_songs: Vec<VerseDef>,
    /// Peoples a stranger at the edge of camp may belong to.
    pub encounter_peoples: Vec<PeopleId>,
    /// Hidden eras never appear as bridge targets until unlocked.
    pub hidden: bool,
    /// Bridges out of this era, keyed by destination.
    pub bridges: BTreeMap<EraId, BridgeDef>,
    /// Names for a fresh band born into this era.
    pub name_pool: Vec<String>,
}

/// One way an era can end, determined by what was carved.
#[derive(Debug, Clone)]
pub struct ApocalypseDef {
    /// Display name.
    pub name: String,
    /// Narration for the ending.
    pub desc: String,
    /// Carved traditions that pull the ending toward this shape.
    pub traditions: Vec<Tradition>,
}

// ---------------------------------------------------------------------------
// Table builders
// ---------------------------------------------------------------------------

fn ids(keys: &[&str]) -> Vec<VerseId> {
    keys.iter().map(|k| VerseId::from(*k)).collect()
}

fn peoples(keys: &[&str]) -> Vec<PeopleId> {
    keys.iter().map(|k| PeopleId::from(*k)).collect()
}

fn names(pool: &[&str]) -> Vec<String> {
    pool.iter().map(|n| String::from(*n)).collect()
}

fn songs(entries: &[(&str, f64)]) -> Vec<(VerseId, f64)> {
    entries.iter().map(|(k, f)| (VerseId::from(*k), *f)).collect()
}

fn bridge(requires: &[&str], desc: &str) -> BridgeDef {
    BridgeDef { requires: ids(requires), desc: String::from(desc) }
}

fn bridges(entries: Vec<(&str, BridgeDef)>) -> BTreeMap<EraId, BridgeDef> {
    entries.into_iter().map(|(k, b)| (EraId::from(k), b)).collect()
}

const KALEVALA_NAMES: [&str; 7] =
    ["Aino", "Joukahainen", "Ilmatar", "Kullervo", "Louhi", "Lemminkainen", "Vainamoinen"];

/// The full era table.
pub(crate) fn eras() -> BTreeMap<EraId, EraDef> {
    let mut table = BTreeMap::new();
    let mut insert = |era: EraDef| {
        table.insert(era.id.clone(), era);
    };

    insert(EraDef {
        id: EraId::from("bears"),
        name: String::from("The Age of Bears"),
        desc: String::from(
            "Before the upright ones. The cave bears dream in cycles older than species. You are not human. You are not even hominid. You are the dreamer.",
        ),
        years_bp: 2_500_000,
        start_people: PeopleId::from("bear"),
        base_songs: songs(&[("den_memory", 1.0), ("cub_call", 0.8)]),
        new_songs: Vec::new(),
        encounter_peoples: peoples(&["bear"]),
        hidden: true,
        bridges: bridges(vec![(
            "stone",
            bridge(
                &["spirit_mark", "den_memory"],
                "Claw marks on the wall. Something upright comes. You dream of them.",
            ),
        )]),
        name_pool: names(&[
            "Great-Paw",
            "Honey-Dream",
            "Old-Den",
            "River-Watch",
            "Snow-Sleep",
            "Cub-Cry",
            "Root-Dig",
        ]),
    });

    insert(EraDef {
        id: EraId::from("stone"),
        name: String::from("The Age of Stone"),
        desc: String::from(
            "You are Homo erectus. The first to walk upright into the unknown. You have no words, only rhythm.",
        ),
        years_bp: 1_800_000,
        start_people: PeopleId::from("troll"),
        base_songs: songs(&[("heartbeat", 1.0)]),
        new_songs: Vec::new(),
        encounter_peoples: peoples(&["troll"]),
        hidden: false,
        bridges: bridges(vec![
            (
                "caves",
                bridge(&["heartbeat", "deep_fire"], "Fire carried forward. A million years of walking."),
            ),
            (
                "bears",
                bridge(
                    &["old_track", "heartbeat"],
                    "You follow the oldest tracks. Back before your kind. To the dreamers.",
                ),
            ),
        ]),
        name_pool: names(&["Grok", "Thud", "Rumble", "Ember-Eye", "Stone-Hand", "Old-Walk", "Still-One"]),
    });

    insert(EraDef {
        id: EraId::from("caves"),
        name: String::from("The Age of Caves"),
        desc: String::from(
            "New people in the caves. Shorter, stronger, with clever hands. The dwarves arrive.",
        ),
        years_bp: 300_000,
        start_people: PeopleId::from("troll"),
        base_songs: songs(&[("heartbeat", 0.7), ("flake", 0.6)]),
        new_songs: Vec::new(),
        encounter_peoples: peoples(&["troll", "dwarf"]),
        hidden: false,
        bridges: bridges(vec![
            (
                "meeting",
                bridge(
                    &["cave_song", "blade"],
                    "The caves fill with echoes of new voices coming from the south.",
                ),
            ),
            (
                "stone",
                bridge(
                    &["heartbeat", "stone_sleep"],
                    "You dream backward. The troll patience takes you to the deep time.",
                ),
            ),
            (
                "bears",
                bridge(
                    &["bear", "cave_song"],
                    "You sing the Bear Song in the deepest cave. Something ancient answers.",
                ),
            ),
        ]),
        name_pool: names(&["Durin", "Mim", "Nain", "Andvari", "Sindri", "Brokk", "Alviss"]),
    });

    insert(EraDef {
        id: EraId::from("meeting"),
        name: String::from("The Age of Meeting"),
        desc: String::from(
            "From the east, the hidden people. From the islands, the small ones. From Africa, the singers. Everyone is here.",
        ),
        years_bp: 52_000,
        start_people: PeopleId::from("human"),
        base_songs: songs(&[("lullaby", 0.8), ("root", 0.6), ("heartbeat", 0.5)]),
        new_songs: Vec::new(),
        encounter_peoples: peoples(&["troll", "dwarf", "elf", "halfling", "human"]),
        hidden: false,
        bridges: bridges(vec![
            ("ice", bridge(&["seasons", "ember"], "The sky changes. Cold comes from the north.")),
            (
                "caves",
                bridge(
                    &["cave_song", "bone_flute"],
                    "The bone flute leads you back to the old caves. The dwarves are still there.",
                ),
            ),
            (
                "bears",
                bridge(
                    &["bear", "bear_gift"],
                    "The Bear Gift opens a door in time. You walk through it on all fours.",
                ),
            ),
        ]),
        name_pool: names(&KALEVALA_NAMES),
    });

    insert(EraDef {
        id: EraId::from("ice"),
        name: String::from("The Age of Ice"),
        desc: String::from(
            "The glacier advances. The old peoples fade. The wolves come to the fire. Only their songs remain in you.",
        ),
        years_bp: 26_000,
        start_people: PeopleId::from("human"),
        base_songs: songs(&[("lullaby", 0.8), ("root", 0.6), ("ember", 0.5)]),
        new_songs: vec![
            verse("glacier", "The Glacier Song", Tradition::Human, "human", &["seasons", "stone_sleep"], 3),
            verse("migration", "The Migration Song", Tradition::Human, "human", &["herd", "far_sight"], 3),
            verse("paint", "The Paint Song", Tradition::Mixed, "mixed", &["ochre", "fire_cave"], 3),
            verse("dog", "The Dog Song", Tradition::Mixed, "mixed", &["wolf_song", "ember", "lullaby"], 4),
            verse("dog_guard", "The Guard Song", Tradition::Human, "human", &["dog", "wall"], 3),
            verse("dog_hunt", "The Hunt Song", Tradition::Mixed, "mixed", &["dog", "track"], 3),
            verse("dog_sled", "The Sled Song", Tradition::Mixed, "mixed", &["dog", "migration"], 4),
            verse("dog_burial", "The Dog Burial", Tradition::Mixed, "mixed", &["dog", "burial"], 3),
        ],
        encounter_peoples: peoples(&["dwarf", "human"]),
        hidden: false,
        bridges: bridges(vec![
            ("grain", bridge(&["ash_song", "root"], "The ice retreats. Green things push through.")),
            (
                "meeting",
                bridge(
                    &["bone_flute", "elder_song"],
                    "The old songs pull you back to when everyone was here.",
                ),
            ),
            ("bears", bridge(&["bear", "long_sleep"], "You sleep like the bears. You wake in their time.")),
        ]),
        name_pool: names(&KALEVALA_NAMES),
    });

    insert(EraDef {
        id: EraId::from("grain"),
        name: String::from("The Age of Grain"),
        desc: String::from(
            "The ice retreats. Someone plants a seed on purpose. Everything changes.",
        ),
        years_bp: 12_000,
        start_people: PeopleId::from("human"),
        base_songs: songs(&[("lullaby", 0.8), ("root", 0.7), ("spark", 0.5)]),
        new_songs: vec![
            verse("pottery", "The Clay Song", Tradition::Human, "human", &["deep_fire", "root"], 2),
            verse("ledger", "The Ledger Song", Tradition::Human, "human", &["grain", "pottery"], 3),
            verse("rune", "The Rune Song", Tradition::Human, "human", &["burial", "tree_song"], 4),
            verse("writing", "The Writing Song", Tradition::Mixed, "mixed", &["ledger", "rune"], 4),
            verse("brew", "The Brewing Song", Tradition::Mixed, "mixed", &["grain", "pottery"], 3),
            verse("bake", "The Baking Song", Tradition::Human, "human", &["grain", "ember"], 2),
            verse("sourdough", "The Mother Song", Tradition::Mixed, "mixed", &["bake", "elder_song"], 4),
            verse("mead", "The Mead Song", Tradition::Mixed, "mixed", &["brew", "root"], 3),
        ],
        encounter_peoples: peoples(&["human"]),
        hidden: false,
        bridges: bridges(vec![
            ("iron", bridge(&["forge", "wall"], "Metal replaces stone. Power replaces song.")),
            (
                "ice",
                bridge(
                    &["glacier", "precession"],
                    "The long drift. The calendar says the ice is coming back.",
                ),
            ),
            (
                "bears",
                bridge(
                    &["bear", "temple"],
                    "You build a temple to the bear. The bear walks out of it, into the past.",
                ),
            ),
        ]),
        name_pool: names(&["Marjatta", "Pellervo", "Sampsa", "Ahti", "Tuoni", "Mielikki", "Tapio"]),
    });

    insert(EraDef {
        id: EraId::from("iron"),
        name: String::from("The Age of Iron"),
        desc: String::from(
            "Metal. Ships. Empires. Someone writes the Kalevala down. Someone bans the old songs.",
        ),
        years_bp: 3_000,
        start_people: PeopleId::from("human"),
        base_songs: songs(&[("lullaby", 0.8), ("root", 0.6), ("spark", 0.5), ("writing", 0.4)]),
        new_songs: vec![
            verse("sail", "The Sail Song", Tradition::Human, "human", &["sea_cross", "loom"], 3),
            verse("book", "The Book", Tradition::Human, "human", &["writing", "elder_song"], 3),
        ],
        encounter_peoples: peoples(&["human"]),
        hidden: false,
        bridges: bridges(vec![
            (
                "remembering",
                bridge(
                    &["book", "ban"],
                    "The ban creates the forgetting. The forgetting creates the remembering.",
                ),
            ),
            (
                "grain",
                bridge(&["ash_song", "seed_song"], "Back to the beginning of planting. Before walls."),
            ),
            ("bears", bridge(&["bear", "burial"], "You bury a bear with flowers. You follow it down.")),
        ]),
        name_pool: names(&["Elias", "Akseli", "Minna", "Johan", "Kristina", "Kaarle", "Aleksis"]),
    });

    insert(EraDef {
        id: EraId::from("remembering"),
        name: String::from("The Age of Remembering"),
        desc: String::from(
            "Someone finds a Neanderthal flute in a cave. Someone sequences Denisovan DNA. The old songs echo.",
        ),
        years_bp: 50,
        start_people: PeopleId::from("human"),
        base_songs: songs(&[("lullaby", 0.8), ("root", 0.6)]),
        new_songs: vec![
            verse("archaeology", "The Dig Song", Tradition::Human, "human", &["writing", "star_map"], 3),
            verse("genome", "The Blood Song", Tradition::Mixed, "mixed", &["archaeology", "deep_time"], 5),
            verse("revive", "The Revival Song", Tradition::Human, "human", &["archaeology", "elder_song"], 4),
        ],
        encounter_peoples: peoples(&["human"]),
        hidden: false,
        bridges: bridges(vec![
            (
                "stone",
                bridge(&["genome", "heartbeat"], "The DNA sings. You follow it back 1.8 million years."),
            ),
            (
                "meeting",
                bridge(
                    &["revive", "bone_flute"],
                    "The revived song remembers the age when everyone was here.",
                ),
            ),
            (
                "bears",
                bridge(&["genome", "bear"], "You read the bear genome. It reads you back. You are in the cave."),
            ),
            (
                "apocalypse",
                bridge(
                    &["cancel", "empire"],
                    "The tree becomes the Tech Tree. It grows until it blots out everything.",
                ),
            ),
        ]),
        name_pool: names(&KALEVALA_NAMES),
    });

    insert(EraDef {
        id: EraId::from("apocalypse"),
        name: String::from("The Age of the Tech Tree"),
        desc: String::from(
            "The tree is no longer a metaphor. It is the system. It grows exponentially. It has replaced the sun. You carved everything on it and now it is all there is.",
        ),
        years_bp: 0,
        start_people: PeopleId::from("human"),
        base_songs: songs(&[("algorithm", 0.9), ("platform", 0.7), ("writing", 0.5)]),
        new_songs: vec![verse(
            "last_song",
            "The Last Song",
            Tradition::Mixed,
            "mixed",
            &["genome", "bear_gift", "den_memory"],
            5,
        )],
        encounter_peoples: peoples(&["human"]),
        hidden: false,
        bridges: bridges(vec![
            (
                "bears",
                bridge(
                    &["last_song"],
                    "You fell the Tech Tree. In the ash, the bears are waiting. They always were.",
                ),
            ),
            (
                "stone",
                bridge(
                    &["genome", "heartbeat"],
                    "You strip it all back. Before writing. Before fire. The heartbeat.",
                ),
            ),
            (
                "remembering",
                bridge(&["revive"], "Not this time. You go back and try to remember harder."),
            ),
        ]),
        name_pool: names(&["User", "Admin", "Founder", "Investor", "Influencer", "Intern", "The-Algorithm"]),
    });

    table
}

// ---------------------------------------------------------------------------
// Apocalypses
// ---------------------------------------------------------------------------

/// How each era can end, keyed by the carved traditions that cause it.
pub(crate) fn apocalypses() -> Vec<ApocalypseDef> {
    vec![
        ApocalypseDef {
            name: String::from("The Burning"),
            desc: String::from(
                "Too many fire songs on the tree. The knowledge of flame becomes the flame itself.",
            ),
            traditions: vec![Tradition::Dwarf],
        },
        ApocalypseDef {
            name: String::from("The Freeze"),
            desc: String::from(
                "Too many stone and earth songs. The weight of knowledge crushes. The glacier comes.",
            ),
            traditions: vec![Tradition::Troll],
        },
        ApocalypseDef {
            name: String::from("The Drift"),
            desc: String::from(
                "Too many sky songs. The precession shifts. Everything built on the calendar collapses.",
            ),
            traditions: vec![Tradition::Elf],
        },
        ApocalypseDef {
            name: String::from("The Hollowing"),
            desc: String::from(
                "Too many shadow songs on the tree. The knowledge is all form and no foundation. The tree is hollow.",
            ),
            traditions: vec![Tradition::Shadow],
        },
        ApocalypseDef {
            name: String::from("The Confusion"),
            desc: String::from(
                "Too many songs from too many traditions. The tower of knowledge babels.",
            ),
            traditions: vec![Tradition::Mixed],
        },
        ApocalypseDef {
            name: String::from("The Return"),
            desc: String::from(
                "The shadows met their roots. The tree grows back from the inside. Not the same tree. A better one.",
            ),
            traditions: vec![Tradition::Redeemed],
        },
    ]
}

/// Pick the ending that best matches the carved traditions. Defaults to
/// The Confusion when nothing dominates.
pub fn determine_apocalypse<'a>(
    apocalypses: &'a [ApocalypseDef],
    carved_traditions: &BTreeMap<Tradition, usize>,
) -> Option<&'a ApocalypseDef> {
    let confusion = apocalypses.iter().find(|a| a.traditions == [Tradition::Mixed]);
    let mut best = confusion;
    let mut best_score = 0;
    for apoc in apocalypses {
        let score: usize =
            apoc.traditions.iter().map(|t| carved_traditions.get(t).copied().unwrap_or(0)).sum();
        if score > best_score {
            best_score = score;
            best = Some(apoc);
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Crossing montages
// ---------------------------------------------------------------------------

/// Narration for a specific crossing, if one is written.
pub fn montage(from: &str, to: &str) -> &'static [&'static str] {
    match (from, to) {
        ("bears", "stone") => &[
            "The last cave bear dies. But something walks upright into the den.",
            "It has no claws. No fur. But it has rhythm.",
        ],
        ("stone", "caves") => &[
            "1.5 million years. An ice age comes and goes and comes again.",
            "And then: footsteps in the cave mouth. Shorter. Stockier. Clever hands.",
        ],
        ("stone", "bears") => &[
            "You follow the oldest tracks backward. Past your own species.",
            "The cave smells of fur and salmon. You remember this place.",
        ],
        ("caves", "meeting") => &[
            "Two hundred and fifty thousand years.",
            "From the mountains: the hidden people. From the islands: the small ones.",
            "From the south: the singers. Everyone is here.",
        ],
        ("caves", "bears") => &[
            "The Bear Song opens the deepest chamber. You crawl through.",
            "On the other side, time runs differently. The bears are waiting.",
        ],
        ("meeting", "ice") => &[
            "The glacier descends. The old peoples fade.",
            "But their songs echo in your children.",
        ],
        ("meeting", "bears") => &[
            "The Bear Gift opens a door in time.",
            "You walk through it on all fours.",
        ],
        ("ice", "grain") => &[
            "The ice retreats. Someone plants a seed on purpose.",
            "The last Neanderthal died ten thousand years ago.",
            "But you still hum their songs when you knap a blade.",
        ],
        ("ice", "bears") => &[
            "You sleep like the bears. Months. Years. Eons.",
            "You wake in the deep time. The cave is warm.",
        ],
        ("grain", "iron") => &["Metal. Walls. Writing. Kings.", "The tree grows very large now."],
        ("grain", "bears") => &[
            "The temple to the bear opens downward. You descend.",
            "Below the foundations, below the bedrock: the dreaming.",
        ],
        ("iron", "remembering") => &[
            "Someone finds a flute in a cave. 40,000 years old.",
            "Someone sequences a genome. The ghost of the elves.",
            "Someone starts a revival. Someone cancels it.",
        ],
        ("iron", "bears") => &[
            "You bury a bear with flowers, like the dwarves taught.",
            "You follow it down into the earth. Into the long sleep.",
        ],
        ("remembering", "apocalypse") => &[
            "The tree is no longer wood. It is silicon. It is data.",
            "It grows exponentially. It has replaced the sun.",
            "The complexity itself is the killer.",
        ],
        ("remembering", "bears") => &[
            "You read the bear genome. It reads you back.",
            "The base pairs are a song. The oldest song.",
        ],
        ("apocalypse", "bears") => &[
            "You fell the Tech Tree. It takes everything with it.",
            "In the ash, fur. Warmth. The smell of salmon.",
            "The bears are waiting. They always were.",
        ],
        _ => &["The song carries you across."],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, VerseRegistry};

    #[test]
    fn every_bridge_target_exists() {
        let catalog = Catalog::standard();
        for era in catalog.eras().values() {
            for target in era.bridges.keys() {
                assert!(catalog.eras().contains_key(target.as_str()), "dangling bridge {target}");
            }
        }
    }

    #[test]
    fn bridge_requirements_resolve_after_full_journey() {
        let catalog = Catalog::standard();
        let all: Vec<EraId> = catalog.eras().keys().cloned().collect();
        let Some((current, visited)) = all.split_last() else {
            return;
        };
        let registry = VerseRegistry::for_journey(catalog.eras(), visited, current);
        for era in catalog.eras().values() {
            for (target, bridge) in &era.bridges {
                for req in &bridge.requires {
                    assert!(
                        registry.contains(req.as_str()),
                        "bridge {} -> {target} requires unknown verse {req}",
                        era.id
                    );
                }
            }
        }
    }

    #[test]
    fn only_the_bear_era_is_hidden() {
        let catalog = Catalog::standard();
        let hidden: Vec<&str> = catalog
            .eras()
            .values()
            .filter(|e| e.hidden)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(hidden, vec!["bears"]);
    }

    #[test]
    fn eras_run_from_deep_time_to_now() {
        let catalog = Catalog::standard();
        let bears = catalog.era("bears").map(|e| e.years_bp);
        let apoc = catalog.era("apocalypse").map(|e| e.years_bp);
        assert_eq!(bears, Some(2_500_000));
        assert_eq!(apoc, Some(0));
    }

    #[test]
    fn shadow_heavy_carving_ends_in_the_hollowing() {
        let apocs = apocalypses();
        let mut counts = BTreeMap::new();
        counts.insert(Tradition::Shadow, 4);
        counts.insert(Tradition::Human, 2);
        let Some(apoc) = determine_apocalypse(&apocs, &counts) else {
            return assert!(false, "no apocalypse");
        };
        assert_eq!(apoc.name, "The Hollowing");
    }

    #[test]
    fn empty_tree_ends_in_confusion() {
        let apocs = apocalypses();
        let Some(apoc) = determine_apocalypse(&apocs, &BTreeMap::new()) else {
            return assert!(false, "no apocalypse");
        };
        assert_eq!(apoc.name, "The Confusion");
    }
}
