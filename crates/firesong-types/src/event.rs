//! Structured turn events.
//!
//! Everything the simulation wants to tell the player is emitted as an
//! [`Event`] rather than printed directly. The engine stays silent; the
//! caller decides how to render. [`Event`] implements [`Display`] with the
//! canonical narration used by the CLI.
//!
//! [`Display`]: core::fmt::Display

use serde::{Deserialize, Serialize};

use crate::enums::Season;

/// Render a fidelity value as a whole percentage.
fn pct(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// A single reportable happening in the world.
///
/// Variants carry display names (already resolved against the catalog),
/// not raw identifiers, so rendering needs no further lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Event {
    /// A new season begins.
    SeasonBegins {
        /// The season now starting.
        season: Season,
        /// Year within the current era.
        year: u32,
        /// Years before present.
        years_bp: i64,
    },
    /// A person died of old age.
    Died {
        /// The deceased.
        name: String,
        /// Display names of the verses they carried.
        carried: Vec<String>,
    },
    /// A verse died with its only carrier.
    SoleCarrierLost {
        /// The deceased.
        name: String,
        /// The verse nobody else knows.
        verse: String,
    },
    /// A child was born.
    ChildBorn {
        /// The child's name.
        name: String,
        /// Blood traits deepened by the parents' shared songs.
        sunk_traits: Vec<String>,
    },
    /// A child was born of surplus, not season.
    SurplusBirth {
        /// The child's name.
        name: String,
    },
    /// A shadow accumulator passed the halfway mark.
    ShadowGrows {
        /// The shadow verse.
        shadow: String,
        /// Accumulator level, 0.0–1.0.
        level: f64,
    },
    /// A shadow crystallized into someone's memory.
    ShadowCrystallized {
        /// The shadow verse.
        shadow: String,
        /// Who now knows it.
        learner: String,
        /// Starting fidelity.
        fidelity: f64,
    },
    /// A redemption verse emerged from shadow meeting root.
    RedemptionEmerged {
        /// The redemption verse.
        verse: String,
        /// Who composed it.
        learner: String,
        /// Starting fidelity.
        fidelity: f64,
    },
    /// A mixed verse emerged from setlist adjacency.
    AdjacencyEmerged {
        /// The emerged verse.
        verse: String,
        /// Who heard it first.
        learner: String,
        /// The first of the adjacent pair.
        first: String,
        /// The second of the adjacent pair.
        second: String,
        /// Starting fidelity.
        fidelity: f64,
    },
    /// Someone's blood spontaneously recalled a verse fragment.
    BloodRemembered {
        /// Who remembered.
        name: String,
        /// The remembered verse.
        verse: String,
        /// Fidelity after remembering.
        fidelity: f64,
    },
    /// Seasonal food accounting.
    FoodTally {
        /// Food gathered this season.
        gathered: i64,
        /// People fed.
        mouths: i64,
        /// Food remaining after the season.
        food: i64,
    },
    /// Someone starved.
    Starved {
        /// The victim.
        name: String,
    },
    /// The tree's canopy is dimming the world.
    TreeShadesWorld {
        /// Remaining sunlight, 0.0–1.0.
        sunlight: f64,
    },
    /// A spirit raided the camp.
    SpiritRaid {
        /// The raiding spirit.
        spirit: String,
        /// Food lost to the raid.
        food_lost: i64,
    },
    /// A spirit killed someone.
    SpiritKill {
        /// The spirit.
        spirit: String,
        /// The victim.
        victim: String,
        /// Whether old blood sensed it coming, too late.
        sensed: bool,
    },
    /// A spirit's relationship has soured; its song must be sung.
    SpiritRestless {
        /// The spirit.
        spirit: String,
        /// The song that mends the relationship.
        song: String,
        /// Relationship score, 0.0–1.0.
        relationship: f64,
    },
    /// A starlit night deepened every held verse.
    StarlitNight {
        /// Fidelity boost applied to each held verse.
        boost: f64,
    },
    /// A starless night cost food and next season's singing time.
    StarlessNight {
        /// Food lost to cold.
        food_lost: i64,
    },
    /// Someone was lost to the dark.
    LostInTheDark {
        /// The victim.
        name: String,
    },
    /// An elder sang one last time before dying.
    LastTeaching {
        /// The dying elder.
        elder: String,
        /// The youth who listened.
        heir: String,
        /// Verses passed on.
        verses: Vec<String>,
    },
    /// Fire burned a carved verse off the tree.
    FireBurnsTree {
        /// The burned verse.
        verse: String,
    },
    /// Lightning struck; the fire spirit stirs.
    LightningStrike,
    /// The invisible one multiplied the food.
    YeastGift {
        /// Surplus food granted.
        food: i64,
    },
    /// The dog's presence drove an old-blood person away.
    DogDrivesOut {
        /// Who left.
        name: String,
        /// Display names of the verses that left with them.
        carried: Vec<String>,
    },
    /// A stranger appeared at the edge of camp.
    StrangerArrives {
        /// The stranger's name.
        name: String,
        /// The people they are identified as.
        people: String,
        /// Display names of the verses they seem to know.
        verses: Vec<String>,
    },
    /// A stranger joined the band.
    StrangerJoins {
        /// Their name.
        name: String,
        /// Their people.
        people: String,
        /// Verses they bring.
        verses: Vec<String>,
    },
    /// A stranger was turned away.
    StrangerLeaves {
        /// Their name.
        name: String,
    },
    /// Everyone is dead; the era can only end.
    BandGone,
    /// The sun is blocked and the food is gone.
    WorldDying,
    /// A verse was carved into the tree.
    Carved {
        /// The carver.
        name: String,
        /// The carved verse.
        verse: String,
        /// Tree height after carving.
        height: u32,
    },
    /// The canopy has begun to darken the sky.
    CanopyDarkens,
    /// The tree now blocks the sun entirely.
    SunBlocked,
    /// The tree was felled.
    TreeFelled {
        /// Height before felling.
        height: u32,
        /// Number of carved verses scattered.
        carved_count: usize,
    },
    /// A carved verse survived the felling as a fragment.
    FragmentScattered {
        /// The verse.
        verse: String,
        /// Fragment fidelity.
        fidelity: f64,
    },
    /// A verse is gone forever.
    VerseLostForever {
        /// The verse.
        verse: String,
    },
    /// A felled verse survives in living memory.
    SurvivesInMemory {
        /// The verse.
        verse: String,
        /// Who still carries it.
        carriers: Vec<String>,
    },
    /// A new verse grew from the ash of the felling.
    AshEmerges {
        /// The emerged verse.
        verse: String,
    },
    /// The sun returned after a felling.
    SunReturns {
        /// Total fellings so far.
        fellings: u32,
    },
    /// The felling disturbed every spirit.
    SpiritsDisturbed,
    /// Someone gathered a scattered fragment.
    FragmentGathered {
        /// Who gathered it.
        name: String,
        /// The verse.
        verse: String,
        /// Fragment fidelity.
        fidelity: f64,
    },
    /// Nobody could understand a fragment; it crumbled.
    FragmentCrumbles {
        /// The verse.
        verse: String,
    },
    /// Someone studied a verse out of the ash.
    AshStudied {
        /// The student.
        name: String,
        /// The verse.
        verse: String,
        /// Fidelity before.
        from: f64,
        /// Fidelity after.
        to: f64,
    },
    /// A focused apprenticeship session.
    Taught {
        /// The teacher.
        teacher: String,
        /// The student.
        student: String,
        /// The verse.
        verse: String,
        /// Student fidelity before.
        from: f64,
        /// Student fidelity after.
        to: f64,
        /// Whether the teacher's own version is garbled.
        garbled: bool,
    },
    /// The era ended and the band crossed a bridge.
    EraCrossed {
        /// The era left behind.
        from: String,
        /// The era arrived in.
        to: String,
        /// The bridge's narration.
        bridge: String,
        /// How many verses were carried across.
        songs_carried: usize,
    },
    /// How the era ended, read from what was carved.
    ApocalypseNamed {
        /// Name of the ending.
        name: String,
        /// Its narration.
        desc: String,
    },
    /// A hidden era became reachable.
    HiddenEraUnlocked {
        /// The era.
        era: String,
    },
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SeasonBegins { season, year, years_bp } => {
                write!(f, "── {season}, Year {year} ({years_bp} BP) ──")
            }
            Self::Died { name, carried } => {
                if carried.is_empty() {
                    write!(f, "{name} has died.")
                } else {
                    write!(f, "{name} has died. They carried: {}", carried.join(", "))
                }
            }
            Self::SoleCarrierLost { name, verse } => {
                write!(f, "\"{verse}\" dies with {name} — no one else knows it")
            }
            Self::ChildBorn { name, sunk_traits } => {
                if sunk_traits.is_empty() {
                    write!(f, "A child is born: {name}")
                } else {
                    write!(
                        f,
                        "A child is born: {name} — the songs sink into the blood ({})",
                        sunk_traits.join(", ")
                    )
                }
            }
            Self::SurplusBirth { name } => {
                write!(f, "The surplus feeds another mouth. {name} is born.")
            }
            Self::ShadowGrows { shadow, level } => {
                write!(f, "The shadow of \"{shadow}\" grows... ({}%)", pct(*level))
            }
            Self::ShadowCrystallized { shadow, learner, fidelity } => {
                write!(
                    f,
                    "A shadow falls. {learner} now knows \"{shadow}\" ({}%).",
                    pct(*fidelity)
                )
            }
            Self::RedemptionEmerged { verse, learner, fidelity } => {
                write!(
                    f,
                    "\"{verse}\" emerges — shadow meets its root. {learner} sings it at {}%.",
                    pct(*fidelity)
                )
            }
            Self::AdjacencyEmerged { verse, learner, first, second, fidelity } => {
                write!(
                    f,
                    "{learner} sings \"{first}\" into \"{second}\" and hears something new: \
                     \"{verse}\" ({}%, still forming)",
                    pct(*fidelity)
                )
            }
            Self::BloodRemembered { name, verse, fidelity } => {
                write!(
                    f,
                    "{name}'s blood remembers: \"{verse}\" ({}% — garbled, from the blood)",
                    pct(*fidelity)
                )
            }
            Self::FoodTally { gathered, mouths, food } => {
                write!(f, "Food: {food} (gathered {gathered}, fed {mouths})")
            }
            Self::Starved { name } => write!(f, "Starvation — {name} has starved."),
            Self::TreeShadesWorld { sunlight } => {
                write!(
                    f,
                    "The tree's shadow covers the world. Sunlight: {}%",
                    pct(*sunlight)
                )
            }
            Self::SpiritRaid { spirit, food_lost } => {
                write!(f, "The {spirit} raids the camp — {food_lost} food lost")
            }
            Self::SpiritKill { spirit, victim, sensed } => {
                if *sensed {
                    write!(f, "{victim} sensed the {spirit} but too late.")
                } else {
                    write!(f, "{victim} is killed by the {spirit}.")
                }
            }
            Self::SpiritRestless { spirit, song, relationship } => {
                write!(
                    f,
                    "The {spirit} is restless ({}%). Someone must sing \"{song}\" \
                     to mend the relationship.",
                    pct(*relationship)
                )
            }
            Self::StarlitNight { boost } => {
                write!(
                    f,
                    "The long dark comes. The stars are out. All songs strengthen (+{}%).",
                    pct(*boost)
                )
            }
            Self::StarlessNight { food_lost } => {
                write!(
                    f,
                    "The long dark. No stars to sing by. {food_lost} food lost to the cold; \
                     fewer songs next season."
                )
            }
            Self::LostInTheDark { name } => {
                write!(f, "{name} is lost in the dark. They don't come back.")
            }
            Self::LastTeaching { elder, heir, verses } => {
                write!(
                    f,
                    "{elder} sings one last time. {heir} listens. Passed on: {}",
                    verses.join(", ")
                )
            }
            Self::FireBurnsTree { verse } => {
                write!(f, "The fire reaches the tree. \"{verse}\" burns away.")
            }
            Self::LightningStrike => write!(f, "Lightning strikes. The fire spirit stirs."),
            Self::YeastGift { food } => {
                write!(
                    f,
                    "The invisible one stirs. The bread rises. The beer foams. (+{food} food)"
                )
            }
            Self::DogDrivesOut { name, carried } => {
                if carried.is_empty() {
                    write!(f, "{name} cannot bear the dog any longer. They leave.")
                } else {
                    write!(
                        f,
                        "{name} cannot bear the dog any longer. They leave, taking: {}",
                        carried.join(", ")
                    )
                }
            }
            Self::StrangerArrives { name, people, verses } => {
                write!(
                    f,
                    "A {people} approaches: {name}. They seem to know: {}",
                    verses.join(", ")
                )
            }
            Self::StrangerJoins { name, people, verses } => {
                write!(
                    f,
                    "{name} the {people} joins the band. They bring: {}",
                    verses.join(", ")
                )
            }
            Self::StrangerLeaves { name } => {
                write!(f, "{name} disappears into the landscape. Their songs go with them.")
            }
            Self::BandGone => write!(f, "The band is gone. The songs fall silent."),
            Self::WorldDying => {
                write!(f, "The tree has killed the sun. Fell it, or cross a bridge.")
            }
            Self::Carved { name, verse, height } => {
                write!(f, "{name} carves \"{verse}\" into the tree. Height: {height}")
            }
            Self::CanopyDarkens => write!(f, "The tree's canopy darkens the sky..."),
            Self::SunBlocked => {
                write!(f, "The tree blocks the sun — the world grows cold and nothing grows")
            }
            Self::TreeFelled { height, carved_count } => {
                write!(
                    f,
                    "The tree is felled. Height was {height}; {carved_count} carved verses scatter."
                )
            }
            Self::FragmentScattered { verse, fidelity } => {
                write!(f, "Fragment found: \"{verse}\" ({}% intact)", pct(*fidelity))
            }
            Self::VerseLostForever { verse } => {
                write!(f, "\"{verse}\" is lost — it was only on the tree")
            }
            Self::SurvivesInMemory { verse, carriers } => {
                write!(f, "\"{verse}\" survives in memory ({})", carriers.join(", "))
            }
            Self::AshEmerges { verse } => {
                write!(f, "From the ash, something new grows: \"{verse}\"")
            }
            Self::SunReturns { fellings } => {
                write!(f, "The sun returns. Fellings: {fellings}")
            }
            Self::SpiritsDisturbed => {
                write!(f, "The spirits stir uneasily. The felling disturbs the land.")
            }
            Self::FragmentGathered { name, verse, fidelity } => {
                write!(f, "{name} gathers fragment: \"{verse}\" ({}%)", pct(*fidelity))
            }
            Self::FragmentCrumbles { verse } => {
                write!(
                    f,
                    "No one can understand the fragment of \"{verse}\". It crumbles."
                )
            }
            Self::AshStudied { name, verse, from, to } => {
                write!(
                    f,
                    "{name} kneels in the ash and begins to understand \"{verse}\": \
                     {}% → {}%",
                    pct(*from),
                    pct(*to)
                )
            }
            Self::Taught { teacher, student, verse, from, to, garbled } => {
                if *garbled {
                    write!(
                        f,
                        "{teacher} teaches {student} a garbled version of \"{verse}\": \
                         {}% → {}%",
                        pct(*from),
                        pct(*to)
                    )
                } else {
                    write!(
                        f,
                        "{teacher} teaches {student} \"{verse}\": {}% → {}%",
                        pct(*from),
                        pct(*to)
                    )
                }
            }
            Self::EraCrossed { from, to, bridge, songs_carried } => {
                write!(
                    f,
                    "{from} ends. {bridge} Songs carried forward: {songs_carried}. \
                     {to} begins."
                )
            }
            Self::ApocalypseNamed { name, desc } => write!(f, "── {name} ── {desc}"),
            Self::HiddenEraUnlocked { era } => {
                write!(f, "{era} is now reachable. You have tended its song across the ages.")
            }
        }
    }
}
