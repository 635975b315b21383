//! Simulation errors.

use thiserror::Error;

/// Why a player action was refused. The world state is untouched when one
/// of these is returned.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The verse id matches nothing in the registry.
    #[error("unknown verse: {0}")]
    UnknownVerse(String),

    /// Nobody in the band holds the verse above the lost threshold.
    #[error("no one knows \"{0}\"")]
    VerseUnknownToBand(String),

    /// The verse is already on the tree.
    #[error("\"{0}\" is already carved on the tree")]
    AlreadyCarved(String),

    /// Carving needs a singer at 70%+ who also knows the carving song.
    #[error("no one knows \"{0}\" well enough and holds the carving song")]
    NoQualifiedCarver(String),

    /// There is no tree to fell.
    #[error("there is no tree to fell")]
    TreeNotGrown,

    /// Felling needs someone who knows blade singing.
    #[error("no one knows blade singing well enough to fell the tree")]
    NoFeller,

    /// Nothing to gather.
    #[error("no fragments to gather")]
    NoFragments,

    /// No stranger is waiting.
    #[error("there is no one at the edge of camp")]
    NoEncounter,

    /// The verse never emerged from the ash.
    #[error("\"{0}\" has not emerged from the ash")]
    NotInAsh(String),

    /// Nobody qualifies to study the ash verse.
    #[error("no one has the prerequisite songs to study \"{0}\"")]
    NoQualifiedStudent(String),

    /// No band member with that name.
    #[error("no one named \"{0}\" in the band")]
    NoSuchPerson(String),

    /// The teacher does not hold the verse.
    #[error("{teacher} doesn't know \"{verse}\"")]
    TeacherLacksVerse {
        /// The would-be teacher.
        teacher: String,
        /// The verse they lack.
        verse: String,
    },

    /// Youth cannot teach.
    #[error("{0} is too young to teach")]
    TooYoungToTeach(String),

    /// The student lacks the verse's prerequisites.
    #[error("{student} lacks the prerequisite songs for \"{verse}\"")]
    MissingPrerequisites {
        /// The student.
        student: String,
        /// The verse being taught.
        verse: String,
    },

    /// No bridge leads from the current era to the named one.
    #[error("no bridge to {0} from here")]
    NoBridge(String),

    /// The bridge exists but its songs are not carved or known.
    #[error("the bridge to {era} requires: {requires}")]
    BridgeNotMet {
        /// Destination era.
        era: String,
        /// Display names of the missing requirements.
        requires: String,
    },

    /// The era id matches nothing in the catalog.
    #[error("unknown era: {0}")]
    UnknownEra(String),
}

/// Why a snapshot could not be saved or loaded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON for the current state shape.
    #[error("snapshot parse: {0}")]
    Parse(#[from] serde_json::Error),
}
