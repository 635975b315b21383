//! Type-safe identifier wrappers around catalog keys.
//!
//! Every catalog entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. IDs are short stable
//! strings (`"ember"`, `"craft_blood"`, `"iron"`) defined by the catalog,
//! not generated at runtime. They name things, they do not number them.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a catalog key string with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from a catalog key.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// View the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(String::from(raw))
            }
        }

        // Lets `BTreeMap<$name, _>` and `BTreeSet<$name>` be queried by `&str`.
        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier for a verse: a named piece of singable knowledge.
    VerseId
}

define_id! {
    /// Identifier for a blood trait: heritage on a generational timescale.
    TraitId
}

define_id! {
    /// Identifier for a spirit: a force of the world with a relationship score.
    SpiritId
}

define_id! {
    /// Identifier for an era: a node in the era graph.
    EraId
}

define_id! {
    /// Identifier for a people: a folklore label matched against blood patterns.
    PeopleId
}
