//! Shared type definitions for the Firesong simulation.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the Firesong workspace.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe catalog-key wrappers for all entity identifiers
//! - [`enums`] -- Seasons, life stages, fidelity bands, traditions
//! - [`event`] -- Structured turn events with canonical narration

pub mod enums;
pub mod event;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{AgeClass, FidelityBand, Season, Tradition};
pub use event::Event;
pub use ids::{EraId, PeopleId, SpiritId, TraitId, VerseId};
