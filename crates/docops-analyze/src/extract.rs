//! Rule-based text heuristics.
//!
//! Everything in here is total: any input text produces a value, and an empty
//! or unrecognizable document simply yields the most conservative answer
//! (`other`, `Unknown`, `medium`, empty entity lists).

pub mod classify;
pub mod entities;
pub mod routing;

pub use classify::detect_document_type;
pub use entities::extract_entities;
pub use routing::{detect_owner_team, detect_priority};
