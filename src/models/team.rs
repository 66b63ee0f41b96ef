//! Team registry entries: the id to name roster the engine consumes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in slots, matches and standings).
pub type TeamId = Uuid;

/// A registered team: the roster is the only team data this engine owns.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub id: TeamId,
    pub name: String,
}

impl TeamEntry {
    /// Create a new roster entry with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
