use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;
use std::str::FromStr;

new_key_type! {
    /// Identifies a transition in the graph arena.
    pub struct TransitionKey;
}

/// Identifies a game object. Ids come straight from the data mod's record
/// filenames; two values are sentinels rather than real objects.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(pub i32);

impl ObjectId {
    /// The player, appearing as actor (bare hand) or target (attack) of a
    /// transition.
    pub const PLAYER: ObjectId = ObjectId(0);

    /// The universal placeholder: an empty hand, an empty tile, or "any
    /// target" on generic transitions.
    pub const EMPTY: ObjectId = ObjectId(-1);

    /// Whether this id can refer to an actual object record.
    pub fn is_concrete(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ObjectId)
    }
}
