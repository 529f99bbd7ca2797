//! One crafting/use rule: an actor object applied to a target object.
//!
//! A transition record's filename encodes the id pair plus an optional
//! last-use marker; the body is a fixed positional field list. Everything
//! else (tool/targetRemains flags, the decay display string, generic and
//! attack classification) is derived.

use crate::depth::Depth;
use crate::graph::CraftGraph;
use crate::id::ObjectId;
use crate::object::GameObject;
use tracing::warn;

/// Errors for transition records that cannot be decoded at all. Anything
/// less than this is defaulted field-by-field.
#[derive(Debug, thiserror::Error)]
pub enum TransitionParseError {
    #[error("transition filename '{0}' does not encode an id pair")]
    BadFilename(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub actor_id: ObjectId,
    pub target_id: ObjectId,
    pub new_actor_id: ObjectId,
    pub new_target_id: ObjectId,
    /// Extra produced object, synthesized by attack merging and global
    /// trigger wiring.
    pub new_extra_target_id: Option<ObjectId>,
    pub last_use_actor: bool,
    pub last_use_target: bool,
    pub auto_decay_seconds: i32,
    pub actor_min_use_fraction: i32,
    pub target_min_use_fraction: i32,
    pub reverse_use_actor: bool,
    pub reverse_use_target: bool,
    pub move_type: i32,
    pub desired_move_dist: i32,
    pub no_use_actor: bool,
    pub no_use_target: bool,
    pub player_actor: bool,
    /// Actor persists unchanged across the transition.
    pub tool: bool,
    /// Target persists unchanged across the transition.
    pub target_remains: bool,
    /// Human-readable decay time ("2h", "5m", "30s"), when timed.
    pub decay: Option<String>,
    pub new_actor_weight: Option<f32>,
    pub new_target_weight: Option<f32>,
    pub depth: Depth,
}

impl Transition {
    /// Decode a transition from its filename (`<actor>_<target>[_LA|_LT|_L].txt`)
    /// and positional body.
    pub fn parse(filename: &str, body: &str) -> Result<Transition, TransitionParseError> {
        let stem = filename.split('.').next().unwrap_or(filename);
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 2 {
            return Err(TransitionParseError::BadFilename(filename.to_string()));
        }
        let actor_id: ObjectId = parts[0]
            .parse()
            .map_err(|_| TransitionParseError::BadFilename(filename.to_string()))?;
        let target_id: ObjectId = parts[1]
            .parse()
            .map_err(|_| TransitionParseError::BadFilename(filename.to_string()))?;
        let suffix = parts.get(2).copied().unwrap_or("");
        let last_use_actor = suffix == "LA";
        let last_use_target = suffix == "LT" || suffix == "L";

        let fields: Vec<&str> = body.split_whitespace().collect();
        let field = |index: usize| fields.get(index).copied().unwrap_or("");
        // Min-use fractions truncate like the original's integer parse of a
        // float field ("1.0" reads as 1).
        let int_field = |index: usize| field(index).parse::<f32>().unwrap_or(0.0) as i32;
        let flag = |index: usize| field(index) == "1";

        let new_actor_id: ObjectId = field(0).parse().unwrap_or(ObjectId::PLAYER);
        let new_target_id: ObjectId = field(1).parse().unwrap_or(ObjectId::PLAYER);
        let auto_decay_seconds = int_field(2);
        let move_type = int_field(7);
        if auto_decay_seconds > 0 && move_type > 0 {
            warn!(file = %filename, "timed transition carries a move field");
        }

        let tool = actor_id.0 >= 0 && actor_id == new_actor_id;
        let target_remains = target_id.0 >= 0 && target_id == new_target_id;

        Ok(Transition {
            actor_id,
            target_id,
            new_actor_id,
            new_target_id,
            new_extra_target_id: None,
            last_use_actor,
            last_use_target,
            auto_decay_seconds,
            actor_min_use_fraction: int_field(3),
            target_min_use_fraction: int_field(4),
            reverse_use_actor: flag(5),
            reverse_use_target: flag(6),
            move_type,
            desired_move_dist: if int_field(8) == 0 { 1 } else { int_field(8) },
            no_use_actor: flag(9),
            no_use_target: flag(10),
            player_actor: actor_id == ObjectId::PLAYER,
            tool,
            target_remains,
            decay: calculate_decay(auto_decay_seconds),
            new_actor_weight: None,
            new_target_weight: None,
            depth: Depth::default(),
        })
    }

    /// Recompute the persistence flags after a merge pass rewrote the
    /// outcome ids.
    pub fn refresh_remains_flags(&mut self) {
        self.tool = self.actor_id.0 >= 0 && self.actor_id == self.new_actor_id;
        self.target_remains = self.target_id.0 >= 0 && self.target_id == self.new_target_id;
    }

    /// Applies regardless of target and changes the actor: merged into
    /// matching concrete transitions rather than standing alone.
    pub fn is_generic(&self) -> bool {
        self.target_id == ObjectId::EMPTY
            && self.new_target_id == ObjectId::PLAYER
            && self.actor_id != self.new_actor_id
    }

    /// Tool-style match: this transition keeps using the generic's actor on
    /// a real target.
    pub fn matches_generic_actor(&self, generic: &Transition) -> bool {
        self.actor_id == generic.actor_id && self.tool && self.target_id.0 > 0
    }

    /// Hand-off match: this transition's target becomes the generic's actor.
    pub fn matches_generic_target(&self, generic: &Transition) -> bool {
        if generic.last_use_actor && !self.last_use_target {
            return false;
        }
        self.target_id == generic.actor_id && self.target_remains && self.actor_id.0 > 0
    }

    pub fn matches_generic_transition(&self, generic: &Transition) -> bool {
        self.matches_generic_actor(generic) || self.matches_generic_target(generic)
    }

    pub fn is_last_use(&self) -> bool {
        self.last_use_actor || self.last_use_target
    }

    /// Whether the rule acts on the player (a direct attack, or food applied
    /// to any target).
    pub fn targets_player(&self, graph: &CraftGraph) -> bool {
        if self.target_id == ObjectId::PLAYER {
            return true;
        }
        self.target_id == ObjectId::EMPTY
            && graph
                .objects
                .get(&self.actor_id)
                .is_some_and(|actor| actor.data.food_value[0] > 0)
    }

    /// Decay seconds scaled across the whole stack when the rule only fires
    /// on the target's last use.
    pub fn total_decay_seconds(&self, graph: &CraftGraph) -> i64 {
        let seconds = self.auto_decay_seconds as i64;
        if seconds > 0 && self.last_use_target {
            if let Some(target) = graph.objects.get(&self.target_id) {
                if target.data.num_uses > 1 {
                    return seconds * target.data.num_uses as i64;
                }
            }
        }
        seconds
    }

    /// Whether the actor's use counter decrements across this transition.
    pub fn apply_actor_use(&self, actor: &GameObject, new_actor: Option<&GameObject>) -> bool {
        !self.no_use_actor
            && (self.tool
                || new_actor.is_some_and(|n| n.data.num_uses == actor.data.num_uses))
    }

    /// Whether the target's use counter decrements across this transition.
    pub fn apply_target_use(&self, target: &GameObject, new_target: Option<&GameObject>) -> bool {
        !self.no_use_target
            && (self.target_remains
                || new_target.is_some_and(|n| n.data.num_uses == target.data.num_uses))
    }

    /// Whether the rule is something a player performs by hand, as opposed
    /// to a timed decay or an autonomous mover.
    pub fn hand(&self, graph: &CraftGraph) -> bool {
        if self.decay.is_some() {
            return false;
        }
        if self.player_actor {
            return true;
        }
        match graph.objects.get(&self.actor_id) {
            Some(actor) => !(graph.can_move(actor.id) || actor.is_global_trigger()),
            None => true,
        }
    }

    /// Combined depth of the resolvable endpoints, or `None` while any of
    /// them is uncraftable.
    pub fn total_depth(&self, graph: &CraftGraph) -> Option<f64> {
        let mut total = 0.0;
        for id in [self.actor_id, self.target_id] {
            if let Some(object) = graph.objects.get(&id) {
                total += object.depth.value()?;
            }
        }
        Some(total)
    }
}

/// Render decay seconds for display: negative encodes hours, multiples of
/// 60 encode minutes.
pub fn calculate_decay(seconds: i32) -> Option<String> {
    if seconds < 0 {
        return Some(format!("{}h", -seconds));
    }
    if seconds > 0 && seconds % 60 == 0 {
        return Some(format!("{}m", seconds / 60));
    }
    if seconds > 0 {
        return Some(format!("{seconds}s"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_body() {
        let t = Transition::parse("5_12.txt", "20 0 30 5 0 0 0 0 1 0").unwrap();
        assert_eq!(t.actor_id, ObjectId(5));
        assert_eq!(t.target_id, ObjectId(12));
        assert_eq!(t.new_actor_id, ObjectId(20));
        assert_eq!(t.new_target_id, ObjectId(0));
        assert_eq!(t.auto_decay_seconds, 30);
        assert_eq!(t.decay.as_deref(), Some("30s"));
        assert_eq!(t.actor_min_use_fraction, 5);
        assert!(!t.tool);
        assert!(!t.target_remains);
        assert!(!t.player_actor);
        assert_eq!(t.desired_move_dist, 1);
        assert!(!t.no_use_actor);
        assert!(!t.no_use_target);
    }

    #[test]
    fn no_use_flags_parse() {
        let t = Transition::parse("5_12.txt", "20 0 0 0 0 0 0 0 0 1 1").unwrap();
        assert!(t.no_use_actor);
        assert!(t.no_use_target);
    }

    #[test]
    fn short_body_defaults() {
        let t = Transition::parse("3_4.txt", "3 4").unwrap();
        assert!(t.tool);
        assert!(t.target_remains);
        assert_eq!(t.auto_decay_seconds, 0);
        assert_eq!(t.decay, None);
        assert_eq!(t.desired_move_dist, 1);
        assert!(!t.no_use_actor);
    }

    #[test]
    fn last_use_suffixes() {
        assert!(Transition::parse("1_2_LA.txt", "0 0").unwrap().last_use_actor);
        assert!(Transition::parse("1_2_LT.txt", "0 0").unwrap().last_use_target);
        assert!(Transition::parse("1_2_L.txt", "0 0").unwrap().last_use_target);
        let plain = Transition::parse("1_2.txt", "0 0").unwrap();
        assert!(!plain.is_last_use());
    }

    #[test]
    fn negative_actor_id_parses() {
        let t = Transition::parse("-1_14.txt", "0 15 20").unwrap();
        assert_eq!(t.actor_id, ObjectId::EMPTY);
        assert_eq!(t.target_id, ObjectId(14));
        assert_eq!(t.decay.as_deref(), Some("20s"));
        assert!(!t.tool, "empty actor is never a tool");
    }

    #[test]
    fn bad_filename_is_an_error() {
        assert!(Transition::parse("notes.txt", "0 0").is_err());
        assert!(Transition::parse("a_b.txt", "0 0").is_err());
    }

    #[test]
    fn generic_classification() {
        let generic = Transition::parse("7_-1.txt", "8 0").unwrap();
        assert!(generic.is_generic());
        // Unchanged actor is not generic.
        let passive = Transition::parse("7_-1.txt", "7 0").unwrap();
        assert!(!passive.is_generic());
        // A real new target is not generic.
        let placing = Transition::parse("7_-1.txt", "8 9").unwrap();
        assert!(!placing.is_generic());
    }

    #[test]
    fn generic_matching() {
        let generic = Transition::parse("7_-1.txt", "8 0").unwrap();
        let tool_use = Transition::parse("7_20.txt", "7 21").unwrap();
        assert!(tool_use.matches_generic_actor(&generic));
        assert!(tool_use.matches_generic_transition(&generic));

        let hand_off = Transition::parse("30_7.txt", "31 7").unwrap();
        assert!(hand_off.matches_generic_target(&generic));

        // Player-actor transitions never match the tool pattern.
        let bare = Transition::parse("0_20.txt", "0 21").unwrap();
        assert!(!bare.matches_generic_transition(&generic));
    }

    #[test]
    fn last_use_generic_requires_last_use_target_match() {
        let mut generic = Transition::parse("7_-1.txt", "8 0").unwrap();
        generic.last_use_actor = true;
        let hand_off = Transition::parse("30_7.txt", "31 7").unwrap();
        assert!(!hand_off.matches_generic_target(&generic));
        let last_use_hand_off = Transition::parse("30_7_LT.txt", "31 7").unwrap();
        assert!(last_use_hand_off.matches_generic_target(&generic));
    }

    #[test]
    fn min_use_fraction_truncates_like_the_original() {
        let t = Transition::parse("1_2.txt", "0 0 0 1.0 0.5").unwrap();
        assert_eq!(t.actor_min_use_fraction, 1);
        assert_eq!(t.target_min_use_fraction, 0);
    }

    #[test]
    fn decay_formats() {
        assert_eq!(calculate_decay(-2).as_deref(), Some("2h"));
        assert_eq!(calculate_decay(120).as_deref(), Some("2m"));
        assert_eq!(calculate_decay(45).as_deref(), Some("45s"));
        assert_eq!(calculate_decay(60).as_deref(), Some("1m"));
        assert_eq!(calculate_decay(0), None);
    }
}
