//! Transition graph construction.
//!
//! [`GraphBuilder`] owns the flat transition list while category expansion
//! and the merge passes reshape it; [`CraftGraph`] is the finished arena —
//! objects keyed by id, transitions in a slotmap, adjacency stored as key
//! lists on the objects. The pass order matters: category splitting, then
//! pattern splitting, then generic merging, then attack merging, then
//! wiring and global triggers.

use crate::category::Category;
use crate::id::{ObjectId, TransitionKey};
use crate::object::GameObject;
use crate::transition::Transition;
use slotmap::SlotMap;
use std::collections::BTreeMap;
use tracing::warn;

/// Ids of the water-pouch pair used to recognize water sources.
const EMPTY_WATER_POUCH: ObjectId = ObjectId(209);
const FULL_WATER_POUCH: ObjectId = ObjectId(210);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitRole {
    Actor,
    Target,
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Accumulates raw transitions and runs the expansion/merge passes over
/// them before they are wired into objects.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    pub transitions: Vec<Transition>,
}

impl GraphBuilder {
    pub fn new() -> GraphBuilder {
        GraphBuilder {
            transitions: Vec::new(),
        }
    }

    pub fn add(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Expand every category reference into concrete transitions: ordinary
    /// categories first (actor pass, then target pass, per category), then
    /// pattern categories, then removal of transitions still referencing a
    /// pattern parent that is itself a pure category object.
    pub fn split_categories(
        &mut self,
        categories: &[Category],
        objects: &BTreeMap<ObjectId, GameObject>,
    ) {
        for category in categories.iter().filter(|c| !c.pattern) {
            self.split_category(category, SplitRole::Actor);
            self.split_category(category, SplitRole::Target);
        }

        let pattern: Vec<&Category> = categories.iter().filter(|c| c.pattern).collect();
        // Newly produced transitions are revisited; they no longer
        // reference a pattern parent, so the pass converges.
        let mut index = 0;
        while index < self.transitions.len() {
            self.split_pattern_categories(index, &pattern);
            index += 1;
        }

        self.clean_up_pattern_categories(categories, objects);
    }

    fn split_category(&mut self, category: &Category, role: SplitRole) {
        let old = std::mem::take(&mut self.transitions);
        let mut result: Vec<Transition> = Vec::new();

        for transition in &old {
            let (current_id, new_id) = match role {
                SplitRole::Actor => (transition.actor_id, transition.new_actor_id),
                SplitRole::Target => (transition.target_id, transition.new_target_id),
            };
            if current_id != category.parent_id && new_id != category.parent_id {
                result.push(transition.clone());
                continue;
            }
            for &member in &category.member_ids {
                let mut split = transition.clone();
                if current_id == category.parent_id {
                    match role {
                        SplitRole::Actor => split.actor_id = member,
                        SplitRole::Target => split.target_id = member,
                    }
                }
                if new_id == category.parent_id {
                    match role {
                        SplitRole::Actor => split.new_actor_id = member,
                        SplitRole::Target => split.new_target_id = member,
                    }
                }
                if category.prob_set {
                    let weight = category.member_weight(member);
                    match role {
                        SplitRole::Actor => split.new_actor_weight = weight,
                        SplitRole::Target => split.new_target_weight = weight,
                    }
                }
                if find_duplicate(&old, &split).is_none() {
                    result.push(split);
                }
            }
        }
        self.transitions = result;
    }

    /// Pattern categories align positionally: each referenced pattern
    /// category must have the same member count, and one concrete transition
    /// is produced per index, substituting every referenced role at once.
    /// A count mismatch voids the expansion for this transition.
    fn split_pattern_categories(&mut self, index: usize, pattern: &[&Category]) {
        let base = self.transitions[index].clone();
        let roles = [
            base.actor_id,
            base.target_id,
            base.new_actor_id,
            base.new_target_id,
        ];
        let categories: Vec<Option<&Category>> = roles
            .iter()
            .map(|id| pattern.iter().copied().find(|c| c.parent_id == *id))
            .collect();

        // Only actor/target references trigger an expansion.
        if categories[0].is_none() && categories[1].is_none() {
            return;
        }
        let count = categories
            .iter()
            .copied()
            .flatten()
            .next()
            .expect("checked above")
            .member_ids
            .len();
        if categories
            .iter()
            .copied()
            .flatten()
            .any(|c| c.member_ids.len() != count)
        {
            return;
        }

        for i in 0..count {
            let mut split = base.clone();
            for (role, category) in categories.iter().enumerate() {
                let Some(category) = category else { continue };
                let member = category.member_ids[i];
                match role {
                    0 => split.actor_id = member,
                    1 => split.target_id = member,
                    2 => split.new_actor_id = member,
                    _ => split.new_target_id = member,
                }
            }
            if find_duplicate(&self.transitions, &split).is_none() {
                self.transitions.push(split);
            }
        }
    }

    /// Drop transitions still naming a pattern parent whose parent object is
    /// a true category object (not a displayable item).
    fn clean_up_pattern_categories(
        &mut self,
        categories: &[Category],
        objects: &BTreeMap<ObjectId, GameObject>,
    ) {
        let removable: Vec<ObjectId> = categories
            .iter()
            .filter(|c| c.pattern && object_is_category(objects, categories, c.parent_id))
            .map(|c| c.parent_id)
            .collect();
        for parent in removable {
            self.transitions.retain(|t| {
                t.actor_id != parent
                    && t.target_id != parent
                    && t.new_actor_id != parent
                    && t.new_target_id != parent
            });
        }
    }

    /// Fold generic transitions (target −1, actor changes) into every
    /// matching concrete transition. Non-last-use generics rewrite their
    /// matches in place; last-use generics are cloned once per match so the
    /// unmerged outcome survives. A generic with no match stands alone.
    pub fn merge_generic_transitions(&mut self) {
        let len = self.transitions.len();
        let mut dropped = vec![false; len];
        let mut clones_at: Vec<Vec<Transition>> = (0..len).map(|_| Vec::new()).collect();

        for g in 0..len {
            if !self.transitions[g].is_generic() {
                continue;
            }
            let generic = self.transitions[g].clone();
            let matches: Vec<usize> = (0..len)
                .filter(|&i| i != g && self.transitions[i].matches_generic_transition(&generic))
                .collect();
            if matches.is_empty() {
                continue;
            }
            dropped[g] = true;

            for &m in &matches {
                if generic.last_use_actor {
                    let mut clone = generic.clone();
                    let other = &self.transitions[m];
                    if other.matches_generic_actor(&generic) {
                        clone.target_id = other.target_id;
                        clone.new_target_id = other.new_target_id;
                        clone.target_remains = other.target_remains;
                    } else {
                        clone.target_id = clone.actor_id;
                        clone.new_target_id = clone.new_actor_id;
                        clone.target_remains = clone.tool;
                        clone.actor_id = other.actor_id;
                        clone.new_actor_id = other.new_actor_id;
                        clone.tool = other.tool;
                    }
                    clones_at[g].push(clone);
                } else if self.transitions[m].matches_generic_actor(&generic) {
                    let other = &mut self.transitions[m];
                    other.new_actor_id = generic.new_actor_id;
                    other.tool = generic.tool;
                } else {
                    let other = &mut self.transitions[m];
                    other.new_target_id = generic.new_actor_id;
                    other.target_remains = generic.tool;
                }
            }
        }

        let old = std::mem::take(&mut self.transitions);
        for (i, transition) in old.into_iter().enumerate() {
            if dropped[i] {
                self.transitions.append(&mut clones_at[i]);
            } else {
                self.transitions.push(transition);
            }
        }
    }

    /// Rewrite player-targeting attack transitions. Without a last-use
    /// sibling the attack yields a fresh grave; with one, the attack's
    /// outcome mirrors the sibling's. Last-use attack transitions are
    /// absorbed and removed.
    pub fn merge_attack_transitions(&mut self, grave_id: ObjectId) {
        let len = self.transitions.len();
        for i in 0..len {
            let transition = &self.transitions[i];
            if transition.target_id != ObjectId::PLAYER || transition.is_last_use() {
                continue;
            }
            let actor_id = transition.actor_id;
            let last_use_actor = (0..len).find(|&j| {
                j != i
                    && self.transitions[j].actor_id == actor_id
                    && self.transitions[j].last_use_actor
            });
            let last_use_target = (0..len).find(|&j| {
                j != i
                    && self.transitions[j].actor_id == actor_id
                    && self.transitions[j].last_use_target
            });

            if last_use_actor.is_none() && last_use_target.is_none() {
                // Animal attack: nothing wears out, someone ends up buried.
                let transition = &mut self.transitions[i];
                if transition.new_target_id == ObjectId::PLAYER {
                    transition.new_target_id = grave_id;
                    transition.target_remains = false;
                } else {
                    transition.new_extra_target_id = Some(grave_id);
                }
                continue;
            }

            let extra = last_use_target
                .map(|j| self.transitions[j].new_target_id)
                .unwrap_or(self.transitions[i].new_target_id);
            let source = last_use_actor.or(last_use_target).expect("one exists");
            let new_actor_id = self.transitions[source].new_actor_id;
            let new_target_id = self.transitions[source].new_target_id;

            let transition = &mut self.transitions[i];
            transition.new_extra_target_id = Some(extra);
            transition.new_actor_id = new_actor_id;
            transition.new_target_id = new_target_id;
            transition.refresh_remains_flags();
        }

        self.transitions
            .retain(|t| !(t.target_id == ObjectId::PLAYER && t.is_last_use()));
    }

    /// Move the finished transition list into an arena and wire adjacency.
    pub fn build(
        self,
        objects: BTreeMap<ObjectId, GameObject>,
        categories: Vec<Category>,
        biomes: Vec<crate::biome::Biome>,
    ) -> CraftGraph {
        let mut graph = CraftGraph {
            objects,
            transitions: SlotMap::with_key(),
            categories,
            biomes,
        };
        let keys: Vec<TransitionKey> = self
            .transitions
            .into_iter()
            .map(|t| graph.transitions.insert(t))
            .collect();
        for key in keys {
            graph.wire(key);
        }
        graph.add_global_triggers();
        graph
    }
}

fn has_weight(weight: Option<f32>) -> bool {
    weight.is_some_and(|w| w != 0.0)
}

/// Duplicate rule for category splitting: weighted transitions compare the
/// full id quad; unweighted ones compare the actor/target pair plus the
/// last-use flags.
fn find_duplicate<'a>(list: &'a [Transition], candidate: &Transition) -> Option<&'a Transition> {
    list.iter().find(|t| {
        if has_weight(candidate.new_actor_weight) || has_weight(candidate.new_target_weight) {
            t.actor_id == candidate.actor_id
                && t.target_id == candidate.target_id
                && t.new_actor_id == candidate.new_actor_id
                && t.new_target_id == candidate.new_target_id
        } else {
            t.actor_id == candidate.actor_id
                && t.target_id == candidate.target_id
                && t.last_use_actor == candidate.last_use_actor
                && t.last_use_target == candidate.last_use_target
        }
    })
}

fn object_is_category(
    objects: &BTreeMap<ObjectId, GameObject>,
    categories: &[Category],
    id: ObjectId,
) -> bool {
    let Some(object) = objects.get(&id) else {
        return false;
    };
    object
        .category
        .is_some_and(|index| categories.get(index).is_some_and(|c| !c.pattern))
        || object.name.starts_with('@')
}

// ---------------------------------------------------------------------------
// CraftGraph
// ---------------------------------------------------------------------------

/// The finished object/transition graph. Objects own their adjacency as
/// transition-key lists; the arena owns the transitions.
#[derive(Debug)]
pub struct CraftGraph {
    pub objects: BTreeMap<ObjectId, GameObject>,
    pub transitions: SlotMap<TransitionKey, Transition>,
    pub categories: Vec<Category>,
    pub biomes: Vec<crate::biome::Biome>,
}

impl CraftGraph {
    /// Link one transition into the adjacency lists of every object it
    /// references. Idempotent: the same transition is visited from multiple
    /// roles, and a producer link is skipped when the object already holds
    /// the transition as a consumer link.
    fn wire(&mut self, key: TransitionKey) {
        let (endpoints, products) = {
            let t = &self.transitions[key];
            (
                [t.actor_id, t.target_id],
                [
                    Some(t.new_actor_id),
                    Some(t.new_target_id),
                    t.new_extra_target_id,
                ],
            )
        };

        for id in endpoints {
            match self.objects.get_mut(&id) {
                Some(object) => {
                    if !object.transitions_away.contains(&key) {
                        object.transitions_away.push(key);
                    }
                }
                None if id.is_concrete() => {
                    warn!(object = %id, "transition references unknown object, edge dropped");
                }
                None => {}
            }
        }
        for id in products.into_iter().flatten() {
            match self.objects.get_mut(&id) {
                Some(object) => {
                    if !object.transitions_away.contains(&key)
                        && !object.transitions_toward.contains(&key)
                    {
                        object.transitions_toward.push(key);
                    }
                }
                None if id.is_concrete() => {
                    warn!(object = %id, "transition produces unknown object, edge dropped");
                }
                None => {}
            }
        }
    }

    /// Wire `>`-named trigger receivers to their `*`-named transmitters by
    /// injecting the trigger as an extra product of every transition that
    /// produces the transmitter.
    fn add_global_triggers(&mut self) {
        let triggers: Vec<ObjectId> = self
            .objects
            .values()
            .filter(|o| o.is_global_trigger())
            .map(|o| o.id)
            .collect();
        for trigger in triggers {
            let transmitter_name = self.objects[&trigger].transmitter_name();
            let transmitters: Vec<ObjectId> = self
                .objects
                .values()
                .filter(|o| o.name.contains(&transmitter_name))
                .map(|o| o.id)
                .collect();
            for transmitter in transmitters {
                let keys = self.objects[&transmitter].transitions_toward.clone();
                for key in keys {
                    self.transitions[key].new_extra_target_id = Some(trigger);
                    self.wire(key);
                }
            }
        }
    }

    // -- Predicates needing adjacency or category context --

    /// A pure category object: a non-pattern category parent, or an object
    /// named with the `@` category convention.
    pub fn is_category(&self, id: ObjectId) -> bool {
        object_is_category(&self.objects, &self.categories, id)
    }

    pub fn is_visible(&self, id: ObjectId) -> bool {
        !self.is_category(id)
    }

    pub fn can_move(&self, id: ObjectId) -> bool {
        self.away(id).any(|t| t.move_type > 0)
    }

    pub fn is_tool(&self, id: ObjectId) -> bool {
        self.away(id)
            .any(|t| t.actor_id == id && self.objects.contains_key(&t.target_id) && t.tool)
    }

    pub fn is_water_source(&self, id: ObjectId) -> bool {
        self.away(id).any(|t| {
            t.actor_id == EMPTY_WATER_POUCH
                && t.new_actor_id == FULL_WATER_POUCH
                && t.target_id == id
                && (t.tool || t.target_remains)
        })
    }

    pub fn has_sick_transition(&self, id: ObjectId) -> bool {
        let object = &self.objects[&id];
        object
            .transitions_away
            .iter()
            .chain(object.transitions_toward.iter())
            .any(|&key| {
                let t = &self.transitions[key];
                t.target_id == ObjectId::PLAYER
                    && self
                        .objects
                        .get(&t.new_target_id)
                        .is_some_and(|n| n.name.contains(" sick"))
            })
    }

    pub fn is_deadly(&self, id: ObjectId) -> bool {
        self.objects[&id].data.deadly_distance > 0 && !self.has_sick_transition(id)
    }

    pub fn can_filter(&self, id: ObjectId) -> bool {
        let object = &self.objects[&id];
        object.depth.craftable && !object.is_global_trigger()
    }

    fn away(&self, id: ObjectId) -> impl Iterator<Item = &Transition> {
        self.objects[&id]
            .transitions_away
            .iter()
            .map(|&key| &self.transitions[key])
    }
}

// ===========================================================================
// Tests
// ===========================================================================
