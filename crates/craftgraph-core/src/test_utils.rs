//! Shorthand builders for graph-shaped tests. Compiled for this crate's own
//! tests and exported to downstream crates behind the `test-utils` feature.

use crate::category::Category;
use crate::graph::{CraftGraph, GraphBuilder};
use crate::id::ObjectId;
use crate::object::GameObject;
use crate::transition::Transition;
use std::collections::BTreeMap;

pub fn oid(raw: i32) -> ObjectId {
    ObjectId(raw)
}

pub fn object(id: i32, name: &str) -> GameObject {
    GameObject::new(ObjectId(id), name)
}

/// An object with a map-spawn chance, i.e. a depth-zero natural.
pub fn natural(id: i32, name: &str) -> GameObject {
    let mut object = GameObject::new(ObjectId(id), name);
    object.data.map_chance = 1.0;
    object
}

/// A transition from a synthetic `<actor>_<target>.txt` record.
pub fn transition(actor: i32, target: i32, body: &str) -> Transition {
    Transition::parse(&format!("{actor}_{target}.txt"), body).expect("test transition")
}

/// Same, with a last-use suffix (`LA`, `LT` or `L`).
pub fn transition_suffixed(actor: i32, target: i32, suffix: &str, body: &str) -> Transition {
    Transition::parse(&format!("{actor}_{target}_{suffix}.txt"), body).expect("test transition")
}

pub fn category(parent: i32, members: &[i32]) -> Category {
    Category {
        parent_id: ObjectId(parent),
        member_ids: members.iter().map(|&m| ObjectId(m)).collect(),
        member_weights: Vec::new(),
        pattern: false,
        prob_set: false,
        resolved_members: members.iter().map(|&m| ObjectId(m)).collect(),
    }
}

pub fn pattern_category(parent: i32, members: &[i32]) -> Category {
    let mut category = category(parent, members);
    category.pattern = true;
    category
}

pub fn prob_category(parent: i32, members: &[(i32, f32)]) -> Category {
    let mut result = category(parent, &members.iter().map(|&(m, _)| m).collect::<Vec<_>>());
    result.prob_set = true;
    result.member_weights = members.iter().map(|&(_, w)| w).collect();
    result
}

pub fn object_map(objects: Vec<GameObject>) -> BTreeMap<ObjectId, GameObject> {
    objects.into_iter().map(|o| (o.id, o)).collect()
}

/// Wire objects and transitions into a graph, skipping the category and
/// merge passes.
pub fn build_graph(objects: Vec<GameObject>, transitions: Vec<Transition>) -> CraftGraph {
    let mut builder = GraphBuilder::new();
    for transition in transitions {
        builder.add(transition);
    }
    builder.build(object_map(objects), Vec::new(), Vec::new())
}
