//! Derived per-object records handed to the packaging layer.
//!
//! Everything here is a projection of the finished graph: resolved
//! transitions (toward / away / timed), computed depth and craftability,
//! a short tech-tree summary, and the recipe payload when there is one.

use crate::config::EngineConfig;
use crate::graph::CraftGraph;
use crate::id::{ObjectId, TransitionKey};
use crate::recipe::{ExportedRecipe, Recipe};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTransition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_actor_uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_actor_weight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_target_uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_target_weight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_actor_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_target_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_extra_target_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_player: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_remains: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<String>,
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub move_type: Option<i32>,
}

/// Project one transition, annotating how the endpoints' use counters
/// change.
pub fn export_transition(graph: &CraftGraph, key: TransitionKey) -> ExportedTransition {
    let transition = &graph.transitions[key];
    let mut out = ExportedTransition::default();

    if let Some(actor) = graph.objects.get(&transition.actor_id) {
        out.actor_id = Some(actor.id);
        if actor.data.num_uses > 1 || graph.is_category(actor.id) {
            if transition.last_use_actor || transition.actor_min_use_fraction == 1 {
                let maxed = transition.reverse_use_actor || transition.actor_min_use_fraction == 1;
                out.actor_uses = Some(if maxed { "max" } else { "last" }.to_string());
                if transition.reverse_use_actor && actor.data.use_chance < 1.0 {
                    out.new_actor_weight = Some(actor.data.use_chance);
                }
            } else if transition
                .apply_actor_use(actor, graph.objects.get(&transition.new_actor_id))
            {
                out.new_actor_uses =
                    Some(if transition.reverse_use_actor { "+1" } else { "-1" }.to_string());
                if actor.data.use_chance < 1.0 {
                    out.new_actor_weight = Some(actor.data.use_chance);
                }
            }
        } else if transition.reverse_use_actor {
            out.new_actor_uses = Some("last".to_string());
        }
    }

    if let Some(target) = graph.objects.get(&transition.target_id) {
        out.target_id = Some(target.id);
        if target.data.num_uses > 1 || graph.is_category(target.id) {
            if transition.last_use_target || transition.target_min_use_fraction == 1 {
                let maxed =
                    transition.reverse_use_target || transition.target_min_use_fraction == 1;
                out.target_uses = Some(if maxed { "max" } else { "last" }.to_string());
                if transition.reverse_use_target && target.data.use_chance < 1.0 {
                    out.new_target_weight = Some(target.data.use_chance);
                }
            } else if transition
                .apply_target_use(target, graph.objects.get(&transition.new_target_id))
            {
                out.new_target_uses =
                    Some(if transition.reverse_use_target { "+1" } else { "-1" }.to_string());
                if target.data.use_chance < 1.0 {
                    out.new_target_weight = Some(target.data.use_chance);
                }
            }
        } else if transition.reverse_use_target {
            out.new_target_uses = Some("last".to_string());
        }
    }

    out.new_actor_id = graph.objects.get(&transition.new_actor_id).map(|o| o.id);
    out.new_target_id = graph.objects.get(&transition.new_target_id).map(|o| o.id);
    out.new_extra_target_id = transition
        .new_extra_target_id
        .and_then(|id| graph.objects.get(&id))
        .map(|o| o.id);

    if let Some(weight) = transition.new_actor_weight {
        out.new_actor_weight = Some(weight);
    }
    if let Some(weight) = transition.new_target_weight {
        out.new_target_weight = Some(weight);
    }

    if transition.targets_player(graph) {
        out.target_player = Some(true);
    }
    if transition.target_remains {
        out.target_remains = Some(true);
    }
    if transition.hand(graph) {
        out.hand = Some(true);
    }
    if transition.tool {
        out.tool = Some(true);
    }
    out.decay = transition.decay.clone();
    if transition.move_type > 0 {
        out.move_type = Some(transition.move_type);
    }

    out
}

// ---------------------------------------------------------------------------
// Tech tree summary
// ---------------------------------------------------------------------------

/// A shallow ancestry sketch shown next to the full recipe: the primary
/// producer's actor/target (and decay), a few levels deep.
#[derive(Debug, Serialize)]
pub struct TechTreeNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<TechTreeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<String>,
}

/// `None` marks a leaf (natural or producerless); an empty list marks a
/// branch cut off by the level budget.
pub fn tech_tree_nodes(graph: &CraftGraph, id: ObjectId, levels: u32) -> Option<Vec<TechTreeNode>> {
    let object = graph.objects.get(&id)?;
    let &first = object.transitions_toward.first()?;
    if object.is_natural() {
        return None;
    }
    if levels == 0 {
        return Some(Vec::new());
    }
    let transition = &graph.transitions[first];
    let mut nodes = Vec::new();
    if let Some(decay) = &transition.decay {
        nodes.push(TechTreeNode {
            id: None,
            nodes: None,
            decay: Some(decay.clone()),
        });
    }
    for endpoint in [transition.actor_id, transition.target_id] {
        if graph.objects.contains_key(&endpoint) {
            nodes.push(TechTreeNode {
                id: Some(endpoint),
                nodes: tech_tree_nodes(graph, endpoint, levels - 1),
                decay: None,
            });
        }
    }
    Some(nodes)
}

// ---------------------------------------------------------------------------
// Per-object record
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBiomeSpawn {
    pub id: String,
    pub spawn_chance: f32,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedObject {
    pub id: ObjectId,
    pub name: String,
    pub transitions_toward: Vec<ExportedTransition>,
    pub transitions_away: Vec<ExportedTransition>,
    pub transitions_timed: Vec<ExportedTransition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_value: Option<[i32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat_value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_uses: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_chance: Option<f32>,
    pub craftable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clothing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insulation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadly_distance: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_distance: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_chance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biomes: Option<Vec<ExportedBiomeSpawn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_slots: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pickup_age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mult: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks_walking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sounds: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_distance: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_tree: Option<Vec<TechTreeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<ExportedRecipe>,
}

/// Build the full derived record for one object, recipe included.
pub fn export_object(graph: &CraftGraph, config: &EngineConfig, id: ObjectId) -> ExportedObject {
    let object = &graph.objects[&id];
    let data = &object.data;

    let timed: Vec<TransitionKey> = object
        .transitions_away
        .iter()
        .copied()
        .filter(|&key| graph.transitions[key].decay.is_some())
        .collect();
    let away: Vec<TransitionKey> = object
        .transitions_away
        .iter()
        .copied()
        .filter(|&key| graph.transitions[key].decay.is_none())
        .collect();

    let mut out = ExportedObject {
        id: object.id,
        name: object.name.clone(),
        transitions_toward: object
            .transitions_toward
            .iter()
            .map(|&key| export_transition(graph, key))
            .collect(),
        transitions_away: away
            .iter()
            .map(|&key| export_transition(graph, key))
            .collect(),
        transitions_timed: timed
            .iter()
            .map(|&key| export_transition(graph, key))
            .collect(),
        craftable: object.depth.craftable,
        ..ExportedObject::default()
    };

    if data.food_value[0] > 0 {
        out.food_value = Some(data.food_value);
    }
    if data.heat_value > 0 {
        out.heat_value = Some(data.heat_value);
    }
    if data.num_uses > 1 {
        out.num_uses = Some(data.num_uses);
        if data.use_chance != 1.0 {
            out.use_chance = Some(data.use_chance);
        }
    }
    if object.depth.craftable {
        out.depth = Some(object.depth.difficulty);
    }

    if data.clothing != "n" {
        out.clothing = Some(data.clothing.clone());
        out.insulation = Some(object.insulation());
    } else if data.r_value > 0.0 && (data.floor == 1 || data.blocks_walking == 1) {
        out.insulation = Some(data.r_value as f64);
    }

    if graph.is_deadly(id) {
        out.deadly_distance = Some(data.deadly_distance);
    }
    if data.use_distance > 1 && data.deadly_distance > 1 {
        out.use_distance = Some(data.use_distance);
    }

    if data.map_chance > 0.0 {
        out.map_chance = Some(data.map_chance);
        out.biomes = Some(
            object
                .biomes
                .iter()
                .filter_map(|&index| graph.biomes.get(index))
                .map(|biome| ExportedBiomeSpawn {
                    id: biome.id.clone(),
                    spawn_chance: biome.spawn_chance(&graph.objects, object),
                })
                .collect(),
        );
    }

    if data.num_slots > 0 {
        out.num_slots = Some(data.num_slots);
        out.slot_size = Some(data.slot_size);
    }
    if data.containable == 1 {
        out.size = Some(data.contain_size);
    }
    if object.can_pickup() {
        out.min_pickup_age = Some(if data.min_pickup_age > 0 {
            data.min_pickup_age
        } else {
            3
        });
    }
    if data.speed_mult != 1.0 {
        out.speed_mult = Some(data.speed_mult);
    }
    if data.blocks_walking == 1 {
        out.blocks_walking = Some(true);
    }

    let sounds = object.sounds();
    if !sounds.is_empty() {
        out.sounds = Some(sounds);
    }

    if let Some(mover) = object
        .transitions_away
        .iter()
        .map(|&key| &graph.transitions[key])
        .find(|t| t.move_type > 0)
    {
        out.move_type = Some(mover.move_type);
        out.move_distance = Some(mover.desired_move_dist);
    }

    out.tech_tree = tech_tree_nodes(graph, id, 3);

    let recipe = Recipe::generate(graph, config, id);
    if recipe.has_data() {
        out.recipe = Some(recipe.json_data(graph));
    }

    out
}
