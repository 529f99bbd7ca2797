//! Object badges: one-line annotations shown on catalog entries.
//!
//! Each badge is a descriptor — key, predicate, optional value formatter —
//! evaluated uniformly over filterable objects. Values are loosely typed
//! (numbers or display strings), so they surface as JSON values.

use craftgraph_core::config::EngineConfig;
use craftgraph_core::graph::CraftGraph;
use craftgraph_core::id::ObjectId;
use craftgraph_core::object::GameObject;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub struct BadgeDef {
    pub key: &'static str,
    pub matches: fn(&CraftGraph, &GameObject) -> bool,
    pub value: Option<fn(&CraftGraph, &EngineConfig, &GameObject) -> Value>,
}

pub const BADGES: &[BadgeDef] = &[
    BadgeDef { key: "clothing", matches: clothing, value: Some(clothing_value) },
    BadgeDef { key: "food", matches: food, value: Some(food_value) },
    BadgeDef { key: "tool", matches: tool, value: Some(tool_value) },
    BadgeDef { key: "container", matches: container, value: Some(container_value) },
    BadgeDef { key: "water", matches: water, value: Some(water_value) },
    BadgeDef { key: "heat", matches: heat, value: Some(heat_value) },
    BadgeDef { key: "natural", matches: natural, value: None },
];

fn clothing(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_clothing()
}

fn clothing_value(_: &CraftGraph, _: &EngineConfig, object: &GameObject) -> Value {
    let percent = (object.insulation() * 10000.0).round() / 100.0;
    Value::from(format!("{}%", trim_number(percent)))
}

fn food(_: &CraftGraph, object: &GameObject) -> bool {
    object.data.food_value[0] > 0
}

fn food_value(_: &CraftGraph, config: &EngineConfig, object: &GameObject) -> Value {
    let total = object.data.food_value[0] + object.data.food_value[1] + config.food_bonus;
    if object.data.num_uses > 1 {
        Value::from(format!("{total} x {}", object.data.num_uses))
    } else {
        Value::from(total)
    }
}

fn tool(graph: &CraftGraph, object: &GameObject) -> bool {
    graph.is_tool(object.id)
}

fn tool_value(_: &CraftGraph, _: &EngineConfig, object: &GameObject) -> Value {
    if object.data.num_uses <= 1 {
        return Value::Null;
    }
    if object.data.use_chance != 1.0 {
        let effective =
            (object.data.num_uses - 1) as f64 * (1.0 / object.data.use_chance as f64) + 1.0;
        return Value::from(format!("~{}", trim_number(effective)));
    }
    Value::from(object.data.num_uses)
}

fn container(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_craftable_container()
}

fn container_value(_: &CraftGraph, _: &EngineConfig, object: &GameObject) -> Value {
    Value::from(object.data.num_slots)
}

fn water(graph: &CraftGraph, object: &GameObject) -> bool {
    graph.is_water_source(object.id)
}

fn water_value(_: &CraftGraph, _: &EngineConfig, object: &GameObject) -> Value {
    if object.data.num_uses > 1 {
        Value::from(object.data.num_uses)
    } else {
        Value::from("")
    }
}

fn heat(_: &CraftGraph, object: &GameObject) -> bool {
    object.data.heat_value > 0
}

fn heat_value(_: &CraftGraph, _: &EngineConfig, object: &GameObject) -> Value {
    Value::from(object.data.heat_value)
}

fn natural(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_natural()
}

/// Render a number the way loosely typed display code does: no trailing
/// ".0" on whole values.
fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Serialize)]
pub struct ExportedBadge {
    pub ids: Vec<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

/// Evaluate every badge over the filterable objects.
pub fn build_badges(
    graph: &CraftGraph,
    config: &EngineConfig,
) -> BTreeMap<&'static str, ExportedBadge> {
    let filterable: Vec<&GameObject> = graph
        .objects
        .values()
        .filter(|o| graph.can_filter(o.id))
        .collect();
    BADGES
        .iter()
        .map(|badge| {
            let matching: Vec<&GameObject> = filterable
                .iter()
                .copied()
                .filter(|o| (badge.matches)(graph, o))
                .collect();
            let values = badge
                .value
                .map(|value| matching.iter().map(|o| value(graph, config, o)).collect());
            let ids = matching.iter().map(|o| o.id).collect();
            (badge.key, ExportedBadge { ids, values })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftgraph_core::depth;
    use craftgraph_core::test_utils::*;
    use craftgraph_core::test_utils::natural;

    fn sample_graph() -> CraftGraph {
        let mut hat = object(1, "Wool Hat");
        hat.data.clothing = "h".to_string();
        hat.data.r_value = 0.8;
        let mut berry = natural(2, "Berry");
        berry.data.food_value = [4, 1];
        berry.data.num_uses = 3;
        let mut axe = object(3, "Axe");
        axe.data.num_uses = 10;
        axe.data.use_chance = 0.5;
        let mut fire = object(4, "Fire");
        fire.data.heat_value = 6;
        let mut graph = build_graph(
            vec![hat, berry, axe, fire, natural(5, "Reed"), object(6, "Stump")],
            vec![
                transition(5, 5, "0 1"),
                transition(5, 5, "0 3"),
                transition(5, 5, "0 4"),
                transition(3, 6, "3 0"),
                transition(5, 5, "0 6"),
            ],
        );
        depth::calculate(&mut graph);
        graph
    }

    #[test]
    fn badges_collect_ids_and_values() {
        let graph = sample_graph();
        let badges = build_badges(&graph, &EngineConfig::default());

        assert_eq!(badges["clothing"].ids, vec![oid(1)]);
        assert_eq!(
            badges["clothing"].values.as_ref().unwrap()[0],
            Value::from("20%")
        );

        assert_eq!(badges["food"].ids, vec![oid(2)]);
        assert_eq!(badges["food"].values.as_ref().unwrap()[0], Value::from("5 x 3"));

        assert_eq!(badges["heat"].ids, vec![oid(4)]);
        assert_eq!(badges["heat"].values.as_ref().unwrap()[0], Value::from(6));

        assert_eq!(badges["natural"].ids, vec![oid(2), oid(5)]);
        assert!(badges["natural"].values.is_none());
    }

    #[test]
    fn tool_badge_estimates_effective_uses() {
        let graph = sample_graph();
        let badges = build_badges(&graph, &EngineConfig::default());
        assert_eq!(badges["tool"].ids, vec![oid(3)]);
        // 9 uses at 50% chance plus the guaranteed last one.
        assert_eq!(badges["tool"].values.as_ref().unwrap()[0], Value::from("~19"));
    }

    #[test]
    fn food_badge_applies_the_configured_bonus() {
        let graph = sample_graph();
        let config = EngineConfig {
            food_bonus: 2,
            ..EngineConfig::default()
        };
        let badges = build_badges(&graph, &config);
        assert_eq!(badges["food"].values.as_ref().unwrap()[0], Value::from("7 x 3"));
    }
}
