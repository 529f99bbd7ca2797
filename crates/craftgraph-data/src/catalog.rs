//! The object catalog: the one summary payload listing every visible
//! object, plus the filters, badges and biome tables the browsing UI needs.

use crate::badges::{self, ExportedBadge};
use crate::filters::{self, ExportedFilter};
use craftgraph_core::biome::ExportedBiome;
use craftgraph_core::config::EngineConfig;
use craftgraph_core::export::{self, ExportedObject};
use craftgraph_core::graph::CraftGraph;
use craftgraph_core::id::ObjectId;
use craftgraph_core::object::GameObject;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCatalog {
    pub ids: Vec<ObjectId>,
    pub names: Vec<String>,
    pub difficulties: Vec<Option<String>>,
    pub num_slots: Vec<i32>,
    pub craftable: Vec<bool>,
    pub filters: BTreeMap<&'static str, ExportedFilter>,
    pub badges: BTreeMap<&'static str, ExportedBadge>,
    pub biome_ids: Vec<String>,
    pub biome_names: Vec<Option<&'static str>>,
    pub food_eat_bonus: i32,
}

/// Assemble the catalog over visible objects, newest (highest id) first.
pub fn build_catalog(graph: &CraftGraph, config: &EngineConfig) -> ObjectCatalog {
    let mut visible: Vec<&GameObject> = graph
        .objects
        .values()
        .filter(|o| graph.is_visible(o.id))
        .collect();
    visible.sort_by_key(|o| o.sort_weight());

    let mut catalog = ObjectCatalog {
        ids: Vec::with_capacity(visible.len()),
        names: Vec::with_capacity(visible.len()),
        difficulties: Vec::with_capacity(visible.len()),
        num_slots: Vec::with_capacity(visible.len()),
        craftable: Vec::with_capacity(visible.len()),
        filters: filters::build_filters(graph),
        badges: badges::build_badges(graph, config),
        biome_ids: graph.biomes.iter().map(|b| b.id.clone()).collect(),
        biome_names: graph.biomes.iter().map(|b| b.name()).collect(),
        food_eat_bonus: config.food_bonus,
    };
    for object in visible {
        catalog.ids.push(object.id);
        catalog.names.push(object.name.clone());
        catalog.difficulties.push(object.difficulty());
        catalog.num_slots.push(object.num_slots());
        catalog.craftable.push(object.craftable());
    }
    catalog
}

/// Derive the full per-object records. With the `parallel` feature the
/// fan-out runs on rayon; generation only reads the finished graph, so the
/// per-object work is independent.
pub fn export_objects(
    graph: &CraftGraph,
    config: &EngineConfig,
) -> Vec<(ObjectId, ExportedObject)> {
    let ids: Vec<ObjectId> = graph.objects.keys().copied().collect();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        ids.par_iter()
            .map(|&id| (id, export::export_object(graph, config, id)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        ids.iter()
            .map(|&id| (id, export::export_object(graph, config, id)))
            .collect()
    }
}

/// Derive the per-biome records.
pub fn export_biomes(graph: &CraftGraph) -> Vec<ExportedBiome> {
    graph
        .biomes
        .iter()
        .map(|biome| biome.json_data(&graph.objects))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftgraph_core::depth;
    use craftgraph_core::test_utils::*;

    fn sample_graph() -> CraftGraph {
        let mut stone = natural(30, "Stone");
        stone.data.num_slots = 0;
        let sharp = object(31, "Sharp Stone");
        let mut basket = object(32, "Basket");
        basket.data.num_slots = 4;
        basket.data.slot_size = 1.0;
        let mut graph = build_graph(
            vec![stone, sharp, basket, object(40, "Relic")],
            vec![transition(30, 30, "30 31"), transition(31, 30, "0 32")],
        );
        depth::calculate(&mut graph);
        graph
    }

    #[test]
    fn catalog_lists_visible_objects_newest_first() {
        let graph = sample_graph();
        let catalog = build_catalog(&graph, &EngineConfig::default());
        assert_eq!(catalog.ids, vec![oid(40), oid(32), oid(31), oid(30)]);
        assert_eq!(catalog.names[3], "Stone");
        assert_eq!(catalog.num_slots, vec![0, 4, 0, 0]);
        assert_eq!(catalog.craftable, vec![false, true, true, true]);
        // Naturals sit at difficulty zero, rendered as no difficulty.
        assert_eq!(catalog.difficulties[3], None);
        assert_eq!(catalog.difficulties[2].as_deref(), Some("1.00"));
        assert_eq!(catalog.difficulties[1].as_deref(), Some("2.00"));
        assert_eq!(catalog.food_eat_bonus, 0);
    }

    #[test]
    fn category_objects_are_hidden() {
        let mut parent = object(500, "@Stones");
        parent.category = Some(0);
        let graph = craftgraph_core::graph::GraphBuilder::new().build(
            object_map(vec![parent, object(1, "Stone")]),
            vec![category(500, &[1])],
            Vec::new(),
        );
        let catalog = build_catalog(&graph, &EngineConfig::default());
        assert_eq!(catalog.ids, vec![oid(1)]);
    }

    #[test]
    fn export_objects_covers_the_whole_map() {
        let graph = sample_graph();
        let exported = export_objects(&graph, &EngineConfig::default());
        assert_eq!(exported.len(), graph.objects.len());
        let basket = exported
            .iter()
            .find(|(id, _)| *id == oid(32))
            .map(|(_, payload)| payload)
            .unwrap();
        assert_eq!(basket.num_slots, Some(4));
        assert!(basket.recipe.is_some());
    }
}
