//! The object filter tree: browsable groupings over filterable objects.
//!
//! Filters are a static descriptor table — key, display name, predicate,
//! children — evaluated uniformly over every craftable, non-trigger object.

use craftgraph_core::graph::CraftGraph;
use craftgraph_core::id::ObjectId;
use craftgraph_core::object::GameObject;
use serde::Serialize;
use std::collections::BTreeMap;

pub struct FilterDef {
    pub key: &'static str,
    pub name: &'static str,
    pub matches: fn(&CraftGraph, &GameObject) -> bool,
    pub children: &'static [FilterDef],
}

pub const FILTERS: &[FilterDef] = &[
    FilterDef {
        key: "clothing",
        name: "Clothing",
        matches: clothing,
        children: &[
            FilterDef { key: "head", name: "Head", matches: clothing_head, children: &[] },
            FilterDef { key: "top", name: "Top", matches: clothing_top, children: &[] },
            FilterDef { key: "pack", name: "Pack", matches: clothing_pack, children: &[] },
            FilterDef { key: "bottom", name: "Bottom", matches: clothing_bottom, children: &[] },
            FilterDef { key: "shoe", name: "Shoe", matches: clothing_shoe, children: &[] },
        ],
    },
    FilterDef { key: "food", name: "Food", matches: food, children: &[] },
    FilterDef { key: "tools", name: "Tools", matches: tools, children: &[] },
    FilterDef {
        key: "containers",
        name: "Containers",
        matches: containers,
        children: &[
            FilterDef { key: "small", name: "Small", matches: containers_small, children: &[] },
            FilterDef { key: "large", name: "Large", matches: containers_large, children: &[] },
            FilterDef {
                key: "extra_large",
                name: "Extra Large",
                matches: containers_extra_large,
                children: &[],
            },
            FilterDef {
                key: "other",
                name: "Other Sizes",
                matches: containers_other,
                children: &[],
            },
        ],
    },
    FilterDef { key: "heat", name: "Heat Sources", matches: heat_sources, children: &[] },
    FilterDef { key: "water", name: "Water Sources", matches: water_sources, children: &[] },
    FilterDef { key: "natural", name: "Natural", matches: natural, children: &[] },
];

fn clothing(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_clothing()
}

fn clothing_piece(object: &GameObject, piece: &str) -> bool {
    object.is_clothing() && object.data.clothing == piece
}

fn clothing_head(_: &CraftGraph, object: &GameObject) -> bool {
    clothing_piece(object, "h")
}

fn clothing_top(_: &CraftGraph, object: &GameObject) -> bool {
    clothing_piece(object, "t")
}

fn clothing_pack(_: &CraftGraph, object: &GameObject) -> bool {
    clothing_piece(object, "p")
}

fn clothing_bottom(_: &CraftGraph, object: &GameObject) -> bool {
    clothing_piece(object, "b")
}

fn clothing_shoe(_: &CraftGraph, object: &GameObject) -> bool {
    clothing_piece(object, "s")
}

fn food(_: &CraftGraph, object: &GameObject) -> bool {
    object.data.food_value[0] > 0
}

fn tools(graph: &CraftGraph, object: &GameObject) -> bool {
    graph.is_tool(object.id)
}

fn containers(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_craftable_container()
}

fn containers_small(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_craftable_container() && object.data.slot_size == 1.0
}

fn containers_large(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_craftable_container() && object.data.slot_size == 2.0
}

fn containers_extra_large(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_craftable_container() && object.data.slot_size == 3.0
}

fn containers_other(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_craftable_container()
        && !(object.data.slot_size == 1.0
            || object.data.slot_size == 2.0
            || object.data.slot_size == 3.0)
}

fn heat_sources(_: &CraftGraph, object: &GameObject) -> bool {
    object.data.heat_value > 0
}

fn water_sources(graph: &CraftGraph, object: &GameObject) -> bool {
    graph.is_water_source(object.id)
}

fn natural(_: &CraftGraph, object: &GameObject) -> bool {
    object.is_natural()
}

#[derive(Debug, Serialize)]
pub struct ExportedFilter {
    pub key: &'static str,
    pub name: &'static str,
    pub path: String,
    pub ids: Vec<ObjectId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub subfilters: BTreeMap<&'static str, ExportedFilter>,
}

/// Populate the filter tree over every filterable object.
pub fn build_filters(graph: &CraftGraph) -> BTreeMap<&'static str, ExportedFilter> {
    let filterable: Vec<&GameObject> = graph
        .objects
        .values()
        .filter(|o| graph.can_filter(o.id))
        .collect();
    FILTERS
        .iter()
        .map(|def| (def.key, build_filter(graph, &filterable, def, "/filter")))
        .collect()
}

fn build_filter(
    graph: &CraftGraph,
    filterable: &[&GameObject],
    def: &FilterDef,
    parent_path: &str,
) -> ExportedFilter {
    let path = format!("{parent_path}/{}", def.key);
    let ids = filterable
        .iter()
        .filter(|o| (def.matches)(graph, o))
        .map(|o| o.id)
        .collect();
    let subfilters = def
        .children
        .iter()
        .map(|child| (child.key, build_filter(graph, filterable, child, &path)))
        .collect();
    ExportedFilter {
        key: def.key,
        name: def.name,
        path,
        ids,
        subfilters,
    }
}
