//! Biomes: where natural objects spawn.
//!
//! The data mod declares biomes implicitly, one ground tile image per biome
//! id, with an optional ground-heat record alongside. Objects opt in via
//! their `biomes` attribute; spawn chances are each object's map chance
//! normalized against the biome total.

use crate::id::ObjectId;
use crate::object::GameObject;
use serde::Serialize;
use std::collections::BTreeMap;

const BIOME_NAMES: &[&str] = &[
    "Grasslands",
    "Swamps",
    "Yellow Prairies",
    "Badlands",
    "Tundra",
    "Desert",
    "Jungle",
    "Deep Water",
    "Flower Fields",
    "Shallow Water",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Biome {
    pub id: String,
    pub ground_heat: f32,
    /// Natural objects spawning here, in object-map order.
    pub object_ids: Vec<ObjectId>,
}

impl Biome {
    /// Recognize a biome from its ground tile filename (`ground_<id>.tga`).
    /// The `U` placeholder tile is not a biome.
    pub fn from_filename(filename: &str) -> Option<Biome> {
        let id = filename
            .strip_prefix("ground_")?
            .strip_suffix(".tga")?
            .to_string();
        if id.is_empty() || id == "U" {
            return None;
        }
        Some(Biome {
            id,
            ground_heat: 0.0,
            object_ids: Vec::new(),
        })
    }

    /// Apply a `groundHeat_<id>.txt` record to the matching biome.
    pub fn apply_ground_heat(biomes: &mut [Biome], filename: &str, content: &str) {
        let Some(id) = filename
            .strip_prefix("groundHeat_")
            .and_then(|rest| rest.strip_suffix(".txt"))
        else {
            return;
        };
        if id.is_empty() || id == "U" {
            return;
        }
        if let Some(biome) = biomes.iter_mut().find(|b| b.id == id) {
            biome.ground_heat = content.trim().parse().unwrap_or(0.0);
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        let index: usize = self.id.parse().ok()?;
        BIOME_NAMES.get(index).copied()
    }

    pub fn total_map_chance(&self, objects: &BTreeMap<ObjectId, GameObject>) -> f32 {
        self.object_ids
            .iter()
            .filter_map(|id| objects.get(id))
            .map(|o| o.data.map_chance)
            .sum()
    }

    pub fn spawn_chance(&self, objects: &BTreeMap<ObjectId, GameObject>, object: &GameObject) -> f32 {
        let total = self.total_map_chance(objects);
        if total == 0.0 {
            return 0.0;
        }
        object.data.map_chance / total
    }

    pub fn json_data(&self, objects: &BTreeMap<ObjectId, GameObject>) -> ExportedBiome {
        ExportedBiome {
            id: self.id.clone(),
            ground_heat: self.ground_heat,
            name: self.name(),
            objects: self
                .object_ids
                .iter()
                .filter_map(|id| objects.get(id))
                .map(|o| ExportedBiomeObject {
                    id: o.id,
                    spawn_chance: self.spawn_chance(objects, o),
                })
                .collect(),
        }
    }
}

/// Attach natural objects to the biomes they list. Mirrors of each other:
/// biomes hold member ids, objects hold biome indices.
pub fn attach_objects(biomes: &mut [Biome], objects: &mut BTreeMap<ObjectId, GameObject>) {
    for (index, biome) in biomes.iter_mut().enumerate() {
        let Ok(numeric_id) = biome.id.parse::<i32>() else {
            continue;
        };
        for object in objects.values_mut() {
            if object.is_natural() && object.data.biomes.contains(&numeric_id) {
                biome.object_ids.push(object.id);
                object.biomes.push(index);
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBiome {
    pub id: String,
    pub ground_heat: f32,
    pub name: Option<&'static str>,
    pub objects: Vec<ExportedBiomeObject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBiomeObject {
    pub id: ObjectId,
    pub spawn_chance: f32,
}
