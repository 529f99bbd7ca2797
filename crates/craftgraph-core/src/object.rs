//! Game objects parsed from one record file each.
//!
//! Objects are created once per record and mutated in place as categories,
//! transitions, biomes and the depth pass reference them. Identity is the
//! [`ObjectId`]; the object map is the single source of truth and everything
//! else points at it by id.

use crate::depth::Depth;
use crate::id::{ObjectId, TransitionKey};
use crate::record::{self, FieldError, RawAttribute};
use crate::sprite::{self, SpriteRecord};
use tracing::warn;

/// A container slot position declared on an object record. The original
/// format packs the coordinate pair and the `vert`/`parent` keys onto one
/// line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotPos {
    pub pos: [f32; 2],
    pub vert: i32,
    pub parent: i32,
}

/// The typed attribute bag of an object record. Unknown keys are reported
/// and skipped; unparsable fields are reported and left at their default.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    pub id: Option<ObjectId>,
    pub name: String,
    pub back_foot_index: Vec<i32>,
    pub biomes: Vec<i32>,
    pub blocks_walking: i32,
    pub body_index: Vec<i32>,
    pub clothing: String,
    pub clothing_offset: [i32; 2],
    pub contain_offset: [i32; 2],
    pub contain_size: f32,
    pub containable: i32,
    pub creation_sound_force: i32,
    pub creation_sound_initial_only: i32,
    pub deadly_distance: i32,
    pub death_marker: i32,
    pub draw_behind_player: i32,
    pub floor: i32,
    pub floor_hugging: i32,
    pub food_value: [i32; 2],
    pub front_foot_index: Vec<i32>,
    pub front_wall: i32,
    pub head_index: Vec<i32>,
    pub heat_value: i32,
    pub held_in_hand: i32,
    pub held_offset: [f32; 2],
    pub home_marker: i32,
    pub left_blocking_radius: i32,
    pub map_chance: f32,
    pub male: i32,
    pub min_pickup_age: i32,
    pub no_flip: i32,
    pub no_spawn: i32,
    pub num_slots: i32,
    pub num_sprites: i32,
    pub num_uses: i32,
    pub use_chance: f32,
    pub partial_floor: i32,
    pub permanent: i32,
    pub person: i32,
    pub pix_height: i32,
    pub r_value: f32,
    pub riding_animation_index: i32,
    pub right_blocking_radius: i32,
    pub side_access: i32,
    pub slot_size: f32,
    pub slot_style: i32,
    pub slots_locked: i32,
    pub slots_no_swap: i32,
    pub sounds: Vec<String>,
    pub speed_mult: f32,
    pub sprites_additive_blend: Vec<i32>,
    pub time_stretch: i32,
    pub use_appear_index: Vec<i32>,
    pub use_distance: i32,
    pub use_vanish_index: Vec<i32>,
    pub vert_slot_rot: f32,
    pub wall_layer: i32,
}

impl Default for ObjectData {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            back_foot_index: Vec::new(),
            biomes: Vec::new(),
            blocks_walking: 0,
            body_index: Vec::new(),
            clothing: "n".to_string(),
            clothing_offset: [0, 0],
            contain_offset: [0, 0],
            contain_size: 0.0,
            containable: 0,
            creation_sound_force: 0,
            creation_sound_initial_only: 0,
            deadly_distance: 0,
            death_marker: 0,
            draw_behind_player: 0,
            floor: 0,
            floor_hugging: 0,
            food_value: [0, 0],
            front_foot_index: Vec::new(),
            front_wall: 0,
            head_index: Vec::new(),
            heat_value: 0,
            held_in_hand: 0,
            held_offset: [0.0, 0.0],
            home_marker: 0,
            left_blocking_radius: 0,
            map_chance: 0.0,
            male: 0,
            min_pickup_age: 0,
            no_flip: 0,
            no_spawn: 0,
            num_slots: 0,
            num_sprites: 0,
            num_uses: 1,
            use_chance: 1.0,
            partial_floor: 0,
            permanent: 0,
            person: 0,
            pix_height: 0,
            r_value: 0.0,
            riding_animation_index: 0,
            right_blocking_radius: 0,
            side_access: 0,
            slot_size: 0.0,
            slot_style: 0,
            slots_locked: 0,
            slots_no_swap: 0,
            sounds: Vec::new(),
            speed_mult: 1.0,
            sprites_additive_blend: Vec::new(),
            time_stretch: 0,
            use_appear_index: Vec::new(),
            use_distance: 0,
            use_vanish_index: Vec::new(),
            vert_slot_rot: 0.0,
            wall_layer: 0,
        }
    }
}

type Setter = fn(&mut ObjectData, &[String]) -> Result<(), FieldError>;

/// Attribute dispatch table. Kept alphabetized, for sanity's sake.
fn setter(key: &str) -> Option<Setter> {
    let setter: Setter = match key {
        "backFootIndex" => |d, v| Ok(d.back_foot_index = record::int_list(v)?),
        "biomes" => |d, v| Ok(d.biomes = record::int_list(v)?),
        "blocksWalking" => |d, v| Ok(d.blocks_walking = record::int(v, 0)?),
        "bodyIndex" => |d, v| Ok(d.body_index = record::int_list(v)?),
        "clothing" => |d, v| Ok(d.clothing = v.first().cloned().unwrap_or_default()),
        "clothingOffset" => |d, v| Ok(d.clothing_offset = record::int_pair(v)?),
        "containOffset" => |d, v| Ok(d.contain_offset = record::int_pair(v)?),
        "containSize" => |d, v| Ok(d.contain_size = record::float(v, 0)?),
        "containable" => |d, v| Ok(d.containable = record::int(v, 0)?),
        "creationSoundForce" => |d, v| Ok(d.creation_sound_force = record::int(v, 0)?),
        "creationSoundInitialOnly" => |d, v| Ok(d.creation_sound_initial_only = record::int(v, 0)?),
        "deadlyDistance" => |d, v| Ok(d.deadly_distance = record::int(v, 0)?),
        "deathMarker" => |d, v| Ok(d.death_marker = record::int(v, 0)?),
        "drawBehindPlayer" => |d, v| Ok(d.draw_behind_player = record::int(v, 0)?),
        "floor" => |d, v| Ok(d.floor = record::int(v, 0)?),
        "floorHugging" => |d, v| Ok(d.floor_hugging = record::int(v, 0)?),
        "foodValue" => |d, v| {
            d.food_value = [record::int(v, 0)?, record::int(v, 1).unwrap_or(0)];
            Ok(())
        },
        "frontFootIndex" => |d, v| Ok(d.front_foot_index = record::int_list(v)?),
        "frontWall" => |d, v| Ok(d.front_wall = record::int(v, 0)?),
        "headIndex" => |d, v| Ok(d.head_index = record::int_list(v)?),
        "heatValue" => |d, v| Ok(d.heat_value = record::int(v, 0)?),
        "heldInHand" => |d, v| Ok(d.held_in_hand = record::int(v, 0)?),
        "heldOffset" => |d, v| Ok(d.held_offset = record::float_pair(v)?),
        "homeMarker" => |d, v| Ok(d.home_marker = record::int(v, 0)?),
        "id" => |d, v| {
            let raw = v.first().ok_or(FieldError::Missing(0))?;
            let id = raw.parse().map_err(|_| FieldError::Int(raw.clone()))?;
            d.id = Some(id);
            Ok(())
        },
        "leftBlockingRadius" => |d, v| Ok(d.left_blocking_radius = record::int(v, 0)?),
        "mapChance" => |d, v| Ok(d.map_chance = record::float(v, 0)?),
        "male" => |d, v| Ok(d.male = record::int(v, 0)?),
        "minPickupAge" => |d, v| Ok(d.min_pickup_age = record::int(v, 0)?),
        "name" => |d, v| Ok(d.name = v.first().cloned().unwrap_or_default()),
        "noFlip" => |d, v| Ok(d.no_flip = record::int(v, 0)?),
        "noSpawn" => |d, v| Ok(d.no_spawn = record::int(v, 0)?),
        "numSlots" => |d, v| Ok(d.num_slots = record::int(v, 0)?),
        "numSprites" => |d, v| Ok(d.num_sprites = record::int(v, 0)?),
        "numUses" => |d, v| {
            d.num_uses = record::int(v, 0)?;
            d.use_chance = record::float(v, 1).unwrap_or(1.0);
            Ok(())
        },
        "partialFloor" => |d, v| Ok(d.partial_floor = record::int(v, 0)?),
        "permanent" => |d, v| Ok(d.permanent = record::int(v, 0)?),
        "person" => |d, v| Ok(d.person = record::int(v, 0)?),
        "pixHeight" => |d, v| Ok(d.pix_height = record::int(v, 0)?),
        "rValue" => |d, v| Ok(d.r_value = record::float(v, 0)?),
        "ridingAnimationIndex" => |d, v| Ok(d.riding_animation_index = record::int(v, 0)?),
        "rightBlockingRadius" => |d, v| Ok(d.right_blocking_radius = record::int(v, 0)?),
        "sideAccess" => |d, v| Ok(d.side_access = record::int(v, 0)?),
        "slotSize" => |d, v| Ok(d.slot_size = record::float(v, 0)?),
        "slotStyle" => |d, v| Ok(d.slot_style = record::int(v, 0)?),
        "slotsLocked" => |d, v| Ok(d.slots_locked = record::int(v, 0)?),
        "slotsNoSwap" => |d, v| Ok(d.slots_no_swap = record::int(v, 0)?),
        "sounds" => |d, v| Ok(d.sounds = v.to_vec()),
        "speedMult" => |d, v| Ok(d.speed_mult = record::float(v, 0)?),
        "spritesAdditiveBlend" => |d, v| Ok(d.sprites_additive_blend = record::int_list(v)?),
        "timeStretch" => |d, v| Ok(d.time_stretch = record::int(v, 0)?),
        "useAppearIndex" => |d, v| Ok(d.use_appear_index = record::int_list(v)?),
        "useDistance" => |d, v| Ok(d.use_distance = record::int(v, 0)?),
        "useVanishIndex" => |d, v| Ok(d.use_vanish_index = record::int_list(v)?),
        "vertSlotRot" => |d, v| Ok(d.vert_slot_rot = record::float(v, 0)?),
        "wallLayer" => |d, v| Ok(d.wall_layer = record::int(v, 0)?),
        _ => return None,
    };
    Some(setter)
}

impl ObjectData {
    pub fn apply_attribute(&mut self, attribute: &RawAttribute) {
        match setter(&attribute.key) {
            Some(set) => {
                if let Err(err) = set(self, &attribute.values) {
                    warn!(key = %attribute.key, %err, "malformed object attribute");
                }
            }
            None => {
                warn!(key = %attribute.key, values = ?attribute.values, "unhandled object attribute");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GameObject
// ---------------------------------------------------------------------------

/// One in-game object plus everything the pipeline derives for it.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub id: ObjectId,
    pub name: String,
    pub data: ObjectData,
    pub sprites: Vec<SpriteRecord>,
    pub slot_positions: Vec<SlotPos>,
    /// Transitions where this object appears as actor or target.
    pub transitions_away: Vec<TransitionKey>,
    /// Transitions producing this object.
    pub transitions_toward: Vec<TransitionKey>,
    /// Index of the category this object is the parent placeholder of, if any.
    pub category: Option<usize>,
    /// Indices of the biomes this object spawns in.
    pub biomes: Vec<usize>,
    pub depth: Depth,
}

impl GameObject {
    pub fn new(id: ObjectId, name: &str) -> GameObject {
        GameObject {
            id,
            name: name.to_string(),
            data: ObjectData::default(),
            sprites: Vec::new(),
            slot_positions: Vec::new(),
            transitions_away: Vec::new(),
            transitions_toward: Vec::new(),
            category: None,
            biomes: Vec::new(),
            depth: Depth::default(),
        }
    }

    /// Parse one object record. Returns `None` when the record carries no id
    /// (blank or junk files are silently skipped upstream).
    pub fn parse(text: &str) -> Option<GameObject> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut data = ObjectData::default();
        let mut sprites: Vec<SpriteRecord> = Vec::new();
        let mut slot_positions: Vec<SlotPos> = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if i == 1 {
                if !line.is_empty() {
                    data.name = line.replace('#', " - ");
                }
            } else if line.contains("spriteID") {
                let mut block = vec![line];
                i += 1;
                while i < lines.len()
                    && sprite::is_sprite_line(lines[i])
                    && !lines[i].contains("spriteID")
                {
                    block.push(lines[i]);
                    i += 1;
                }
                sprites.push(SpriteRecord::parse(&block, sprites.len()));
                continue;
            } else if line.contains("slotPos") {
                slot_positions.push(parse_slot_pos(line));
            } else {
                for attribute in record::tokenize_line(line) {
                    data.apply_attribute(&attribute);
                }
            }
            i += 1;
        }

        let id = data.id?;
        let name = data.name.clone();
        Some(GameObject {
            id,
            name,
            data,
            sprites,
            slot_positions,
            transitions_away: Vec::new(),
            transitions_toward: Vec::new(),
            category: None,
            biomes: Vec::new(),
            depth: Depth::default(),
        })
    }

    pub fn can_pickup(&self) -> bool {
        self.data.permanent == 0 && self.data.floor == 0
    }

    pub fn has_sprite(&self) -> bool {
        !self.sprites.is_empty()
    }

    /// Catalog sort key: descending id puts the newest objects first.
    pub fn sort_weight(&self) -> i32 {
        -self.id.0
    }

    pub fn num_slots(&self) -> i32 {
        self.data.num_slots
    }

    pub fn is_natural(&self) -> bool {
        self.data.map_chance > 0.0
    }

    pub fn craftable(&self) -> bool {
        self.depth.craftable || self.is_natural()
    }

    pub fn is_grave(&self) -> bool {
        self.name.contains("Grave")
    }

    pub fn is_clothing(&self) -> bool {
        self.data.clothing != "n"
            && (self.data.r_value > 0.0
                || self.data.food_value[0] == 0 && self.data.containable == 1)
    }

    pub fn is_craftable_container(&self) -> bool {
        self.data.num_slots > 0 && self.data.slot_size >= 1.0 && !self.is_grave()
    }

    pub fn is_global_trigger(&self) -> bool {
        self.name.starts_with('>')
    }

    pub fn transmitter_name(&self) -> String {
        self.name.replacen('>', "*", 1)
    }

    /// Difficulty rendered with three significant digits, for the catalog.
    pub fn difficulty(&self) -> Option<String> {
        if !self.depth.craftable || self.depth.difficulty == 0.0 {
            return None;
        }
        Some(to_precision(self.depth.difficulty, 3))
    }

    /// Distinct positive sound ids referenced by this object.
    pub fn sounds(&self) -> Vec<i32> {
        let ids: Vec<i32> = self
            .data
            .sounds
            .iter()
            .filter_map(|sound| sound.split(':').next()?.parse().ok())
            .collect();
        let mut seen = Vec::new();
        for id in ids {
            if id > 0 && !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    /// Insulation contribution: a body-part weighting times the object's
    /// rValue.
    pub fn insulation(&self) -> f64 {
        let part = match self.data.clothing.as_str() {
            "h" => 0.25,
            "t" => 0.35,
            "b" => 0.2,
            "s" | "p" => 0.1,
            _ => return 0.0,
        };
        part * self.data.r_value as f64
    }
}

fn parse_slot_pos(line: &str) -> SlotPos {
    // The coordinate pair straddles the first comma; rejoin it before
    // reading key=value pairs.
    let mut parts: Vec<String> = line.split(',').map(str::to_string).collect();
    if parts.len() >= 2 {
        let merged = format!("{},{}", parts[0], parts[1]);
        parts.remove(0);
        parts[0] = merged;
    }

    let mut slot = SlotPos::default();
    for part in parts {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            "slotPos" => {
                let coords: Vec<f32> = value.split(',').filter_map(|v| v.parse().ok()).collect();
                if coords.len() >= 2 {
                    slot.pos = [coords[0], coords[1]];
                }
            }
            "vert" => slot.vert = value.parse().unwrap_or(0),
            "parent" => slot.parent = value.parse().unwrap_or(0),
            _ => {}
        }
    }
    slot
}

/// Format a value with `digits` significant digits, the way the catalog
/// difficulty column expects it.
pub fn to_precision(value: f64, digits: i32) -> String {
    if value == 0.0 {
        return format!("{:.*}", (digits - 1).max(0) as usize, 0.0);
    }
    let exponent = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - exponent).max(0) as usize;
    format!("{value:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "id=123\n\
Sharp Stone# tool\n\
containable=1\n\
containSize=1.5,vertSlotRot=-0.25\n\
permanent=0,minPickupAge=3\n\
noFlip=0\n\
sideAccess=0\n\
heldInHand=1\n\
blocksWalking=0,leftBlockingRadius=0,rightBlockingRadius=0,drawBehindPlayer=0\n\
mapChance=0.2#biomes_0,3\n\
heatValue=0\n\
rValue=0.000000\n\
person=0,noSpawn=0\n\
male=0\n\
deathMarker=0\n\
foodValue=0\n\
speedMult=1.000000\n\
heldOffset=2.00,-15.00\n\
clothing=n\n\
clothingOffset=0,0\n\
deadlyDistance=0\n\
useDistance=1\n\
sounds=292:0.25,-1:0.25,292:0.25,-1:0.25\n\
creationSoundInitialOnly=0,creationSoundForce=0\n\
numSlots=0#timeStretch=1.0\n\
slotSize=1.000000\n\
slotsLocked=0\n\
numSprites=2\n\
spriteID=791\n\
pos=0.0,-2.0\n\
rot=0.005\n\
hFlip=0\n\
color=1.0,1.0,1.0\n\
ageRange=-1.0,-1.0\n\
parent=-1\n\
invisHolding=0,invisWorn=0,behindSlots=0\n\
spriteID=792\n\
pos=1.0,3.0\n\
rot=0.0\n\
hFlip=0\n\
color=1.0,1.0,1.0\n\
ageRange=-1.0,-1.0\n\
parent=-1\n\
invisHolding=0,invisWorn=0,behindSlots=0\n\
headIndex=-1\n\
bodyIndex=-1\n\
backFootIndex=-1\n\
frontFootIndex=-1\n\
numUses=10,0.5\n\
useVanishIndex=-1\n\
useAppearIndex=-1\n\
pixHeight=32";

    #[test]
    fn parses_identity_and_name() {
        let object = GameObject::parse(RECORD).unwrap();
        assert_eq!(object.id, ObjectId(123));
        assert_eq!(object.name, "Sharp Stone -  tool");
    }

    #[test]
    fn parses_scalar_and_list_attributes() {
        let object = GameObject::parse(RECORD).unwrap();
        assert_eq!(object.data.containable, 1);
        assert_eq!(object.data.contain_size, 1.5);
        assert_eq!(object.data.vert_slot_rot, -0.25);
        assert_eq!(object.data.biomes, vec![0, 3]);
        assert_eq!(object.data.map_chance, 0.2);
        assert_eq!(object.data.held_offset, [2.0, -15.0]);
        assert_eq!(object.data.num_uses, 10);
        assert_eq!(object.data.use_chance, 0.5);
        assert_eq!(object.data.food_value, [0, 0]);
        assert_eq!(object.data.pix_height, 32);
    }

    #[test]
    fn sprite_lookahead_splits_blocks() {
        let object = GameObject::parse(RECORD).unwrap();
        assert_eq!(object.sprites.len(), 2);
        assert_eq!(object.sprites[0].id, "791");
        assert_eq!(object.sprites[1].id, "792");
        assert_eq!(object.sprites[1].pos, [1.0, 3.0]);
        // The line after the sprite block parses as a normal attribute.
        assert_eq!(object.data.head_index, vec![-1]);
    }

    #[test]
    fn record_without_id_is_rejected() {
        assert!(GameObject::parse("name=junk\nJunk\n").is_none());
    }

    #[test]
    fn unknown_attribute_is_tolerated() {
        let object = GameObject::parse("id=5\nThing\nshimmer=3\nheatValue=2").unwrap();
        assert_eq!(object.data.heat_value, 2);
    }

    #[test]
    fn slot_pos_lines_are_collected() {
        let object =
            GameObject::parse("id=6\nBasket\nnumSlots=2\nslotPos=-2.0,64.0,vert=1,parent=0")
                .unwrap();
        assert_eq!(object.slot_positions.len(), 1);
        assert_eq!(object.slot_positions[0].pos, [-2.0, 64.0]);
        assert_eq!(object.slot_positions[0].vert, 1);
    }

    #[test]
    fn predicates() {
        let object = GameObject::parse(RECORD).unwrap();
        assert!(object.can_pickup());
        assert!(object.is_natural());
        assert!(!object.is_grave());
        assert!(!object.is_clothing());
        assert!(!object.is_global_trigger());
        assert_eq!(object.sort_weight(), -123);
    }

    #[test]
    fn sounds_deduplicate_and_drop_non_positive() {
        let object = GameObject::parse(RECORD).unwrap();
        assert_eq!(object.sounds(), vec![292]);
    }

    #[test]
    fn insulation_weights_by_body_part() {
        let mut object = GameObject::new(ObjectId(9), "Wool Hat");
        object.data.clothing = "h".to_string();
        object.data.r_value = 0.5;
        assert!((object.insulation() - 0.125).abs() < 1e-9);
        object.data.clothing = "x".to_string();
        assert_eq!(object.insulation(), 0.0);
    }

    #[test]
    fn global_trigger_naming() {
        let trigger = GameObject::new(ObjectId(70), ">gate1");
        assert!(trigger.is_global_trigger());
        assert_eq!(trigger.transmitter_name(), "*gate1");
    }

    #[test]
    fn precision_formatting() {
        assert_eq!(to_precision(1.0, 3), "1.00");
        assert_eq!(to_precision(12.5, 3), "12.5");
        assert_eq!(to_precision(123.0, 3), "123");
        assert_eq!(to_precision(0.0456, 3), "0.0456");
    }
}
