//! Sprite sub-records embedded in object record files.
//!
//! Sprite data is interleaved with positional slot records in the same file
//! without explicit delimiters; [`is_sprite_line`] drives the lookahead that
//! decides where a sprite block ends. Only parsing lives here; rasterizing
//! the layered artwork is a downstream concern.

use crate::record::{self, FieldError, RawAttribute};
use tracing::warn;

/// Tokens that mark a line as sprite data. The lookahead in the object
/// parser consumes lines while they contain any of these and do not start
/// another `spriteID` block.
const SPRITE_TOKENS: &[&str] = &[
    "spriteID",
    "pos",
    "rot",
    "hFlip",
    "color",
    "ageRange",
    "parent",
    "invisHolding",
    "invisCont",
    "spritesDrawnBehind",
    "ignoredCont",
];

pub fn is_sprite_line(line: &str) -> bool {
    SPRITE_TOKENS.iter().any(|token| line.contains(token))
}

/// One layer of an object's artwork.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteRecord {
    pub id: String,
    pub index: usize,
    pub pos: [f32; 2],
    pub rotation: f32,
    pub h_flip: i32,
    pub color: Vec<f32>,
    pub age_range: [f32; 2],
    pub parent: i32,
    pub invis_holding: i32,
    pub invis_worn: i32,
    pub invis_cont: i32,
    pub behind_slots: i32,
    pub sprites_drawn_behind: Vec<i32>,
    pub ignored_cont: Vec<i32>,
}

type Setter = fn(&mut SpriteRecord, &[String]) -> Result<(), FieldError>;

fn setter(key: &str) -> Option<Setter> {
    let setter: Setter = match key {
        "spriteID" => |s, v| {
            s.id = v.first().cloned().unwrap_or_default();
            Ok(())
        },
        "pos" => |s, v| {
            s.pos = record::float_pair(v)?;
            Ok(())
        },
        "rot" => |s, v| {
            s.rotation = record::float(v, 0)?;
            Ok(())
        },
        "ageRange" => |s, v| {
            s.age_range = record::float_pair(v)?;
            Ok(())
        },
        "color" => |s, v| {
            s.color = vec![
                record::float(v, 0)?,
                record::float(v, 1)?,
                record::float(v, 2)?,
            ];
            Ok(())
        },
        "index" => |s, v| {
            s.index = record::int(v, 0)?.max(0) as usize;
            Ok(())
        },
        "hFlip" => |s, v| {
            s.h_flip = record::int(v, 0)?;
            Ok(())
        },
        "invisHolding" => |s, v| {
            s.invis_holding = record::int(v, 0)?;
            Ok(())
        },
        "invisWorn" => |s, v| {
            s.invis_worn = record::int(v, 0)?;
            Ok(())
        },
        "behindSlots" => |s, v| {
            s.behind_slots = record::int(v, 0)?;
            Ok(())
        },
        "parent" => |s, v| {
            s.parent = record::int(v, 0)?;
            Ok(())
        },
        "invisCont" => |s, v| {
            s.invis_cont = record::int(v, 0)?;
            Ok(())
        },
        "spritesDrawnBehind" => |s, v| {
            s.sprites_drawn_behind = record::int_list(v)?;
            Ok(())
        },
        "ignoredCont" => |s, v| {
            s.ignored_cont = record::int_list(v)?;
            Ok(())
        },
        _ => return None,
    };
    Some(setter)
}

impl SpriteRecord {
    /// Parse one sprite block (the `spriteID` line plus its lookahead lines).
    pub fn parse(lines: &[&str], index: usize) -> SpriteRecord {
        let mut sprite = SpriteRecord {
            index,
            ..SpriteRecord::default()
        };
        for line in lines {
            for attribute in crate::record::tokenize_line(line) {
                sprite.apply(&attribute);
            }
        }
        sprite
    }

    fn apply(&mut self, attribute: &RawAttribute) {
        match setter(&attribute.key) {
            Some(set) => {
                if let Err(err) = set(self, &attribute.values) {
                    warn!(key = %attribute.key, %err, "malformed sprite attribute");
                }
            }
            None => {
                warn!(key = %attribute.key, values = ?attribute.values, "unhandled sprite attribute");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_sprite_block() {
        let sprite = SpriteRecord::parse(
            &[
                "spriteID=433",
                "pos=1.5,-2.0",
                "rot=0.25",
                "hFlip=1",
                "color=1.0,0.5,0.25",
                "ageRange=-1.0,-1.0",
                "parent=2",
                "invisHolding=1,invisWorn=0,behindSlots=0",
            ],
            3,
        );
        assert_eq!(sprite.id, "433");
        assert_eq!(sprite.index, 3);
        assert_eq!(sprite.pos, [1.5, -2.0]);
        assert_eq!(sprite.rotation, 0.25);
        assert_eq!(sprite.h_flip, 1);
        assert_eq!(sprite.color, vec![1.0, 0.5, 0.25]);
        assert_eq!(sprite.age_range, [-1.0, -1.0]);
        assert_eq!(sprite.parent, 2);
        assert_eq!(sprite.invis_holding, 1);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let sprite = SpriteRecord::parse(&["spriteID=7", "glow=1"], 0);
        assert_eq!(sprite.id, "7");
    }

    #[test]
    fn sprite_line_detection() {
        assert!(is_sprite_line("spriteID=12"));
        assert!(is_sprite_line("pos=0.0,0.0"));
        assert!(is_sprite_line("spritesDrawnBehind=1,2"));
        assert!(!is_sprite_line("numSlots=3"));
        assert!(!is_sprite_line("slotSize=1.0"));
    }
}
