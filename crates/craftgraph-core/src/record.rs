//! Line tokenizer for the data mod's record micro-grammar.
//!
//! A record line is a run of fragments separated by `,` or `#`. A fragment
//! that splits on `_` or `=` starts a new attribute (the first segment is the
//! key, the second is its first value); bare fragments accumulate onto the
//! attribute currently being built. An attribute is flushed when the next key
//! starts and once more at end of line. `mapChance=0.5#biomes_0,3` therefore
//! yields `mapChance -> ["0.5"]` and `biomes -> ["0", "3"]`.

/// One attribute pulled out of a record line: a key plus the value fragments
/// accumulated until the next key started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub key: String,
    pub values: Vec<String>,
}

/// Errors raised by the typed value helpers. These are reported and the
/// field is left at its default; they never abort a record.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("expected integer, got '{0}'")]
    Int(String),

    #[error("expected number, got '{0}'")]
    Float(String),

    #[error("missing value at position {0}")]
    Missing(usize),
}

/// Split one record line into attributes.
///
/// Value fragments appearing before the first key are dropped, matching the
/// original format's tolerance for stray tokens.
pub fn tokenize_line(line: &str) -> Vec<RawAttribute> {
    let mut attributes = Vec::new();
    let mut key: Option<String> = None;
    let mut values: Vec<String> = Vec::new();

    for fragment in line.split([',', '#']) {
        let segments: Vec<&str> = fragment.split(['_', '=']).collect();
        if segments.len() > 1 {
            flush(&mut attributes, key.take(), std::mem::take(&mut values));
            key = Some(segments[0].to_string());
            // Segments past the second are dropped, as in the original
            // tokenizer; real records never carry them.
            values.push(segments[1].to_string());
        } else {
            values.push(segments[0].to_string());
        }
    }
    flush(&mut attributes, key, values);
    attributes
}

fn flush(attributes: &mut Vec<RawAttribute>, key: Option<String>, values: Vec<String>) {
    if let Some(key) = key {
        attributes.push(RawAttribute { key, values });
    }
}

// ---------------------------------------------------------------------------
// Typed value helpers
// ---------------------------------------------------------------------------

pub fn int(values: &[String], index: usize) -> Result<i32, FieldError> {
    let raw = values.get(index).ok_or(FieldError::Missing(index))?;
    raw.trim().parse().map_err(|_| FieldError::Int(raw.clone()))
}

pub fn float(values: &[String], index: usize) -> Result<f32, FieldError> {
    let raw = values.get(index).ok_or(FieldError::Missing(index))?;
    raw.trim().parse().map_err(|_| FieldError::Float(raw.clone()))
}

pub fn int_list(values: &[String]) -> Result<Vec<i32>, FieldError> {
    values
        .iter()
        .map(|v| v.trim().parse().map_err(|_| FieldError::Int(v.clone())))
        .collect()
}

pub fn int_pair(values: &[String]) -> Result<[i32; 2], FieldError> {
    Ok([int(values, 0)?, int(values, 1)?])
}

pub fn float_pair(values: &[String]) -> Result<[f32; 2], FieldError> {
    Ok([float(values, 0)?, float(values, 1)?])
}
