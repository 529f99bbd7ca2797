//! Substitution groups: one placeholder object standing in for many.
//!
//! An ordinary category is pure notation — transitions naming the parent are
//! split into one concrete transition per member and the parent never reaches
//! the graph as a real item. A pattern category instead aligns its members
//! positionally with the other pattern categories named by the same
//! transition, and its parent remains a real, addressable object.

use crate::id::ObjectId;
use crate::object::GameObject;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub parent_id: ObjectId,
    /// Raw member list from the record, in declared order. Transition
    /// splitting substitutes from this list even when some ids fail to
    /// resolve; the dangling references are dropped later during wiring.
    pub member_ids: Vec<ObjectId>,
    /// Per-member weights, populated only under `probSet`.
    pub member_weights: Vec<f32>,
    pub pattern: bool,
    pub prob_set: bool,
    /// Members that resolved to real objects, minus self-references.
    pub resolved_members: Vec<ObjectId>,
}

impl Category {
    /// Parse one category record: header lines terminated by `numObjects=`,
    /// then one `<memberID> [<weight>]` line per member. Returns `None` when
    /// the record never names a parent.
    pub fn parse(text: &str) -> Option<Category> {
        let mut parent_id = None;
        let mut pattern = false;
        let mut prob_set = false;
        let mut member_ids = Vec::new();
        let mut member_weights = Vec::new();

        let mut in_headers = true;
        for line in text.lines() {
            if in_headers {
                let mut parts = line.split('=');
                match parts.next().unwrap_or("") {
                    "parentID" => match parts.next().unwrap_or("").parse() {
                        Ok(id) => parent_id = Some(id),
                        Err(_) => warn!(%line, "malformed category parentID"),
                    },
                    "pattern" => pattern = true,
                    "probSet" => prob_set = true,
                    "numObjects" => in_headers = false,
                    other => warn!(header = %other, "unknown category header"),
                }
            } else {
                let mut parts = line.split(' ');
                let Some(first) = parts.next().filter(|p| !p.is_empty()) else {
                    continue;
                };
                match first.parse() {
                    Ok(id) => {
                        member_ids.push(id);
                        if prob_set {
                            let weight = parts.next().and_then(|w| w.parse().ok());
                            if weight.is_none() {
                                warn!(member = %first, "missing probSet weight, assuming 0");
                            }
                            member_weights.push(weight.unwrap_or(0.0));
                        }
                    }
                    Err(_) => warn!(%line, "malformed category member line"),
                }
            }
        }

        let Some(parent_id) = parent_id else {
            warn!("category record without parentID");
            return None;
        };
        Some(Category {
            parent_id,
            member_ids,
            member_weights,
            pattern,
            prob_set,
            resolved_members: Vec::new(),
        })
    }

    pub fn member_weight(&self, id: ObjectId) -> Option<f32> {
        let index = self.member_ids.iter().position(|&m| m == id)?;
        self.member_weights.get(index).copied()
    }

    /// Resolve the parent and members against the object map. Marks the
    /// parent with this category's index and records the valid members.
    /// Returns false (category dropped) when the parent does not resolve.
    pub fn add_to_objects(
        &mut self,
        objects: &mut BTreeMap<ObjectId, GameObject>,
        index: usize,
    ) -> bool {
        if !objects.contains_key(&self.parent_id) {
            warn!(parent = %self.parent_id, "category parent not found, dropping category");
            return false;
        }
        objects
            .get_mut(&self.parent_id)
            .expect("checked above")
            .category = Some(index);

        self.resolved_members.clear();
        for &id in &self.member_ids {
            if id == self.parent_id {
                warn!(parent = %self.parent_id, "category references itself, skipping member");
            } else if objects.contains_key(&id) {
                self.resolved_members.push(id);
            } else {
                warn!(member = %id, parent = %self.parent_id, "invalid category member id");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "parentID=100\nnumObjects=3\n200\n201\n202\n";

    #[test]
    fn parses_headers_and_members() {
        let category = Category::parse(RECORD).unwrap();
        assert_eq!(category.parent_id, ObjectId(100));
        assert!(!category.pattern);
        assert!(!category.prob_set);
        assert_eq!(
            category.member_ids,
            vec![ObjectId(200), ObjectId(201), ObjectId(202)]
        );
    }

    #[test]
    fn parses_pattern_flag() {
        let category = Category::parse("parentID=5\npattern\nnumObjects=1\n6\n").unwrap();
        assert!(category.pattern);
    }

    #[test]
    fn parses_prob_set_weights() {
        let category =
            Category::parse("parentID=5\nprobSet\nnumObjects=2\n6 0.75\n7 0.25\n").unwrap();
        assert!(category.prob_set);
        assert_eq!(category.member_weight(ObjectId(6)), Some(0.75));
        assert_eq!(category.member_weight(ObjectId(7)), Some(0.25));
        assert_eq!(category.member_weight(ObjectId(8)), None);
    }

    #[test]
    fn unknown_header_is_tolerated() {
        let category = Category::parse("parentID=5\nshuffled\nnumObjects=1\n6\n").unwrap();
        assert_eq!(category.parent_id, ObjectId(5));
        assert_eq!(category.member_ids, vec![ObjectId(6)]);
    }

    #[test]
    fn record_without_parent_is_rejected() {
        assert!(Category::parse("numObjects=1\n6\n").is_none());
    }

    #[test]
    fn resolves_members_and_skips_self_reference() {
        use crate::object::GameObject;
        let mut objects = BTreeMap::new();
        for (id, name) in [(100, "@Sharp"), (200, "Flint Chip"), (201, "Knife")] {
            objects.insert(ObjectId(id), GameObject::new(ObjectId(id), name));
        }
        let mut category =
            Category::parse("parentID=100\nnumObjects=4\n200\n201\n100\n999\n").unwrap();
        assert!(category.add_to_objects(&mut objects, 0));
        // Self-reference (100) and the unresolved id (999) are dropped.
        assert_eq!(
            category.resolved_members,
            vec![ObjectId(200), ObjectId(201)]
        );
        assert_eq!(objects[&ObjectId(100)].category, Some(0));
        // The raw list keeps every declared member for transition splitting.
        assert_eq!(category.member_ids.len(), 4);
    }

    #[test]
    fn missing_parent_drops_category() {
        let mut objects = BTreeMap::new();
        let mut category = Category::parse("parentID=100\nnumObjects=1\n200\n").unwrap();
        assert!(!category.add_to_objects(&mut objects, 0));
    }
}
