//! Recipe trees: what it takes to craft one object.
//!
//! A recipe expands backward from the target's primary producing transition.
//! Natural objects, tools and producerless objects are leaves; everything
//! else recurses through its own best producer. One node is shared per
//! object within a generation (tracked by a generator-scoped cache), pure
//! decay chains collapse into accumulated time on the consuming node, and
//! unconsumed byproducts cheaper than the node needing them become reusable
//! tools. Nodes live only as long as one generation; the export payload is
//! the survivor.

use crate::config::EngineConfig;
use crate::graph::CraftGraph;
use crate::id::{ObjectId, TransitionKey};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::warn;

/// Hard ceiling on nodes per generation. Real recipes stay in the tens;
/// this exists so a malformed graph fails one object instead of the batch.
const NODE_BUDGET: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe exceeded the node budget of {0}")]
    NodeBudget(usize),

    #[error("recipe requires itself through a production cycle")]
    Cyclic,
}

/// One object within a specific recipe expansion.
#[derive(Debug, Clone)]
pub struct RecipeNode {
    pub object_id: ObjectId,
    pub parents: Vec<usize>,
    pub children: Vec<usize>,
    /// Reusable across steps rather than consumed.
    pub tool: bool,
    /// The producing transition this node expands through.
    pub transition: Option<TransitionKey>,
    /// Decay time accumulated from collapsed pure-decay chains.
    pub decay_seconds: i64,
    /// On the primary lineage from the recipe root.
    pub main_branch: bool,
    pub deleted: bool,
    /// Distance from the root; shared branches surface at their deepest
    /// requirement.
    pub step_depth: usize,
}

impl RecipeNode {
    fn new(object_id: ObjectId) -> RecipeNode {
        RecipeNode {
            object_id,
            parents: Vec::new(),
            children: Vec::new(),
            tool: false,
            transition: None,
            decay_seconds: 0,
            main_branch: false,
            deleted: false,
            step_depth: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

struct RecipeGenerator<'a> {
    graph: &'a CraftGraph,
    config: &'a EngineConfig,
    nodes: Vec<RecipeNode>,
    available_tools: Vec<ObjectId>,
}

impl<'a> RecipeGenerator<'a> {
    fn new(graph: &'a CraftGraph, config: &'a EngineConfig) -> RecipeGenerator<'a> {
        RecipeGenerator {
            graph,
            config,
            nodes: Vec::new(),
            available_tools: Vec::new(),
        }
    }

    fn generate(&mut self, object_id: ObjectId) -> Result<(), RecipeError> {
        let root = self.generate_node(object_id)?;
        self.track_main_branch(root);
        self.layout_steps()
    }

    /// Create (and register) a node, then expand it unless it is a leaf.
    /// Registration happens before expansion so a shared object resolves to
    /// one node even while its own subtree is still being built.
    fn generate_node(&mut self, object_id: ObjectId) -> Result<usize, RecipeError> {
        if self.nodes.len() >= NODE_BUDGET {
            return Err(RecipeError::NodeBudget(NODE_BUDGET));
        }
        let index = self.nodes.len();
        self.nodes.push(RecipeNode::new(object_id));
        if self.available_tools.contains(&object_id) {
            self.make_tool(index);
        }
        if !self.is_leaf(index) {
            self.nodes[index].transition = self.lookup_transition(index);
            self.generate_transition_nodes(index)?;
        }
        Ok(index)
    }

    fn is_leaf(&self, index: usize) -> bool {
        if self.nodes[index].tool {
            return true;
        }
        match self.graph.objects.get(&self.nodes[index].object_id) {
            Some(object) => object.is_natural() || object.transitions_toward.is_empty(),
            None => true,
        }
    }

    /// The node's best producing transition: the primary listing with decay
    /// chains collapsed, unless it is a last-use rule and the second listing
    /// is within one depth and one total-depth step. That alternate keeps
    /// recipes from insisting on exhausting the final item of a stack when
    /// grabbing an earlier one works.
    fn lookup_transition(&mut self, index: usize) -> Option<TransitionKey> {
        let graph = self.graph;
        let object = graph.objects.get(&self.nodes[index].object_id)?;
        let first = *object.transitions_toward.first()?;
        let primary = self.collapse_decay_transition(index, first);

        let transition = &graph.transitions[primary];
        let last_use_blocks = transition.last_use_actor && !transition.reverse_use_actor
            || transition.last_use_target && !transition.reverse_use_target;
        if last_use_blocks {
            if let Some(&alternate_key) = object.transitions_toward.get(1) {
                let alternate = &graph.transitions[alternate_key];
                if let (Some(alternate_depth), Some(primary_depth)) =
                    (alternate.depth.value(), transition.depth.value())
                    && alternate_depth <= primary_depth + 1.0
                    && let (Some(alternate_total), Some(primary_total)) =
                        (alternate.total_depth(graph), transition.total_depth(graph))
                    && alternate_total <= primary_total + 1.0
                {
                    return Some(alternate_key);
                }
            }
        }
        Some(primary)
    }

    /// Walk consecutive pure-decay producers, accumulating their time onto
    /// the node, up to the configured hop limit.
    fn collapse_decay_transition(&mut self, index: usize, start: TransitionKey) -> TransitionKey {
        let graph = self.graph;
        let mut key = start;
        let mut hops = 0;
        loop {
            if hops > self.config.decay_collapse_limit {
                let name = self
                    .graph
                    .objects
                    .get(&self.nodes[index].object_id)
                    .map(|o| o.name.clone())
                    .unwrap_or_default();
                warn!(object = %name, "decay chain did not converge, leaving transition uncollapsed");
                return key;
            }
            let transition = &graph.transitions[key];
            let seconds = transition.total_decay_seconds(graph);
            if seconds <= 0 {
                return key;
            }
            let Some(target) = graph.objects.get(&transition.target_id) else {
                return key;
            };
            if !target.depth.value().is_some_and(|v| v != 0.0) {
                return key;
            }
            self.nodes[index].decay_seconds += seconds;
            let Some(&next) = target.transitions_toward.first() else {
                return key;
            };
            if graph.transitions[next].total_decay_seconds(graph) > 0 {
                key = next;
                hops += 1;
            } else {
                return key;
            }
        }
    }

    fn generate_transition_nodes(&mut self, index: usize) -> Result<(), RecipeError> {
        let Some(key) = self.nodes[index].transition else {
            return Ok(());
        };
        let transition = &self.graph.transitions[key];
        let (new_actor_id, new_target_id, actor_id, target_id) = (
            transition.new_actor_id,
            transition.new_target_id,
            transition.actor_id,
            transition.target_id,
        );

        self.add_available_tool(new_actor_id, index, 0);
        self.add_available_tool(new_target_id, index, 0);

        self.generate_child(actor_id, index)?;
        self.generate_child(target_id, index)
    }

    fn generate_child(&mut self, object_id: ObjectId, parent: usize) -> Result<(), RecipeError> {
        if !self.graph.objects.contains_key(&object_id) {
            return Ok(());
        }
        let child = match self.find_node(object_id) {
            Some(index) => index,
            None => self.generate_node(object_id)?,
        };
        self.nodes[child].parents.push(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    fn find_node(&self, object_id: ObjectId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| !n.deleted && n.object_id == object_id)
    }

    /// An unconsumed byproduct becomes an available tool when it is
    /// strictly cheaper than the node needing it; tool status then
    /// propagates through simple transitions (decays, or rules with no real
    /// actor+target pair) up to the hop limit, skipping naturals.
    fn add_available_tool(&mut self, object_id: ObjectId, parent: usize, hops: u32) {
        let graph = self.graph;
        let Some(object) = graph.objects.get(&object_id) else {
            return;
        };
        let parent_id = self.nodes[parent].object_id;
        if object_id == parent_id || self.available_tools.contains(&object_id) {
            return;
        }

        let Some(parent_object) = graph.objects.get(&parent_id) else {
            return;
        };
        if object.depth.compare(&parent_object.depth) == Ordering::Less {
            self.available_tools.push(object_id);
            if let Some(index) = self.find_node(object_id) {
                self.make_tool(index);
            }
        }

        if hops >= self.config.tool_search_limit || object.is_natural() {
            return;
        }
        for &key in &object.transitions_away {
            let transition = &graph.transitions[key];
            let simple = transition.decay.is_some()
                || !graph.objects.contains_key(&transition.actor_id)
                || !graph.objects.contains_key(&transition.target_id);
            if simple {
                self.add_available_tool(transition.new_actor_id, parent, hops + 1);
                self.add_available_tool(transition.new_target_id, parent, hops + 1);
            }
        }
    }

    /// Mark a node reusable and release the subtree it no longer needs.
    fn make_tool(&mut self, index: usize) {
        if self.nodes[index].tool {
            return;
        }
        self.nodes[index].tool = true;
        let children = std::mem::take(&mut self.nodes[index].children);
        for child in children {
            self.nodes[child].parents.retain(|&p| p != index);
            if self.nodes[child].parents.is_empty() {
                self.delete_node(child);
            }
        }
    }

    fn delete_node(&mut self, index: usize) {
        if self.nodes[index].deleted {
            return;
        }
        self.nodes[index].deleted = true;
        let children = std::mem::take(&mut self.nodes[index].children);
        for child in children {
            self.nodes[child].parents.retain(|&p| p != index);
            if self.nodes[child].parents.is_empty() {
                self.delete_node(child);
            }
        }
    }

    /// Flag the primary lineage: from the root, follow the produced object's
    /// own chain (the transition target, falling back to the actor).
    fn track_main_branch(&mut self, root: usize) {
        let mut current = root;
        loop {
            self.nodes[current].main_branch = true;
            let Some(key) = self.nodes[current].transition else {
                return;
            };
            let transition = &self.graph.transitions[key];
            let next = [transition.target_id, transition.actor_id]
                .into_iter()
                .find_map(|id| {
                    self.find_node(id)
                        .filter(|&i| i != current && !self.nodes[i].tool)
                });
            match next {
                Some(index) if !self.nodes[index].main_branch => current = index,
                _ => return,
            }
        }
    }

    /// Assign step depths (longest distance from the root), merging shared
    /// branches onto their deepest requirement. A cycle here means the
    /// recipe needs itself and fails as a whole.
    fn layout_steps(&mut self) -> Result<(), RecipeError> {
        let mut marks = vec![Mark::White; self.nodes.len()];
        let mut depths = vec![0usize; self.nodes.len()];
        for index in 0..self.nodes.len() {
            if !self.nodes[index].deleted {
                self.depth_from_root(index, &mut marks, &mut depths)?;
            }
        }
        for (index, depth) in depths.into_iter().enumerate() {
            self.nodes[index].step_depth = depth;
        }
        Ok(())
    }

    fn depth_from_root(
        &self,
        index: usize,
        marks: &mut [Mark],
        depths: &mut [usize],
    ) -> Result<usize, RecipeError> {
        match marks[index] {
            Mark::Done => return Ok(depths[index]),
            Mark::InProgress => return Err(RecipeError::Cyclic),
            Mark::White => {}
        }
        marks[index] = Mark::InProgress;
        let mut depth = 0;
        let parents = self.nodes[index].parents.clone();
        for parent in parents {
            if self.nodes[parent].deleted {
                continue;
            }
            depth = depth.max(self.depth_from_root(parent, marks, depths)? + 1);
        }
        marks[index] = Mark::Done;
        depths[index] = depth;
        Ok(depth)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    InProgress,
    Done,
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// The finished recipe for one object: the surviving node arena plus the
/// export projection.
#[derive(Debug)]
pub struct Recipe {
    pub object_id: ObjectId,
    nodes: Vec<RecipeNode>,
}

impl Recipe {
    /// Generate the recipe for one object. Generation failures are caught
    /// here: the error is logged with the object's name and an empty recipe
    /// comes back, leaving the rest of the batch untouched.
    pub fn generate(graph: &CraftGraph, config: &EngineConfig, object_id: ObjectId) -> Recipe {
        let mut generator = RecipeGenerator::new(graph, config);
        match generator.generate(object_id) {
            Ok(()) => Recipe {
                object_id,
                nodes: generator.nodes,
            },
            Err(err) => {
                let name = graph
                    .objects
                    .get(&object_id)
                    .map(|o| o.name.as_str())
                    .unwrap_or("<unknown>");
                warn!(object = %name, %err, "error generating recipe");
                Recipe {
                    object_id,
                    nodes: Vec::new(),
                }
            }
        }
    }

    /// A recipe whose only node is the target itself has nothing to show.
    pub fn has_data(&self) -> bool {
        self.live().count() > 1
    }

    pub fn json_data(&self, graph: &CraftGraph) -> ExportedRecipe {
        let mut steps: Vec<Vec<ExportedRecipeNode>> = Vec::new();
        for node in self.live() {
            if node.tool || node.transition.is_none() {
                continue;
            }
            if steps.len() <= node.step_depth {
                steps.resize_with(node.step_depth + 1, Vec::new);
            }
            steps[node.step_depth].push(self.node_payload(node, graph));
        }
        steps.retain(|step| !step.is_empty());
        steps.reverse();

        let mut ingredients: Vec<ObjectId> = self.tools().collect();
        for node in self.live().filter(|n| self.is_ingredient(n, graph)) {
            for _ in 0..self.count(node) {
                ingredients.push(node.object_id);
            }
        }
        ingredients.sort_by(|a, b| {
            let a = graph.objects[a].depth;
            let b = graph.objects[b].depth;
            b.compare(&a)
        });

        let uncraftables: Vec<ObjectId> = self
            .live()
            .filter(|n| self.is_uncraftable(n, graph))
            .map(|n| n.object_id)
            .collect();

        ExportedRecipe {
            steps,
            ingredients: (!ingredients.is_empty()).then_some(ingredients),
            uncraftables: (!uncraftables.is_empty()).then_some(uncraftables),
        }
    }

    fn live(&self) -> impl Iterator<Item = &RecipeNode> {
        self.nodes.iter().filter(|n| !n.deleted)
    }

    /// Tools needed directly; a tool only feeding other tools is theirs to
    /// bring.
    fn tools(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.live()
            .filter(|n| n.tool && !self.parents_are_tools(n))
            .map(|n| n.object_id)
    }

    fn parents_are_tools(&self, node: &RecipeNode) -> bool {
        !node.parents.is_empty() && node.parents.iter().all(|&p| self.nodes[p].tool)
    }

    fn is_ingredient(&self, node: &RecipeNode, graph: &CraftGraph) -> bool {
        !node.tool
            && node.transition.is_none()
            && graph.objects.get(&node.object_id).is_some_and(|o| o.craftable())
    }

    fn is_uncraftable(&self, node: &RecipeNode, graph: &CraftGraph) -> bool {
        node.transition.is_none()
            && graph
                .objects
                .get(&node.object_id)
                .is_some_and(|o| o.transitions_toward.is_empty() && !o.is_natural())
    }

    /// How many of this object the recipe consumes: one per requiring link.
    fn count(&self, node: &RecipeNode) -> usize {
        node.parents.len().max(1)
    }

    fn node_payload(&self, node: &RecipeNode, graph: &CraftGraph) -> ExportedRecipeNode {
        let count = self.count(node);
        let mut payload = ExportedRecipeNode {
            id: node.object_id,
            count: (count > 1).then_some(count),
            main_branch: node.main_branch.then_some(true),
            decay_seconds: (node.decay_seconds > 0).then_some(node.decay_seconds),
            actor_id: None,
            target_id: None,
            decay: None,
            hand: None,
        };
        if let Some(key) = node.transition {
            let transition = &graph.transitions[key];
            payload.actor_id = graph.objects.get(&transition.actor_id).map(|o| o.id);
            payload.target_id = graph.objects.get(&transition.target_id).map(|o| o.id);
            payload.decay = transition.decay.clone();
            payload.hand = transition.hand(graph).then_some(true);
        }
        payload
    }
}

#[derive(Debug, Serialize)]
pub struct ExportedRecipe {
    pub steps: Vec<Vec<ExportedRecipeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<ObjectId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncraftables: Option<Vec<ObjectId>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedRecipeNode {
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_branch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<bool>,
}

// ===========================================================================
// Tests
// ===========================================================================
