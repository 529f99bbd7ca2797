//! Craftability distance.
//!
//! Every object carries a [`Depth`]: whether any chain of transitions
//! reaches it from map-spawned materials, and how much work that chain
//! costs. The transition graph is not acyclic (decay loops, reusable tools,
//! reversible rules), so the calculator runs a least fixed point over an
//! explicit worklist rather than a topological pass.

use crate::graph::CraftGraph;
use crate::id::TransitionKey;
use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

/// A comparable craftability measure. Craftable objects order before
/// uncraftable ones; among craftable objects, lower difficulty wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Depth {
    pub craftable: bool,
    pub difficulty: f64,
}

impl Depth {
    pub fn craftable(difficulty: f64) -> Depth {
        Depth {
            craftable: true,
            difficulty,
        }
    }

    /// The difficulty when craftable; `None` marks an unreachable object.
    pub fn value(&self) -> Option<f64> {
        self.craftable.then_some(self.difficulty)
    }

    /// Total order used to rank recipe branches and tool eligibility.
    pub fn compare(&self, other: &Depth) -> Ordering {
        if self.craftable != other.craftable {
            return if self.craftable {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        self.difficulty.total_cmp(&other.difficulty)
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            craftable: false,
            difficulty: 0.0,
        }
    }
}

/// Assign every object its depth.
///
/// Naturals (map-spawn chance > 0) seed at difficulty 0. A transition fires
/// once every resolvable endpoint is craftable; its candidate difficulty is
/// the endpoint difficulties plus one step, recorded on the transition and
/// relaxed onto whatever it produces. Improved objects re-enqueue their away
/// transitions until nothing changes. Objects the worklist never reaches
/// stay non-craftable.
pub fn calculate(graph: &mut CraftGraph) {
    let mut queue: VecDeque<TransitionKey> = VecDeque::new();
    let mut queued: HashSet<TransitionKey> = HashSet::new();

    let naturals: Vec<_> = graph
        .objects
        .values()
        .filter(|o| o.is_natural())
        .map(|o| o.id)
        .collect();
    for id in naturals {
        let object = graph.objects.get_mut(&id).expect("natural id from map");
        object.depth = Depth::craftable(0.0);
        for &key in &object.transitions_away {
            if queued.insert(key) {
                queue.push_back(key);
            }
        }
    }

    while let Some(key) = queue.pop_front() {
        queued.remove(&key);
        let Some(candidate) = candidate_depth(graph, key) else {
            continue;
        };

        let transition = &mut graph.transitions[key];
        if candidate.compare(&transition.depth) == Ordering::Less {
            transition.depth = candidate;
        }

        let products = [
            Some(transition.new_actor_id),
            Some(transition.new_target_id),
            transition.new_extra_target_id,
        ];
        for id in products.into_iter().flatten() {
            let Some(object) = graph.objects.get_mut(&id) else {
                continue;
            };
            if candidate.compare(&object.depth) == Ordering::Less {
                object.depth = candidate;
                for &away in &object.transitions_away {
                    if queued.insert(away) {
                        queue.push_back(away);
                    }
                }
            }
        }
    }
}

/// Depth a transition would confer on its products, or `None` while any of
/// its resolvable endpoints is still uncraftable.
fn candidate_depth(graph: &CraftGraph, key: TransitionKey) -> Option<Depth> {
    let transition = &graph.transitions[key];
    let mut difficulty = 1.0;
    for id in [transition.actor_id, transition.target_id] {
        if let Some(object) = graph.objects.get(&id) {
            if !object.depth.craftable {
                return None;
            }
            difficulty += object.depth.difficulty;
        }
    }
    Some(Depth::craftable(difficulty))
}
