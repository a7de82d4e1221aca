use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::systems::SystemId;

/// Cost of traversing any single edge. Every jump counts the same regardless
/// of whether it is a stargate or a wormhole.
pub const EDGE_WEIGHT: u32 = 1;

/// Constraints applied during pathfinding.
#[derive(Debug, Default, Clone)]
pub struct PathConstraints {
    /// Systems that must not appear in the interior of the resulting path.
    /// The start and goal are always permitted.
    pub avoided_systems: HashSet<SystemId>,
}

impl PathConstraints {
    pub fn avoiding(systems: impl IntoIterator<Item = SystemId>) -> Self {
        Self {
            avoided_systems: systems.into_iter().collect(),
        }
    }

    fn allows(&self, target: SystemId, start: SystemId, goal: SystemId) -> bool {
        target == start || target == goal || !self.avoided_systems.contains(&target)
    }
}

/// Find a route between `start` and `goal` without additional constraints.
pub fn find_route(
    graph: &Graph,
    start: SystemId,
    goal: SystemId,
) -> Result<Option<Vec<SystemId>>> {
    find_route_dijkstra(graph, start, goal, &PathConstraints::default())
}

/// Run Dijkstra's algorithm to find the fewest-jump path that satisfies the
/// provided constraints.
///
/// Returns `Ok(None)` when either endpoint is not part of the graph or no
/// path exists. Among equally short paths the one reached through the
/// lowest system ids is preferred, so repeated calls return the same route.
pub fn find_route_dijkstra(
    graph: &Graph,
    start: SystemId,
    goal: SystemId,
    constraints: &PathConstraints,
) -> Result<Option<Vec<SystemId>>> {
    if !graph.contains(start) || !graph.contains(goal) {
        return Ok(None);
    }
    if start == goal {
        return Ok(Some(vec![start]));
    }

    let mut distances: HashMap<SystemId, u32> = HashMap::new();
    let mut parents: HashMap<SystemId, SystemId> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0);
    queue.push(QueueEntry::new(start, 0));

    while let Some(entry) = queue.pop() {
        match distances.get(&entry.node) {
            Some(&distance) if distance < entry.cost => continue,
            Some(_) => {}
            None => continue,
        }

        if entry.node == goal {
            return reconstruct_path(&parents, start, goal).map(Some);
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.system_id;
            if !graph.contains(next) || !constraints.allows(next, start, goal) {
                continue;
            }

            let next_cost = entry.cost + EDGE_WEIGHT;
            if next_cost < distances.get(&next).copied().unwrap_or(u32::MAX) {
                distances.insert(next, next_cost);
                parents.insert(next, entry.node);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    Ok(None)
}

fn reconstruct_path(
    parents: &HashMap<SystemId, SystemId>,
    start: SystemId,
    goal: SystemId,
) -> Result<Vec<SystemId>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = *parents.get(&current).ok_or(Error::BrokenRoute {
            start,
            goal,
            at: current,
        })?;
        path.push(current);
    }
    path.reverse();
    Ok(path)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: SystemId,
    cost: u32,
}

impl QueueEntry {
    fn new(node: SystemId, cost: u32) -> Self {
        Self { node, cost }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then id.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
