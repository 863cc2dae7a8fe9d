//! Graph traversal over connectors
//!
//! Connectors form an undirected adjacency list for the purpose of aggregation: a node's
//! neighbors are the other endpoints of every connector that touches it, resolved through
//! a [`NodeLookup`]. Unresolvable endpoints are skipped silently.

use std::collections::{BTreeMap, HashSet};

use crate::model::{Connector, Node, NodeKind, NodeLookup};

/// Neighbor nodes of a focal node, bucketed by kind.
///
/// Bucket contents follow connector order, but callers should treat them as unordered.
#[derive(Debug, Default, Clone)]
pub struct Neighborhood<'a> {
    buckets: BTreeMap<NodeKind, Vec<&'a Node>>,
}

impl<'a> Neighborhood<'a> {
    /// Neighbors of one kind; empty for kinds that were never seen
    pub fn of_kind(&self, kind: NodeKind) -> &[&'a Node] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn goals(&self) -> &[&'a Node] {
        self.of_kind(NodeKind::Goal)
    }

    pub fn tasks(&self) -> &[&'a Node] {
        self.of_kind(NodeKind::Task)
    }

    pub fn habits(&self) -> &[&'a Node] {
        self.of_kind(NodeKind::Habit)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// All neighbors, grouped by kind
    pub fn iter(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.buckets.values().flatten().copied()
    }

    fn contains(&self, id: &str) -> bool {
        self.iter().any(|n| n.id == id)
    }

    fn push(&mut self, node: &'a Node) {
        self.buckets.entry(node.kind()).or_default().push(node);
    }
}

/// One-hop neighbors of `focal_id`.
///
/// Each connector is visited once. Self-loops contribute nothing, and a node reachable
/// through several connectors appears once.
pub fn neighbors<'a, L>(focal_id: &str, nodes: &'a L, connectors: &[Connector]) -> Neighborhood<'a>
where
    L: NodeLookup + ?Sized,
{
    let mut hood = Neighborhood::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for connector in connectors {
        let Some(other) = connector.other_end(focal_id) else {
            continue;
        };
        if other == focal_id || !seen.insert(other) {
            continue;
        }
        if let Some(node) = nodes.node(other) {
            hood.push(node);
        }
    }

    hood
}

/// One-hop neighbors plus the tasks of every neighboring goal.
///
/// Tasks reached through a goal are merged into the task bucket, de-duplicated by id.
/// The focal node itself is never reported even when a goal links back to it.
pub fn neighbors_with_goal_tasks<'a, L>(
    focal_id: &str,
    nodes: &'a L,
    connectors: &[Connector],
) -> Neighborhood<'a>
where
    L: NodeLookup + ?Sized,
{
    let mut hood = neighbors(focal_id, nodes, connectors);
    let goal_ids: Vec<String> = hood.goals().iter().map(|g| g.id.clone()).collect();

    for goal_id in &goal_ids {
        for task in neighbors(goal_id, nodes, connectors).tasks() {
            if task.id != focal_id && !hood.contains(&task.id) {
                hood.push(*task);
            }
        }
    }

    hood
}

/// Goals directly connected to a task
pub fn goals_of_task<'a, L>(task_id: &str, nodes: &'a L, connectors: &[Connector]) -> Vec<&'a Node>
where
    L: NodeLookup + ?Sized,
{
    neighbors(task_id, nodes, connectors).goals().to_vec()
}

/// Connectors with at least one endpoint that no longer resolves
pub fn dangling<'c, L>(connectors: &'c [Connector], nodes: &L) -> Vec<&'c Connector>
where
    L: NodeLookup + ?Sized,
{
    connectors
        .iter()
        .filter(|c| nodes.node(&c.from_id).is_none() || nodes.node(&c.to_id).is_none())
        .collect()
}
