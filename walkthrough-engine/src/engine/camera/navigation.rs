use std::collections::{BTreeMap, BTreeSet};

use bevy::math::Vec3;
use constants::coordinate_system::SceneFrame;
use constants::property::SceneLayout;

use super::pose::CameraPose;

/// Authored viewpoint placed into render space.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldNode {
    pub name: String,
    pub label: String,
    pub position: Vec3,
}

impl WorldNode {
    pub fn pose(&self) -> CameraPose {
        CameraPose::at_node(self.position)
    }
}

/// Reasons a move request is refused. Caller contract violations, never user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRejection {
    AlreadyCurrent,
    UnknownNode,
    NotAdjacent,
}

/// Named viewpoints with an explicit adjacency relation.
///
/// `current` reflects the settled node; it only changes through [`NavigationGraph::settle`].
#[derive(Debug, Clone)]
pub struct NavigationGraph {
    nodes: BTreeMap<String, WorldNode>,
    order: Vec<String>,
    edges: BTreeSet<(String, String)>,
    current: String,
    default: String,
}

impl NavigationGraph {
    /// Every node reachable from every other. `None` if `start` is not among `nodes`.
    pub fn complete(nodes: Vec<WorldNode>, start: &str) -> Option<Self> {
        let mut graph = Self::unconnected(nodes, start)?;
        let names = graph.order.clone();
        for from in &names {
            for to in &names {
                if from != to {
                    graph.edges.insert((from.clone(), to.clone()));
                }
            }
        }
        Some(graph)
    }

    /// Nodes with no edges yet; connect them with [`NavigationGraph::connect`].
    pub fn unconnected(nodes: Vec<WorldNode>, start: &str) -> Option<Self> {
        let mut map = BTreeMap::new();
        let mut order = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !map.contains_key(&node.name) {
                order.push(node.name.clone());
            }
            map.insert(node.name.clone(), node);
        }
        if !map.contains_key(start) {
            return None;
        }
        Some(Self {
            nodes: map,
            order,
            edges: BTreeSet::new(),
            current: start.to_string(),
            default: start.to_string(),
        })
    }

    /// Place a layout's nodes with the scene frame and connect them completely.
    pub fn from_layout(layout: &SceneLayout, frame: &SceneFrame) -> Option<Self> {
        let start = layout.default_node?;
        let nodes = layout
            .nodes
            .iter()
            .map(|node| WorldNode {
                name: node.name.to_string(),
                label: node.label.to_string(),
                position: frame.place(Vec3::from_array(node.position), layout.node_space),
            })
            .collect();
        Self::complete(nodes, start)
    }

    /// Add a directed edge between two existing nodes.
    pub fn connect(&mut self, from: &str, to: &str) -> bool {
        if from == to || !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            return false;
        }
        self.edges.insert((from.to_string(), to.to_string()))
    }

    pub fn current_node(&self) -> &WorldNode {
        &self.nodes[&self.current]
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// Node the camera is placed at when the scene becomes ready.
    pub fn default_node(&self) -> &WorldNode {
        &self.nodes[&self.default]
    }

    pub fn node(&self, name: &str) -> Option<&WorldNode> {
        self.nodes.get(name)
    }

    /// Nodes in authored order.
    pub fn nodes(&self) -> impl Iterator<Item = &WorldNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_adjacent(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&(from.to_string(), to.to_string()))
    }

    /// First neighbour of `from` after it in authored order, wrapping around.
    pub fn next_from(&self, from: &str) -> Option<&WorldNode> {
        let start = self.order.iter().position(|name| name == from)?;
        (1..self.order.len())
            .map(|offset| &self.order[(start + offset) % self.order.len()])
            .find(|name| self.is_adjacent(from, name))
            .and_then(|name| self.nodes.get(name))
    }

    pub fn next_from_current(&self) -> Option<&WorldNode> {
        self.next_from(&self.current)
    }

    /// Validate a move from the settled node.
    pub fn request_move(&self, name: &str) -> Result<&WorldNode, NavigationRejection> {
        let target = self.nodes.get(name).ok_or(NavigationRejection::UnknownNode)?;
        if name == self.current {
            return Err(NavigationRejection::AlreadyCurrent);
        }
        if !self.is_adjacent(&self.current, name) {
            return Err(NavigationRejection::NotAdjacent);
        }
        Ok(target)
    }

    /// Record arrival at a node. Unknown names leave the graph untouched.
    pub fn settle(&mut self, name: &str) -> bool {
        if self.nodes.contains_key(name) {
            self.current = name.to_string();
            true
        } else {
            false
        }
    }
}
