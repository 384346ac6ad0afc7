//! Scene graph for the placement world.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Node, NodeId, SceneError, SceneResult};

/// A scene containing all placement nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// All nodes in the scene, indexed by ID.
    nodes: HashMap<NodeId, Node>,
    /// Root-level node IDs (not children of any node).
    root_nodes: Vec<NodeId>,
}

impl Scene {
    /// Create a new empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at the root of the scene.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        if node.parent.is_none() {
            self.root_nodes.push(id);
        }
        self.nodes.insert(id, node);
        id
    }

    /// Add a node as a child of an existing node.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent node is not found.
    pub fn attach_child(&mut self, parent: NodeId, mut node: Node) -> SceneResult<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent.to_string()));
        }
        node.parent = Some(parent);
        let id = node.id;
        self.nodes.insert(id, node);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    /// Get a node by ID.
    #[must_use]
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Get all nodes in the scene.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get root-level nodes (not children of any node).
    pub fn root_nodes(&self) -> impl Iterator<Item = &Node> {
        self.root_nodes.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Get the direct children of a node.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child_id| self.nodes.get(child_id))
    }

    /// Remove every descendant of a node, leaving the node itself in place.
    /// Returns the number of nodes removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not found.
    pub fn remove_children(&mut self, id: NodeId) -> SceneResult<usize> {
        let Some(node) = self.nodes.get(&id) else {
            return Err(SceneError::NodeNotFound(id.to_string()));
        };

        let mut pending = node.children.clone();
        let mut removed = 0;
        while let Some(next) = pending.pop() {
            if let Some(gone) = self.nodes.remove(&next) {
                pending.extend(gone.children);
                self.root_nodes.retain(|&root_id| root_id != next);
                removed += 1;
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children.clear();
        }
        Ok(removed)
    }

    /// Remove every node from the scene.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_nodes.clear();
    }

    /// Advance time-based actions on all nodes by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        for node in self.nodes.values_mut() {
            node.advance_spins(dt);
        }
    }

    /// Get the number of nodes in the scene.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string(self).map_err(SceneError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json).map_err(SceneError::Serialization)
    }
}
