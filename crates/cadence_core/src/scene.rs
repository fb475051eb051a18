//! In-memory reference stage
//!
//! A small object tree with per-node view and layer state. Sibling order is
//! the z-order: the last sibling is drawn on top.

use crate::change::{LayerChange, LayerState, ViewChange, ViewState};
use crate::lock::{InteractionCounter, InteractionLock};
use crate::object::ObjectId;
use crate::stage::{ApplyChange, Stage};
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::sync::Arc;

/// A node in the scene
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub name: String,
    pub view: ViewState,
    pub layer: LayerState,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
}

impl Node {
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }
}

/// Reference [`Stage`] implementation
pub struct Scene {
    nodes: SlotMap<ObjectId, Node>,
    roots: Vec<ObjectId>,
    interaction: Arc<InteractionCounter>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            interaction: Arc::new(InteractionCounter::new()),
        }
    }

    /// Insert a top-level node, placed above existing top-level nodes
    pub fn insert(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.nodes.insert(Node {
            name: name.into(),
            ..Default::default()
        });
        self.roots.push(id);
        id
    }

    /// Insert a node under `parent`, placed above its existing children
    ///
    /// Returns `None` if `parent` is not in the scene.
    pub fn insert_child(&mut self, parent: ObjectId, name: impl Into<String>) -> Option<ObjectId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }

        let id = self.nodes.insert(Node {
            name: name.into(),
            parent: Some(parent),
            ..Default::default()
        });
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(parent) = self.nodes.get(id).map(|n| n.parent) else {
            return false;
        };

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }

        let mut pending: SmallVec<[ObjectId; 8]> = SmallVec::new();
        pending.push(id);
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
            }
        }
        true
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn name(&self, id: ObjectId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    pub fn view(&self, id: ObjectId) -> Option<&ViewState> {
        self.nodes.get(id).map(|n| &n.view)
    }

    pub fn view_mut(&mut self, id: ObjectId) -> Option<&mut ViewState> {
        self.nodes.get_mut(id).map(|n| &mut n.view)
    }

    pub fn layer(&self, id: ObjectId) -> Option<&LayerState> {
        self.nodes.get(id).map(|n| &n.layer)
    }

    /// The sibling list `id` belongs to, bottommost first
    ///
    /// Empty if `id` is not in the scene.
    pub fn siblings(&self, id: ObjectId) -> &[ObjectId] {
        match self.nodes.get(id) {
            Some(node) => match node.parent.and_then(|p| self.nodes.get(p)) {
                Some(parent) => parent.children.as_slice(),
                None => self.roots.as_slice(),
            },
            None => &[],
        }
    }

    /// Position of `id` among its siblings (0 = bottommost)
    pub fn z_index(&self, id: ObjectId) -> Option<usize> {
        self.siblings(id).iter().position(|s| *s == id)
    }

    /// The counting lock handed out by [`Stage::interaction_lock`]
    pub fn interaction(&self) -> &Arc<InteractionCounter> {
        &self.interaction
    }

    fn sibling_list_mut(&mut self, id: ObjectId) -> Option<&mut Vec<ObjectId>> {
        let parent = self.nodes.get(id)?.parent;
        match parent {
            Some(parent) => self.nodes.get_mut(parent).map(|p| &mut p.children),
            None => Some(&mut self.roots),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Scene {
    fn bring_to_front(&mut self, object: ObjectId) {
        let Some(siblings) = self.sibling_list_mut(object) else {
            tracing::trace!(?object, "bring_to_front on a dead object");
            return;
        };

        if let Some(index) = siblings.iter().position(|s| *s == object) {
            let id = siblings.remove(index);
            siblings.push(id);
        }
    }

    fn interaction_lock(&self) -> Arc<dyn InteractionLock> {
        self.interaction.clone()
    }
}

impl ApplyChange<ViewChange> for Scene {
    fn apply_change(&mut self, object: ObjectId, change: &ViewChange) {
        match self.nodes.get_mut(object) {
            Some(node) => node.view.apply(change),
            None => tracing::trace!(?object, "view change on a dead object"),
        }
    }
}

impl ApplyChange<LayerChange> for Scene {
    fn apply_change(&mut self, object: ObjectId, change: &LayerChange) {
        match self.nodes.get_mut(object) {
            Some(node) => node.layer.apply(change),
            None => tracing::trace!(?object, "layer change on a dead object"),
        }
    }
}
