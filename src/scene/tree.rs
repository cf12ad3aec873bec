//! One scene's node tree.
//!
//! Nodes live in a map keyed by id; ordering lives only in the child lists (the scene root list
//! plus each folder's `children`). Reparenting is a splice between two lists, and a folder's
//! subtree travels with it because the folder owns its child list. Tree order and draw order
//! are both derived from the lists on demand and are never stored.

use std::collections::HashMap;

use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{NodeId, SceneId};
use crate::foundation::reach;
use crate::scene::node::{NodeKind, SceneItem, SceneItemFolder, SceneNode};

/// Where a moved node should end up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveTarget {
    /// Last child of the folder, or last root node for `None`.
    Parent(Option<NodeId>),
    /// Immediately before the anchor in tree order, adopting the anchor's parent.
    Before(NodeId),
    /// Immediately after the anchor (and its subtree), adopting the anchor's parent.
    After(NodeId),
}

/// A node's slot in draw order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawSlot {
    /// Node id.
    pub id: NodeId,
    /// Node kind.
    pub kind: NodeKind,
    /// Draw index: items count up from zero; folders repeat the nearest preceding item's
    /// index, or `None` when no item precedes them.
    pub draw_index: Option<usize>,
}

/// A scene: a name plus an ordered tree of items and folders.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    id: SceneId,
    name: String,
    nodes: HashMap<NodeId, SceneNode>,
    root: Vec<NodeId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(id: SceneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: HashMap::new(),
            root: Vec::new(),
        }
    }

    /// Scene id.
    pub fn id(&self) -> &SceneId {
        &self.id
    }

    /// Scene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Number of nodes (items and folders).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` when the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return `true` when `id` is a node of this scene.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node.
    pub fn node(&self, id: &NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Look up an item.
    pub fn item(&self, id: &NodeId) -> Option<&SceneItem> {
        self.nodes.get(id).and_then(SceneNode::as_item)
    }

    /// Look up a folder.
    pub fn folder(&self, id: &NodeId) -> Option<&SceneItemFolder> {
        self.nodes.get(id).and_then(SceneNode::as_folder)
    }

    /// Parentless nodes in tree order.
    pub fn root_nodes(&self) -> &[NodeId] {
        &self.root
    }

    /// Direct children of `parent` (scene root for `None`); empty for unknown ids and items.
    pub fn children(&self, parent: Option<&NodeId>) -> &[NodeId] {
        self.siblings(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every node id in tree order (depth-first pre-order).
    pub fn tree_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&NodeId> = self.root.iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id.clone());
            if let Some(SceneNode::Folder(f)) = self.nodes.get(id) {
                stack.extend(f.children.iter().rev());
            }
        }
        out
    }

    /// Draw order derived from tree order.
    pub fn draw_order(&self) -> Vec<DrawSlot> {
        let mut next = 0usize;
        let mut last: Option<usize> = None;
        self.tree_order()
            .into_iter()
            .filter_map(|id| {
                let kind = self.nodes.get(&id)?.kind();
                let draw_index = match kind {
                    NodeKind::Item => {
                        last = Some(next);
                        next += 1;
                        last
                    }
                    NodeKind::Folder => last,
                };
                Some(DrawSlot {
                    id,
                    kind,
                    draw_index,
                })
            })
            .collect()
    }

    /// Draw index of one node; `None` for unknown ids, `Some(None)` for a leading folder.
    pub fn draw_index(&self, id: &NodeId) -> Option<Option<usize>> {
        self.draw_order()
            .into_iter()
            .find(|slot| &slot.id == id)
            .map(|slot| slot.draw_index)
    }

    /// Items in tree order (back to front).
    pub fn items(&self) -> Vec<&SceneItem> {
        self.tree_order()
            .iter()
            .filter_map(|id| self.item(id))
            .collect()
    }

    /// Folders in tree order.
    pub fn folders(&self) -> Vec<&SceneItemFolder> {
        self.tree_order()
            .iter()
            .filter_map(|id| self.folder(id))
            .collect()
    }

    /// Nearest item strictly after `id` in tree order, skipping folders.
    pub fn next_item(&self, id: &NodeId) -> Option<&SceneItem> {
        let order = self.tree_order();
        let pos = order.iter().position(|o| o == id)?;
        order[pos + 1..].iter().find_map(|o| self.item(o))
    }

    /// Nearest item strictly before `id` in tree order, skipping folders.
    pub fn prev_item(&self, id: &NodeId) -> Option<&SceneItem> {
        let order = self.tree_order();
        let pos = order.iter().position(|o| o == id)?;
        order[..pos].iter().rev().find_map(|o| self.item(o))
    }

    /// Descendants of `id` in tree order, excluding `id`.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }
        let mut out = reach::walk_depth_first(id.clone(), |n| self.children(Some(n)).to_vec());
        out.remove(0);
        out
    }

    /// Return `true` when `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        ancestor != node
            && reach::reaches(ancestor, node, |n| self.children(Some(n)).to_vec())
    }

    /// Ancestors of `id`, nearest first.
    pub fn parent_chain(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes.get(id).and_then(SceneNode::parent_id);
        while let Some(p) = cur {
            out.push(p.clone());
            cur = self.nodes.get(p).and_then(SceneNode::parent_id);
        }
        out
    }

    // -- Structural mutation (crate-internal; callers emit notifications) --

    fn siblings(&self, parent: Option<&NodeId>) -> Option<&Vec<NodeId>> {
        match parent {
            None => Some(&self.root),
            Some(p) => match self.nodes.get(p) {
                Some(SceneNode::Folder(f)) => Some(&f.children),
                _ => None,
            },
        }
    }

    fn siblings_mut(&mut self, parent: Option<&NodeId>) -> Option<&mut Vec<NodeId>> {
        let Self { nodes, root, .. } = self;
        match parent {
            None => Some(root),
            Some(p) => match nodes.get_mut(p) {
                Some(SceneNode::Folder(f)) => Some(&mut f.children),
                _ => None,
            },
        }
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Check that `parent` can receive a new child.
    pub(crate) fn check_parent(&self, parent: Option<&NodeId>) -> SceneResult<()> {
        match parent {
            None => Ok(()),
            Some(p) => match self.nodes.get(p) {
                None => Err(SceneError::not_found("node", p)),
                Some(SceneNode::Item(_)) => Err(SceneError::NotAFolder(p.to_string())),
                Some(SceneNode::Folder(_)) => Ok(()),
            },
        }
    }

    /// Insert a new node as the last child of its `parent_id` (or last root node).
    pub(crate) fn insert(&mut self, mut node: SceneNode) -> SceneResult<NodeId> {
        let id = node.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(SceneError::validation(format!("duplicate node id '{id}'")));
        }
        let parent = node.parent_id().cloned();
        self.check_parent(parent.as_ref())?;
        // A fresh node's child list is rebuilt by later inserts.
        if let SceneNode::Folder(f) = &mut node {
            f.children.clear();
        }
        self.siblings_mut(parent.as_ref())
            .ok_or_else(|| SceneError::NotAFolder(format!("{parent:?}")))?
            .push(id.clone());
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Insert a node with a fully formed child list, trusting the caller for consistency.
    pub(crate) fn insert_raw(&mut self, node: SceneNode) {
        if node.parent_id().is_none() {
            self.root.push(node.id().clone());
        }
        self.nodes.insert(node.id().clone(), node);
    }

    /// Remove `id` and its subtree. Returns removed nodes, descendants before ancestors.
    pub(crate) fn remove_subtree(&mut self, id: &NodeId) -> Vec<SceneNode> {
        let Some(parent) = self.nodes.get(id).map(|n| n.parent_id().cloned()) else {
            return Vec::new();
        };
        if let Some(list) = self.siblings_mut(parent.as_ref()) {
            list.retain(|c| c != id);
        }
        let mut doomed = reach::walk_depth_first(id.clone(), |n| self.children(Some(n)).to_vec());
        doomed.reverse();
        doomed
            .iter()
            .filter_map(|d| self.nodes.remove(d))
            .collect()
    }

    /// Remove a folder, splicing its children into the folder's former slot.
    ///
    /// Returns the reparented children in their (unchanged) relative order.
    pub(crate) fn ungroup(&mut self, id: &NodeId) -> SceneResult<Vec<NodeId>> {
        let folder = match self.nodes.get(id) {
            None => return Err(SceneError::not_found("node", id)),
            Some(SceneNode::Item(_)) => return Err(SceneError::NotAFolder(id.to_string())),
            Some(SceneNode::Folder(f)) => f.clone(),
        };
        let parent = folder.parent_id.clone();
        let list = self
            .siblings_mut(parent.as_ref())
            .ok_or_else(|| SceneError::validation(format!("folder '{id}' has a dangling parent")))?;
        let pos = list
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| {
                SceneError::validation(format!("folder '{id}' missing from its parent"))
            })?;
        list.splice(pos..=pos, folder.children.iter().cloned());
        for child in &folder.children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.set_parent_id(parent.clone());
            }
        }
        self.nodes.remove(id);
        Ok(folder.children)
    }

    /// Validate a move without applying it.
    ///
    /// Returns `Ok(false)` when the move is a no-op by construction (anchor is the node itself).
    pub(crate) fn check_move(&self, id: &NodeId, target: &MoveTarget) -> SceneResult<bool> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::not_found("node", id));
        }
        match target {
            MoveTarget::Parent(None) => Ok(true),
            MoveTarget::Parent(Some(folder)) => {
                self.check_parent(Some(folder))?;
                if folder == id || self.is_ancestor(id, folder) {
                    return Err(SceneError::cyclic_move(id, folder));
                }
                Ok(true)
            }
            MoveTarget::Before(anchor) | MoveTarget::After(anchor) => {
                if !self.nodes.contains_key(anchor) {
                    return Err(SceneError::not_found("node", anchor));
                }
                if anchor == id {
                    return Ok(false);
                }
                if self.is_ancestor(id, anchor) {
                    return Err(SceneError::cyclic_move(id, anchor));
                }
                Ok(true)
            }
        }
    }

    fn position_of(&self, id: &NodeId) -> Option<(Option<NodeId>, usize)> {
        let parent = self.nodes.get(id)?.parent_id().cloned();
        let pos = self.siblings(parent.as_ref())?.iter().position(|c| c == id)?;
        Some((parent, pos))
    }

    /// Move `id` (and its subtree) to `target`. Returns `true` when the tree changed.
    pub(crate) fn move_node(&mut self, id: &NodeId, target: &MoveTarget) -> SceneResult<bool> {
        if !self.check_move(id, target)? {
            return Ok(false);
        }
        let before = self.position_of(id);
        let Some((old_parent, old_pos)) = before.clone() else {
            return Err(SceneError::validation(format!(
                "node '{id}' is missing from its parent list"
            )));
        };

        if let Some(list) = self.siblings_mut(old_parent.as_ref()) {
            list.remove(old_pos);
        }

        let (new_parent, index) = match target {
            MoveTarget::Parent(p) => {
                let len = self.children(p.as_ref()).len();
                (p.clone(), len)
            }
            MoveTarget::Before(anchor) | MoveTarget::After(anchor) => {
                let Some((p, pos)) = self.position_of(anchor) else {
                    return Err(SceneError::not_found("node", anchor));
                };
                let index = if matches!(target, MoveTarget::After(_)) {
                    pos + 1
                } else {
                    pos
                };
                (p, index)
            }
        };

        let list = self
            .siblings_mut(new_parent.as_ref())
            .ok_or_else(|| SceneError::NotAFolder(format!("{new_parent:?}")))?;
        list.insert(index, id.clone());
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_parent_id(new_parent);
        }

        Ok(self.position_of(id) != before)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/tree.rs"]
mod tests;
