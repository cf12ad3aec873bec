use std::collections::HashSet;

use crate::foundation::core::{Anchor, Canvas, Rect, Size, Vec2};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{NodeId, SceneId};
use crate::scene::graph::{SceneGraph, top_level_in_tree_order};
use crate::scene::node::{ItemPatch, ItemPlacement, SceneItem, SceneItemFolder};
use crate::scene::tree::{MoveTarget, Scene};
use crate::selection::transform;

/// A scene-scoped set of node ids.
///
/// Only ids are stored. Every read resolves them against the live [`SceneGraph`], so ids of
/// nodes removed since they were selected (or that never belonged to the scene) are never
/// returned and never acted upon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    scene: SceneId,
    ids: Vec<NodeId>,
}

impl Selection {
    /// Empty selection over `scene`.
    pub fn new(scene: SceneId) -> Self {
        Self {
            scene,
            ids: Vec::new(),
        }
    }

    /// Scene the selection is relative to.
    pub fn scene_id(&self) -> &SceneId {
        &self.scene
    }

    fn live<'g>(&self, graph: &'g SceneGraph) -> Option<&'g Scene> {
        graph.scene(&self.scene)
    }

    /// Drop ids that no longer resolve in the scene.
    fn prune(&mut self, graph: &SceneGraph) {
        match self.live(graph) {
            Some(scene) => self.ids.retain(|id| scene.contains(id)),
            None => self.ids.clear(),
        }
    }

    fn insert_valid<'a>(&mut self, graph: &SceneGraph, ids: impl IntoIterator<Item = &'a NodeId>) {
        let Some(scene) = self.live(graph) else {
            return;
        };
        for id in ids {
            if scene.contains(id) && !self.ids.contains(id) {
                self.ids.push(id.clone());
            }
        }
    }

    // -- Set operations --

    /// Replace the selection with the valid members of `ids`.
    pub fn select<'a>(&mut self, graph: &SceneGraph, ids: impl IntoIterator<Item = &'a NodeId>) {
        self.ids.clear();
        self.insert_valid(graph, ids);
    }

    /// Add the valid members of `ids`.
    pub fn add<'a>(&mut self, graph: &SceneGraph, ids: impl IntoIterator<Item = &'a NodeId>) {
        self.prune(graph);
        self.insert_valid(graph, ids);
    }

    /// Remove `ids` from the selection. Unknown ids are ignored.
    pub fn deselect<'a>(&mut self, graph: &SceneGraph, ids: impl IntoIterator<Item = &'a NodeId>) {
        let drop: HashSet<&NodeId> = ids.into_iter().collect();
        self.ids.retain(|id| !drop.contains(id));
        self.prune(graph);
    }

    /// Select exactly the nodes of the scene that are not currently selected.
    pub fn invert(&mut self, graph: &SceneGraph) {
        let Some(scene) = self.live(graph) else {
            self.ids.clear();
            return;
        };
        let current: HashSet<&NodeId> = self.ids.iter().collect();
        let inverted = scene
            .tree_order()
            .into_iter()
            .filter(|id| !current.contains(id))
            .collect();
        self.ids = inverted;
    }

    /// Clear the selection.
    pub fn reset(&mut self) {
        self.ids.clear();
    }

    /// Select every node of the scene, folders included.
    pub fn select_all(&mut self, graph: &SceneGraph) {
        self.ids = self.live(graph).map(Scene::tree_order).unwrap_or_default();
    }

    // -- Reads --

    /// Selected ids that still exist, in tree order.
    pub fn get_ids(&self, graph: &SceneGraph) -> Vec<NodeId> {
        let Some(scene) = self.live(graph) else {
            return Vec::new();
        };
        let wanted: HashSet<&NodeId> = self.ids.iter().collect();
        scene
            .tree_order()
            .into_iter()
            .filter(|id| wanted.contains(id))
            .collect()
    }

    /// Selected items, in tree order.
    pub fn get_items<'g>(&self, graph: &'g SceneGraph) -> Vec<&'g SceneItem> {
        let Some(scene) = self.live(graph) else {
            return Vec::new();
        };
        self.get_ids(graph)
            .iter()
            .filter_map(|id| scene.item(id))
            .collect()
    }

    /// Selected folders, in tree order.
    pub fn get_folders<'g>(&self, graph: &'g SceneGraph) -> Vec<&'g SceneItemFolder> {
        let Some(scene) = self.live(graph) else {
            return Vec::new();
        };
        self.get_ids(graph)
            .iter()
            .filter_map(|id| scene.folder(id))
            .collect()
    }

    /// Selected nodes without a selected ancestor, in tree order.
    pub fn get_root_nodes(&self, graph: &SceneGraph) -> Vec<NodeId> {
        match self.live(graph) {
            Some(scene) => top_level_in_tree_order(scene, &self.get_ids(graph)),
            None => Vec::new(),
        }
    }

    /// Return `true` when `id` is selected and still exists.
    pub fn is_selected(&self, graph: &SceneGraph, id: &NodeId) -> bool {
        self.ids.contains(id) && self.live(graph).is_some_and(|s| s.contains(id))
    }

    /// Number of live selected nodes.
    pub fn len(&self, graph: &SceneGraph) -> usize {
        self.get_ids(graph).len()
    }

    /// Return `true` when no live node is selected.
    pub fn is_empty(&self, graph: &SceneGraph) -> bool {
        self.len(graph) == 0
    }

    /// Union of the selected items' canvas bounds; `None` without selected items.
    pub fn bounding_rect(&self, graph: &SceneGraph) -> Option<Rect> {
        self.get_items(graph)
            .into_iter()
            .map(|item| item.placement.bounds(graph.item_source_size(item)))
            .reduce(|acc, r| acc.union(r))
    }

    // -- Structural operations --

    /// Move every top-level selected node into `folder` (scene root for `None`).
    ///
    /// The target folder itself is skipped when selected.
    pub fn set_parent(&self, graph: &mut SceneGraph, folder: Option<&NodeId>) -> SceneResult<()> {
        let ids: Vec<NodeId> = self
            .get_ids(graph)
            .into_iter()
            .filter(|id| Some(id) != folder)
            .collect();
        graph.move_nodes(&self.scene, &ids, MoveTarget::Parent(folder.cloned()))
    }

    /// Move every top-level selected node immediately before `anchor`, keeping relative order.
    pub fn place_before(&self, graph: &mut SceneGraph, anchor: &NodeId) -> SceneResult<()> {
        let ids = self.get_ids(graph);
        graph.move_nodes(&self.scene, &ids, MoveTarget::Before(anchor.clone()))
    }

    /// Move every top-level selected node immediately after `anchor`, keeping relative order.
    pub fn place_after(&self, graph: &mut SceneGraph, anchor: &NodeId) -> SceneResult<()> {
        let ids = self.get_ids(graph);
        graph.move_nodes(&self.scene, &ids, MoveTarget::After(anchor.clone()))
    }

    /// Remove every selected node (and subtree) as one change, then clear the selection.
    #[tracing::instrument(skip(self, graph), fields(scene = %self.scene))]
    pub fn remove(&mut self, graph: &mut SceneGraph) -> SceneResult<()> {
        let ids = self.get_root_nodes(graph);
        graph.remove_nodes(&self.scene, &ids)?;
        self.ids.clear();
        Ok(())
    }

    // -- Placement operations --

    /// Apply `patch` to every selected item; selected folders are left alone.
    pub fn set_settings(&self, graph: &mut SceneGraph, patch: ItemPatch) -> SceneResult<()> {
        let ids: Vec<NodeId> = self.get_items(graph).iter().map(|i| i.id.clone()).collect();
        graph.update_items(&self.scene, &ids, patch)
    }

    /// Show or hide every selected item.
    pub fn set_visibility(&self, graph: &mut SceneGraph, visible: bool) -> SceneResult<()> {
        self.set_settings(graph, ItemPatch::visible(visible))
    }

    /// Lock or unlock every selected item.
    pub fn set_locked(&self, graph: &mut SceneGraph, locked: bool) -> SceneResult<()> {
        self.set_settings(graph, ItemPatch::locked(locked))
    }

    fn transform_items(
        &self,
        graph: &mut SceneGraph,
        f: impl Fn(&ItemPlacement, Size) -> Option<ItemPlacement>,
    ) -> SceneResult<()> {
        let placements: Vec<(NodeId, ItemPlacement)> = self
            .get_items(graph)
            .into_iter()
            .filter_map(|item| {
                let size = graph.item_source_size(item);
                f(&item.placement, size).map(|p| (item.id.clone(), p))
            })
            .collect();
        graph.set_placements(&self.scene, placements)
    }

    /// Scale every selected item by `factor`, each around its own `anchor` point.
    #[tracing::instrument(skip(self, graph))]
    pub fn scale(&self, graph: &mut SceneGraph, factor: Vec2, anchor: Anchor) -> SceneResult<()> {
        if !(factor.x.is_finite() && factor.y.is_finite()) {
            return Err(SceneError::validation("scale factor must be finite"));
        }
        let fractions = anchor.fractions();
        self.transform_items(graph, |p, size| {
            Some(transform::scaled(p, size, factor, fractions))
        })
    }

    /// Rotate every selected item by `degrees` around its center.
    pub fn rotate(&self, graph: &mut SceneGraph, degrees: f64) -> SceneResult<()> {
        if !degrees.is_finite() {
            return Err(SceneError::validation("rotation must be finite"));
        }
        self.transform_items(graph, |p, size| Some(transform::rotated(p, size, degrees)))
    }

    /// Mirror every selected item horizontally.
    pub fn flip_x(&self, graph: &mut SceneGraph) -> SceneResult<()> {
        self.transform_items(graph, |p, size| Some(transform::flipped(p, size, true, false)))
    }

    /// Mirror every selected item vertically.
    pub fn flip_y(&self, graph: &mut SceneGraph) -> SceneResult<()> {
        self.transform_items(graph, |p, size| Some(transform::flipped(p, size, false, true)))
    }

    /// Reset position, scale, rotation and crop of every selected item.
    pub fn reset_transform(&self, graph: &mut SceneGraph) -> SceneResult<()> {
        self.transform_items(graph, |p, _| Some(transform::reset(p)))
    }

    /// Center each selected item on the canvas.
    pub fn center_on_canvas(&self, graph: &mut SceneGraph, canvas: Canvas) -> SceneResult<()> {
        let area = canvas.rect();
        self.transform_items(graph, |p, size| Some(transform::centered(p, size, area)))
    }

    /// Scale each selected item uniformly to fit the canvas, then center it.
    ///
    /// Items with zero-sized content are left unchanged.
    pub fn fit_to_canvas(&self, graph: &mut SceneGraph, canvas: Canvas) -> SceneResult<()> {
        let area = canvas.rect();
        self.transform_items(graph, |p, size| transform::fitted(p, size, area))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/view.rs"]
mod tests;
