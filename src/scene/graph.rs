use std::collections::{BTreeMap, HashMap, HashSet};

use crate::foundation::core::{Canvas, Size};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{CollectionId, NodeId, SceneId, SourceId};
use crate::foundation::reach;
use crate::scene::events::{ChangeSet, SceneEvent};
use crate::scene::node::{ItemPatch, ItemPlacement, SceneItem, SceneItemFolder, SceneNode};
use crate::scene::tree::{MoveTarget, Scene};
use crate::sources::registry::{SCENE_SOURCE_TYPE, SourceDescriptor, SourceRegistry, SourceSpec};

/// Options for adding an item.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AddItemOptions {
    /// Placement applied on top of the default placement.
    #[serde(default)]
    pub placement: ItemPatch,
    /// Folder to append the item to; scene root when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

impl AddItemOptions {
    /// Options that append into `folder`.
    pub fn in_folder(folder: NodeId) -> Self {
        Self {
            parent: Some(folder),
            ..Self::default()
        }
    }
}

/// An item found by [`SceneGraph::nested_items`], tagged with the scene it lives in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedItem {
    /// Scene that directly holds the item.
    pub scene: SceneId,
    /// The item.
    pub item: NodeId,
    /// The item's source.
    pub source: SourceId,
}

/// The in-memory model of one loaded scene collection.
///
/// All structural mutations go through `&mut self` methods that validate first and then apply,
/// so a failed call leaves the graph untouched and emits no [`ChangeSet`].
#[derive(Debug)]
pub struct SceneGraph {
    collection_id: CollectionId,
    name: String,
    canvas: Canvas,
    scenes: HashMap<SceneId, Scene>,
    scene_order: Vec<SceneId>,
    active_scene: Option<SceneId>,
    registry: Box<dyn SourceRegistry>,
    pub(crate) paste_origins: BTreeMap<String, SourceId>,
    outbox: Vec<ChangeSet>,
}

impl SceneGraph {
    /// Create an empty collection model backed by `registry`.
    pub fn new(
        name: impl Into<String>,
        canvas: Canvas,
        registry: Box<dyn SourceRegistry>,
    ) -> Self {
        Self::from_parts(CollectionId::generate(), name.into(), canvas, registry)
    }

    pub(crate) fn from_parts(
        collection_id: CollectionId,
        name: String,
        canvas: Canvas,
        registry: Box<dyn SourceRegistry>,
    ) -> Self {
        Self {
            collection_id,
            name,
            canvas,
            scenes: HashMap::new(),
            scene_order: Vec::new(),
            active_scene: None,
            registry,
            paste_origins: BTreeMap::new(),
            outbox: Vec::new(),
        }
    }

    /// Id of the loaded collection.
    pub fn collection_id(&self) -> &CollectionId {
        &self.collection_id
    }

    /// Name of the loaded collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base output resolution; also the size of nested-scene items.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// The resource registry.
    pub fn registry(&self) -> &dyn SourceRegistry {
        self.registry.as_ref()
    }

    /// The resource registry, mutably (external edits such as settings changes).
    pub fn registry_mut(&mut self) -> &mut dyn SourceRegistry {
        self.registry.as_mut()
    }

    /// Resolve a source through the registry.
    pub fn source(&self, id: &SourceId) -> Option<SourceDescriptor> {
        self.registry.resolve(id)
    }

    /// Return `true` when `id` names a scene of this collection.
    pub fn is_scene_source(&self, id: &SourceId) -> bool {
        self.scenes.contains_key(&id.as_scene())
    }

    /// Intrinsic size of an item's source; nested scenes are canvas-sized.
    pub fn item_source_size(&self, item: &SceneItem) -> Size {
        if self.is_scene_source(&item.source_id) {
            return Size::new(f64::from(self.canvas.width), f64::from(self.canvas.height));
        }
        self.registry
            .resolve(&item.source_id)
            .map(|d| d.size_or_zero())
            .unwrap_or(Size::ZERO)
    }

    /// Look up a scene.
    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub(crate) fn scene_ref(&self, id: &SceneId) -> SceneResult<&Scene> {
        self.scenes
            .get(id)
            .ok_or_else(|| SceneError::not_found("scene", id))
    }

    pub(crate) fn scene_mut(&mut self, id: &SceneId) -> SceneResult<&mut Scene> {
        self.scenes
            .get_mut(id)
            .ok_or_else(|| SceneError::not_found("scene", id))
    }

    /// Scene ids in creation order.
    pub fn scene_ids(&self) -> &[SceneId] {
        &self.scene_order
    }

    /// Scenes in creation order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scene_order.iter().filter_map(|id| self.scenes.get(id))
    }

    /// Active scene id.
    pub fn active_scene_id(&self) -> Option<&SceneId> {
        self.active_scene.as_ref()
    }

    /// Active scene.
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active_scene.as_ref().and_then(|id| self.scenes.get(id))
    }

    /// Find a node in any scene.
    pub fn find_node(&self, id: &NodeId) -> Option<&SceneNode> {
        self.scenes().find_map(|s| s.node(id))
    }

    /// Drain the change sets emitted since the last call.
    pub fn take_changes(&mut self) -> Vec<ChangeSet> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn commit(&mut self, changes: ChangeSet) {
        if !changes.is_empty() {
            self.outbox.push(changes);
        }
    }

    // -- Scenes --

    pub(crate) fn insert_scene(&mut self, scene: Scene) {
        self.scene_order.push(scene.id().clone());
        self.scenes.insert(scene.id().clone(), scene);
    }

    pub(crate) fn set_active_raw(&mut self, id: Option<SceneId>) {
        self.active_scene = id;
    }

    /// Register a scene source and an empty scene, without emitting.
    pub(crate) fn create_scene(
        &mut self,
        name: &str,
        changes: &mut ChangeSet,
    ) -> SceneResult<SceneId> {
        let source = self
            .registry
            .create_source(SourceSpec::new(SCENE_SOURCE_TYPE, name))?;
        let id = source.as_scene();
        let resolved_name = self
            .registry
            .resolve(&source)
            .map(|d| d.name)
            .unwrap_or_else(|| name.to_owned());
        self.insert_scene(Scene::new(id.clone(), resolved_name));
        changes.push(SceneEvent::SceneAdded { scene: id.clone() });
        if self.active_scene.is_none() {
            self.active_scene = Some(id.clone());
            changes.push(SceneEvent::SceneSwitched {
                from: None,
                to: id.clone(),
            });
        }
        Ok(id)
    }

    /// Drop a scene created earlier in the same operation, without emitting.
    pub(crate) fn discard_scene(&mut self, id: &SceneId) {
        if self.scenes.remove(id).is_some() {
            self.scene_order.retain(|s| s != id);
            self.registry.release_source(&id.as_source());
            if self.active_scene.as_ref() == Some(id) {
                self.active_scene = self.scene_order.first().cloned();
            }
        }
    }

    /// Create an empty scene. The first scene of a collection becomes active.
    #[tracing::instrument(skip(self))]
    pub fn add_scene(&mut self, name: &str) -> SceneResult<SceneId> {
        let mut changes = ChangeSet::default();
        let id = self.create_scene(name, &mut changes)?;
        self.commit(changes);
        Ok(id)
    }

    /// Remove a scene, every item nesting it, and its scene source.
    ///
    /// The last remaining scene cannot be removed. Unknown ids are a no-op.
    #[tracing::instrument(skip(self))]
    pub fn remove_scene(&mut self, id: &SceneId) -> SceneResult<()> {
        if !self.scenes.contains_key(id) {
            return Ok(());
        }
        if self.scenes.len() == 1 {
            return Err(SceneError::validation("cannot remove the last scene"));
        }

        let mut changes = ChangeSet::default();
        let scene_source = id.as_source();
        let nesting: Vec<(SceneId, NodeId)> = self
            .scenes()
            .filter(|s| s.id() != id)
            .flat_map(|s| {
                s.items()
                    .into_iter()
                    .filter(|i| i.source_id == scene_source)
                    .map(|i| (s.id().clone(), i.id.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (sid, node) in nesting {
            if let Some(scene) = self.scenes.get_mut(&sid) {
                for removed in scene.remove_subtree(&node) {
                    changes.node_removed(&sid, removed.id());
                }
            }
        }

        let mut released = Vec::new();
        if let Some(scene) = self.scenes.remove(id) {
            released.extend(scene.items().into_iter().map(|i| i.source_id.clone()));
        }
        self.scene_order.retain(|s| s != id);
        self.registry.release_source(&scene_source);
        changes.push(SceneEvent::SceneRemoved { scene: id.clone() });
        self.release_unreferenced(released, &mut changes);

        if self.active_scene.as_ref() == Some(id) {
            let next = self.scene_order.first().cloned();
            self.active_scene = next.clone();
            if let Some(to) = next {
                changes.push(SceneEvent::SceneSwitched {
                    from: Some(id.clone()),
                    to,
                });
            }
        }
        self.commit(changes);
        Ok(())
    }

    /// Rename a scene.
    pub fn rename_scene(&mut self, id: &SceneId, name: &str) -> SceneResult<()> {
        let scene = self.scene_mut(id)?;
        if scene.name() == name {
            return Ok(());
        }
        scene.set_name(name.to_owned());
        self.commit(ChangeSet {
            events: vec![SceneEvent::SceneUpdated { scene: id.clone() }],
        });
        Ok(())
    }

    /// Copy a scene's tree into a new scene. Items keep referencing the same sources.
    #[tracing::instrument(skip(self))]
    pub fn duplicate_scene(&mut self, id: &SceneId, name: &str) -> SceneResult<SceneId> {
        let original = self.scene_ref(id)?.clone();
        let mut changes = ChangeSet::default();
        let new_id = self.create_scene(name, &mut changes)?;

        let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();
        let mut copy = Scene::new(new_id.clone(), self.scene_ref(&new_id)?.name());
        for old in original.tree_order() {
            let Some(node) = original.node(&old) else {
                continue;
            };
            let fresh = NodeId::generate();
            let parent = node.parent_id().and_then(|p| id_map.get(p)).cloned();
            let cloned = match node {
                SceneNode::Item(i) => SceneNode::Item(SceneItem {
                    id: fresh.clone(),
                    scene_id: new_id.clone(),
                    parent_id: parent,
                    source_id: i.source_id.clone(),
                    placement: i.placement,
                }),
                SceneNode::Folder(f) => SceneNode::Folder(SceneItemFolder {
                    id: fresh.clone(),
                    scene_id: new_id.clone(),
                    parent_id: parent,
                    name: f.name.clone(),
                    children: Vec::new(),
                }),
            };
            copy.insert(cloned)?;
            changes.node_added(&new_id, &fresh);
            id_map.insert(old, fresh);
        }
        self.scenes.insert(new_id.clone(), copy);
        self.commit(changes);
        Ok(new_id)
    }

    /// Switch the active scene.
    pub fn set_active_scene(&mut self, id: &SceneId) -> SceneResult<()> {
        self.scene_ref(id)?;
        if self.active_scene.as_ref() == Some(id) {
            return Ok(());
        }
        let from = self.active_scene.replace(id.clone());
        self.commit(ChangeSet {
            events: vec![SceneEvent::SceneSwitched {
                from,
                to: id.clone(),
            }],
        });
        Ok(())
    }

    // -- Nested scenes --

    /// Scenes directly nested by items of `scene`, in tree order, without repeats.
    pub fn nested_scene_ids(&self, scene: &SceneId) -> Vec<SceneId> {
        let Some(s) = self.scenes.get(scene) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        s.items()
            .into_iter()
            .map(|i| i.source_id.as_scene())
            .filter(|n| self.scenes.contains_key(n) && seen.insert(n.clone()))
            .collect()
    }

    /// Return `true` when `outer` is `inner` or (transitively) nests it.
    pub fn scene_contains(&self, outer: &SceneId, inner: &SceneId) -> bool {
        reach::reaches(outer, inner, |s| self.nested_scene_ids(s))
    }

    /// Reject nesting `target` into `scene` when `target` already contains `scene`.
    pub(crate) fn check_nesting(&self, scene: &SceneId, target: &SceneId) -> SceneResult<()> {
        if self.scene_contains(target, scene) {
            return Err(SceneError::cyclic_scene(scene, target));
        }
        Ok(())
    }

    /// Every item of `scene` plus, recursively, the items of scenes it nests.
    ///
    /// Depth-first discovery order; each nested scene is expanded once even when referenced
    /// several times, so cyclic or diamond-shaped nesting terminates.
    pub fn nested_items(&self, scene: &SceneId) -> SceneResult<Vec<NestedItem>> {
        self.scene_ref(scene)?;
        let mut visited = HashSet::from([scene.clone()]);
        let mut out = Vec::new();
        self.collect_nested(scene, &mut visited, &mut out);
        Ok(out)
    }

    fn collect_nested(
        &self,
        scene: &SceneId,
        visited: &mut HashSet<SceneId>,
        out: &mut Vec<NestedItem>,
    ) {
        let Some(s) = self.scenes.get(scene) else {
            return;
        };
        for item in s.items() {
            out.push(NestedItem {
                scene: scene.clone(),
                item: item.id.clone(),
                source: item.source_id.clone(),
            });
            let nested = item.source_id.as_scene();
            if self.scenes.contains_key(&nested) && visited.insert(nested.clone()) {
                self.collect_nested(&nested, visited, out);
            }
        }
    }

    // -- Nodes --

    pub(crate) fn add_item_inner(
        &mut self,
        scene: &SceneId,
        source: &SourceId,
        opts: &AddItemOptions,
        changes: &mut ChangeSet,
    ) -> SceneResult<NodeId> {
        self.scene_ref(scene)?.check_parent(opts.parent.as_ref())?;
        if self.registry.resolve(source).is_none() {
            return Err(SceneError::invalid_source(source));
        }
        if self.is_scene_source(source) {
            self.check_nesting(scene, &source.as_scene())?;
        }
        opts.placement.validate()?;

        let mut placement = ItemPlacement::default();
        opts.placement.apply_to(&mut placement);
        let id = NodeId::generate();
        self.scene_mut(scene)?.insert(SceneNode::Item(SceneItem {
            id: id.clone(),
            scene_id: scene.clone(),
            parent_id: opts.parent.clone(),
            source_id: source.clone(),
            placement,
        }))?;
        changes.node_added(scene, &id);
        Ok(id)
    }

    /// Add an item referencing an existing source at the top of tree order.
    ///
    /// Fails with [`SceneError::InvalidSource`] when the source does not resolve and with
    /// [`SceneError::CyclicScene`] when the source is a scene that already contains `scene`.
    #[tracing::instrument(skip(self, opts))]
    pub fn add_item(
        &mut self,
        scene: &SceneId,
        source: &SourceId,
        opts: AddItemOptions,
    ) -> SceneResult<NodeId> {
        let mut changes = ChangeSet::default();
        let id = self.add_item_inner(scene, source, &opts, &mut changes)?;
        self.commit(changes);
        Ok(id)
    }

    /// Create a source and add an item referencing it.
    #[tracing::instrument(skip(self, spec, opts), fields(type_id = %spec.type_id))]
    pub fn add_source_item(
        &mut self,
        scene: &SceneId,
        spec: SourceSpec,
        opts: AddItemOptions,
    ) -> SceneResult<NodeId> {
        self.scene_ref(scene)?.check_parent(opts.parent.as_ref())?;
        opts.placement.validate()?;
        if spec.type_id == SCENE_SOURCE_TYPE {
            return Err(SceneError::validation(
                "scene sources are created with add_scene",
            ));
        }
        let source = self.registry.create_source(spec)?;
        let mut changes = ChangeSet::default();
        changes.push(SceneEvent::SourceAdded {
            source: source.clone(),
        });
        match self.add_item_inner(scene, &source, &opts, &mut changes) {
            Ok(id) => {
                self.commit(changes);
                Ok(id)
            }
            Err(e) => {
                self.registry.release_source(&source);
                Err(e)
            }
        }
    }

    /// Add an item nesting `target` into `scene`.
    pub fn add_nested_scene(
        &mut self,
        scene: &SceneId,
        target: &SceneId,
        opts: AddItemOptions,
    ) -> SceneResult<NodeId> {
        self.scene_ref(target)?;
        self.add_item(scene, &target.as_source(), opts)
    }

    /// Add an empty folder at the top of tree order.
    pub fn add_folder(&mut self, scene: &SceneId, name: &str) -> SceneResult<NodeId> {
        self.add_folder_in(scene, name, None)
    }

    /// Add an empty folder as the last child of `parent` (scene root for `None`).
    pub fn add_folder_in(
        &mut self,
        scene: &SceneId,
        name: &str,
        parent: Option<&NodeId>,
    ) -> SceneResult<NodeId> {
        let id = NodeId::generate();
        self.scene_mut(scene)?
            .insert(SceneNode::Folder(SceneItemFolder {
                id: id.clone(),
                scene_id: scene.clone(),
                parent_id: parent.cloned(),
                name: name.to_owned(),
                children: Vec::new(),
            }))?;
        let mut changes = ChangeSet::default();
        changes.node_added(scene, &id);
        self.commit(changes);
        Ok(id)
    }

    /// Wrap nodes in a new folder placed where the first of them (in tree order) was.
    ///
    /// Nodes whose ancestor is also in `ids` stay inside that ancestor.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn group_nodes(
        &mut self,
        scene: &SceneId,
        ids: &[NodeId],
        name: &str,
    ) -> SceneResult<NodeId> {
        let s = self.scene_ref(scene)?;
        let live: Vec<NodeId> = ids.iter().filter(|id| s.contains(id)).cloned().collect();
        let roots = top_level_in_tree_order(s, &live);
        let Some(first) = roots.first().cloned() else {
            return Err(SceneError::validation("nothing to group"));
        };
        let parent = s.node(&first).and_then(SceneNode::parent_id).cloned();

        let id = NodeId::generate();
        let s = self.scene_mut(scene)?;
        s.insert(SceneNode::Folder(SceneItemFolder {
            id: id.clone(),
            scene_id: scene.clone(),
            parent_id: parent,
            name: name.to_owned(),
            children: Vec::new(),
        }))?;
        s.move_node(&id, &MoveTarget::Before(first))?;
        let mut changes = ChangeSet::default();
        changes.node_added(scene, &id);
        for root in &roots {
            s.move_node(root, &MoveTarget::Parent(Some(id.clone())))?;
            changes.node_updated(scene, root);
        }
        self.commit(changes);
        Ok(id)
    }

    /// Remove a node and its subtree. Unknown node ids are a no-op.
    pub fn remove_node(&mut self, scene: &SceneId, id: &NodeId) -> SceneResult<()> {
        self.remove_nodes(scene, std::slice::from_ref(id))
    }

    /// Remove several nodes (and subtrees) as one change. Unknown node ids are skipped.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn remove_nodes(&mut self, scene: &SceneId, ids: &[NodeId]) -> SceneResult<()> {
        let target = self.scene_mut(scene)?;
        let mut changes = ChangeSet::default();
        let mut released = Vec::new();
        for id in ids {
            for removed in target.remove_subtree(id) {
                if let SceneNode::Item(item) = &removed {
                    released.push(item.source_id.clone());
                }
                changes.node_removed(scene, removed.id());
            }
        }
        self.release_unreferenced(released, &mut changes);
        self.commit(changes);
        Ok(())
    }

    /// Release non-scene sources that no item in any scene references any more.
    fn release_unreferenced(&mut self, candidates: Vec<SourceId>, changes: &mut ChangeSet) {
        let mut seen = HashSet::new();
        for source in candidates {
            if !seen.insert(source.clone()) || self.is_scene_source(&source) {
                continue;
            }
            let referenced = self
                .scenes
                .values()
                .any(|s| s.items().iter().any(|i| i.source_id == source));
            if !referenced && self.registry.resolve(&source).is_some() {
                tracing::debug!(%source, "releasing unreferenced source");
                self.registry.release_source(&source);
                changes.push(SceneEvent::SourceRemoved { source });
            }
        }
        self.prune_paste_origins();
    }

    /// Forget paste provenance whose target no longer resolves.
    pub(crate) fn prune_paste_origins(&mut self) {
        let registry = &self.registry;
        self.paste_origins
            .retain(|_, target| registry.resolve(target).is_some());
    }

    /// Remove a folder, moving its children into its place.
    ///
    /// Unknown ids are a no-op; items fail with [`SceneError::NotAFolder`].
    pub fn ungroup_folder(&mut self, scene: &SceneId, id: &NodeId) -> SceneResult<()> {
        let target = self.scene_mut(scene)?;
        if !target.contains(id) {
            return Ok(());
        }
        let moved = target.ungroup(id)?;
        let mut changes = ChangeSet::default();
        changes.node_removed(scene, id);
        for child in &moved {
            changes.node_updated(scene, child);
        }
        self.commit(changes);
        Ok(())
    }

    /// Make `id` the last child of `folder`, or the last root node for `None`.
    pub fn set_parent(
        &mut self,
        scene: &SceneId,
        id: &NodeId,
        folder: Option<&NodeId>,
    ) -> SceneResult<()> {
        self.move_nodes(
            scene,
            std::slice::from_ref(id),
            MoveTarget::Parent(folder.cloned()),
        )
    }

    /// Move `id` immediately before `anchor` in tree order.
    pub fn place_before(
        &mut self,
        scene: &SceneId,
        id: &NodeId,
        anchor: &NodeId,
    ) -> SceneResult<()> {
        let target = MoveTarget::Before(anchor.clone());
        self.move_nodes(scene, std::slice::from_ref(id), target)
    }

    /// Move `id` immediately after `anchor` in tree order.
    pub fn place_after(
        &mut self,
        scene: &SceneId,
        id: &NodeId,
        anchor: &NodeId,
    ) -> SceneResult<()> {
        let target = MoveTarget::After(anchor.clone());
        self.move_nodes(scene, std::slice::from_ref(id), target)
    }

    /// Move several nodes to `target` as one change.
    ///
    /// Nodes whose ancestor is also in `ids` travel with that ancestor. Relative tree order of
    /// the moved nodes is preserved. Every move is validated before the first one is applied.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn move_nodes(
        &mut self,
        scene: &SceneId,
        ids: &[NodeId],
        target: MoveTarget,
    ) -> SceneResult<()> {
        let s = self.scene_ref(scene)?;
        for id in ids {
            if !s.contains(id) {
                return Err(SceneError::not_found("node", id));
            }
        }
        let mut moving = top_level_in_tree_order(s, ids);
        if let MoveTarget::Before(anchor) | MoveTarget::After(anchor) = &target {
            moving.retain(|id| id != anchor);
        }
        for id in &moving {
            s.check_move(id, &target)?;
        }
        if matches!(target, MoveTarget::After(_)) {
            moving.reverse();
        }

        let s = self.scene_mut(scene)?;
        let mut changes = ChangeSet::default();
        for id in &moving {
            if s.move_node(id, &target)? {
                changes.node_updated(scene, id);
            }
        }
        self.commit(changes);
        Ok(())
    }

    /// Apply a placement patch to one item.
    pub fn update_item(
        &mut self,
        scene: &SceneId,
        id: &NodeId,
        patch: ItemPatch,
    ) -> SceneResult<()> {
        match self.scene_ref(scene)?.node(id) {
            None => return Err(SceneError::not_found("node", id)),
            Some(SceneNode::Folder(_)) => return Err(SceneError::NotAnItem(id.to_string())),
            Some(SceneNode::Item(_)) => {}
        }
        self.update_items(scene, std::slice::from_ref(id), patch)
    }

    /// Apply the same placement patch to every item in `ids`; folders are skipped.
    pub fn update_items(
        &mut self,
        scene: &SceneId,
        ids: &[NodeId],
        patch: ItemPatch,
    ) -> SceneResult<()> {
        patch.validate()?;
        let s = self.scene_mut(scene)?;
        for id in ids {
            if !s.contains(id) {
                return Err(SceneError::not_found("node", id));
            }
        }
        let mut changes = ChangeSet::default();
        for id in ids {
            if let Some(SceneNode::Item(item)) = s.node_mut(id)
                && patch.apply_to(&mut item.placement)
            {
                changes.node_updated(scene, id);
            }
        }
        self.commit(changes);
        Ok(())
    }

    /// Apply a different placement to each item, as one change.
    pub(crate) fn set_placements(
        &mut self,
        scene: &SceneId,
        placements: Vec<(NodeId, ItemPlacement)>,
    ) -> SceneResult<()> {
        let s = self.scene_mut(scene)?;
        let mut changes = ChangeSet::default();
        for (id, placement) in placements {
            if let Some(SceneNode::Item(item)) = s.node_mut(&id)
                && item.placement != placement
            {
                item.placement = placement;
                changes.node_updated(scene, &id);
            }
        }
        self.commit(changes);
        Ok(())
    }

    /// Rename a folder.
    pub fn rename_folder(&mut self, scene: &SceneId, id: &NodeId, name: &str) -> SceneResult<()> {
        let s = self.scene_mut(scene)?;
        match s.node_mut(id) {
            None => Err(SceneError::not_found("node", id)),
            Some(SceneNode::Item(_)) => Err(SceneError::NotAFolder(id.to_string())),
            Some(SceneNode::Folder(f)) => {
                if f.name == name {
                    return Ok(());
                }
                f.name = name.to_owned();
                let mut changes = ChangeSet::default();
                changes.node_updated(scene, id);
                self.commit(changes);
                Ok(())
            }
        }
    }
}

/// Members of `ids` that have no ancestor in `ids`, in tree order.
pub(crate) fn top_level_in_tree_order(scene: &Scene, ids: &[NodeId]) -> Vec<NodeId> {
    let wanted: HashSet<&NodeId> = ids.iter().collect();
    scene
        .tree_order()
        .into_iter()
        .filter(|id| wanted.contains(id))
        .filter(|id| !scene.parent_chain(id).iter().any(|a| wanted.contains(a)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
