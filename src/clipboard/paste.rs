use std::collections::HashSet;

use crate::clipboard::snapshot::{
    ClipboardSnapshot, FilterSnapshot, SnapshotNode, SnapshotNodeKind, SnapshotScene,
    SnapshotSource, SourceRef,
};
use crate::foundation::core::normalize_rotation;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{NodeId, SceneId, SnapshotId, SourceId};
use crate::scene::events::{ChangeSet, SceneEvent};
use crate::scene::graph::SceneGraph;
use crate::scene::node::{ItemPatch, SceneItem, SceneItemFolder, SceneNode};
use crate::sources::registry::FilterDef;

/// How snapshot sources are turned into destination sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourcePolicy {
    /// Reuse a source this snapshot already produced (or the original, in its own collection).
    FindOrCreate,
    /// Always create fresh copies, nested scenes included.
    AlwaysCreate,
}

/// Key of the paste provenance map.
pub(crate) fn origin_key(snapshot: &SnapshotId, origin: &str) -> String {
    format!("{snapshot}/{origin}")
}

/// One paste in progress, with enough bookkeeping to undo it.
struct Paste<'a> {
    graph: &'a mut SceneGraph,
    snapshot: &'a ClipboardSnapshot,
    policy: SourcePolicy,
    changes: ChangeSet,
    created_sources: Vec<SourceId>,
    created_scenes: Vec<SceneId>,
    recorded_origins: Vec<(String, Option<SourceId>)>,
}

impl<'a> Paste<'a> {
    fn same_collection(&self) -> bool {
        self.snapshot.origin_collection == *self.graph.collection_id()
    }

    fn find_source(&self, src: &SnapshotSource) -> Option<SourceId> {
        if self.policy == SourcePolicy::AlwaysCreate {
            return None;
        }
        let matches = |id: &SourceId| {
            !self.graph.is_scene_source(id)
                && self
                    .graph
                    .source(id)
                    .is_some_and(|d| d.type_id == src.type_id)
        };
        let key = origin_key(&self.snapshot.snapshot_id, src.origin_id.as_str());
        if let Some(id) = self.graph.paste_origins.get(&key)
            && matches(id)
        {
            return Some(id.clone());
        }
        if self.same_collection() && matches(&src.origin_id) {
            return Some(src.origin_id.clone());
        }
        None
    }

    fn find_scene(&self, scene: &SnapshotScene) -> Option<SceneId> {
        if self.policy == SourcePolicy::AlwaysCreate {
            return None;
        }
        let key = origin_key(&self.snapshot.snapshot_id, scene.origin_id.as_str());
        if let Some(id) = self.graph.paste_origins.get(&key)
            && self.graph.is_scene_source(id)
        {
            return Some(id.as_scene());
        }
        if self.same_collection() && self.graph.scene(&scene.origin_id).is_some() {
            return Some(scene.origin_id.clone());
        }
        None
    }

    /// Reject the paste when a pasted nested-scene item would end up containing `dest`.
    ///
    /// A reused scene contains `dest` if it already reaches it; a scene copy about to be
    /// created contains `dest` if any scene it references does.
    fn check_cycles(&self, dest: &SceneId, plan: &[Option<SceneId>]) -> SceneResult<()> {
        let mut contains_dest: Vec<bool> = Vec::with_capacity(plan.len());
        for (scene, planned) in self.snapshot.scenes.iter().zip(plan) {
            let hit = match planned {
                Some(existing) => self.graph.scene_contains(existing, dest),
                None => scene_refs(&scene.nodes).any(|j| contains_dest.get(j) == Some(&true)),
            };
            contains_dest.push(hit);
        }
        for j in scene_refs(&self.snapshot.nodes) {
            if contains_dest.get(j) == Some(&true) {
                let target = plan
                    .get(j)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| self.snapshot.scenes[j].origin_id.clone());
                return Err(SceneError::cyclic_scene(dest, target));
            }
        }
        Ok(())
    }

    /// A duplicating paste into the source collection copies the live origin.
    fn duplicable(&self, src: &SnapshotSource) -> bool {
        self.policy == SourcePolicy::AlwaysCreate
            && self.same_collection()
            && !self.graph.is_scene_source(&src.origin_id)
            && self
                .graph
                .source(&src.origin_id)
                .is_some_and(|d| d.type_id == src.type_id)
    }

    fn record_origin(&mut self, origin: &str, id: &SourceId) {
        if self.policy == SourcePolicy::AlwaysCreate {
            return;
        }
        let key = origin_key(&self.snapshot.snapshot_id, origin);
        let previous = self.graph.paste_origins.insert(key.clone(), id.clone());
        self.recorded_origins.push((key, previous));
    }

    fn resolve_source(&mut self, src: &SnapshotSource) -> SceneResult<SourceId> {
        if let Some(existing) = self.find_source(src) {
            tracing::debug!(origin = %src.origin_id, source = %existing, "reusing source");
            return Ok(existing);
        }
        let id = if self.duplicable(src) {
            let id = self.graph.registry_mut().duplicate_source(&src.origin_id)?;
            tracing::debug!(origin = %src.origin_id, source = %id, "duplicated source");
            id
        } else {
            let id = self.graph.registry_mut().create_source(src.to_spec())?;
            tracing::debug!(origin = %src.origin_id, source = %id, "created source");
            id
        };
        self.created_sources.push(id.clone());
        self.changes.push(SceneEvent::SourceAdded { source: id.clone() });
        self.record_origin(src.origin_id.as_str(), &id);
        Ok(id)
    }

    fn create_scene(
        &mut self,
        scene: &SnapshotScene,
        sources: &[SourceId],
        scenes: &[SceneId],
    ) -> SceneResult<SceneId> {
        let id = self.graph.create_scene(&scene.name, &mut self.changes)?;
        self.created_scenes.push(id.clone());
        if !scene.filters.is_empty() {
            self.graph
                .registry_mut()
                .append_filters(&id.as_source(), &scene.filters)?;
        }
        self.record_origin(scene.origin_id.as_str(), &id.as_source());
        self.insert_fragment(&id, &scene.nodes, sources, scenes)?;
        Ok(id)
    }

    /// Insert `nodes` at the end of `scene`'s tree order. Returns the ids of fragment roots.
    fn insert_fragment(
        &mut self,
        scene: &SceneId,
        nodes: &[SnapshotNode],
        sources: &[SourceId],
        scenes: &[SceneId],
    ) -> SceneResult<Vec<NodeId>> {
        let mut ids: Vec<NodeId> = Vec::with_capacity(nodes.len());
        let mut roots = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            let id = NodeId::generate();
            let parent = match node.parent {
                None => None,
                Some(p) => Some(ids.get(p).cloned().ok_or_else(|| {
                    SceneError::validation(format!("snapshot node {i} has a dangling parent"))
                })?),
            };
            let built = match &node.kind {
                SnapshotNodeKind::Item { source, placement } => {
                    ItemPatch::from_placement(placement).validate()?;
                    let source_id = match *source {
                        SourceRef::Source(k) => sources.get(k).cloned(),
                        SourceRef::Scene(k) => scenes.get(k).map(SceneId::as_source),
                    }
                    .ok_or_else(|| {
                        SceneError::validation(format!("snapshot node {i} has a dangling source"))
                    })?;
                    let mut placement = *placement;
                    placement.rotation = normalize_rotation(placement.rotation);
                    SceneNode::Item(SceneItem {
                        id: id.clone(),
                        scene_id: scene.clone(),
                        parent_id: parent.clone(),
                        source_id,
                        placement,
                    })
                }
                SnapshotNodeKind::Folder { name } => SceneNode::Folder(SceneItemFolder {
                    id: id.clone(),
                    scene_id: scene.clone(),
                    parent_id: parent.clone(),
                    name: name.clone(),
                    children: Vec::new(),
                }),
            };
            self.graph.scene_mut(scene)?.insert(built)?;
            self.changes.node_added(scene, &id);
            if parent.is_none() {
                roots.push(id.clone());
            }
            ids.push(id);
        }
        Ok(roots)
    }

    fn run(&mut self, dest: &SceneId, plan: Vec<Option<SceneId>>) -> SceneResult<Vec<NodeId>> {
        let snapshot = self.snapshot;
        let mut sources = Vec::with_capacity(snapshot.sources.len());
        for src in &snapshot.sources {
            sources.push(self.resolve_source(src)?);
        }
        let mut scenes: Vec<SceneId> = Vec::with_capacity(snapshot.scenes.len());
        for (scene, planned) in snapshot.scenes.iter().zip(plan) {
            let id = match planned {
                Some(existing) => existing,
                None => self.create_scene(scene, &sources, &scenes)?,
            };
            scenes.push(id);
        }
        self.insert_fragment(dest, &snapshot.nodes, &sources, &scenes)
    }

    fn rollback(&mut self, dest: &SceneId) {
        let added: Vec<(SceneId, NodeId)> = self
            .changes
            .events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::NodeAdded { scene, node } if scene == dest => {
                    Some((scene.clone(), node.clone()))
                }
                _ => None,
            })
            .collect();
        if let Ok(scene) = self.graph.scene_mut(dest) {
            for (_, node) in added.iter().rev() {
                scene.remove_subtree(node);
            }
        }
        for scene in self.created_scenes.drain(..).rev() {
            self.graph.discard_scene(&scene);
        }
        for source in self.created_sources.drain(..).rev() {
            self.graph.registry_mut().release_source(&source);
        }
        for (key, previous) in self.recorded_origins.drain(..).rev() {
            match previous {
                Some(p) => self.graph.paste_origins.insert(key, p),
                None => self.graph.paste_origins.remove(&key),
            };
        }
        self.changes = ChangeSet::default();
    }
}

/// Scene-table indices referenced by items of `nodes`.
fn scene_refs(nodes: &[SnapshotNode]) -> impl Iterator<Item = usize> + '_ {
    nodes.iter().filter_map(|n| match n.kind {
        SnapshotNodeKind::Item {
            source: SourceRef::Scene(j),
            ..
        } => Some(j),
        _ => None,
    })
}

impl ClipboardSnapshot {
    /// Materialize the snapshot at the top of `scene`'s tree order.
    ///
    /// With `duplicate_sources == false`, sources and nested scenes that an earlier paste of
    /// this snapshot produced in this collection are referenced again instead of copied, and a
    /// paste back into the originating collection references the original sources. With
    /// `duplicate_sources == true`, independent copies are always created.
    ///
    /// Nested-scene cycles are rejected before anything changes. A registry failure midway
    /// releases everything the paste had created. Returns the ids of the pasted top-level
    /// nodes in tree order.
    #[tracing::instrument(skip(self, graph), fields(snapshot = %self.snapshot_id))]
    pub fn paste(
        &self,
        graph: &mut SceneGraph,
        scene: &SceneId,
        duplicate_sources: bool,
    ) -> SceneResult<Vec<NodeId>> {
        graph.scene_ref(scene)?;
        self.validate()?;
        let policy = if duplicate_sources {
            SourcePolicy::AlwaysCreate
        } else {
            SourcePolicy::FindOrCreate
        };
        let mut paste = Paste {
            graph,
            snapshot: self,
            policy,
            changes: ChangeSet::default(),
            created_sources: Vec::new(),
            created_scenes: Vec::new(),
            recorded_origins: Vec::new(),
        };
        let plan: Vec<Option<SceneId>> = self.scenes.iter().map(|s| paste.find_scene(s)).collect();
        paste.check_cycles(scene, &plan)?;

        match paste.run(scene, plan) {
            Ok(roots) => {
                let changes = std::mem::take(&mut paste.changes);
                paste.graph.commit(changes);
                Ok(roots)
            }
            Err(e) => {
                tracing::debug!(error = %e, "paste failed, rolling back");
                paste.rollback(scene);
                Err(e)
            }
        }
    }
}

impl FilterSnapshot {
    /// Append the copied filters to the source of every item among `ids`.
    ///
    /// Each distinct source receives the filters once; existing filters are kept and copied
    /// names are suffixed where they collide.
    #[tracing::instrument(skip(self, graph, ids), fields(count = ids.len()))]
    pub fn paste(
        &self,
        graph: &mut SceneGraph,
        scene: &SceneId,
        ids: &[NodeId],
    ) -> SceneResult<()> {
        let filters = self.flattened();
        let s = graph.scene_ref(scene)?;
        if filters.is_empty() {
            return Ok(());
        }
        let mut seen = HashSet::new();
        let targets: Vec<SourceId> = ids
            .iter()
            .filter_map(|id| s.item(id))
            .map(|item| item.source_id.clone())
            .filter(|source| seen.insert(source.clone()))
            .collect();
        if let Some(missing) = targets.iter().find(|t| graph.source(t).is_none()) {
            return Err(SceneError::invalid_source(missing));
        }

        let previous: Vec<(SourceId, Vec<FilterDef>)> = targets
            .iter()
            .filter_map(|t| graph.source(t).map(|d| (t.clone(), d.filters)))
            .collect();
        let mut changes = ChangeSet::default();
        for (i, target) in targets.into_iter().enumerate() {
            if let Err(e) = graph.registry_mut().append_filters(&target, &filters) {
                tracing::debug!(error = %e, "filter paste failed, rolling back");
                for (id, stack) in previous.into_iter().take(i) {
                    if let Err(undo) = graph.registry_mut().set_filters(&id, stack) {
                        tracing::warn!(source = %id, error = %undo, "filter rollback failed");
                    }
                }
                return Err(e);
            }
            changes.push(SceneEvent::SourceUpdated { source: target });
        }
        graph.commit(changes);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clipboard/paste.rs"]
mod tests;
