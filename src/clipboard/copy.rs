use std::collections::{HashMap, HashSet};

use crate::clipboard::snapshot::{
    ClipboardSnapshot, FilterSnapshot, SnapshotNode, SnapshotNodeKind, SnapshotScene,
    SnapshotSource, SourceRef,
};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{NodeId, SceneId, SnapshotId, SourceId};
use crate::scene::graph::{SceneGraph, top_level_in_tree_order};
use crate::scene::node::SceneNode;
use crate::scene::tree::Scene;

/// Accumulates the source and scene tables while nodes are captured.
struct Capture<'g> {
    graph: &'g SceneGraph,
    sources: Vec<SnapshotSource>,
    scenes: Vec<SnapshotScene>,
    source_index: HashMap<SourceId, usize>,
    scene_index: HashMap<SceneId, usize>,
    in_progress: HashSet<SceneId>,
}

impl<'g> Capture<'g> {
    fn new(graph: &'g SceneGraph) -> Self {
        Self {
            graph,
            sources: Vec::new(),
            scenes: Vec::new(),
            source_index: HashMap::new(),
            scene_index: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn source_ref(&mut self, id: &SourceId) -> SceneResult<SourceRef> {
        if self.graph.is_scene_source(id) {
            return self.scene_ref(&id.as_scene()).map(SourceRef::Scene);
        }
        if let Some(&i) = self.source_index.get(id) {
            return Ok(SourceRef::Source(i));
        }
        let desc = self
            .graph
            .source(id)
            .ok_or_else(|| SceneError::invalid_source(id))?;
        self.sources.push(SnapshotSource {
            origin_id: desc.id,
            type_id: desc.type_id,
            name: desc.name,
            settings: desc.settings,
            size: desc.size,
            filters: desc.filters,
        });
        let i = self.sources.len() - 1;
        self.source_index.insert(id.clone(), i);
        Ok(SourceRef::Source(i))
    }

    /// Capture a nested scene after everything it references.
    fn scene_ref(&mut self, id: &SceneId) -> SceneResult<usize> {
        if let Some(&i) = self.scene_index.get(id) {
            return Ok(i);
        }
        if !self.in_progress.insert(id.clone()) {
            return Err(SceneError::cyclic_scene(id, id));
        }
        let graph = self.graph;
        let scene = graph
            .scene(id)
            .ok_or_else(|| SceneError::not_found("scene", id))?;
        let nodes = self.fragment(scene, &scene.root_nodes().to_vec())?;
        let filters = graph
            .source(&id.as_source())
            .map(|d| d.filters)
            .unwrap_or_default();
        self.in_progress.remove(id);
        self.scenes.push(SnapshotScene {
            origin_id: id.clone(),
            name: scene.name().to_owned(),
            filters,
            nodes,
        });
        let i = self.scenes.len() - 1;
        self.scene_index.insert(id.clone(), i);
        Ok(i)
    }

    /// Flatten the subtrees under `roots` into tree order with positional parent links.
    fn fragment(&mut self, scene: &Scene, roots: &[NodeId]) -> SceneResult<Vec<SnapshotNode>> {
        let mut out = Vec::new();
        let mut position: HashMap<NodeId, usize> = HashMap::new();
        for root in roots {
            let mut ids = vec![root.clone()];
            ids.extend(scene.descendants(root));
            for id in ids {
                let Some(node) = scene.node(&id) else {
                    continue;
                };
                let parent = if &id == root {
                    None
                } else {
                    node.parent_id().and_then(|p| position.get(p)).copied()
                };
                let kind = match node {
                    SceneNode::Item(item) => SnapshotNodeKind::Item {
                        source: self.source_ref(&item.source_id)?,
                        placement: item.placement,
                    },
                    SceneNode::Folder(f) => SnapshotNodeKind::Folder {
                        name: f.name.clone(),
                    },
                };
                position.insert(id, out.len());
                out.push(SnapshotNode { parent, kind });
            }
        }
        Ok(out)
    }
}

impl ClipboardSnapshot {
    /// Capture `ids` from `scene` together with everything they reference.
    ///
    /// Folders bring their whole subtree; selected descendants of a selected folder are not
    /// duplicated. Nested scenes are captured recursively, each at most once. Ids that do not
    /// exist in the scene are ignored.
    #[tracing::instrument(skip(graph, ids), fields(count = ids.len()))]
    pub fn capture(graph: &SceneGraph, scene: &SceneId, ids: &[NodeId]) -> SceneResult<Self> {
        let source_scene = graph
            .scene(scene)
            .ok_or_else(|| SceneError::not_found("scene", scene))?;
        let live: Vec<NodeId> = ids
            .iter()
            .filter(|id| source_scene.contains(id))
            .cloned()
            .collect();
        let roots = top_level_in_tree_order(source_scene, &live);

        let mut capture = Capture::new(graph);
        let nodes = capture.fragment(source_scene, &roots)?;
        let snapshot = Self {
            snapshot_id: SnapshotId::generate(),
            origin_collection: graph.collection_id().clone(),
            nodes,
            sources: capture.sources,
            scenes: capture.scenes,
        };
        tracing::debug!(
            nodes = snapshot.nodes.len(),
            sources = snapshot.sources.len(),
            scenes = snapshot.scenes.len(),
            "captured snapshot"
        );
        Ok(snapshot)
    }
}

impl FilterSnapshot {
    /// Capture the filter stacks of the items among `ids` (and inside selected folders).
    ///
    /// Items sharing a source contribute its stack once.
    pub fn capture(graph: &SceneGraph, scene: &SceneId, ids: &[NodeId]) -> SceneResult<Self> {
        let s = graph
            .scene(scene)
            .ok_or_else(|| SceneError::not_found("scene", scene))?;
        let mut wanted: HashSet<NodeId> = HashSet::new();
        for id in ids.iter().filter(|id| s.contains(id)) {
            wanted.insert(id.clone());
            wanted.extend(s.descendants(id));
        }
        let mut seen: HashSet<SourceId> = HashSet::new();
        let stacks = s
            .items()
            .into_iter()
            .filter(|item| wanted.contains(&item.id))
            .filter(|item| seen.insert(item.source_id.clone()))
            .map(|item| {
                graph
                    .source(&item.source_id)
                    .map(|d| d.filters)
                    .unwrap_or_default()
            })
            .collect();
        Ok(Self { stacks })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clipboard/copy.rs"]
mod tests;
