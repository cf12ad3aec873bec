use std::collections::HashMap;

use crate::collection::model::{CollectionDef, NodeDef, NodeDefKind, SceneDef};
use crate::foundation::core::normalize_rotation;
use crate::foundation::error::SceneResult;
use crate::foundation::ids::SceneId;
use crate::scene::events::{ChangeSet, SceneEvent};
use crate::scene::graph::SceneGraph;
use crate::scene::node::{SceneItem, SceneItemFolder, SceneNode};
use crate::scene::tree::Scene;
use crate::sources::registry::{SCENE_SOURCE_TYPE, SourceDescriptor, SourceRegistry};

impl SceneGraph {
    /// Rebuild a graph from a persisted collection, registering its sources in `registry`.
    ///
    /// The record is validated first; tree order comes from the persisted child lists and
    /// draw order is derived from it. Emits a single `CollectionLoaded` change set.
    #[tracing::instrument(skip(def, registry), fields(collection = %def.id))]
    pub fn from_def(
        def: CollectionDef,
        mut registry: Box<dyn SourceRegistry>,
    ) -> SceneResult<Self> {
        def.validate()?;

        for source in &def.sources {
            registry.restore_source(source.clone())?;
        }
        for scene in &def.scenes {
            registry.restore_source(SourceDescriptor {
                id: scene.id.as_source(),
                type_id: SCENE_SOURCE_TYPE.to_owned(),
                name: scene.name.clone(),
                settings: serde_json::Value::Null,
                size: None,
                filters: scene.filters.clone(),
            })?;
        }

        let order = def.ordered_scene_ids();
        let CollectionDef {
            id,
            name,
            canvas,
            active_scene,
            scenes,
            paste_origins,
            ..
        } = def;
        let mut graph = SceneGraph::from_parts(id.clone(), name, canvas, registry);
        let mut by_id: HashMap<SceneId, SceneDef> =
            scenes.into_iter().map(|s| (s.id.clone(), s)).collect();
        for scene_id in order {
            if let Some(scene) = by_id.remove(&scene_id) {
                graph.insert_scene(build_scene(scene));
            }
        }
        let active = active_scene.or_else(|| graph.scene_ids().first().cloned());
        graph.set_active_raw(active);
        graph.paste_origins = paste_origins;
        graph.prune_paste_origins();

        tracing::debug!(scenes = graph.scene_ids().len(), "collection loaded");
        graph.commit(ChangeSet {
            events: vec![SceneEvent::CollectionLoaded { collection: id }],
        });
        Ok(graph)
    }

    /// Persist the graph. Only non-scene sources that still resolve are written.
    pub fn to_def(&self) -> CollectionDef {
        let scenes = self
            .scenes()
            .map(|scene| SceneDef {
                id: scene.id().clone(),
                name: scene.name().to_owned(),
                filters: self
                    .source(&scene.id().as_source())
                    .map(|d| d.filters)
                    .unwrap_or_default(),
                nodes: scene
                    .tree_order()
                    .iter()
                    .filter_map(|id| scene.node(id))
                    .map(node_def)
                    .collect(),
            })
            .collect();
        let sources = self
            .registry()
            .source_ids()
            .iter()
            .filter(|id| !self.is_scene_source(id))
            .filter_map(|id| self.source(id))
            .filter(|d| !d.is_scene())
            .collect();
        CollectionDef {
            id: self.collection_id().clone(),
            name: self.name().to_owned(),
            canvas: self.canvas(),
            active_scene: self.active_scene_id().cloned(),
            scene_order: self.scene_ids().to_vec(),
            scenes,
            sources,
            paste_origins: self
                .paste_origins
                .iter()
                .filter(|(_, target)| self.source(target).is_some())
                .map(|(key, target)| (key.clone(), target.clone()))
                .collect(),
        }
    }
}

fn build_scene(def: SceneDef) -> Scene {
    let mut scene = Scene::new(def.id.clone(), def.name);
    for node in def.nodes {
        let built = match node.kind {
            NodeDefKind::Item {
                source_id,
                mut placement,
            } => {
                placement.rotation = normalize_rotation(placement.rotation);
                SceneNode::Item(SceneItem {
                    id: node.id,
                    scene_id: def.id.clone(),
                    parent_id: node.parent_id,
                    source_id,
                    placement,
                })
            }
            NodeDefKind::Folder { name, children } => SceneNode::Folder(SceneItemFolder {
                id: node.id,
                scene_id: def.id.clone(),
                parent_id: node.parent_id,
                name,
                children,
            }),
        };
        scene.insert_raw(built);
    }
    scene
}

fn node_def(node: &SceneNode) -> NodeDef {
    match node {
        SceneNode::Item(i) => NodeDef {
            id: i.id.clone(),
            parent_id: i.parent_id.clone(),
            kind: NodeDefKind::Item {
                source_id: i.source_id.clone(),
                placement: i.placement,
            },
        },
        SceneNode::Folder(f) => NodeDef {
            id: f.id.clone(),
            parent_id: f.parent_id.clone(),
            kind: NodeDefKind::Folder {
                name: f.name.clone(),
                children: f.children.clone(),
            },
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collection/load.rs"]
mod tests;
