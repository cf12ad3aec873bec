//! Persisted collection record.
//!
//! This is the JSON-facing shape a collection is saved as and loaded from. Only child-list
//! order is stored: root order is the order of parentless nodes in `nodes`, each folder's
//! `children` gives its own order, and draw order is always recomputed on load.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{CollectionId, NodeId, SceneId, SourceId};
use crate::foundation::reach;
use crate::scene::node::{ItemPatch, ItemPlacement};
use crate::sources::registry::{FilterDef, SCENE_SOURCE_TYPE, SourceDescriptor};

/// Persisted source definition.
pub type SourceDef = SourceDescriptor;

/// Kind-specific part of a [`NodeDef`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDefKind {
    /// Item placing a source or nested scene.
    Item {
        /// Source or scene id.
        source_id: SourceId,
        /// Placement state.
        #[serde(default)]
        placement: ItemPlacement,
    },
    /// Folder.
    Folder {
        /// Folder name.
        name: String,
        /// Direct children in tree order.
        #[serde(default)]
        children: Vec<NodeId>,
    },
}

/// Persisted node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeDef {
    /// Node id.
    pub id: NodeId,
    /// Parent folder; absent at scene root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    /// Kind-specific data.
    #[serde(flatten)]
    pub kind: NodeDefKind,
}

/// Persisted scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDef {
    /// Scene id, also the id of its scene source.
    pub id: SceneId,
    /// Scene name.
    pub name: String,
    /// Filters on the scene source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDef>,
    /// Nodes; parents are listed before their children.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

/// Persisted scene collection.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollectionDef {
    /// Collection id.
    pub id: CollectionId,
    /// Collection name.
    pub name: String,
    /// Base output resolution.
    #[serde(default)]
    pub canvas: Canvas,
    /// Active scene; the first scene when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_scene: Option<SceneId>,
    /// Scene ordering; the order of `scenes` when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scene_order: Vec<SceneId>,
    /// Scenes.
    pub scenes: Vec<SceneDef>,
    /// Non-scene sources.
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    /// Paste provenance: `"<snapshot>/<origin>"` to the source a paste produced.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paste_origins: BTreeMap<String, SourceId>,
}

impl CollectionDef {
    /// Parse a collection from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SceneError::serde(format!("parse collection JSON: {e}")))
    }

    /// Parse a collection from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneError::validation(format!("open collection JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write pretty-printed JSON.
    pub fn to_writer<W: Write>(&self, w: W) -> SceneResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| SceneError::serde(format!("write collection JSON: {e}")))
    }

    /// Write pretty-printed JSON to a file, replacing it.
    pub fn to_path(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            SceneError::validation(format!("create collection JSON '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .map_err(|e| SceneError::Other(anyhow::Error::new(e).context("flush collection JSON")))
    }

    /// Scene ids in effective order.
    pub fn ordered_scene_ids(&self) -> Vec<SceneId> {
        if self.scene_order.is_empty() {
            self.scenes.iter().map(|s| s.id.clone()).collect()
        } else {
            self.scene_order.clone()
        }
    }

    /// Check structural consistency.
    pub fn validate(&self) -> SceneResult<()> {
        if self.scenes.is_empty() {
            return Err(SceneError::validation("collection must contain at least one scene"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SceneError::validation("canvas width/height must be > 0"));
        }

        let mut scene_ids = HashSet::new();
        for scene in &self.scenes {
            if !scene_ids.insert(&scene.id) {
                return Err(SceneError::validation(format!(
                    "duplicate scene id '{}'",
                    scene.id
                )));
            }
        }

        let mut source_ids = HashSet::new();
        for source in &self.sources {
            if source.type_id.trim().is_empty() {
                return Err(SceneError::validation(format!(
                    "source '{}' has an empty type_id",
                    source.id
                )));
            }
            if source.type_id == SCENE_SOURCE_TYPE {
                return Err(SceneError::validation(format!(
                    "source '{}' is a scene; scenes belong in 'scenes'",
                    source.id
                )));
            }
            if scene_ids.contains(&source.id.as_scene()) || !source_ids.insert(&source.id) {
                return Err(SceneError::validation(format!(
                    "duplicate source id '{}'",
                    source.id
                )));
            }
        }

        if !self.scene_order.is_empty() {
            let ordered: HashSet<&SceneId> = self.scene_order.iter().collect();
            if ordered.len() != self.scene_order.len() || ordered != scene_ids {
                return Err(SceneError::validation(
                    "scene_order must list every scene exactly once",
                ));
            }
        }
        if let Some(active) = &self.active_scene
            && !scene_ids.contains(active)
        {
            return Err(SceneError::validation(format!(
                "active scene '{active}' does not exist"
            )));
        }

        let mut node_ids = HashSet::new();
        let mut nested: HashMap<SceneId, Vec<SceneId>> = HashMap::new();
        for scene in &self.scenes {
            for node in &scene.nodes {
                if !node_ids.insert(&node.id) {
                    return Err(SceneError::validation(format!(
                        "duplicate node id '{}'",
                        node.id
                    )));
                }
                if let NodeDefKind::Item {
                    source_id,
                    placement,
                } = &node.kind
                {
                    let is_scene = scene_ids.contains(&source_id.as_scene());
                    if !is_scene && !source_ids.contains(source_id) {
                        return Err(SceneError::validation(format!(
                            "item '{}' references missing source '{}'",
                            node.id, source_id
                        )));
                    }
                    if is_scene {
                        nested
                            .entry(scene.id.clone())
                            .or_default()
                            .push(source_id.as_scene());
                    }
                    ItemPatch::from_placement(placement).validate()?;
                }
            }
            validate_tree(scene)?;
        }

        for scene in &self.scenes {
            let direct = nested.get(&scene.id).cloned().unwrap_or_default();
            for target in &direct {
                if reach::reaches(target, &scene.id, |s| {
                    nested.get(s).cloned().unwrap_or_default()
                }) {
                    return Err(SceneError::cyclic_scene(&scene.id, target));
                }
            }
        }

        Ok(())
    }
}

/// Parents are folders of the same scene, child lists agree with `parent_id`, and every node
/// is reachable from the root (which rules out folder cycles).
fn validate_tree(scene: &SceneDef) -> SceneResult<()> {
    let by_id: HashMap<&NodeId, &NodeDef> = scene.nodes.iter().map(|n| (&n.id, n)).collect();

    for node in &scene.nodes {
        if let Some(parent) = &node.parent_id {
            match by_id.get(parent).map(|p| &p.kind) {
                None => {
                    return Err(SceneError::validation(format!(
                        "scene '{}': node '{}' has parent '{}' outside the scene",
                        scene.id, node.id, parent
                    )));
                }
                Some(NodeDefKind::Item { .. }) => {
                    return Err(SceneError::NotAFolder(parent.to_string()));
                }
                Some(NodeDefKind::Folder { children, .. }) => {
                    if children.iter().filter(|c| *c == &node.id).count() != 1 {
                        return Err(SceneError::validation(format!(
                            "scene '{}': folder '{}' does not list child '{}' exactly once",
                            scene.id, parent, node.id
                        )));
                    }
                }
            }
        }
        if let NodeDefKind::Folder { children, .. } = &node.kind {
            for child in children {
                let listed = by_id.get(child).and_then(|c| c.parent_id.as_ref());
                if listed != Some(&node.id) {
                    return Err(SceneError::validation(format!(
                        "scene '{}': folder '{}' lists '{}' whose parent differs",
                        scene.id, node.id, child
                    )));
                }
            }
        }
    }

    let children_of = |id: &Option<NodeId>| -> Vec<Option<NodeId>> {
        match id {
            None => scene
                .nodes
                .iter()
                .filter(|n| n.parent_id.is_none())
                .map(|n| Some(n.id.clone()))
                .collect(),
            Some(id) => match by_id.get(id).map(|n| &n.kind) {
                Some(NodeDefKind::Folder { children, .. }) => {
                    children.iter().cloned().map(Some).collect()
                }
                _ => Vec::new(),
            },
        }
    };
    let reachable = reach::walk_depth_first(None, children_of).len() - 1;
    if reachable != scene.nodes.len() {
        return Err(SceneError::validation(format!(
            "scene '{}': folder nesting contains a cycle",
            scene.id
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/collection/model.rs"]
mod tests;
