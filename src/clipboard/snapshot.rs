//! Self-contained, serializable copies of node subtrees.
//!
//! Nodes link to their parent by position in the same list and to their source by index into
//! the snapshot's own `sources`/`scenes` tables, so nothing in a snapshot points into the live
//! collection it was taken from. The recorded `origin_id`s are opaque provenance keys used only
//! for paste deduplication.

use crate::foundation::core::Size;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{CollectionId, SceneId, SnapshotId, SourceId};
use crate::scene::node::ItemPlacement;
use crate::sources::registry::{FilterDef, SourceSpec};

/// Reference from a snapshot item to the snapshot's source tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "table", content = "index", rename_all = "snake_case")]
pub enum SourceRef {
    /// Index into [`ClipboardSnapshot::sources`].
    Source(usize),
    /// Index into [`ClipboardSnapshot::scenes`].
    Scene(usize),
}

/// Kind-specific part of a [`SnapshotNode`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotNodeKind {
    /// A placed source.
    Item {
        /// Referenced source.
        source: SourceRef,
        /// Placement state at copy time.
        placement: ItemPlacement,
    },
    /// A folder.
    Folder {
        /// Folder name.
        name: String,
    },
}

/// One node of a snapshot tree fragment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotNode {
    /// Position of the parent folder in the same list; `None` for fragment roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    /// Kind-specific data.
    #[serde(flatten)]
    pub kind: SnapshotNodeKind,
}

/// Full definition of a non-scene source referenced by the snapshot.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotSource {
    /// Id of the source in the collection it was copied from.
    pub origin_id: SourceId,
    /// Source type tag.
    pub type_id: String,
    /// Display name at copy time.
    pub name: String,
    /// Settings blob at copy time.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub settings: serde_json::Value,
    /// Intrinsic size at copy time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Filter stack at copy time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDef>,
}

impl SnapshotSource {
    pub(crate) fn to_spec(&self) -> SourceSpec {
        SourceSpec {
            type_id: self.type_id.clone(),
            name: self.name.clone(),
            settings: self.settings.clone(),
            size: self.size,
            filters: self.filters.clone(),
        }
    }
}

/// A nested scene referenced by the snapshot, with its whole node tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotScene {
    /// Id of the scene in the collection it was copied from.
    pub origin_id: SceneId,
    /// Scene name at copy time.
    pub name: String,
    /// Filters on the scene source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDef>,
    /// Every node of the scene in tree order.
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
}

/// Portable copy of a node selection and everything it references.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipboardSnapshot {
    /// Stamped at capture; keys deduplication of repeated pastes.
    pub snapshot_id: SnapshotId,
    /// Collection the snapshot was captured from.
    pub origin_collection: CollectionId,
    /// Copied nodes in tree order.
    pub nodes: Vec<SnapshotNode>,
    /// Non-scene sources referenced anywhere in the snapshot.
    #[serde(default)]
    pub sources: Vec<SnapshotSource>,
    /// Nested scenes, each listed after every scene it references.
    #[serde(default)]
    pub scenes: Vec<SnapshotScene>,
}

impl ClipboardSnapshot {
    /// Return `true` when the snapshot holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of items in the copied fragment (nested scene contents excluded).
    pub fn item_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, SnapshotNodeKind::Item { .. }))
            .count()
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        let snap: Self = serde_json::from_str(text).map_err(|e| SceneError::serde(e.to_string()))?;
        snap.validate()?;
        Ok(snap)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string(self).map_err(|e| SceneError::serde(e.to_string()))
    }

    /// Check internal references: parents precede children and are folders, source indices are
    /// in range, and nested scenes only reference scenes listed before them.
    pub fn validate(&self) -> SceneResult<()> {
        validate_fragment("snapshot", &self.nodes, self.sources.len(), self.scenes.len())?;
        for (i, scene) in self.scenes.iter().enumerate() {
            validate_fragment(&scene.origin_id.to_string(), &scene.nodes, self.sources.len(), i)?;
        }
        Ok(())
    }
}

fn validate_fragment(
    label: &str,
    nodes: &[SnapshotNode],
    sources: usize,
    scenes: usize,
) -> SceneResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        if let Some(p) = node.parent {
            if p >= i {
                return Err(SceneError::validation(format!(
                    "{label}: node {i} has parent {p} that does not precede it"
                )));
            }
            if !matches!(nodes[p].kind, SnapshotNodeKind::Folder { .. }) {
                return Err(SceneError::validation(format!(
                    "{label}: node {i} has parent {p} that is not a folder"
                )));
            }
        }
        if let SnapshotNodeKind::Item { source, .. } = &node.kind {
            let ok = match *source {
                SourceRef::Source(s) => s < sources,
                SourceRef::Scene(s) => s < scenes,
            };
            if !ok {
                return Err(SceneError::validation(format!(
                    "{label}: node {i} references {source:?} out of range"
                )));
            }
        }
    }
    Ok(())
}

/// Filter stacks copied from items, without geometry.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterSnapshot {
    /// One filter stack per distinct source of the copied items, in tree order.
    pub stacks: Vec<Vec<FilterDef>>,
}

impl FilterSnapshot {
    /// Return `true` when no filters were copied.
    pub fn is_empty(&self) -> bool {
        self.stacks.iter().all(Vec::is_empty)
    }

    /// All filters in application order.
    pub fn flattened(&self) -> Vec<FilterDef> {
        self.stacks.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clipboard/snapshot.rs"]
mod tests;
