//! Scene graph, selection and clipboard engine for live production scene collections.
//!
//! A collection holds named scenes. Each scene is an ordered tree of items (placements of a
//! source or of another scene) and folders. Tree order is the only stored order; draw order is
//! derived from it. Sources live in an external [`SourceRegistry`] and are referenced by id.
//!
//! Every successful mutation pushes one [`ChangeSet`] onto the graph's outbox, drained with
//! [`SceneGraph::take_changes`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod clipboard;
mod collection;
mod foundation;
mod scene;
mod selection;
mod sources;

pub use clipboard::snapshot::{
    ClipboardSnapshot, FilterSnapshot, SnapshotNode, SnapshotNodeKind, SnapshotScene,
    SnapshotSource, SourceRef,
};
pub use collection::config::StudioConfig;
pub use collection::model::{CollectionDef, NodeDef, NodeDefKind, SceneDef, SourceDef};
pub use collection::shared::StudioHandle;
pub use collection::studio::{RegistryFactory, Studio};
pub use foundation::core::{
    Affine, Anchor, Canvas, Crop, Point, Rect, Size, Vec2, normalize_rotation,
};
pub use foundation::error::{SceneError, SceneResult};
pub use foundation::ids::{CollectionId, NodeId, SceneId, SnapshotId, SourceId};
pub use scene::events::{ChangeSet, SceneEvent};
pub use scene::graph::{AddItemOptions, NestedItem, SceneGraph};
pub use scene::node::{ItemPatch, ItemPlacement, NodeKind, SceneItem, SceneItemFolder, SceneNode};
pub use scene::tree::{DrawSlot, MoveTarget, Scene};
pub use selection::view::Selection;
pub use sources::memory::InMemorySourceRegistry;
pub use sources::registry::{
    FilterDef, SCENE_SOURCE_TYPE, SourceDescriptor, SourceRegistry, SourceSpec,
};
