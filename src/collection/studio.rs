use std::path::Path;

use crate::clipboard::snapshot::{ClipboardSnapshot, FilterSnapshot};
use crate::collection::config::StudioConfig;
use crate::collection::model::CollectionDef;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{NodeId, SceneId};
use crate::scene::events::{ChangeSet, SceneEvent};
use crate::scene::graph::SceneGraph;
use crate::selection::view::Selection;
use crate::sources::memory::InMemorySourceRegistry;
use crate::sources::registry::SourceRegistry;

/// Builds a fresh registry for every collection a [`Studio`] creates or loads.
pub type RegistryFactory = Box<dyn Fn() -> Box<dyn SourceRegistry> + Send>;

/// Owner of the loaded collection, the active-scene selection and the clipboard.
///
/// The clipboard lives here rather than on the graph, so a snapshot copied from one collection
/// can be pasted after another collection has been loaded.
pub struct Studio {
    config: StudioConfig,
    graph: SceneGraph,
    selection: Selection,
    clipboard: Option<ClipboardSnapshot>,
    filter_clipboard: Option<FilterSnapshot>,
    registry_factory: RegistryFactory,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .field("selection", &self.selection)
            .field("clipboard", &self.clipboard.as_ref().map(|c| &c.snapshot_id))
            .field("filter_clipboard", &self.filter_clipboard.is_some())
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Studio with an in-memory registry and an empty "Untitled" collection.
    pub fn new(config: StudioConfig) -> SceneResult<Self> {
        Self::with_registry(
            config,
            Box::new(|| Box::new(InMemorySourceRegistry::new()) as Box<dyn SourceRegistry>),
        )
    }

    /// Studio whose collections are backed by registries from `factory`.
    pub fn with_registry(config: StudioConfig, factory: RegistryFactory) -> SceneResult<Self> {
        config.validate()?;
        let graph = fresh_graph(&config, "Untitled", factory())?;
        let selection = Selection::new(active_id(&graph)?);
        Ok(Self {
            config,
            graph,
            selection,
            clipboard: None,
            filter_clipboard: None,
            registry_factory: factory,
        })
    }

    /// Replace the loaded collection with an empty one holding a single default scene.
    #[tracing::instrument(skip(self))]
    pub fn new_collection(&mut self, name: &str) -> SceneResult<()> {
        let graph = fresh_graph(&self.config, name, (self.registry_factory)())?;
        self.install(graph)
    }

    /// Tear down the loaded collection and rebuild from `def`.
    ///
    /// On failure the previously loaded collection stays in place.
    #[tracing::instrument(skip(self, def), fields(collection = %def.id))]
    pub fn load(&mut self, def: CollectionDef) -> SceneResult<()> {
        let graph = SceneGraph::from_def(def, (self.registry_factory)())?;
        self.install(graph)
    }

    /// Load a collection from a JSON file.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> SceneResult<()> {
        self.load(CollectionDef::from_path(path)?)
    }

    /// Persisted form of the loaded collection.
    #[tracing::instrument(skip(self))]
    pub fn save(&self) -> CollectionDef {
        self.graph.to_def()
    }

    /// Write the loaded collection to a JSON file.
    pub fn save_path(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        self.save().to_path(path)
    }

    fn install(&mut self, graph: SceneGraph) -> SceneResult<()> {
        self.selection = Selection::new(active_id(&graph)?);
        self.graph = graph;
        Ok(())
    }

    /// Configuration in effect.
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// The loaded collection.
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// The loaded collection, mutably.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Selection over the active scene.
    ///
    /// May lag behind a scene switch made through [`Studio::graph_mut`] until the next
    /// [`Studio::with_selection`] call; its reads stay relative to its own scene.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Run `f` with the selection (moved to the active scene first) and the graph.
    pub fn with_selection<R>(
        &mut self,
        f: impl FnOnce(&mut Selection, &mut SceneGraph) -> R,
    ) -> R {
        self.sync_selection();
        f(&mut self.selection, &mut self.graph)
    }

    fn sync_selection(&mut self) {
        if let Some(active) = self.graph.active_scene_id()
            && active != self.selection.scene_id()
        {
            self.selection = Selection::new(active.clone());
        }
    }

    /// Switch the active scene; the selection starts empty on the new scene.
    pub fn set_active_scene(&mut self, id: &SceneId) -> SceneResult<()> {
        self.graph.set_active_scene(id)?;
        self.sync_selection();
        Ok(())
    }

    /// Drain pending change notifications.
    pub fn take_changes(&mut self) -> Vec<ChangeSet> {
        self.graph.take_changes()
    }

    // -- Clipboard --

    /// Copy `ids` from the active scene. Returns the number of top-level nodes captured.
    ///
    /// An empty capture leaves the clipboard unchanged.
    pub fn copy(&mut self, ids: &[NodeId]) -> SceneResult<usize> {
        let scene = active_id(&self.graph)?;
        let snapshot = ClipboardSnapshot::capture(&self.graph, &scene, ids)?;
        if snapshot.is_empty() {
            return Ok(0);
        }
        let roots = snapshot.nodes.iter().filter(|n| n.parent.is_none()).count();
        self.clipboard = Some(snapshot);
        Ok(roots)
    }

    /// Copy the current selection.
    pub fn copy_selection(&mut self) -> SceneResult<usize> {
        self.sync_selection();
        let ids = self.selection.get_ids(&self.graph);
        self.copy(&ids)
    }

    /// Copy the filter stacks of the selected items.
    pub fn copy_filters(&mut self) -> SceneResult<bool> {
        self.sync_selection();
        let scene = active_id(&self.graph)?;
        let ids = self.selection.get_ids(&self.graph);
        let filters = FilterSnapshot::capture(&self.graph, &scene, &ids)?;
        if filters.is_empty() {
            return Ok(false);
        }
        self.filter_clipboard = Some(filters);
        Ok(true)
    }

    /// Paste the clipboard at the top of the active scene and select the pasted nodes.
    ///
    /// Returns the new top-level node ids; empty when the clipboard is empty.
    pub fn paste(&mut self, duplicate_sources: bool) -> SceneResult<Vec<NodeId>> {
        let Some(snapshot) = &self.clipboard else {
            return Ok(Vec::new());
        };
        let scene = active_id(&self.graph)?;
        let roots = snapshot.paste(&mut self.graph, &scene, duplicate_sources)?;
        self.sync_selection();
        self.selection.select(&self.graph, &roots);
        Ok(roots)
    }

    /// Append copied filters to the sources of the selected items.
    pub fn paste_filters(&mut self) -> SceneResult<()> {
        self.sync_selection();
        let Some(filters) = &self.filter_clipboard else {
            return Ok(());
        };
        let scene = self.selection.scene_id().clone();
        let ids = self.selection.get_ids(&self.graph);
        filters.paste(&mut self.graph, &scene, &ids)
    }

    /// Current node clipboard.
    pub fn clipboard(&self) -> Option<&ClipboardSnapshot> {
        self.clipboard.as_ref()
    }

    /// Replace the node clipboard, e.g. with a snapshot received as JSON.
    pub fn set_clipboard(&mut self, snapshot: ClipboardSnapshot) -> SceneResult<()> {
        snapshot.validate()?;
        self.clipboard = Some(snapshot);
        Ok(())
    }

    /// Wrap the selected nodes in a new folder named after the configured default.
    pub fn group_selection(&mut self) -> SceneResult<NodeId> {
        self.sync_selection();
        let scene = self.selection.scene_id().clone();
        let ids = self.selection.get_ids(&self.graph);
        let folder = self
            .graph
            .group_nodes(&scene, &ids, &self.config.default_folder_name)?;
        self.selection.select(&self.graph, [&folder]);
        Ok(folder)
    }
}

fn fresh_graph(
    config: &StudioConfig,
    name: &str,
    registry: Box<dyn SourceRegistry>,
) -> SceneResult<SceneGraph> {
    let mut graph = SceneGraph::new(name, config.canvas, registry);
    graph.add_scene(&config.default_scene_name)?;
    graph.take_changes();
    let collection = graph.collection_id().clone();
    graph.commit(ChangeSet {
        events: vec![SceneEvent::CollectionLoaded { collection }],
    });
    Ok(graph)
}

fn active_id(graph: &SceneGraph) -> SceneResult<SceneId> {
    graph
        .active_scene_id()
        .cloned()
        .ok_or_else(|| SceneError::validation("collection has no active scene"))
}

#[cfg(test)]
#[path = "../../tests/unit/collection/studio.rs"]
mod tests;
