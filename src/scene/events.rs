use crate::foundation::ids::{CollectionId, NodeId, SceneId, SourceId};

/// One observable change.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    /// A node was created.
    NodeAdded {
        /// Scene holding the node.
        scene: SceneId,
        /// New node.
        node: NodeId,
    },
    /// A node was destroyed.
    NodeRemoved {
        /// Scene that held the node.
        scene: SceneId,
        /// Removed node.
        node: NodeId,
    },
    /// A node's placement, name or position in the tree changed.
    NodeUpdated {
        /// Scene holding the node.
        scene: SceneId,
        /// Updated node.
        node: NodeId,
    },
    /// A scene was created.
    SceneAdded {
        /// New scene.
        scene: SceneId,
    },
    /// A scene was removed.
    SceneRemoved {
        /// Removed scene.
        scene: SceneId,
    },
    /// A scene was renamed.
    SceneUpdated {
        /// Renamed scene.
        scene: SceneId,
    },
    /// The active scene changed.
    SceneSwitched {
        /// Previously active scene.
        from: Option<SceneId>,
        /// Newly active scene.
        to: SceneId,
    },
    /// A source was created in the registry by the engine.
    SourceAdded {
        /// New source.
        source: SourceId,
    },
    /// A source was released from the registry by the engine.
    SourceRemoved {
        /// Released source.
        source: SourceId,
    },
    /// A source's filter stack changed.
    SourceUpdated {
        /// Updated source.
        source: SourceId,
    },
    /// A collection replaced the previous one.
    CollectionLoaded {
        /// Loaded collection.
        collection: CollectionId,
    },
}

/// The events of one successful mutating call.
///
/// Exactly one change set is emitted per successful mutation; failed and no-op calls emit none.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChangeSet {
    /// Events in the order they happened.
    pub events: Vec<SceneEvent>,
}

impl ChangeSet {
    /// Return `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn push(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    pub(crate) fn node_added(&mut self, scene: &SceneId, node: &NodeId) {
        self.push(SceneEvent::NodeAdded {
            scene: scene.clone(),
            node: node.clone(),
        });
    }

    pub(crate) fn node_removed(&mut self, scene: &SceneId, node: &NodeId) {
        self.push(SceneEvent::NodeRemoved {
            scene: scene.clone(),
            node: node.clone(),
        });
    }

    pub(crate) fn node_updated(&mut self, scene: &SceneId, node: &NodeId) {
        self.push(SceneEvent::NodeUpdated {
            scene: scene.clone(),
            node: node.clone(),
        });
    }

    /// Nodes created by this change set, in creation order.
    pub fn added_nodes(&self) -> Vec<&NodeId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::NodeAdded { node, .. } => Some(node),
                _ => None,
            })
            .collect()
    }
}
