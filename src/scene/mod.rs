//! Scene trees, the collection-level scene graph, and change notifications.

pub(crate) mod events;
pub(crate) mod graph;
pub(crate) mod node;
pub(crate) mod tree;
