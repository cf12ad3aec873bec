/// Convenience result type used across scenecast.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Structural rejections (`CyclicMove`, `CyclicScene`, kind mismatches) are raised before any
/// state is touched, so a caller that receives one can assume nothing changed.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// A node, scene or source id does not exist.
    #[error("not found: {what} '{id}'")]
    NotFound {
        /// What kind of thing was looked up ("node", "scene", "source", ...).
        what: &'static str,
        /// The id that failed to resolve.
        id: String,
    },

    /// A source id did not resolve through the registry at creation time.
    #[error("invalid source: '{0}'")]
    InvalidSource(String),

    /// Moving `node` under or next to `target` would make the node its own ancestor.
    #[error("cyclic move: node '{node}' cannot be placed relative to '{target}'")]
    CyclicMove {
        /// Node being moved.
        node: String,
        /// Requested parent or anchor.
        target: String,
    },

    /// Nesting `target` inside `scene` would make a scene contain itself.
    #[error("cyclic scene: '{target}' already contains scene '{scene}'")]
    CyclicScene {
        /// Scene receiving the nested reference.
        scene: String,
        /// Scene that would be nested.
        target: String,
    },

    /// A folder was required.
    #[error("not a folder: '{0}'")]
    NotAFolder(String),

    /// An item was required.
    #[error("not an item: '{0}'")]
    NotAnItem(String),

    /// Invalid caller input or persisted collection data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The resource registry rejected a request.
    #[error("registry error: {0}")]
    Registry(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::NotFound`] value.
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }

    /// Build a [`SceneError::InvalidSource`] value.
    pub fn invalid_source(id: impl ToString) -> Self {
        Self::InvalidSource(id.to_string())
    }

    /// Build a [`SceneError::CyclicMove`] value.
    pub fn cyclic_move(node: impl ToString, target: impl ToString) -> Self {
        Self::CyclicMove {
            node: node.to_string(),
            target: target.to_string(),
        }
    }

    /// Build a [`SceneError::CyclicScene`] value.
    pub fn cyclic_scene(scene: impl ToString, target: impl ToString) -> Self {
        Self::CyclicScene {
            scene: scene.to_string(),
            target: target.to_string(),
        }
    }

    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`SceneError::Registry`] value.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Return `true` for [`SceneError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
