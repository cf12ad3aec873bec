use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random id.
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            /// Wrap an existing raw id (e.g. one read from a persisted collection).
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw id string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of a node (item or folder), unique within a collection.
    NodeId,
    "node"
);

string_id!(
    /// Identifier of a source in the resource registry.
    SourceId,
    "src"
);

string_id!(
    /// Identifier of a scene.
    ///
    /// A scene is also registered as a source of type `"scene"` under the same raw id, which
    /// is how items nest whole scenes.
    SceneId,
    "scene"
);

string_id!(
    /// Identifier of a persisted scene collection.
    CollectionId,
    "coll"
);

string_id!(
    /// Identifier stamped on every clipboard snapshot at capture time.
    SnapshotId,
    "snap"
);

impl SceneId {
    /// The source id under which this scene is registered.
    pub fn as_source(&self) -> SourceId {
        SourceId(self.0.clone())
    }
}

impl SourceId {
    /// Reinterpret this source id as a scene id (meaningful for `"scene"` sources only).
    pub fn as_scene(&self) -> SceneId {
        SceneId(self.0.clone())
    }
}
