use crate::foundation::core::Size;
use crate::foundation::error::SceneResult;
use crate::foundation::ids::SourceId;

/// Source type tag under which scenes are registered.
pub const SCENE_SOURCE_TYPE: &str = "scene";

/// One entry of a source's filter stack.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterDef {
    /// Display name, unique within the owning source.
    pub name: String,
    /// Filter type tag understood by the external engine.
    pub type_id: String,
    /// Opaque filter settings.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub settings: serde_json::Value,
    /// Whether the filter is applied.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FilterDef {
    /// Build an enabled filter with no settings.
    pub fn new(name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: type_id.into(),
            settings: serde_json::Value::Null,
            enabled: true,
        }
    }
}

/// Request to create a source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceSpec {
    /// Source type tag (`"image_source"`, `"color_source"`, [`SCENE_SOURCE_TYPE`], ...).
    pub type_id: String,
    /// Preferred display name; the registry may suffix it to keep names unique.
    pub name: String,
    /// Opaque source settings.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub settings: serde_json::Value,
    /// Intrinsic content size, when the engine knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Initial filter stack.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDef>,
}

impl SourceSpec {
    /// Build a spec with null settings, no size and no filters.
    pub fn new(type_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            settings: serde_json::Value::Null,
            size: None,
            filters: Vec::new(),
        }
    }

    /// Set the settings blob.
    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = settings;
        self
    }

    /// Set the intrinsic size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    /// Append a filter to the initial stack.
    pub fn with_filter(mut self, filter: FilterDef) -> Self {
        self.filters.push(filter);
        self
    }
}

/// Snapshot of a source as the registry currently knows it.
///
/// Descriptors are owned copies; callers re-resolve instead of holding on to them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceDescriptor {
    /// Source id.
    pub id: SourceId,
    /// Source type tag.
    pub type_id: String,
    /// Display name.
    pub name: String,
    /// Opaque settings blob.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub settings: serde_json::Value,
    /// Intrinsic content size, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Filter stack in application order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDef>,
}

impl SourceDescriptor {
    /// Return `true` when this source is a scene.
    pub fn is_scene(&self) -> bool {
        self.type_id == SCENE_SOURCE_TYPE
    }

    /// Intrinsic size, or zero when the engine has not reported one.
    pub fn size_or_zero(&self) -> Size {
        self.size.unwrap_or(Size::ZERO)
    }
}

/// Contract with the external resource registry that owns source lifecycles.
///
/// The scene graph only ever refers to sources by [`SourceId`] and goes through this trait for
/// every read, so edits made to a source outside the engine are always observed.
pub trait SourceRegistry: Send + std::fmt::Debug {
    /// Create a new source and return its id.
    fn create_source(&mut self, spec: SourceSpec) -> SceneResult<SourceId>;

    /// Create an independent copy of `id` (settings, size and filters).
    fn duplicate_source(&mut self, id: &SourceId) -> SceneResult<SourceId>;

    /// Release a source. Unknown ids are ignored.
    fn release_source(&mut self, id: &SourceId);

    /// Resolve a source id to its current descriptor.
    fn resolve(&self, id: &SourceId) -> Option<SourceDescriptor>;

    /// Append filters to the end of a source's filter stack.
    fn append_filters(&mut self, id: &SourceId, filters: &[FilterDef]) -> SceneResult<()>;

    /// Replace a source's whole filter stack.
    fn set_filters(&mut self, id: &SourceId, filters: Vec<FilterDef>) -> SceneResult<()>;

    /// Replace a source's settings blob.
    fn update_settings(&mut self, id: &SourceId, settings: serde_json::Value) -> SceneResult<()>;

    /// Re-register a source under its persisted id (collection load).
    fn restore_source(&mut self, desc: SourceDescriptor) -> SceneResult<()>;

    /// Ids of every live source, in creation order.
    fn source_ids(&self) -> Vec<SourceId>;
}
