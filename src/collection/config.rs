use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{SceneError, SceneResult};

/// Defaults applied when a [`Studio`](crate::Studio) creates collections, scenes and folders.
///
/// Every field is optional in JSON; missing fields fall back to [`StudioConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Canvas of newly created collections.
    pub canvas: Canvas,
    /// Name of the first scene in a new collection.
    pub default_scene_name: String,
    /// Name of folders created by grouping a selection.
    pub default_folder_name: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            default_scene_name: "Scene".to_owned(),
            default_folder_name: "Group".to_owned(),
        }
    }
}

impl StudioConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SceneError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the config can produce a usable collection.
    pub fn validate(&self) -> SceneResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SceneError::validation("config canvas width/height must be > 0"));
        }
        if self.default_scene_name.trim().is_empty() || self.default_folder_name.trim().is_empty()
        {
            return Err(SceneError::validation("config default names must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collection/config.rs"]
mod tests;
