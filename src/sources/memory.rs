use std::collections::HashMap;

use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::SourceId;
use crate::sources::registry::{FilterDef, SourceDescriptor, SourceRegistry, SourceSpec};

/// In-process registry that keeps source descriptors in memory.
///
/// This is the registry a [`crate::Studio`] uses unless it is given another one, and the one
/// tests use as a stand-in for the capture engine.
#[derive(Debug, Default)]
pub struct InMemorySourceRegistry {
    by_id: HashMap<SourceId, SourceDescriptor>,
    order: Vec<SourceId>,
}

impl InMemorySourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sources.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Return `true` when no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.by_id.values().any(|d| d.name == name);
        if !taken(base) {
            return base.to_owned();
        }
        (2..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_owned())
    }

    fn insert(&mut self, desc: SourceDescriptor) {
        self.order.push(desc.id.clone());
        self.by_id.insert(desc.id.clone(), desc);
    }
}

pub(crate) fn unique_filter_name(existing: &[FilterDef], base: &str) -> String {
    let taken = |name: &str| existing.iter().any(|f| f.name == name);
    if !taken(base) {
        return base.to_owned();
    }
    (2..)
        .map(|n| format!("{base} {n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_owned())
}

impl SourceRegistry for InMemorySourceRegistry {
    fn create_source(&mut self, spec: SourceSpec) -> SceneResult<SourceId> {
        if spec.type_id.trim().is_empty() {
            return Err(SceneError::registry("source type_id must be non-empty"));
        }
        let base = if spec.name.trim().is_empty() {
            spec.type_id.clone()
        } else {
            spec.name.clone()
        };
        let id = SourceId::generate();
        let name = self.unique_name(&base);
        self.insert(SourceDescriptor {
            id: id.clone(),
            type_id: spec.type_id,
            name,
            settings: spec.settings,
            size: spec.size,
            filters: spec.filters,
        });
        Ok(id)
    }

    fn duplicate_source(&mut self, id: &SourceId) -> SceneResult<SourceId> {
        let original = self
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::invalid_source(id))?;
        let new_id = SourceId::generate();
        let name = self.unique_name(&original.name);
        self.insert(SourceDescriptor {
            id: new_id.clone(),
            name,
            ..original
        });
        Ok(new_id)
    }

    fn release_source(&mut self, id: &SourceId) {
        if self.by_id.remove(id).is_some() {
            self.order.retain(|o| o != id);
        }
    }

    fn resolve(&self, id: &SourceId) -> Option<SourceDescriptor> {
        self.by_id.get(id).cloned()
    }

    fn append_filters(&mut self, id: &SourceId, filters: &[FilterDef]) -> SceneResult<()> {
        let desc = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| SceneError::not_found("source", id))?;
        for filter in filters {
            let name = unique_filter_name(&desc.filters, &filter.name);
            desc.filters.push(FilterDef {
                name,
                ..filter.clone()
            });
        }
        Ok(())
    }

    fn set_filters(&mut self, id: &SourceId, filters: Vec<FilterDef>) -> SceneResult<()> {
        let desc = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| SceneError::not_found("source", id))?;
        desc.filters = filters;
        Ok(())
    }

    fn update_settings(&mut self, id: &SourceId, settings: serde_json::Value) -> SceneResult<()> {
        let desc = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| SceneError::not_found("source", id))?;
        desc.settings = settings;
        Ok(())
    }

    fn restore_source(&mut self, desc: SourceDescriptor) -> SceneResult<()> {
        if self.by_id.contains_key(&desc.id) {
            return Err(SceneError::validation(format!(
                "duplicate source id '{}'",
                desc.id
            )));
        }
        self.insert(desc);
        Ok(())
    }

    fn source_ids(&self) -> Vec<SourceId> {
        self.order.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sources/memory.rs"]
mod tests;
