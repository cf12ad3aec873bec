use std::sync::{Arc, Mutex, MutexGuard};

use crate::collection::studio::Studio;

/// Cloneable handle that serializes every operation on one [`Studio`].
///
/// A local UI and a remote control surface each hold a clone; [`StudioHandle::with`] runs a
/// closure to completion under the lock, so callers observe operations in a total order and
/// never see a partially applied one.
#[derive(Clone, Debug)]
pub struct StudioHandle {
    inner: Arc<Mutex<Studio>>,
}

impl StudioHandle {
    /// Share `studio`.
    pub fn new(studio: Studio) -> Self {
        Self {
            inner: Arc::new(Mutex::new(studio)),
        }
    }

    /// Run `f` with exclusive access to the studio.
    pub fn with<R>(&self, f: impl FnOnce(&mut Studio) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    fn lock(&self) -> MutexGuard<'_, Studio> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl From<Studio> for StudioHandle {
    fn from(studio: Studio) -> Self {
        Self::new(studio)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collection/shared.rs"]
mod tests;
