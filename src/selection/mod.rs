//! Scene-scoped selections and their bulk operations.

pub(crate) mod transform;
pub(crate) mod view;
