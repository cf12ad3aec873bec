//! Resource registry contract and the in-memory registry.

pub(crate) mod memory;
pub(crate) mod registry;
