//! Copy and paste of node subtrees and filter stacks.

pub(crate) mod copy;
pub(crate) mod paste;
pub(crate) mod snapshot;
