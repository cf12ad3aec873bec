//! Collection boundary: persistence, configuration and the studio facade.

pub(crate) mod config;
pub(crate) mod load;
pub(crate) mod model;
pub(crate) mod shared;
pub(crate) mod studio;
