pub(crate) mod model;
pub(crate) mod persist;
pub(crate) mod store;
pub(crate) mod template;
