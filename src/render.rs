pub(crate) mod cpu;
pub(crate) mod filter;
pub(crate) mod fit;
pub(crate) mod gradient;
pub(crate) mod plan;
pub(crate) mod wrap;
