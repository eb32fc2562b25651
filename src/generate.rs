pub(crate) mod client;
pub(crate) mod generator;
pub(crate) mod parse;
pub(crate) mod prompt;
pub(crate) mod request;
