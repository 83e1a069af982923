pub(crate) mod engine;
pub(crate) mod ownership;
pub(crate) mod state;
