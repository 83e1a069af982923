pub(crate) mod ease;
pub(crate) mod proc;
pub(crate) mod timeline;
