pub(crate) mod outline;
pub(crate) mod reveal;
pub(crate) mod stroke;
