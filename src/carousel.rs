pub(crate) mod camera;
pub(crate) mod depth;
pub(crate) mod layers;
