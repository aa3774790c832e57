pub(crate) mod compositor;
pub(crate) mod params;
pub(crate) mod stroke;
