pub(crate) mod gaussian;
pub(crate) mod kuwahara;
pub(crate) mod sobel;
