pub(crate) mod slic;
