pub(crate) mod field;
pub(crate) mod relief;
pub(crate) mod tensor;
