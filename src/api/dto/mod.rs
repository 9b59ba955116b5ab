pub(crate) mod stress;
pub(crate) mod system;
