pub(crate) mod healthz;
pub(crate) mod index;
pub(crate) mod stress;

pub(crate) use healthz::healthz;
pub(crate) use index::index;
pub(crate) use stress::stress;
