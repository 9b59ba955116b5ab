pub(crate) mod action;
pub(crate) mod counter;
pub(crate) mod dto;
pub(crate) mod server;
