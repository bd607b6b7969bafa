//! Flutter bridge crate for the to-do list core.

pub mod api;
