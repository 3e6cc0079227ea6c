//! Bridge between the UI command queue and the admin relay.

pub mod commands;
pub mod runtime;
