//! Presentation controller for the bakery admin dashboard: table view-models,
//! moderation controls, and the queue that carries UI intents to the relay.

pub mod backend_bridge;
pub mod bakery_controls;
pub mod controller;
pub mod decoration_table;
pub mod format;

/// Shown for every failed mutation; details go to the log only.
pub const GENERIC_ERROR_MESSAGE: &str = "Đã xảy ra lỗi";
