//! Controller layer: UI events, notifications, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod state;
