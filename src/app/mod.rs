//! Preview host: state, event sources and input handling.

pub mod event;
pub mod handler;
pub mod images;
pub mod state;
pub mod timers;
