//! Core behavior layer – document model, widget controllers and the page
//! that wires them together.
//!
//! Nothing in this module depends on any TUI or rendering crate.  All
//! operations are synchronous and run to completion on `&mut` state.

pub mod accordion;
pub mod carousel;
pub mod dom;
pub mod error;
pub mod layout;
pub mod lightbox;
pub mod manifest;
pub mod observer;
pub mod page;
pub mod parallax;
pub mod reveal;
pub mod snapshot;
pub mod tabs;
pub mod timer;
