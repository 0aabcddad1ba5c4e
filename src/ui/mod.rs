//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer reads the page's markers and geometry and turns them into
//! cells on the terminal.  It never mutates the page.

pub mod layout;
pub mod lightbox;
pub mod page_widget;
pub mod popup;
pub mod theme;
