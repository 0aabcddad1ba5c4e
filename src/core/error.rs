//! Error types for page loading and widget discovery.
//!
//! Controller operations themselves never fail: absent parts and empty lists
//! are no-ops.  These errors only describe why a widget instance was skipped
//! at discovery time, or why a page manifest could not be read.

use std::path::PathBuf;

use thiserror::Error;

use super::dom::ElementId;

/// A widget instance that could not be wired.  Logged and skipped; other
/// widgets are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("{widget} #{root}: no {part} found")]
    MissingPart {
        widget: &'static str,
        root: ElementId,
        part: &'static str,
    },

    #[error("{widget} #{root}: {attr}={value:?} is not a valid value")]
    BadAttribute {
        widget: &'static str,
        root: ElementId,
        attr: &'static str,
        value: String,
    },
}

/// Failure to read or decode a page manifest.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("cannot read page {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid page manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("page manifest has an empty body")]
    EmptyBody,
}
