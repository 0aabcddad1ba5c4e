//! Off-thread image decoding for the lightbox preview.
//!
//! Decoding a full-size photo can take long enough to stall a frame, so each
//! request runs on its own thread and reports back over a channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

/// Longest edge kept after decoding.  The half-block renderer never needs
/// more than a terminal's worth of pixels.
pub const MAX_EDGE: u32 = 512;

pub struct ImageUpdate {
    pub href: String,
    pub result: anyhow::Result<Arc<image::RgbaImage>>,
}

/// Cache slot for a gallery image.
#[derive(Debug, Clone)]
pub enum ImageSlot {
    Loading,
    Ready(Arc<image::RgbaImage>),
    Failed(String),
    /// Not a local file (URL); only the address is shown.
    Remote,
}

/// `href` points at something other than a local file.
pub fn is_remote(href: &str) -> bool {
    href.contains("://") || href.starts_with("data:")
}

/// Resolve `href` relative to the manifest's directory.
pub fn resolve(base: &Path, href: &str) -> PathBuf {
    let path = Path::new(href.strip_prefix("file://").unwrap_or(href));
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn spawn_image_load(tx: mpsc::UnboundedSender<ImageUpdate>, href: String, path: PathBuf) {
    std::thread::spawn(move || {
        let result = image::open(&path)
            .with_context(|| format!("decoding {}", path.display()))
            .map(|img| {
                let img = if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
                    img.thumbnail(MAX_EDGE, MAX_EDGE)
                } else {
                    img
                };
                Arc::new(img.to_rgba8())
            });
        let _ = tx.send(ImageUpdate { href, result });
    });
}
