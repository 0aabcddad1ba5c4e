//! Central application state.
//!
//! All mutable host state lives here so that rendering is a pure function
//! over `&AppState` and event handling works on `&mut AppState`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::app::images::ImageSlot;
use crate::config::AppConfig;
use crate::core::dom::ElementId;
use crate::core::page::Page;
use crate::ui::lightbox::LightboxHitZones;

/// Which view is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Page,
    Controls,
}

pub struct AppState {
    pub page: Page,
    /// Directory of the manifest; gallery hrefs resolve against it.
    pub page_dir: PathBuf,
    /// Focused control, if any.
    pub focus: Option<ElementId>,
    /// Focus to restore when the lightbox closes.
    pub focus_before_viewer: Option<ElementId>,
    /// Page width is pinned by `--width` and ignores terminal resizes.
    pub fixed_width: Option<u16>,
    /// Viewport rect from the last frame, for mouse hit-testing.
    pub viewport: ratatui::layout::Rect,
    /// Lightbox hit zones from the last frame; `None` while closed.
    pub lightbox_zones: Option<LightboxHitZones>,
    /// Gallery images by href.
    pub images: HashMap<String, ImageSlot>,
    pub should_quit: bool,
    /// Shown in the status bar instead of the key hints.
    pub status_message: Option<String>,
    pub active_view: ActiveView,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(page: Page, page_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            page,
            page_dir,
            focus: None,
            focus_before_viewer: None,
            fixed_width: None,
            viewport: ratatui::layout::Rect::default(),
            lightbox_zones: None,
            images: HashMap::new(),
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            config,
        }
    }

    /// Href of the image the viewer is showing.
    pub fn viewer_href(&self) -> Option<&str> {
        let (gallery, index) = self.page.viewer.current()?;
        self.page
            .galleries
            .get(gallery)?
            .images
            .get(index)
            .map(String::as_str)
    }
}
