//! Colour palette and text styles used across the preview.

use ratatui::style::{Color, Modifier, Style};

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── page content ───────────────────────────────────────────
    pub fn text_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn heading_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    /// Reveal targets that have not entered the viewport yet.
    pub fn unrevealed_style() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    }

    /// Interactive controls (headers, tab buttons, gallery links).
    pub fn control_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    /// Open accordion header / active tab.
    pub fn active_control_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn focused_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn placeholder_style() -> Style {
        Style::default().fg(Color::Magenta)
    }

    // ── lightbox ───────────────────────────────────────────────
    pub fn lightbox_border_style() -> Style {
        Style::default().fg(Color::LightBlue)
    }

    pub fn lightbox_button_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn lightbox_close_style() -> Style {
        Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
