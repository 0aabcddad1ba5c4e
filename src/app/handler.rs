//! Input handling: maps key/mouse events onto page operations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::dom::ElementId;
use crate::core::lightbox::Key;
use crate::core::page::ClickOutcome;
use crate::core::timer::Scheduler;
use crate::ui::lightbox::LightboxHit;

use super::state::{ActiveView, AppState};

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent, sched: &mut dyn Scheduler) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Controls => state.active_view = ActiveView::Page,
        ActiveView::Page => handle_page_key(state, key, sched),
    }
}

fn viewer_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Esc => Key::Escape,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        _ => Key::Other,
    }
}

fn handle_page_key(state: &mut AppState, key: KeyEvent, sched: &mut dyn Scheduler) {
    // The viewer's own keys go first; it ignores everything while closed.
    let was_open = state.page.viewer.is_open();
    if state.page.key(viewer_key(key.code), sched) {
        sync_focus(state, was_open);
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    let step = f64::from(state.config.scroll_step);
    let page_rows = (state.page.viewport().height - 1.0).max(1.0);
    match action {
        Action::Quit => state.should_quit = true,
        Action::ShowControls => state.active_view = ActiveView::Controls,
        Action::ScrollUp => state.page.scroll_by(-step, sched),
        Action::ScrollDown => state.page.scroll_by(step, sched),
        Action::PageUp => state.page.scroll_by(-page_rows, sched),
        Action::PageDown => state.page.scroll_by(page_rows, sched),
        Action::FocusNext => move_focus(state, true, sched),
        Action::FocusPrev => move_focus(state, false, sched),
        Action::Activate => {
            if let Some(id) = state.focus {
                activate(state, id, sched);
            }
        }
    }
}

/// Cycle focus over the currently interactive controls.
fn move_focus(state: &mut AppState, forward: bool, sched: &mut dyn Scheduler) {
    let controls = state.page.interactive_elements();
    if controls.is_empty() {
        state.focus = None;
        return;
    }
    let len = controls.len();
    let pos = state.focus.and_then(|f| controls.iter().position(|&c| c == f));
    let next = match (pos, forward) {
        (Some(p), true) => (p + 1) % len,
        (Some(p), false) => (p + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    state.focus = Some(controls[next]);
    scroll_into_view(state, controls[next], sched);
}

fn scroll_into_view(state: &mut AppState, id: ElementId, sched: &mut dyn Scheduler) {
    if state.page.viewer.is_open() {
        return;
    }
    let Some(rect) = state.page.doc.get(id).rect else {
        return;
    };
    let vp = state.page.viewport();
    if rect.y < vp.y {
        state.page.scroll_to(rect.y, sched);
    } else if rect.y + 1.0 > vp.bottom() {
        state.page.scroll_to(rect.y + 1.0 - vp.height, sched);
    }
}

/// Click `id` and report the outcome in the status bar.
fn activate(state: &mut AppState, id: ElementId, sched: &mut dyn Scheduler) {
    let was_open = state.page.viewer.is_open();
    match state.page.click(id, sched) {
        ClickOutcome::Navigate(href) => {
            tracing::info!(%href, "link navigation");
            state.status_message = Some(format!("→ {href}"));
        }
        ClickOutcome::Handled => state.status_message = None,
        ClickOutcome::Ignored => {}
    }
    sync_focus(state, was_open);
}

/// Move focus into or out of the lightbox as it opens or closes, and drop
/// focus from controls that are no longer rendered.
fn sync_focus(state: &mut AppState, was_open: bool) {
    let open = state.page.viewer.is_open();
    if open && !was_open {
        state.focus_before_viewer = state.focus.take();
        state.focus = state.page.viewer.overlay().map(|o| o.close);
    } else if !open && was_open {
        state.focus = state.focus_before_viewer.take();
        state.lightbox_zones = None;
    }
    if let Some(f) = state.focus {
        if !state.page.interactive_elements().contains(&f) {
            state.focus = None;
        }
    }
}

// ── mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, sched: &mut dyn Scheduler) {
    if state.active_view != ActiveView::Page {
        if matches!(mouse.kind, MouseEventKind::Down(_)) {
            state.active_view = ActiveView::Page;
        }
        return;
    }

    let step = f64::from(state.config.scroll_step);
    match mouse.kind {
        MouseEventKind::ScrollUp => state.page.scroll_by(-step, sched),
        MouseEventKind::ScrollDown => state.page.scroll_by(step, sched),
        MouseEventKind::Down(MouseButton::Left) => {
            if state.page.viewer.is_open() {
                lightbox_click(state, mouse.column, mouse.row, sched);
            } else if let Some(id) = hit_test(state, mouse.column, mouse.row) {
                state.focus = Some(id);
                activate(state, id, sched);
            }
        }
        _ => {}
    }
}

fn lightbox_click(state: &mut AppState, col: u16, row: u16, sched: &mut dyn Scheduler) {
    let (Some(zones), Some(overlay)) = (state.lightbox_zones, state.page.viewer.overlay().copied()) else {
        return;
    };
    let target = match zones.hit(col, row) {
        LightboxHit::Close => overlay.close,
        LightboxHit::Prev => overlay.prev,
        LightboxHit::Next => overlay.next,
        LightboxHit::Backdrop => overlay.root,
        LightboxHit::Content => return,
    };
    activate(state, target, sched);
}

/// Deepest interactive element under a terminal cell.
fn hit_test(state: &AppState, col: u16, row: u16) -> Option<ElementId> {
    let vp = state.viewport;
    if col < vp.x || row < vp.y || col >= vp.right() || row >= vp.bottom() {
        return None;
    }
    let x = f64::from(col - vp.x) + 0.5;
    let y = f64::from(row - vp.y) + state.page.scroll() + 0.5;

    state
        .page
        .interactive_elements()
        .into_iter()
        .filter(|&id| {
            state.page.doc.get(id).rect.is_some_and(|r| {
                x >= r.x && x < r.right() && y >= r.y && y < r.bottom()
            })
        })
        .max_by_key(|&id| state.page.doc.depth(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    use crate::config::AppConfig;
    use crate::core::manifest;
    use crate::core::page::Page;
    use crate::core::timer::ManualScheduler;
    use crate::ui::lightbox::LightboxHitZones;

    const PAGE: &str = r#"{ "title": "T", "body": [
        { "class": "accordion-block", "children": [
            { "class": "accordion-item", "children": [
                { "tag": "button", "class": "accordion-header", "text": "Question" },
                { "class": "accordion-body", "text": "Answer" } ] } ] },
        { "class": "gallery-block", "attrs": { "data-lightbox": "True" }, "children": [
            { "tag": "a", "class": "gallery-item", "attrs": { "href": "a.png" }, "text": "A" },
            { "tag": "a", "class": "gallery-item", "attrs": { "href": "b.png" }, "text": "B" } ] },
        { "class": "gallery-block", "children": [
            { "tag": "a", "class": "gallery-item", "attrs": { "href": "https://example.org/z" }, "text": "Z" } ] },
        { "tag": "p", "height": 30, "text": "filler" }
    ] }"#;

    fn setup() -> (AppState, ManualScheduler) {
        let mut sched = ManualScheduler::new();
        let page = Page::init(manifest::parse(PAGE).unwrap(), 40, 10, &mut sched);
        let mut state = AppState::new(page, PathBuf::from("."), AppConfig::default());
        state.viewport = Rect::new(1, 1, 40, 10);
        (state, sched)
    }

    fn press(state: &mut AppState, sched: &mut ManualScheduler, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE), sched);
    }

    fn click(state: &mut AppState, sched: &mut ManualScheduler, column: u16, row: u16) {
        let ev = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(state, ev, sched);
    }

    #[test]
    fn tab_then_enter_toggles_accordion() {
        let (mut state, mut sched) = setup();
        press(&mut state, &mut sched, KeyCode::Tab);
        let header = state.page.accordions[0].panels()[0].header;
        assert_eq!(state.focus, Some(header));

        press(&mut state, &mut sched, KeyCode::Enter);
        assert!(state.page.accordions[0].panels()[0].expanded());
        press(&mut state, &mut sched, KeyCode::Enter);
        assert!(!state.page.accordions[0].panels()[0].expanded());
    }

    #[test]
    fn lightbox_takes_focus_and_gives_it_back() {
        let (mut state, mut sched) = setup();
        let item = state.page.galleries[0].items[0];
        state.focus = Some(item);
        press(&mut state, &mut sched, KeyCode::Enter);
        assert!(state.page.viewer.is_open());
        let overlay = *state.page.viewer.overlay().unwrap();
        assert_eq!(state.focus, Some(overlay.close));

        press(&mut state, &mut sched, KeyCode::Right);
        assert_eq!(state.viewer_href(), Some("b.png"));
        // Scroll keys do nothing while the page is locked.
        press(&mut state, &mut sched, KeyCode::Down);
        assert_eq!(state.page.scroll(), 0.0);

        press(&mut state, &mut sched, KeyCode::Esc);
        assert!(!state.page.viewer.is_open());
        assert_eq!(state.focus, Some(item));
    }

    #[test]
    fn tab_cycles_overlay_controls_while_open() {
        let (mut state, mut sched) = setup();
        state.focus = Some(state.page.galleries[0].items[0]);
        press(&mut state, &mut sched, KeyCode::Enter);
        let overlay = *state.page.viewer.overlay().unwrap();
        let controls = [overlay.close, overlay.prev, overlay.next];

        for _ in 0..3 {
            press(&mut state, &mut sched, KeyCode::Tab);
            assert!(controls.contains(&state.focus.unwrap()));
        }
        assert_eq!(state.focus, Some(overlay.close));
        press(&mut state, &mut sched, KeyCode::Enter);
        assert!(!state.page.viewer.is_open());
    }

    #[test]
    fn plain_gallery_reports_navigation() {
        let (mut state, mut sched) = setup();
        state.focus = Some(state.page.galleries[1].items[0]);
        press(&mut state, &mut sched, KeyCode::Enter);
        assert_eq!(state.status_message.as_deref(), Some("→ https://example.org/z"));
        assert!(!state.page.viewer.is_open());
    }

    #[test]
    fn mouse_click_hits_header_and_backdrop_closes() {
        let (mut state, mut sched) = setup();
        let header = state.page.accordions[0].panels()[0].header;
        let r = state.page.doc.get(header).rect.unwrap();
        click(&mut state, &mut sched, 1 + r.x as u16, 1 + r.y as u16);
        assert!(state.page.accordions[0].panels()[0].expanded());
        assert_eq!(state.focus, Some(header));

        state.focus = Some(state.page.galleries[0].items[1]);
        press(&mut state, &mut sched, KeyCode::Enter);
        state.lightbox_zones = Some(LightboxHitZones {
            overlay_rect: Rect::new(5, 2, 30, 8),
            close_rect: Rect::new(30, 2, 3, 1),
            prev_rect: Rect::new(5, 6, 3, 1),
            next_rect: Rect::new(32, 6, 3, 1),
        });
        click(&mut state, &mut sched, 5, 6);
        assert_eq!(state.page.viewer.current(), Some((0, 0)));
        click(&mut state, &mut sched, 10, 4);
        assert!(state.page.viewer.is_open());
        click(&mut state, &mut sched, 0, 0);
        assert!(!state.page.viewer.is_open());
    }

    #[test]
    fn scroll_keys_and_controls_popup() {
        let (mut state, mut sched) = setup();
        press(&mut state, &mut sched, KeyCode::Char('j'));
        assert_eq!(state.page.scroll(), 1.0);
        press(&mut state, &mut sched, KeyCode::PageDown);
        assert_eq!(state.page.scroll(), 10.0);

        press(&mut state, &mut sched, KeyCode::Char('?'));
        assert_eq!(state.active_view, ActiveView::Controls);
        press(&mut state, &mut sched, KeyCode::Char('j'));
        assert_eq!(state.active_view, ActiveView::Page);
        assert_eq!(state.page.scroll(), 10.0);

        press(&mut state, &mut sched, KeyCode::Char('q'));
        assert!(state.should_quit);
    }
}
