//! Preview-host configuration: key bindings, scroll settings and persistence.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/blockfx/config.toml` (default `~/.config/blockfx/config.toml`).
//! The lightbox keys (Esc / ← / →) belong to the behavior layer and are not
//! configurable here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ───────────────────────────────────────── actions ───────────

/// Host actions a key can trigger while the page has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    FocusNext,
    FocusPrev,
    Activate,
    ShowControls,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls popup).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::FocusNext,
        Action::FocusPrev,
        Action::Activate,
        Action::ShowControls,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::ScrollUp => "Scroll Up",
            Action::ScrollDown => "Scroll Down",
            Action::PageUp => "Page Up",
            Action::PageDown => "Page Down",
            Action::FocusNext => "Next Control",
            Action::FocusPrev => "Prev Control",
            Action::Activate => "Click Control",
            Action::ShowControls => "Show Controls",
            Action::Quit => "Quit",
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::FocusNext => "focus_next",
            Action::FocusPrev => "focus_prev",
            Action::Activate => "activate",
            Action::ShowControls => "show_controls",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code plus modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.  `BackTab` already implies Shift,
    /// so its modifiers are ignored entirely; for characters the shift state
    /// is part of the character itself (`?` arrives as Shift+`?`).
    pub fn matches(&self, event: KeyEvent) -> bool {
        if self.code != event.code {
            return false;
        }
        let mask = match self.code {
            KeyCode::BackTab => return true,
            KeyCode::Char(_) => KeyModifiers::CONTROL.union(KeyModifiers::ALT),
            _ => MODIFIER_MASK,
        };
        (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-facing label (e.g. `"Ctrl+c"`, `"↓"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Config-file form (e.g. `"Ctrl+c"`, `"Down"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, pretty: bool) -> String {
        if pretty && self.code == KeyCode::BackTab {
            return "Shift+Tab".into();
        }
        let mut s = String::new();
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(name);
            }
        }
        let key: String = match (self.code, pretty) {
            (KeyCode::Char(' '), _) => "Space".into(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Left, true) => "←".into(),
            (KeyCode::Right, true) => "→".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"PageDown"`, `"j"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, mods) = parts.split_last()?;

        for part in mods {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

pub const DEFAULT_SCROLL_STEP: u16 = 1;
pub const DEFAULT_TICK_MS: u64 = 100;

/// Host configuration: key bindings and scroll/tick settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Rows moved per scroll key / wheel notch.
    pub scroll_step: u16,
    /// Terminal poll interval; also the redraw cadence when idle.
    pub tick_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            scroll_step: DEFAULT_SCROLL_STEP,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        let n = KeyModifiers::NONE;
        let key = |code| KeyBind::new(code, n);
        let mut m = HashMap::new();

        m.insert(Action::ScrollUp, vec![key(KeyCode::Up), key(KeyCode::Char('k'))]);
        m.insert(Action::ScrollDown, vec![key(KeyCode::Down), key(KeyCode::Char('j'))]);
        m.insert(Action::PageUp, vec![key(KeyCode::PageUp)]);
        m.insert(Action::PageDown, vec![key(KeyCode::PageDown), key(KeyCode::Char(' '))]);
        m.insert(Action::FocusNext, vec![key(KeyCode::Tab)]);
        m.insert(Action::FocusPrev, vec![KeyBind::new(KeyCode::BackTab, KeyModifiers::SHIFT)]);
        m.insert(Action::Activate, vec![key(KeyCode::Enter)]);
        m.insert(Action::ShowControls, vec![key(KeyCode::Char('?'))]);
        m.insert(Action::Quit, vec![key(KeyCode::Char('q'))]);

        m
    }

    /// Find the action bound to a key event.  When several bindings match,
    /// the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<(Action, u32)> = None;
        for (&action, binds) in &self.bindings {
            for bind in binds.iter().filter(|b| b.matches(event)) {
                let mc = bind.modifiers.bits().count_ones();
                if best.map_or(true, |(_, m)| mc > m) {
                    best = Some((action, mc));
                }
            }
        }
        best.map(|(a, _)| a)
    }

    /// Format the binding list for an action (e.g. `"↓/j"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action).and_then(|b| b.first()) {
            Some(bind) => bind.display(),
            None => "?".into(),
        }
    }

    /// Status-bar hint built from the current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: next control | {}: click | {}: controls | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::FocusNext),
            self.short_binding(Action::Activate),
            self.short_binding(Action::ShowControls),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(err) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), %err, "config unreadable, using defaults");
                }
                Self::default()
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "scroll_step" => {
                    if let Ok(v) = value.parse::<u16>() {
                        config.scroll_step = v.clamp(1, 20);
                    }
                    continue;
                }
                "tick_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.tick_ms = v.clamp(16, 1000);
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };
            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# blockfx preview configuration".to_string(),
            String::new(),
            format!("scroll_step = {}", self.scroll_step),
            format!("tick_ms = {}", self.tick_ms),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// `$XDG_CONFIG_HOME/blockfx/config.toml`.
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("blockfx").join("config.toml")
}
