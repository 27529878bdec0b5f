//! User configuration — keybindings, default track colour, persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/encode-picker/config.toml`
//! (default `~/.config/encode-picker/config.toml`).

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Colour for tracks whose antibody has no entry in the colour table.
pub const DEFAULT_TRACK_COLOR: &str = "rgb(0, 0, 150)";

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    JumpFirst,
    JumpLast,
    ScrollLeft,
    ScrollRight,
    ToggleSelect,
    LoadSelected,
    CloseDialog,
    OpenCatalog,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when writing the config file).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::PageUp,
        Action::PageDown,
        Action::JumpFirst,
        Action::JumpLast,
        Action::ScrollLeft,
        Action::ScrollRight,
        Action::ToggleSelect,
        Action::LoadSelected,
        Action::CloseDialog,
        Action::OpenCatalog,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::JumpFirst => "jump_first",
            Action::JumpLast => "jump_last",
            Action::ScrollLeft => "scroll_left",
            Action::ScrollRight => "scroll_right",
            Action::ToggleSelect => "toggle_select",
            Action::LoadSelected => "load_selected",
            Action::CloseDialog => "close_dialog",
            Action::OpenCatalog => "open_catalog",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// Named keys accepted in the config file.  The first spelling of each key
/// is the one written back out.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Space", KeyCode::Char(' ')),
    ("Enter", KeyCode::Enter),
    ("Return", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Escape", KeyCode::Esc),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PgUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("PgDn", KeyCode::PageDown),
    ("Tab", KeyCode::Tab),
];

const MODIFIER_NAMES: &[(&str, KeyModifiers)] = &[
    ("Ctrl", KeyModifiers::CONTROL),
    ("Alt", KeyModifiers::ALT),
    ("Shift", KeyModifiers::SHIFT),
];

/// One key plus the modifiers that must be held with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT take part in the comparison.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Compact form for hint lines: arrows as glyphs, everything else as
    /// written in the config file.
    pub fn display(&self) -> String {
        let glyph = match self.code {
            KeyCode::Up => "↑",
            KeyCode::Down => "↓",
            KeyCode::Left => "←",
            KeyCode::Right => "→",
            _ => return self.to_string(),
        };
        format!("{}{glyph}", modifier_prefix(self.modifiers))
    }
}

/// Config-file form, e.g. `Ctrl+l`, `PageUp`, `F5`.
impl fmt::Display for KeyBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&modifier_prefix(self.modifiers))?;
        match self.code {
            KeyCode::F(n) => write!(f, "F{n}"),
            code => match NAMED_KEYS.iter().find(|(_, c)| *c == code) {
                Some((name, _)) => f.write_str(name),
                None => match code {
                    KeyCode::Char(c) => write!(f, "{c}"),
                    other => write!(f, "{other:?}"),
                },
            },
        }
    }
}

impl FromStr for KeyBind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, key) = match s.rsplit_once('+') {
            // A bare "+" is the plus key itself.
            Some((prefix, "")) => (prefix.strip_suffix('+').unwrap_or(prefix), "+"),
            Some(split) => split,
            None => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            let (_, m) = MODIFIER_NAMES
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(part))
                .ok_or_else(|| format!("unknown modifier `{part}`"))?;
            modifiers |= *m;
        }

        let mut chars = key.chars();
        let code = match (chars.next(), chars.next()) {
            // Single characters keep their case so "G" and "g" differ.
            (Some(c), None) => KeyCode::Char(c),
            _ => NAMED_KEYS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, code)| *code)
                .or_else(|| {
                    let n = key.strip_prefix(['f', 'F'])?.parse().ok()?;
                    Some(KeyCode::F(n))
                })
                .ok_or_else(|| format!("unknown key `{key}`"))?,
        };

        Ok(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    MODIFIER_NAMES
        .iter()
        .filter(|(_, m)| modifiers.contains(*m))
        .map(|(name, _)| format!("{name}+"))
        .collect()
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Colour for tracks without a known antibody.
    pub default_color: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            default_color: DEFAULT_TRACK_COLOR.to_string(),
        }
    }
}

impl AppConfig {
    /// Hard-coded default bindings.  None of them need a modifier.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        let table: [(Action, &[KeyCode]); 13] = [
            (Action::MoveUp, &[KeyCode::Up, KeyCode::Char('k')]),
            (Action::MoveDown, &[KeyCode::Down, KeyCode::Char('j')]),
            (Action::PageUp, &[KeyCode::PageUp]),
            (Action::PageDown, &[KeyCode::PageDown]),
            (Action::JumpFirst, &[KeyCode::Home]),
            (Action::JumpLast, &[KeyCode::End]),
            (Action::ScrollLeft, &[KeyCode::Left, KeyCode::Char('h')]),
            (Action::ScrollRight, &[KeyCode::Right, KeyCode::Char('l')]),
            (Action::ToggleSelect, &[KeyCode::Char(' ')]),
            (Action::LoadSelected, &[KeyCode::Enter]),
            (Action::CloseDialog, &[KeyCode::Esc]),
            (Action::OpenCatalog, &[KeyCode::Char('e')]),
            (Action::Quit, &[KeyCode::Char('q')]),
        ];

        table
            .into_iter()
            .map(|(action, codes)| {
                let binds = codes
                    .iter()
                    .map(|&code| KeyBind::new(code, KeyModifiers::NONE))
                    .collect();
                (action, binds)
            })
            .collect()
    }

    /// The action bound to a key event.  When several bindings match, the
    /// one requiring the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |bind| (action, bind)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Short display of the first binding only (for hint lines).
    pub fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Status-bar hint for the browser view.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: open catalog | {}: quit",
            self.short_binding(Action::OpenCatalog),
            self.short_binding(Action::Quit),
        )
    }

    /// Hint line shown inside the catalog dialog.
    pub fn dialog_hint(&self) -> String {
        format!(
            "{}: select | {}: load | {}: close | {}/{}: scroll columns | 1-8: sort",
            self.short_binding(Action::ToggleSelect),
            self.short_binding(Action::LoadSelected),
            self.short_binding(Action::CloseDialog),
            self.short_binding(Action::ScrollLeft),
            self.short_binding(Action::ScrollRight),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Persist current config to disk, returning where it went.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        let entries = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(['#', '[']))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()));

        for (key, value) in entries {
            if key == "default_color" {
                let color = value.trim_matches('"');
                if !color.is_empty() {
                    config.default_color = color.to_string();
                }
                continue;
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::warn!(key, "unknown config key");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .map(|part| part.trim().trim_matches('"'))
                .filter_map(|part| match part.parse() {
                    Ok(bind) => Some(bind),
                    Err(reason) => {
                        tracing::warn!(key, %reason, "ignoring key binding");
                        None
                    }
                })
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# encode-picker configuration".to_string(),
            String::new(),
            "# Colour for tracks without a known antibody".to_string(),
            format!("default_color = \"{}\"", self.default_color),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Named keys: Space, Enter, Esc, Up, Down, Left, Right, Home, End,".to_string(),
            "#   PageUp, PageDown, Tab, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_string).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/encode-picker/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}
