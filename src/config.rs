//! User configuration — packing knobs, keybindings and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/tx-tiles/config.toml` (default `~/.config/tx-tiles/config.toml`).
//! Unknown keys and bad values are logged and skipped; the default stays.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::layout::{PackerConfig, PackerKind};
use crate::core::scale::ScaleConfig;
use crate::core::skyline::SkylineConfig;
use crate::core::tetris::TetrisConfig;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CyclePacker,
    Refresh,
    TogglePause,
    ToggleHelp,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help popup).
    pub const ALL: &[Action] = &[
        Action::CyclePacker,
        Action::Refresh,
        Action::TogglePause,
        Action::ToggleHelp,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::CyclePacker => "Next packer",
            Action::Refresh => "Refresh now",
            Action::TogglePause => "Pause / resume feed",
            Action::ToggleHelp => "Toggle help",
            Action::Quit => "Quit",
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Action::CyclePacker => "cycle_packer",
            Action::Refresh => "refresh",
            Action::TogglePause => "toggle_pause",
            Action::ToggleHelp => "toggle_help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A key code plus the CTRL/ALT/SHIFT modifiers that must accompany it.
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

    /// Platform modifiers like SUPER are ignored when matching.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Config-file form, e.g. `"Ctrl+r"`, `"Space"`, `"F1"`.  Also used for
    /// display.
    pub fn to_config_string(&self) -> String {
        let mut s = String::new();
        for (flag, prefix) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(prefix);
            }
        }
        match self.code {
            KeyCode::Char(' ') => s.push_str("Space"),
            KeyCode::Char(c) => s.push(c),
            KeyCode::Enter => s.push_str("Enter"),
            KeyCode::Esc => s.push_str("Esc"),
            KeyCode::Tab => s.push_str("Tab"),
            KeyCode::F(n) => s.push_str(&format!("F{n}")),
            other => s.push_str(&format!("{other:?}")),
        }
        s
    }

    /// Parse `"Ctrl+r"`, `"Space"`, `"q"`, `"F5"`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let (key_part, mods) = parts.split_last()?;

        let mut modifiers = KeyModifiers::NONE;
        for part in mods {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let lower = key_part.to_lowercase();
        let code = match lower.as_str() {
            "space" => KeyCode::Char(' '),
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            f if f.len() > 1 && f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
            _ => {
                let mut chars = key_part.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };
        Some(Self { code, modifiers })
    }
}

// ───────────────────────────────────────── errors ────────────

/// A problem with one line of the config file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("line {line}: expected `key = value`")]
    Malformed { line: usize },
    #[error("line {line}: unknown key `{key}`")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: invalid value `{value}` for `{key}`")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
}

// ───────────────────────────────────────── config ────────────

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub packer: PackerKind,
    pub scale: ScaleConfig,
    /// Cell side hint in terminal "pixels" (a column, or half a row).
    pub cell_size: f64,
    pub gap: f64,
    pub pad: f64,
    pub skyline: SkylineConfig,
    pub tetris: TetrisConfig,
    /// Seed for the synthetic feed.
    pub seed: u64,
    /// Number of transactions the synthetic feed keeps around.
    pub pool_size: usize,
    pub animation_ms: u64,
    pub refresh_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            packer: PackerKind::default(),
            scale: ScaleConfig::default(),
            cell_size: 2.0,
            gap: 0.0,
            pad: 0.0,
            skyline: SkylineConfig::default(),
            tetris: TetrisConfig::default(),
            seed: 21,
            pool_size: 400,
            animation_ms: 600,
            refresh_ms: 4000,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(CyclePacker, vec![KeyBind::new(Char('p'), n), KeyBind::new(Tab, n)]);
        m.insert(Refresh, vec![KeyBind::new(Char('r'), n)]);
        m.insert(TogglePause, vec![KeyBind::new(Char(' '), n)]);
        m.insert(ToggleHelp, vec![KeyBind::new(Char('?'), n), KeyBind::new(F(1), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    /// The action bound to `event`.  The binding with more modifiers wins
    /// when several match.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(action, b)| {
                let pos = Action::ALL.iter().position(|a| a == action).unwrap_or(0);
                (b.modifiers.bits().count_ones(), usize::MAX - pos)
            })
            .map(|(action, _)| action)
    }

    /// `"p/Tab"` style list for the help popup.
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds
                .iter()
                .map(KeyBind::to_config_string)
                .collect::<Vec<_>>()
                .join("/"),
            _ => "unbound".into(),
        }
    }

    /// Status-bar hint built from the first binding of each key action.
    pub fn status_bar_hint(&self) -> String {
        let first = |a: Action| {
            self.bindings
                .get(&a)
                .and_then(|b| b.first())
                .map_or_else(|| "?".to_string(), KeyBind::to_config_string)
        };
        format!(
            "{}: packer | {}: refresh | {}: pause | {}: help",
            first(Action::CyclePacker),
            first(Action::Refresh),
            first(Action::TogglePause),
            first(Action::ToggleHelp),
        )
    }

    pub fn packer_config(&self) -> PackerConfig {
        PackerConfig {
            skyline: self.skyline,
            tetris: self.tetris,
        }
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        let (config, problems) = Self::parse(&contents);
        for problem in problems {
            tracing::warn!("{}: {problem}", path.display());
        }
        config
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    /// Parse config text on top of the defaults, collecting per-line
    /// problems instead of failing.
    pub fn parse(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut problems = Vec::new();

        for (n, raw) in s.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                problems.push(ConfigError::Malformed { line: n + 1 });
                continue;
            };
            if let Err(e) = config.apply(n + 1, key.trim(), value.trim().trim_matches('"')) {
                problems.push(e);
            }
        }

        (config, problems)
    }

    fn apply(&mut self, line: usize, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            line,
            key: key.to_string(),
            value: value.to_string(),
        };
        let float = || value.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(invalid);
        let int = || value.parse::<u64>().map_err(|_| invalid());

        match key {
            "packer" => self.packer = value.parse().map_err(|_| invalid())?,
            "unit_weight" => self.scale.unit_weight = float()?.max(1e-6),
            "gamma" => self.scale.gamma = float()?.clamp(0.1, 1.0),
            "min_side" => self.scale.min_side = int()?.clamp(1, 64) as u32,
            "max_side" => self.scale.max_side = int()?.clamp(1, 256) as u32,
            "cell_size" => self.cell_size = float()?.clamp(2.0, 64.0),
            "gap" => self.gap = float()?.clamp(0.0, 16.0),
            "pad" => self.pad = float()?.clamp(0.0, 64.0),
            "gap_fill_side_max" => self.skyline.gap_fill_side_max = int()?.min(64) as u32,
            "bubble_passes" => self.tetris.bubble_passes = int()?.min(32) as u32,
            "seed" => {
                self.seed = int()?;
                self.tetris.seed = self.seed;
            }
            "pool_size" => self.pool_size = int()?.clamp(1, 20_000) as usize,
            "animation_ms" => self.animation_ms = int()?.min(5000),
            "refresh_ms" => self.refresh_ms = int()?.clamp(250, 60_000),
            _ => {
                let Some(action) = Action::from_config_key(key) else {
                    return Err(ConfigError::UnknownKey {
                        line,
                        key: key.to_string(),
                    });
                };
                let parsed: Vec<KeyBind> = value
                    .split(',')
                    .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                    .collect();
                if parsed.is_empty() {
                    return Err(invalid());
                }
                self.bindings.insert(action, parsed);
            }
        }
        Ok(())
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# tx-tiles configuration".to_string(),
            String::new(),
            "# Packing".to_string(),
            format!("packer = {}", self.packer.key()),
            format!("unit_weight = {}", self.scale.unit_weight),
            format!("gamma = {}", self.scale.gamma),
            format!("min_side = {}", self.scale.min_side),
            format!("max_side = {}", self.scale.max_side),
            format!("cell_size = {}", self.cell_size),
            format!("gap = {}", self.gap),
            format!("pad = {}", self.pad),
            format!("gap_fill_side_max = {}", self.skyline.gap_fill_side_max),
            format!("bubble_passes = {}", self.tetris.bubble_passes),
            String::new(),
            "# Feed and animation".to_string(),
            format!("seed = {}", self.seed),
            format!("pool_size = {}", self.pool_size),
            format!("animation_ms = {}", self.animation_ms),
            format!("refresh_ms = {}", self.refresh_ms),
            String::new(),
            "# Key bindings: action = Key1, Key2 (Ctrl+/Alt+/Shift+ prefixes)".to_string(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/tx-tiles/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("tx-tiles").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn parse_overrides_and_clamps() {
        let text = "\
# comment
packer = treemap
gamma = 3.5
refresh_ms = 10
seed = 99
quit = Ctrl+x, q
";
        let (cfg, problems) = AppConfig::parse(text);
        assert!(problems.is_empty(), "{problems:?}");
        assert_eq!(cfg.packer, PackerKind::Treemap);
        assert_eq!(cfg.scale.gamma, 1.0);
        assert_eq!(cfg.refresh_ms, 250);
        assert_eq!(cfg.tetris.seed, 99);
        assert_eq!(
            cfg.bindings[&Action::Quit],
            vec![
                KeyBind::new(KeyCode::Char('x'), KeyModifiers::CONTROL),
                KeyBind::new(KeyCode::Char('q'), KeyModifiers::NONE),
            ]
        );
    }

    #[test]
    fn bad_lines_are_reported_and_skipped() {
        let (cfg, problems) = AppConfig::parse("packer = zigzag\nnonsense\ncolour = red\ngap = x\n");
        assert_eq!(cfg.packer, PackerKind::default());
        assert_eq!(
            problems,
            vec![
                ConfigError::InvalidValue {
                    line: 1,
                    key: "packer".into(),
                    value: "zigzag".into()
                },
                ConfigError::Malformed { line: 2 },
                ConfigError::UnknownKey {
                    line: 3,
                    key: "colour".into()
                },
                ConfigError::InvalidValue {
                    line: 4,
                    key: "gap".into(),
                    value: "x".into()
                },
            ]
        );
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut cfg = AppConfig::default();
        cfg.packer = PackerKind::Tetris;
        cfg.animation_ms = 900;
        cfg.bindings
            .insert(Action::Refresh, vec![KeyBind::new(KeyCode::F(5), KeyModifiers::NONE)]);
        let (back, problems) = AppConfig::parse(&cfg.serialise());
        assert!(problems.is_empty(), "{problems:?}");
        assert_eq!(back.packer, PackerKind::Tetris);
        assert_eq!(back.animation_ms, 900);
        assert_eq!(back.bindings, cfg.bindings);
    }

    #[test]
    fn keybind_parsing() {
        assert_eq!(
            KeyBind::parse("Shift+Tab"),
            Some(KeyBind::new(KeyCode::Tab, KeyModifiers::SHIFT))
        );
        assert_eq!(KeyBind::parse("F12"), Some(KeyBind::new(KeyCode::F(12), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("f"), Some(KeyBind::new(KeyCode::Char('f'), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("Hyper+q"), None);
        assert_eq!(KeyBind::parse("word"), None);
    }

    #[test]
    fn match_key_prefers_more_modifiers() {
        let mut cfg = AppConfig::default();
        cfg.bindings
            .insert(Action::Refresh, vec![KeyBind::new(KeyCode::Char('q'), KeyModifiers::CONTROL)]);
        assert_eq!(
            cfg.match_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Action::Refresh)
        );
        assert_eq!(cfg.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(Action::Quit));
        assert_eq!(cfg.match_key(key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }
}
