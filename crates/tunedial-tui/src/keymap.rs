//! Key bindings: config key names to navigation actions.
//!
//! Names follow the classic curses convention (`KEY_UP`, `KEY_NPAGE`,
//! …) so existing configs keep working; anything else is taken as a
//! single character. Unknown names fall back to the built-in default
//! for that action.

use std::collections::HashMap;

use ratatui::crossterm::event::KeyCode;
use tracing::warn;
use tunedial_opml::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    PageUp,
    PageDown,
    Start,
    End,
    Left,
    Right,
    Enter,
    Stop,
    Favourite,
    Exit,
}

const DEFAULTS: &[(Action, &str, &str)] = &[
    (Action::Up, "up", "KEY_UP"),
    (Action::Down, "down", "KEY_DOWN"),
    (Action::Start, "start", "KEY_HOME"),
    (Action::End, "end", "KEY_END"),
    (Action::PageUp, "pageup", "KEY_PPAGE"),
    (Action::PageDown, "pagedown", "KEY_NPAGE"),
    (Action::Enter, "enter", "KEY_ENTER"),
    (Action::Stop, "stop", "k"),
    (Action::Exit, "exit", "q"),
    (Action::Favourite, "favourite", "f"),
    (Action::Left, "left", "KEY_LEFT"),
    (Action::Right, "right", "KEY_RIGHT"),
];

pub struct Keymap {
    bindings: HashMap<KeyCode, Action>,
}

impl Keymap {
    pub fn from_config(config: &Config) -> Self {
        let table = config.active_keymap();
        let mut bindings = HashMap::new();
        for &(action, name, default_key) in DEFAULTS {
            let configured = table.and_then(|t| t.get(name)).map(String::as_str);
            let code = configured
                .and_then(|key| {
                    let code = parse_key(key);
                    if code.is_none() {
                        warn!("unknown key name {key:?} for action {name:?}, using default");
                    }
                    code
                })
                .or_else(|| parse_key(default_key));
            if let Some(code) = code {
                bindings.insert(code, action);
            }
        }
        Self { bindings }
    }

    pub fn lookup(&self, code: KeyCode) -> Option<Action> {
        // Enter arrives as KeyCode::Enter regardless of binding name.
        self.bindings.get(&code).copied()
    }
}

fn parse_key(name: &str) -> Option<KeyCode> {
    match name {
        "KEY_UP" => Some(KeyCode::Up),
        "KEY_DOWN" => Some(KeyCode::Down),
        "KEY_LEFT" => Some(KeyCode::Left),
        "KEY_RIGHT" => Some(KeyCode::Right),
        "KEY_HOME" => Some(KeyCode::Home),
        "KEY_END" => Some(KeyCode::End),
        "KEY_PPAGE" => Some(KeyCode::PageUp),
        "KEY_NPAGE" => Some(KeyCode::PageDown),
        "KEY_ENTER" => Some(KeyCode::Enter),
        single => {
            let mut chars = single.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_all_actions() {
        let keymap = Keymap::from_config(&Config::default());
        assert_eq!(keymap.lookup(KeyCode::Up), Some(Action::Up));
        assert_eq!(keymap.lookup(KeyCode::PageDown), Some(Action::PageDown));
        assert_eq!(keymap.lookup(KeyCode::Enter), Some(Action::Enter));
        assert_eq!(keymap.lookup(KeyCode::Char('q')), Some(Action::Exit));
        assert_eq!(keymap.lookup(KeyCode::Char('f')), Some(Action::Favourite));
        assert_eq!(keymap.lookup(KeyCode::Char('x')), None);
    }

    #[test]
    fn config_overrides_replace_defaults() {
        let config: Config = toml::from_str(
            r#"
            [interface]
            keymap = "vi"

            [keymap.vi]
            up = "k"
            down = "j"
            stop = "K"
            "#,
        )
        .unwrap();
        let keymap = Keymap::from_config(&config);
        assert_eq!(keymap.lookup(KeyCode::Char('k')), Some(Action::Up));
        assert_eq!(keymap.lookup(KeyCode::Char('j')), Some(Action::Down));
        assert_eq!(keymap.lookup(KeyCode::Char('K')), Some(Action::Stop));
        // Actions the table doesn't mention keep their defaults.
        assert_eq!(keymap.lookup(KeyCode::Char('q')), Some(Action::Exit));
    }

    #[test]
    fn bad_key_name_falls_back_to_default() {
        let config: Config = toml::from_str(
            r#"
            [keymap.default]
            up = "KEY_BOGUS"
            "#,
        )
        .unwrap();
        let keymap = Keymap::from_config(&config);
        assert_eq!(keymap.lookup(KeyCode::Up), Some(Action::Up));
    }
}
