use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::platform;

/// Key bindings for one named keymap: action name to key name
/// (`KEY_UP`, `KEY_HOME`, … or a single character).
pub type KeymapTable = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub opml: OpmlConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub interface: InterfaceConfig,
    #[serde(default)]
    pub keymap: BTreeMap<String, KeymapTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpmlConfig {
    /// Root of the station directory — an https:// URL or a local path.
    #[serde(default = "default_root")]
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Player binary; receives the resolved stream location as its
    /// single argument.
    #[serde(default = "default_command")]
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Name of the `[keymap.<name>]` table to use.
    #[serde(default = "default_keymap")]
    pub keymap: String,
}

impl Default for OpmlConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
        }
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            keymap: default_keymap(),
        }
    }
}

fn default_root() -> String {
    "https://opml.radiotime.com/".to_string()
}

fn default_command() -> String {
    "mpv".to_string()
}

fn default_keymap() -> String {
    "default".to_string()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// The keymap table selected by `[interface] keymap`, if it exists
    /// in the config; callers fall back to built-in defaults per action.
    pub fn active_keymap(&self) -> Option<&KeymapTable> {
        self.keymap.get(&self.interface.keymap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.opml.root, "https://opml.radiotime.com/");
        assert_eq!(config.playback.command, "mpv");
        assert_eq!(config.interface.keymap, "default");
        assert!(config.active_keymap().is_none());
    }

    #[test]
    fn keymap_tables_parse_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [interface]
            keymap = "vi"

            [keymap.vi]
            up = "k"
            down = "j"
            "#,
        )
        .unwrap();
        let table = config.active_keymap().unwrap();
        assert_eq!(table["up"], "k");
        assert_eq!(table["down"], "j");
    }
}
