use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Undo history tuning, the `[history]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_undo_levels: usize,
    pub grouping_window_ms: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_undo_levels: 100,
            grouping_window_ms: 500,
        }
    }
}

/// Wiki-link autocomplete, the `[wikilink]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiLinkSettings {
    /// Most suggestions shown for one query
    pub result_limit: usize,
}

impl Default for WikiLinkSettings {
    fn default() -> Self {
        Self { result_limit: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub notes_path: PathBuf,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub wikilink: WikiLinkSettings,
}

impl Config {
    pub fn new(notes_path: impl Into<PathBuf>) -> Self {
        Self {
            notes_path: notes_path.into(),
            history: HistorySettings::default(),
            wikilink: WikiLinkSettings::default(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded notes path
        config.notes_path = Self::expand_path(&config.notes_path).unwrap_or(config.notes_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blockpad");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        shellexpand::full(&path_str)
            .ok()
            .map(|expanded| PathBuf::from(expanded.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, content).unwrap();
        (temp_dir, config_file)
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/blockpad/config.toml"));
    }

    #[test]
    fn test_missing_tables_use_defaults() {
        let (_dir, config_file) = write_config("notes_path = \"/tmp/notes\"\n");

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config, Config::new("/tmp/notes"));
        assert_eq!(config.history.max_undo_levels, 100);
        assert_eq!(config.history.grouping_window_ms, 500);
        assert_eq!(config.wikilink.result_limit, 20);
    }

    #[test]
    fn test_partial_tables_fill_in_defaults() {
        let (_dir, config_file) = write_config(
            r#"
notes_path = "/tmp/notes"

[history]
grouping_window_ms = 250

[wikilink]
result_limit = 5
"#,
        );

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.history,
            HistorySettings {
                max_undo_levels: 100,
                grouping_window_ms: 250,
            }
        );
        assert_eq!(config.wikilink.result_limit, 5);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let (_dir, config_file) = write_config("notes_path = [not toml");

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        unsafe {
            env::set_var("BLOCKPAD_TEST_NOTES_ROOT", "/custom/notes");
        }
        let (_dir, config_file) =
            write_config("notes_path = \"$BLOCKPAD_TEST_NOTES_ROOT/my-notes\"\n");

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.notes_path, PathBuf::from("/custom/notes/my-notes"));
        unsafe {
            env::remove_var("BLOCKPAD_TEST_NOTES_ROOT");
        }
    }

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        for path in ["/absolute/path", "relative/path"] {
            assert_eq!(Config::expand_path(Path::new(path)), Some(PathBuf::from(path)));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        assert!(Config::load_from_path(&non_existent_config).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut config = Config::new("/tmp/test-notes");
        config.history.max_undo_levels = 42;

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }
}
