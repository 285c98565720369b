//! Configuration for meaning-tree tools.
//!
//! Loads config from:
//! 1. Global: ~/.config/meaning-tree/config.toml
//! 2. Per-project: .meaning-tree/config.toml (overrides global)
//!
//! Example config.toml:
//! ```toml
//! [tokenizer]
//! navigable = true
//! skip_preparations = false
//!
//! [ids]
//! seed = 1000
//! ```

use meaning_tree::IdAllocator;
use meaning_tree_tokens::TokenizerOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tokenizer configuration. Unset keys fall through to the next layer.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Emit whitespace and newline pseudo tokens.
    pub navigable: Option<bool>,
    /// Parse source exactly as given.
    pub skip_preparations: Option<bool>,
}

/// Id allocation configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct IdsConfig {
    /// First id handed out by a fresh allocator.
    pub seed: Option<u64>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub tokenizer: TokenizerConfig,
    pub ids: IdsConfig,
}

impl Config {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/meaning-tree/config.toml,
    /// then merges with per-project config from .meaning-tree/config.toml.
    pub fn load(root: &Path) -> Self {
        Self::load_layers(Self::global_config_path().as_deref(), root)
    }

    /// Load an explicit global file (if any) and the project config under `root`.
    pub fn load_layers(global: Option<&Path>, root: &Path) -> Self {
        let mut config = Self::default();

        if let Some(global) = global.and_then(Self::load_file) {
            config = config.merge(global);
        }

        let project_path = root.join(".meaning-tree").join("config.toml");
        if let Some(project) = Self::load_file(&project_path) {
            config = config.merge(project);
        }

        config
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("meaning-tree").join("config.toml"))
    }

    /// Load config from a file path. Missing or malformed files yield `None`.
    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                debug!(path = %path.display(), %err, "ignoring malformed config");
                None
            }
        }
    }

    /// Merge another config into this one; keys set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            tokenizer: TokenizerConfig {
                navigable: other.tokenizer.navigable.or(self.tokenizer.navigable),
                skip_preparations: other
                    .tokenizer
                    .skip_preparations
                    .or(self.tokenizer.skip_preparations),
            },
            ids: IdsConfig {
                seed: other.ids.seed.or(self.ids.seed),
            },
        }
    }

    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            navigable: self.tokenizer.navigable.unwrap_or(false),
            skip_preparations: self.tokenizer.skip_preparations.unwrap_or(false),
        }
    }

    pub fn allocator(&self) -> IdAllocator {
        IdAllocator::with_seed(self.ids.seed.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "{body}").unwrap();
    }

    #[test]
    fn test_default_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_layers(None, dir.path());
        assert_eq!(config, Config::default());
        assert_eq!(config.tokenizer_options(), TokenizerOptions::default());
        assert_eq!(config.allocator().next_node_id().0, 0);
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".meaning-tree").join("config.toml"),
            r#"
[tokenizer]
navigable = true

[ids]
seed = 500
"#,
        );

        let config = Config::load_layers(None, dir.path());
        let options = config.tokenizer_options();
        assert!(options.navigable);
        assert!(!options.skip_preparations);
        assert_eq!(config.allocator().next_token_id().0, 500);
    }

    #[test]
    fn test_project_overrides_only_keys_it_sets() {
        let global_dir = TempDir::new().unwrap();
        let global = global_dir.path().join("config.toml");
        write_config(
            &global,
            r#"
[tokenizer]
navigable = true
skip_preparations = true
"#,
        );

        let project = TempDir::new().unwrap();
        write_config(
            &project.path().join(".meaning-tree").join("config.toml"),
            r#"
[tokenizer]
skip_preparations = false
"#,
        );

        let options = Config::load_layers(Some(&global), project.path()).tokenizer_options();
        assert!(options.navigable);
        assert!(!options.skip_preparations);
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".meaning-tree").join("config.toml"),
            "[ids]\nseed = \"lots\"",
        );

        assert_eq!(Config::load_layers(None, dir.path()), Config::default());
    }
}
