//! Configuration system for apisift.
//!
//! Loads config from:
//! 1. Global: ~/.config/apisift/config.toml
//! 2. Per-project: .apisift/config.toml (overrides global)
//!
//! Command line flags override both.
//!
//! Example config.toml:
//! ```toml
//! [conditions]
//! ios = "26.."
//! macos = "15..26"
//!
//! [sdk]
//! platform = "ios"
//! ```

use apisift_filter::{Conditions, Platform};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// SDK configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SdkConfig {
    /// Platform SDK to open inside an Xcode bundle.
    pub platform: Option<Platform>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ApisiftConfig {
    /// Conditions used when none are given on the command line.
    pub conditions: Option<Conditions>,
    pub sdk: SdkConfig,
}

impl ApisiftConfig {
    /// Load configuration for a project rooted at `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_layers(Self::global_config_path().as_deref(), root)
    }

    /// Merge the global file (if any) with `root/.apisift/config.toml`.
    /// Missing files are skipped.
    pub fn load_layers(global: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(global_path) = global {
            if let Some(global) = Self::load_file(global_path)? {
                config = config.merge(global);
            }
        }

        let project_path = root.join(".apisift").join("config.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = config.merge(project);
        }

        Ok(config)
    }

    /// Get the global config path.
    pub fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(dirs::config_dir)?;
        Some(config_home.join("apisift").join("config.toml"))
    }

    /// Load config from a file path. A missing file is `Ok(None)`.
    pub fn load_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Merge another config into this one. Values set in `other` win; the
    /// conditions tables merge per platform.
    fn merge(self, other: Self) -> Self {
        let conditions = match (self.conditions, other.conditions) {
            (Some(mut base), Some(over)) => {
                base.extend(over.iter().map(|(platform, range)| (platform, range.clone())));
                Some(base)
            }
            (base, over) => over.or(base),
        };
        Self {
            conditions,
            sdk: SdkConfig {
                platform: other.sdk.platform.or(self.sdk.platform),
            },
        }
    }

    /// Conditions from the config, or empty ones.
    pub fn conditions(&self) -> Conditions {
        self.conditions.clone().unwrap_or_default()
    }

    pub fn sdk_platform(&self) -> Platform {
        self.sdk.platform.unwrap_or(Platform::Ios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apisift_filter::VersionRange;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "{content}").unwrap();
    }

    #[test]
    fn test_default_config() {
        let dir = TempDir::new().unwrap();
        let config = ApisiftConfig::load_layers(None, dir.path()).unwrap();
        assert_eq!(config, ApisiftConfig::default());
        assert!(config.conditions().is_empty());
        assert_eq!(config.sdk_platform(), Platform::Ios);
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".apisift").join("config.toml"),
            r#"
[conditions]
ios = "26.."

[sdk]
platform = "visionOS"
"#,
        );

        let config = ApisiftConfig::load_layers(None, dir.path()).unwrap();
        assert_eq!(
            config.conditions().get(Platform::Ios),
            Some(&VersionRange::at_least("26"))
        );
        assert_eq!(config.sdk_platform(), Platform::Visionos);
    }

    #[test]
    fn test_project_overrides_global_per_key() {
        let global = TempDir::new().unwrap();
        let global_path = global.path().join("config.toml");
        write_config(
            &global_path,
            r#"
[conditions]
ios = "18.."
macos = "15.."

[sdk]
platform = "macos"
"#,
        );
        let project = TempDir::new().unwrap();
        write_config(
            &project.path().join(".apisift").join("config.toml"),
            r#"
[conditions]
ios = "26..27"
"#,
        );

        let config = ApisiftConfig::load_layers(Some(&global_path), project.path()).unwrap();
        let conditions = config.conditions();
        assert_eq!(
            conditions.get(Platform::Ios),
            Some(&VersionRange::new("26", "27"))
        );
        assert_eq!(
            conditions.get(Platform::Macos),
            Some(&VersionRange::at_least("15"))
        );
        assert_eq!(config.sdk_platform(), Platform::Macos);
    }

    #[test]
    fn test_invalid_config_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".apisift").join("config.toml");
        write_config(&path, "[conditions]\nandroid = \"1..\"");

        let err = ApisiftConfig::load_layers(None, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"), "{err}");

        write_config(&path, "[conditions]\nios = \"..\"");
        assert!(ApisiftConfig::load_layers(None, dir.path()).is_err());

        write_config(&path, "[sdk]\nplatfrom = \"ios\"");
        assert!(ApisiftConfig::load_layers(None, dir.path()).is_err());
    }
}
