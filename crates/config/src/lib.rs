//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults.
//! 2. `config.toml`, `config.yaml` and `config.json` in the user's config
//!    directory (e.g. `~/.config/tome/` on Linux).
//! 3. An explicit file given on the command line.
//! 4. `TOME_*` environment variables, with `__` separating nested keys:
//!    `TOME_REMOTE__API_KEY`, `TOME_LOCATOR__PATCH_SIZE=medium`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
pub use tome_codec::{Locator, PatchSize};

const ENV_PREFIX: &str = "TOME_";
const CONFIG_STEM: &str = "config";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub locator: Locator,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: data_dir().join("catalog.sqlite"), max_connections: 5 }
    }
}

/// Where rendered code images are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: data_dir().join("codes") }
    }
}

/// The remote bibliographic source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: tome_fetch::DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: tome_fetch::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tome")
}

fn data_dir() -> PathBuf {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_default()
}

/// Merges a file provider chosen by extension; TOML when there is none.
fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}

impl Config {
    /// The full provider stack, without extracting.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dirs) = project_dirs() {
            for ext in ["toml", "yaml", "json"] {
                let path = dirs.config_dir().join(format!("{CONFIG_STEM}.{ext}"));
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "merging user config");
                    figment = merge_file(figment, &path);
                }
            }
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::MissingFile(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "merging explicit config");
            figment = merge_file(figment, path);
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(explicit)?)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database.path"));
        }
        if self.database.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid("database.max_connections"));
        }
        if self.storage.root.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("storage.root"));
        }
        if !(self.remote.endpoint.starts_with("http://") || self.remote.endpoint.starts_with("https://")) {
            exn::bail!(ErrorKind::Invalid("remote.endpoint"));
        }
        if self.remote.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("remote.timeout_secs"));
        }
        if self.locator.max_dimension < 64 {
            exn::bail!(ErrorKind::Invalid("locator.max_dimension"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(None).unwrap();
            assert_eq!(config.database.max_connections, 5);
            assert_eq!(config.remote.timeout(), tome_fetch::DEFAULT_TIMEOUT);
            assert_eq!(config.remote.endpoint, tome_fetch::DEFAULT_ENDPOINT);
            assert_eq!(config.remote.api_key, None);
            assert_eq!(config.locator, Locator::default());
            assert!(config.locator.half_sample);
            assert_eq!(config.locator.patch_size, PatchSize::XLarge);
            Ok(())
        });
    }

    #[rstest]
    #[case(
        "tome.toml",
        "[remote]\napi_key = \"abc\"\n[locator]\npatch_size = \"medium\"\nhalf_sample = false\n"
    )]
    #[case("tome.yaml", "remote:\n  api_key: abc\nlocator:\n  patch_size: medium\n  half_sample: false\n")]
    #[case("tome.json", r#"{"remote": {"api_key": "abc"}, "locator": {"patch_size": "medium", "half_sample": false}}"#)]
    fn test_explicit_file(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::load(Some(Path::new(name))).unwrap();
            assert_eq!(config.remote.api_key.as_deref(), Some("abc"));
            assert_eq!(config.locator.patch_size, PatchSize::Medium);
            assert!(!config.locator.half_sample);
            // Untouched values keep their defaults.
            assert_eq!(config.locator.max_dimension, 1600);
            assert_eq!(config.remote.timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("tome.toml", "[remote]\ntimeout_secs = 30\n[database]\nmax_connections = 2\n")?;
            jail.set_env("TOME_REMOTE__TIMEOUT_SECS", "3");
            jail.set_env("TOME_LOCATOR__PATCH_SIZE", "x-small");
            let config = Config::load(Some(Path::new("tome.toml"))).unwrap();
            assert_eq!(config.remote.timeout_secs, 3);
            assert_eq!(config.database.max_connections, 2);
            assert_eq!(config.locator.patch_size, PatchSize::XSmall);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = Config::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::MissingFile(_)));
            Ok(())
        });
    }

    #[test]
    fn test_unparseable_value() {
        Jail::expect_with(|jail| {
            jail.set_env("TOME_LOCATOR__PATCH_SIZE", "enormous");
            let err = Config::load(None).unwrap_err();
            assert_eq!(*err, ErrorKind::Load);
            Ok(())
        });
    }

    #[rstest]
    #[case("TOME_DATABASE__MAX_CONNECTIONS", "0", "database.max_connections")]
    #[case("TOME_REMOTE__TIMEOUT_SECS", "0", "remote.timeout_secs")]
    #[case("TOME_REMOTE__ENDPOINT", "ftp://example.com", "remote.endpoint")]
    #[case("TOME_LOCATOR__MAX_DIMENSION", "10", "locator.max_dimension")]
    fn test_validation(#[case] var: &str, #[case] value: &str, #[case] field: &str) {
        Jail::expect_with(|jail| {
            jail.set_env(var, value);
            let err = Config::load(None).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(f) if *f == field));
            Ok(())
        });
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_user_config_dir() {
        Jail::expect_with(|jail| {
            let home = jail.directory().to_path_buf();
            jail.set_env("XDG_CONFIG_HOME", home.join("xdg").display());
            std::fs::create_dir_all(home.join("xdg/tome")).unwrap();
            jail.create_file("xdg/tome/config.yaml", "storage:\n  root: /srv/codes\n")?;
            let config = Config::load(None).unwrap();
            assert_eq!(config.storage.root, PathBuf::from("/srv/codes"));
            Ok(())
        });
    }
}
