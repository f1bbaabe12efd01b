//! Runtime configuration.
//!
//! Values come from an optional TOML file layered under `CARELOG_*`
//! environment variables; anything unset falls back to the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("carelog.db") }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

impl ServerConfig {
  /// Load configuration from `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CARELOG"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_toml(contents: &str) -> PathBuf {
    let path = std::env::temp_dir()
      .join(format!("carelog-config-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn missing_file_gives_defaults() {
    let path = std::env::temp_dir()
      .join(format!("carelog-absent-{}.toml", uuid::Uuid::new_v4()));
    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("carelog.db"));
  }

  #[test]
  fn file_values_override_defaults() {
    let path = temp_toml("port = 9090\nstore_path = \"/var/lib/carelog/db\"\n");
    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 9090);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/carelog/db"));
    assert_eq!(cfg.host, "127.0.0.1");
  }

  #[test]
  fn absolute_paths_are_left_alone() {
    let p = Path::new("/srv/carelog.db");
    assert_eq!(expand_tilde(p), p.to_path_buf());
  }
}
