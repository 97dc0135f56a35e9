use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::constants::constants;

/// String key-value persistence, the only capability the explorer needs from storage.
pub trait KeyValueStore {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Preferences backed by a flat TOML table in the platform config dir (`prefs.toml`).
#[derive(Debug, Default)]
pub struct PrefsStore {
  path: Option<PathBuf>,
  values: BTreeMap<String, String>,
}

impl PrefsStore {
  /// Open the per-user preferences file. A missing or unreadable file yields an empty store.
  pub fn load() -> Self {
    match ProjectDirs::from("", "", "ytchan") {
      Some(proj_dirs) => Self::open(proj_dirs.config_dir().join("prefs.toml")),
      None => {
        warn!("prefs: no home directory, preferences will not persist");
        Self::default()
      }
    }
  }

  pub fn open(path: PathBuf) -> Self {
    let values = std::fs::read_to_string(&path)
      .ok()
      .and_then(|content| match toml::from_str::<BTreeMap<String, String>>(&content) {
        Ok(values) => Some(values),
        Err(e) => {
          warn!(path = %path.display(), err = %e, "prefs: ignoring malformed preferences file");
          None
        }
      })
      .unwrap_or_default();
    Self { path: Some(path), values }
  }

  fn save(&self) -> Result<()> {
    let Some(path) = &self.path else { return Ok(()) };
    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml::to_string(&self.values).context("Failed to serialize preferences")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "prefs: saved");
    Ok(())
  }
}

impl KeyValueStore for PrefsStore {
  fn get(&self, key: &str) -> Option<String> {
    self.values.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    if self.values.get(key).map(String::as_str) == Some(value) {
      return Ok(());
    }
    self.values.insert(key.to_string(), value.to_string());
    self.save()
  }
}

// --- Credential ---

/// Read the stored API key, or an empty string when none was saved.
pub fn load_api_key(store: &impl KeyValueStore) -> String {
  store.get(&constants().api_key_entry).unwrap_or_default()
}

/// Mirror a changed API key to the store. Empty keys are never written, so
/// clearing the field keeps the previously saved key on disk.
pub fn persist_api_key(store: &mut impl KeyValueStore, key: &str) -> Result<()> {
  if key.is_empty() {
    return Ok(());
  }
  store.set(&constants().api_key_entry, key).context("Failed to save API key")
}

#[cfg(test)]
pub(crate) mod testing {
  use super::*;
  use std::collections::HashMap;

  /// In-memory store that records every write.
  #[derive(Default)]
  pub(crate) struct MemoryStore {
    pub(crate) values: HashMap<String, String>,
    pub(crate) writes: usize,
  }

  impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
      self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
      self.writes += 1;
      self.values.insert(key.to_string(), value.to_string());
      Ok(())
    }
  }
}
