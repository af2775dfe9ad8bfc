use crate::core::PreferenceStore;
use crate::domain::model::Theme;
use crate::utils::error::{AssessmentError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const UI_SCOPE: &str = "ui";
pub const THEME_KEY: &str = "theme";

/// Preferences persisted as a flat TOML table of strings.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| AssessmentError::ConfigValidationError {
                field: path.display().to_string(),
                message: format!("TOML parsing error: {}", e),
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string(&self.values).map_err(|e| AssessmentError::ConfigError {
            message: format!("could not serialize preferences: {}", e),
        })?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Prefixes every key with `scope.` so unrelated settings can share one store.
pub struct ScopedPreferences<'a, P: PreferenceStore> {
    store: &'a mut P,
    scope: String,
}

impl<'a, P: PreferenceStore> ScopedPreferences<'a, P> {
    pub fn new(store: &'a mut P, scope: &str) -> Self {
        Self {
            store,
            scope: scope.to_string(),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}.{}", self.scope, key)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.get(&self.scoped(key))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = self.scoped(key);
        self.store.set(&key, value)
    }

    /// Stored theme; unknown values fall back to the default.
    pub fn theme(&self) -> Result<Theme> {
        Ok(match self.get(THEME_KEY)? {
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring unknown theme preference '{}'", value);
                Theme::default()
            }),
            None => Theme::default(),
        })
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.set(THEME_KEY, theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.toml");

        let mut store = FilePreferenceStore::open(&path).unwrap();
        assert_eq!(store.get("ui.theme").unwrap(), None);
        store.set("ui.theme", "dark").unwrap();
        assert!(path.exists());

        let reopened = FilePreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get("ui.theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");

        let mut store = FilePreferenceStore::open(&path).unwrap();
        store.set("ui.theme", "dark").unwrap();
        store.remove("ui.theme").unwrap();

        let reopened = FilePreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get("ui.theme").unwrap(), None);
    }

    #[test]
    fn test_scoped_theme_defaults_to_light() {
        let mut store = MemoryPreferenceStore::default();
        let mut prefs = ScopedPreferences::new(&mut store, UI_SCOPE);
        assert_eq!(prefs.theme().unwrap(), Theme::Light);

        prefs.set_theme(Theme::Dark).unwrap();
        assert_eq!(prefs.theme().unwrap(), Theme::Dark);
        assert_eq!(store.get("ui.theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let mut store = MemoryPreferenceStore::default();
        store.set("ui.theme", "sepia").unwrap();
        let prefs = ScopedPreferences::new(&mut store, UI_SCOPE);
        assert_eq!(prefs.theme().unwrap(), Theme::Light);
    }
}
