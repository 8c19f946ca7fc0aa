//! Theme Preference
//!
//! The only piece of client-local durable state: light or dark. It is read
//! once on load, applied as the `data-theme` document attribute and written
//! back whenever the toggle changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Key the preference is stored under
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Theme selected by the toggle's checked state
    pub fn from_toggle(checked: bool) -> Self {
        if checked {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Document-level attribute carrying the theme
    pub fn document_attribute(&self) -> (&'static str, &'static str) {
        ("data-theme", self.as_str())
    }

    /// Colours the chart axes and legend use under this theme
    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                text_primary: "#000000",
                text_secondary: "#666666",
                border: "#e0e0e0",
            },
            Theme::Dark => Palette {
                text_primary: "#ffffff",
                text_secondary: "#aaaaaa",
                border: "#333333",
            },
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ThemeError::Unknown(other.to_string())),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme-dependent colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Unknown theme: {0}")]
    Unknown(String),

    #[error("Failed to access theme file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse theme file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Durable client-local key-value storage for the theme
pub trait ThemeStore: Send + Sync {
    /// Stored theme, if any
    fn load(&self) -> Result<Option<Theme>, ThemeError>;
    fn save(&self, theme: Theme) -> Result<(), ThemeError>;
}

/// Volatile store, for tests and sessions without a writable config dir
#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    value: Mutex<Option<Theme>>,
}

impl MemoryThemeStore {
    pub fn with(theme: Theme) -> Self {
        Self {
            value: Mutex::new(Some(theme)),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Result<Option<Theme>, ThemeError> {
        Ok(*self.value.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(theme);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default)]
    theme: Option<Theme>,
}

/// TOML file store (`theme = "dark"`)
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/garaj-admin/preferences.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("garaj-admin").join("preferences.toml"))
            .unwrap_or_else(|| PathBuf::from("./garaj-admin-preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, e: std::io::Error) -> ThemeError {
        ThemeError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        }
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Result<Option<Theme>, ThemeError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };

        let prefs: Preferences = toml::from_str(&content).map_err(|e| ThemeError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        Ok(prefs.theme)
    }

    fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let prefs = Preferences { theme: Some(theme) };
        let content = toml::to_string(&prefs).map_err(|e| ThemeError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        std::fs::write(&self.path, content).map_err(|e| self.io_err(e))
    }
}

/// Read the stored theme, falling back to light on a missing or broken store
pub fn load_or_default(store: &dyn ThemeStore) -> Theme {
    match store.load() {
        Ok(theme) => theme.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to load {} preference: {}", THEME_KEY, e);
            Theme::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_toggle_and_attribute() {
        assert_eq!(Theme::from_toggle(true), Theme::Dark);
        assert_eq!(Theme::from_toggle(false), Theme::Light);
        assert_eq!(Theme::Dark.document_attribute(), ("data-theme", "dark"));
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }

    #[test]
    fn test_file_store_roundtrip_and_missing_file() {
        let dir = tempdir().unwrap();
        let store = FileThemeStore::new(dir.path().join("nested").join("prefs.toml"));

        assert_eq!(store.load().unwrap(), None);
        assert_eq!(load_or_default(&store), Theme::Light);

        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_light() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "theme = [").unwrap();

        let store = FileThemeStore::new(&path);
        assert!(matches!(store.load(), Err(ThemeError::Parse { .. })));
        assert_eq!(load_or_default(&store), Theme::Light);
    }
}
