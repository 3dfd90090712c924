//! Settings infrastructure for runlens.
//!
//! Settings come from two places: a `runlens.toml` file discovered from the
//! workspace root, and the client's configuration (`initializationOptions` and
//! `workspace/didChangeConfiguration`). Client values win field by field.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::runners::{RunnerDef, RunnerRegistry};

/// Name of the settings file looked up around the workspace root.
pub const SETTINGS_FILE: &str = "runlens.toml";

/// Key the client nests runlens configuration under, if any.
pub const CLIENT_SECTION: &str = "runlens";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid client configuration: {0}")]
    Client(#[from] serde_json::Error),
}

/// Root settings structure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Publish run code lenses. Detection itself is unaffected.
    pub show_code_lens: bool,

    /// Keep one shell alive and send every run to it.
    pub reuse_executor: bool,

    /// Shell program blocks are run through.
    pub shell: String,

    /// Runner overrides keyed by canonical language identifier.
    /// Each entry replaces the built-in runner of the same key entirely.
    pub runners: HashMap<String, RunnerDef>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_code_lens: true,
            reuse_executor: true,
            shell: "sh".to_string(),
            runners: HashMap::new(),
        }
    }
}

impl Settings {
    /// Registry snapshot: built-in runners with this settings' overrides applied.
    pub fn registry(&self) -> RunnerRegistry {
        RunnerRegistry::snapshot(&self.runners)
    }

    /// Apply client-supplied values on top of these settings.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(show) = patch.show_code_lens {
            self.show_code_lens = show;
        }
        if let Some(reuse) = patch.reuse_executor {
            self.reuse_executor = reuse;
        }
        if let Some(shell) = patch.shell {
            self.shell = shell;
        }
        if let Some(runners) = patch.runners {
            self.runners.extend(runners);
        }
    }

    /// These settings with `patch` applied.
    pub fn with_patch(mut self, patch: SettingsPatch) -> Self {
        self.apply(patch);
        self
    }
}

/// Partial settings sent by the client. Absent fields leave settings untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(alias = "show_code_lens")]
    pub show_code_lens: Option<bool>,
    #[serde(alias = "reuse_executor")]
    pub reuse_executor: Option<bool>,
    pub shell: Option<String>,
    pub runners: Option<HashMap<String, RunnerDef>>,
}

impl SettingsPatch {
    /// Parse client configuration.
    ///
    /// Accepts either the runlens object itself or an object with it under a
    /// `runlens` key. `null` is an empty patch.
    pub fn from_client_value(value: &serde_json::Value) -> Result<Self, SettingsError> {
        let section = value.get(CLIENT_SECTION).unwrap_or(value);
        if section.is_null() {
            return Ok(Self::default());
        }
        Ok(Self::deserialize(section)?)
    }
}

/// Load settings from a file, reporting why it failed.
pub fn try_load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings from a file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match try_load_settings(path) {
        Ok(settings) => settings,
        Err(SettingsError::Read { .. }) => Settings::default(),
        Err(e) => {
            tracing::warn!("{e}; using default settings");
            Settings::default()
        }
    }
}

/// Discover the settings file by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found file. If not found, returns
/// `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            tracing::info!(path = %candidate.display(), "loading settings");
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join(SETTINGS_FILE);
                if candidate.is_file() {
                    tracing::info!(path = %candidate.display(), "loading settings");
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}
