//! Translation preference loading and parsing.
//!
//! Parses the `[translation]` section of a TOML preferences file into the
//! two flags the engine caches on, plus the path of the contraction table to
//! hand to the table-loading collaborator. Unknown fields are ignored (TOML
//! deserialization tolerance) so the file can grow without breaking older
//! builds; a missing or unparsable file degrades to defaults rather than
//! failing startup.

use anyhow::Result;
use core_table::{CapitalizationMode, Prefs};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CapitalizationSetting {
    /// Fold uppercase letters to their lowercase cells.
    Fold,
    /// Emit an explicit capital-indicator cell (when the table defines one).
    #[default]
    Sign,
}

impl From<CapitalizationSetting> for CapitalizationMode {
    fn from(setting: CapitalizationSetting) -> Self {
        match setting {
            CapitalizationSetting::Fold => CapitalizationMode::Fold,
            CapitalizationSetting::Sign => CapitalizationMode::Sign,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "TranslationConfig::default_expand_current_word")]
    pub expand_current_word: bool,
    #[serde(default)]
    pub capitalization: CapitalizationSetting,
    /// Contraction table file for the (out-of-scope) table loader.
    #[serde(default)]
    pub table: Option<PathBuf>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            expand_current_word: Self::default_expand_current_word(),
            capitalization: CapitalizationSetting::default(),
            table: None,
        }
    }
}

impl TranslationConfig {
    const fn default_expand_current_word() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Original file string, kept for diagnostics.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl Config {
    /// The engine-facing preference flags.
    pub fn prefs(&self) -> Prefs {
        Prefs {
            expand_current_word: self.file.translation.expand_current_word,
            capitalization: self.file.translation.capitalization.into(),
        }
    }

    pub fn table_path(&self) -> Option<&PathBuf> {
        self.file.translation.table.as_ref()
    }
}

/// Load preferences from `path`. Missing file or parse error falls back to
/// defaults; the parse error is logged, never propagated.
pub fn load_from(path: &std::path::Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "preferences loaded");
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                warn!(
                    target: "config",
                    path = %path.display(),
                    error = %e,
                    "preferences unparsable; using defaults"
                );
                Ok(Config::default())
            }
        },
        Err(_) => {
            info!(target: "config", path = %path.display(), "no preferences file; using defaults");
            Ok(Config::default())
        }
    }
}
