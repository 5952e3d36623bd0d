//! Loader configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PdftextError;

/// Environment variable overriding [`LoaderConfig::primary_library`].
pub const PRIMARY_LIBRARY_ENV: &str = "PDFTEXT_PDFIUM_LIBRARY";

/// Environment variable overriding [`LoaderConfig::fallback_library`].
pub const FALLBACK_LIBRARY_ENV: &str = "PDFTEXT_PDFIUM_FALLBACK";

/// Which shared libraries the loader tries, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Library name or path tried first.
    pub primary_library: String,

    /// Library name or path tried when the primary fails to open.
    pub fallback_library: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            primary_library: "libpdfium.so".to_string(),
            fallback_library: "libjniPdfium.so".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, PdftextError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| PdftextError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), PdftextError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| PdftextError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `PDFTEXT_PDFIUM_LIBRARY` / `PDFTEXT_PDFIUM_FALLBACK` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(PRIMARY_LIBRARY_ENV).ok(),
            std::env::var(FALLBACK_LIBRARY_ENV).ok(),
        )
    }

    /// Replace library names with the given values, ignoring empty ones.
    pub fn with_overrides(mut self, primary: Option<String>, fallback: Option<String>) -> Self {
        if let Some(primary) = primary.filter(|s| !s.is_empty()) {
            self.primary_library = primary;
        }
        if let Some(fallback) = fallback.filter(|s| !s.is_empty()) {
            self.fallback_library = fallback;
        }
        self
    }
}
