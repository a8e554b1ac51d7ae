//! Configuration types for the nightly status checker.
//!
//! The checker consumes three name lists (slots, platforms, projects) plus
//! the two nightly-site base URLs. Values come from `nightly-status.json`
//! in the working directory when present and fall back to the built-in
//! defaults otherwise; the CLI may override the name lists per invocation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CheckerError, Result};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "nightly-status.json";

/// Default slot names to check.
fn default_slots() -> Vec<String> {
    ["lhcb-sim10-dev", "lhcb-sim10", "lhcb-sim11"]
        .map(String::from)
        .to_vec()
}

/// Default platform names to check.
fn default_platforms() -> Vec<String> {
    [
        "x86_64_v2-centos7-gcc11-opt",
        "x86_64_v2-centos7-gcc11+detdesc-opt",
        "x86_64_v2-centos7-gcc11-dbg",
        "x86_64_v2-centos7-gcc12-opt",
        "x86_64_v2-centos7-gcc12+detdesc-opt",
        "x86_64_v2-el9-gcc12-opt",
    ]
    .map(String::from)
    .to_vec()
}

/// Default project names to check.
fn default_projects() -> Vec<String> {
    [
        "Gaudi",
        "Geant4",
        "Detector",
        "LHCb",
        "Run2Support",
        "GaussinoExtLibs",
        "Gaussino",
        "Gauss",
    ]
    .map(String::from)
    .to_vec()
}

/// Default index page. There is no way to get the list of build ids from
/// the API, so the main page is scraped instead.
fn default_main_page() -> String {
    "https://lhcb-nightlies.web.cern.ch/nightly/".to_string()
}

/// Default API base URL.
fn default_api_page() -> String {
    "https://lhcb-nightlies.web.cern.ch/api/v1/nightly".to_string()
}

/// Main configuration for the nightly status checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Nightly slot names to check.
    #[serde(default = "default_slots")]
    pub slots: Vec<String>,

    /// Platform names to include in result tables.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,

    /// Project names to include in result tables.
    #[serde(default = "default_projects")]
    pub projects: Vec<String>,

    /// Index page scraped for the latest build ids.
    #[serde(default = "default_main_page")]
    pub main_page: String,

    /// API base URL for per-build summary documents.
    #[serde(default = "default_api_page")]
    pub api_page: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slots: default_slots(),
            platforms: default_platforms(),
            projects: default_projects(),
            main_page: default_main_page(),
            api_page: default_api_page(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `nightly-status.json` in the current directory. If found,
    /// loads and validates the configuration; otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            CheckerError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_file(&current_dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `CheckerError::ConfigParse` if the file exists but contains
    /// invalid JSON, or `CheckerError::ConfigValidation` if the values are
    /// invalid (empty name lists or URLs).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(CheckerError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| CheckerError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `CheckerError::ConfigValidation` if any name list or URL
    /// is empty.
    pub fn validate(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(CheckerError::config_validation(
                "slots must not be empty",
                "List at least one nightly slot name in your nightly-status.json",
            ));
        }
        if self.platforms.is_empty() {
            return Err(CheckerError::config_validation(
                "platforms must not be empty",
                "List at least one platform name in your nightly-status.json",
            ));
        }
        if self.projects.is_empty() {
            return Err(CheckerError::config_validation(
                "projects must not be empty",
                "List at least one project name in your nightly-status.json",
            ));
        }
        if self.main_page.trim().is_empty() {
            return Err(CheckerError::config_validation(
                "mainPage must not be empty",
                "Provide the nightly index page URL in your nightly-status.json",
            ));
        }
        if self.api_page.trim().is_empty() {
            return Err(CheckerError::config_validation(
                "apiPage must not be empty",
                "Provide the nightly API base URL in your nightly-status.json",
            ));
        }
        Ok(())
    }

    /// Serializes the configuration to pretty-printed JSON, the format
    /// `mkconfig` writes to disk.
    ///
    /// # Errors
    ///
    /// Returns `CheckerError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
