//! User configuration
//!
//! Everything lives in `$XDG_CONFIG_HOME/proslenkey` (or
//! `~/.config/proslenkey`):
//!
//! - `style.css`: optional stylesheet overlay for the window. Only located
//!   here, applying it is up to the toolkit front end.
//! - `config.toml`: optional settings. A missing file means defaults.
//!
//! ```toml
//! max_suggestions = 20
//! case_sensitive = false
//! exclude = ["*.so", "x86_64-*"]
//! ```

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::matcher::{CaseMode, Matcher};
use crate::scanner::compile_exclusions;
use crate::types::{APP_NAME, DEFAULT_SUGGESTIONS, MAX_SUGGESTIONS_LIMIT};

/// Stylesheet overlay file name
pub const CSS_FILE: &str = "style.css";

/// Settings file name
pub const CONFIG_FILE: &str = "config.toml";

/// Launcher settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of suggestions shown at once
    pub max_suggestions: usize,
    /// Compare characters exactly when matching
    pub case_sensitive:  bool,
    /// Glob patterns for executable names to hide
    pub exclude:         Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_suggestions: DEFAULT_SUGGESTIONS, case_sensitive: false, exclude: Vec::new() }
    }
}

/// The configuration directory for the current user
///
/// Returns `None` when neither `XDG_CONFIG_HOME` nor a home directory is
/// available.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
}

/// Resolve the configuration directory from `XDG_CONFIG_HOME` and `HOME`
///
/// Per the XDG base directory rules, a relative or empty `XDG_CONFIG_HOME` is
/// ignored.
#[must_use]
pub fn config_dir_from(
    xdg_config_home: Option<OsString>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    let base = xdg_config_home
        .map(PathBuf::from)
        .filter(|path| path.is_absolute())
        .or_else(|| home.map(|home| home.join(".config")))?;
    Some(base.join(APP_NAME))
}

/// The stylesheet overlay in `dir`, if present
#[must_use]
pub fn stylesheet_in(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CSS_FILE);
    path.is_file().then_some(path)
}

/// The user's stylesheet overlay, if present
#[must_use]
pub fn stylesheet() -> Option<PathBuf> {
    config_dir().and_then(|dir| stylesheet_in(&dir))
}

impl Config {
    /// Load `config.toml` from the user's configuration directory
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or is invalid.
    pub fn load() -> Result<Self> {
        match config_dir() {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`, falling back to defaults if it is missing
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            },
            Err(e) => {
                return Err(Error::config(&format!("Failed to read {}: {e}", path.display())));
            },
        };
        Self::parse(&content)
    }

    /// Parse and validate settings from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML, has unknown keys, or
    /// fails validation.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.message()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and exclusion patterns
    ///
    /// # Errors
    /// Returns error if `max_suggestions` is out of range or a pattern is
    /// invalid.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SUGGESTIONS_LIMIT).contains(&self.max_suggestions) {
            return Err(Error::config(&format!(
                "max_suggestions must be between 1 and {MAX_SUGGESTIONS_LIMIT}"
            )));
        }
        compile_exclusions(&self.exclude)?;
        Ok(())
    }

    /// Matcher for the configured case policy
    #[must_use]
    pub const fn matcher(&self) -> Matcher {
        Matcher::new(if self.case_sensitive { CaseMode::Sensitive } else { CaseMode::Insensitive })
    }
}
