use crate::error::{MocvError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory name reserved for the selected version's copy
pub const CURRENT_DIR_NAME: &str = "current";

/// Executables that must be present for a version to count as cached
pub const REQUIRED_BINARIES: [&str; 3] = ["moc", "mo-doc", "mo-ide"];

/// A published moc release as listed by the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    /// Drafts have no publish date
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Release {
    /// Publish date formatted like `Jan 1, 2024`
    pub fn display_date(&self) -> String {
        self.published_at
            .map(|date| date.format("%b %-d, %Y").to_string())
            .unwrap_or_default()
    }
}

/// Host platforms with a published moc build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Macos,
    Linux64,
}

impl Platform {
    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Result<Self> {
        match os {
            "macos" => Ok(Platform::Macos),
            "linux" => Ok(Platform::Linux64),
            "windows" => Err(MocvError::WindowsUnsupported),
            os => Err(MocvError::UnsupportedPlatform { os: os.to_string() }),
        }
    }

    /// Platform segment used in release asset names
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Macos => "macos",
            Platform::Linux64 => "linux64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reject identifiers that cannot be used as a single directory name
pub fn validate_version(version: &str) -> Result<()> {
    let invalid = version.is_empty()
        || version.starts_with('.')
        || version == CURRENT_DIR_NAME
        || version.contains(['/', '\\']);

    if invalid {
        return Err(MocvError::InvalidVersion(version.to_string()));
    }
    Ok(())
}
