use crate::config::Config;
use crate::error::{MocvError, Result};
use crate::models::validate_version;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct VersionManager {
    config: Config,
}

impl VersionManager {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Make `version` the current one by snapshotting its directory into
    /// `versions/current` and recording its identifier in the marker file.
    pub fn set_current(&self, version: &str) -> Result<PathBuf> {
        validate_version(version)?;

        let version_dir = self.config.version_dir(version);
        if !self.config.is_cached(version) {
            return Err(MocvError::NotCached(version.to_string()));
        }

        let current_dir = self.config.current_dir();
        let staging_dir = self.config.versions_dir.join(".current.staging");

        if staging_dir.exists() {
            std::fs::remove_dir_all(&staging_dir)?;
        }
        copy_dir(&version_dir, &staging_dir)?;
        std::fs::write(staging_dir.join("version.txt"), version)?;

        if current_dir.exists() {
            std::fs::remove_dir_all(&current_dir)?;
        }
        std::fs::rename(&staging_dir, &current_dir)?;

        tracing::info!(version, dir = %current_dir.display(), "current version set");
        Ok(current_dir)
    }

    /// Identifier recorded in the marker file, if any
    pub fn get_current(&self) -> Result<Option<String>> {
        let marker = self.config.current_marker();

        if !marker.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&marker)?;
        let version = contents.trim();

        if version.is_empty() {
            return Ok(None);
        }

        Ok(Some(version.to_string()))
    }
}

fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> Result<()> {
    let link = std::fs::read_link(src)?;
    std::os::unix::fs::symlink(link, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> Result<()> {
    std::fs::copy(src, target)?;
    Ok(())
}
