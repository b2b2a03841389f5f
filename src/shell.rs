use crate::error::{MocvError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable dfx reads to locate the moc binary
pub const MOC_PATH_VAR: &str = "DFX_MOC_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub fn detect() -> Option<Self> {
        let shell = std::env::var("SHELL").ok()?;
        Self::from_shell_path(&shell)
    }

    fn from_shell_path(shell: &str) -> Option<Self> {
        if shell.contains("zsh") {
            Some(Shell::Zsh)
        } else if shell.contains("bash") {
            Some(Shell::Bash)
        } else if shell.contains("fish") {
            Some(Shell::Fish)
        } else {
            None
        }
    }

    pub fn config_file(&self) -> Option<PathBuf> {
        let home = dirs::home_dir()?;

        match self {
            Shell::Bash => Some(home.join(".bashrc")),
            Shell::Zsh => Some(home.join(".zshrc")),
            Shell::Fish => Some(home.join(".config/fish/config.fish")),
        }
    }

    /// The exact block owned by mocv inside the init file.
    ///
    /// Removal matches this string verbatim, including the surrounding
    /// newlines, so hand-edited variants are left alone.
    pub fn export_line(&self, moc_path: &Path) -> String {
        match self {
            Shell::Bash | Shell::Zsh => {
                format!("\nexport {}={}\n", MOC_PATH_VAR, moc_path.display())
            }
            Shell::Fish => format!("\nset -gx {} {}\n", MOC_PATH_VAR, moc_path.display()),
        }
    }
}

/// Rewrites `rc_file` so it carries the export line exactly once, or not at
/// all when `reset` is set.
pub fn configure_env(shell: Shell, rc_file: &Path, moc_path: &Path, reset: bool) -> Result<()> {
    if !rc_file.exists() {
        return Err(MocvError::ShellRcNotFound {
            path: rc_file.display().to_string(),
        });
    }

    let export_line = shell.export_line(moc_path);
    let contents = std::fs::read_to_string(rc_file)?;

    let removed = contents.matches(export_line.as_str()).count();
    let mut contents = contents.replace(export_line.as_str(), "");

    if !reset {
        contents.push_str(&export_line);
    }

    std::fs::write(rc_file, contents)?;

    tracing::info!(
        file = %rc_file.display(),
        removed,
        appended = !reset,
        "updated shell init file"
    );
    Ok(())
}
