use crate::error::{MocvError, Result};
use crate::models::{CURRENT_DIR_NAME, REQUIRED_BINARIES};
use crate::shell::Shell;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub mocv_dir: PathBuf,

    #[serde(skip)]
    pub versions_dir: PathBuf,

    #[serde(skip)]
    pub tmp_dir: PathBuf,

    #[serde(skip)]
    pub config_file: PathBuf,

    /// Base URL of the releases REST API
    pub api_base: String,

    /// Base URL release archives are downloaded from
    pub download_base: String,

    /// `owner/name` of the repository publishing moc releases
    pub repository: String,

    /// Number of releases fetched from the catalog
    pub releases_per_page: u8,

    /// Shell whose init file gets the export line (detected from $SHELL if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<Shell>,

    /// Explicit init file path, overriding the shell's default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_rc: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_root(Self::default_mocv_dir())
    }
}

impl Config {
    fn default_mocv_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("MOCV_DIR") {
            return PathBuf::from(shellexpand::tilde(&dir).to_string());
        }

        if let Some(base_dirs) = BaseDirs::new() {
            return base_dirs.home_dir().join(".cache").join("mocv");
        }

        PathBuf::from(shellexpand::tilde("~/.cache/mocv").to_string())
    }

    /// Default settings rooted at an explicit cache directory
    pub fn for_root<P: AsRef<Path>>(root: P) -> Self {
        let mocv_dir = root.as_ref().to_path_buf();

        Self {
            versions_dir: mocv_dir.join("versions"),
            tmp_dir: mocv_dir.join("tmp"),
            config_file: mocv_dir.join("config.toml"),
            mocv_dir,
            api_base: "https://api.github.com".to_string(),
            download_base: "https://github.com".to_string(),
            repository: "dfinity/motoko".to_string(),
            releases_per_page: 10,
            shell: None,
            shell_rc: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_mocv_dir())
    }

    pub fn load_from<P: AsRef<Path>>(root: P) -> Result<Self> {
        let mut config = Self::for_root(root);

        std::fs::create_dir_all(&config.mocv_dir)?;
        std::fs::create_dir_all(&config.versions_dir)?;
        std::fs::create_dir_all(&config.tmp_dir)?;

        if config.config_file.exists() {
            let contents = std::fs::read_to_string(&config.config_file)?;
            let file_config: Config = toml::from_str(&contents)?;

            config.api_base = file_config.api_base;
            config.download_base = file_config.download_base;
            config.repository = file_config.repository;
            config.releases_per_page = file_config.releases_per_page;
            config.shell = file_config.shell;
            config.shell_rc = file_config.shell_rc;
        } else {
            config.save()?;
        }

        tracing::debug!(root = %config.mocv_dir.display(), "configuration loaded");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| MocvError::ConfigError(e.to_string()))?;

        std::fs::write(&self.config_file, contents)?;
        Ok(())
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions_dir.join(version)
    }

    /// A version is cached when all of its required executables are on disk
    pub fn is_cached(&self, version: &str) -> bool {
        let version_dir = self.version_dir(version);
        REQUIRED_BINARIES
            .iter()
            .all(|binary| version_dir.join(binary).exists())
    }

    pub fn current_dir(&self) -> PathBuf {
        self.versions_dir.join(CURRENT_DIR_NAME)
    }

    pub fn current_marker(&self) -> PathBuf {
        self.current_dir().join("version.txt")
    }

    pub fn shell(&self) -> Shell {
        self.shell.or_else(Shell::detect).unwrap_or(Shell::Bash)
    }

    pub fn shell_rc_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.shell_rc {
            return Ok(PathBuf::from(shellexpand::tilde(path).to_string()));
        }

        self.shell().config_file().ok_or_else(|| {
            MocvError::ConfigError("Could not determine home directory".to_string())
        })
    }
}
