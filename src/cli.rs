use crate::api::ReleasesApi;
use crate::config::Config;
use crate::error::{MocvError, Result};
use crate::install::Installer;
use crate::models::Platform;
use crate::shell::{configure_env, MOC_PATH_VAR};
use crate::utils::{print_success, print_warning, release_label};
use crate::version_manager::VersionManager;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

/// Keyword resolved to the newest catalog release
const LATEST: &str = "latest";

#[derive(Parser)]
#[command(name = "mocv")]
#[command(about = "Motoko compiler version manager", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(skip)]
    config: Config,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a line to the shell init file setting DFX_MOC_PATH to the current moc
    Init,

    /// Remove the DFX_MOC_PATH line from the shell init file
    Reset,

    /// Set current moc version (e.g. "mocv use 0.8.4" or "mocv use latest")
    Use {
        /// Version to use, or "latest"
        version: String,
    },

    /// Print current moc version
    Current,

    /// Print the directory of a moc version, downloading it if needed
    Bin {
        /// Version to locate (defaults to the current one)
        version: Option<String>,
    },
}

impl Cli {
    /// Attach the loaded configuration to already parsed arguments
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub async fn run(self, platform: Platform) -> Result<()> {
        match self.command {
            None => self.select(platform).await,
            Some(Commands::Init) => self.configure_shell(false),
            Some(Commands::Reset) => self.configure_shell(true),
            Some(Commands::Use { ref version }) => self.use_version(version, platform).await,
            Some(Commands::Current) => self.current(),
            Some(Commands::Bin { ref version }) => {
                let dir = self.bin(version.as_deref(), platform).await?;
                println!("{}", dir);
                Ok(())
            }
        }
    }

    async fn select(&self, platform: Platform) -> Result<()> {
        let api = ReleasesApi::new(&self.config);
        let releases = api.list_releases().await?;

        if releases.is_empty() {
            print_warning("No moc releases found");
            return Ok(());
        }

        let current = VersionManager::new(self.config.clone()).get_current()?;
        let cached = Installer::new(self.config.clone(), platform).list_cached()?;
        let current_index = releases
            .iter()
            .position(|r| Some(&r.tag_name) == current.as_ref());

        let items: Vec<String> = releases
            .iter()
            .enumerate()
            .map(|(i, release)| {
                release_label(
                    release,
                    current_index == Some(i),
                    cached.contains(&release.tag_name),
                )
            })
            .collect();

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select moc version")
            .items(&items[..])
            .default(current_index.unwrap_or(0))
            .interact_opt()?;

        let Some(index) = selection else {
            return Ok(());
        };

        self.use_version(&releases[index].tag_name, platform).await
    }

    async fn use_version(&self, version: &str, platform: Platform) -> Result<()> {
        let version = if version == LATEST {
            ReleasesApi::new(&self.config).latest_version().await?
        } else {
            version.to_string()
        };

        let installer = Installer::new(self.config.clone(), platform);
        installer.ensure_downloaded(&version, false).await?;

        let manager = VersionManager::new(self.config.clone());
        manager.set_current(&version)?;

        print_success(&format!("Selected moc {}", version.cyan()));

        if !self.shell_configured() {
            print_warning(&format!(
                "{} is not set up in your shell. Run {} to configure it",
                MOC_PATH_VAR,
                "mocv init".cyan()
            ));
        }

        Ok(())
    }

    fn current(&self) -> Result<()> {
        let manager = VersionManager::new(self.config.clone());
        println!("{}", manager.get_current()?.unwrap_or_default());
        Ok(())
    }

    async fn bin(&self, version: Option<&str>, platform: Platform) -> Result<String> {
        let version = match version {
            Some(version) => version.to_string(),
            None => VersionManager::new(self.config.clone())
                .get_current()?
                .ok_or_else(|| {
                    MocvError::Usage(
                        "No version selected. Please pass a version arg or run `mocv` or `mocv use <version>`"
                            .to_string(),
                    )
                })?,
        };

        let installer = Installer::new(self.config.clone(), platform);
        installer.ensure_downloaded(&version, true).await?;

        Ok(self.config.version_dir(&version).display().to_string())
    }

    fn configure_shell(&self, reset: bool) -> Result<()> {
        let shell = self.config.shell();
        let rc_file = self.config.shell_rc_path()?;
        let moc_path = self.config.current_dir().join("moc");

        configure_env(shell, &rc_file, &moc_path, reset)?;

        print_success(&format!("Updated {}", rc_file.display()));
        println!("{}", "Restart terminal to apply changes".yellow());
        Ok(())
    }

    fn shell_configured(&self) -> bool {
        let Ok(rc_file) = self.config.shell_rc_path() else {
            return false;
        };
        let export_line = self
            .config
            .shell()
            .export_line(&self.config.current_dir().join("moc"));

        std::fs::read_to_string(rc_file)
            .map(|contents| contents.contains(&export_line))
            .unwrap_or(false)
    }
}
