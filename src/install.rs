use crate::config::Config;
use crate::download::{DownloadStatus, Downloader};
use crate::error::{MocvError, Result};
use crate::models::{validate_version, Platform, CURRENT_DIR_NAME};
use crate::utils::print_info;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tar::Archive;

pub struct Installer {
    config: Config,
    platform: Platform,
    downloader: Downloader,
}

impl Installer {
    pub fn new(config: Config, platform: Platform) -> Self {
        Self {
            config,
            platform,
            downloader: Downloader::new(),
        }
    }

    pub fn is_cached(&self, version: &str) -> bool {
        self.config.is_cached(version)
    }

    pub fn download_url(&self, version: &str) -> String {
        format!(
            "{}/{}/releases/download/{version}/motoko-{platform}-{version}.tar.gz",
            self.config.download_base.trim_end_matches('/'),
            self.config.repository,
            platform = self.platform,
        )
    }

    /// Download and extract `version` unless it is already cached
    pub async fn ensure_downloaded(&self, version: &str, silent: bool) -> Result<()> {
        validate_version(version)?;

        if self.is_cached(version) {
            tracing::debug!(version, "already cached");
            return Ok(());
        }

        if !silent {
            print_info("Downloading...");
        }

        let url = self.download_url(version);
        std::fs::create_dir_all(&self.config.tmp_dir)?;
        let scratch_file = self
            .config
            .tmp_dir
            .join(format!("motoko-{}-{}.tar.gz", self.platform, version));

        match self.downloader.download(&url, &scratch_file, silent).await {
            Ok(DownloadStatus::Completed { bytes }) => {
                tracing::info!(version, bytes, "archive downloaded");
            }
            Ok(DownloadStatus::Rejected(status)) => {
                return Err(MocvError::VersionNotFound {
                    version: version.to_string(),
                    url,
                    status: status.as_u16(),
                });
            }
            Err(e) => {
                let _ = std::fs::remove_file(&scratch_file);
                return Err(e);
            }
        }

        let version_dir = self.config.version_dir(version);
        std::fs::create_dir_all(&version_dir)?;

        let extracted = Self::extract_tar_gz(&scratch_file, &version_dir);
        if let Err(e) = std::fs::remove_file(&scratch_file) {
            tracing::warn!(file = %scratch_file.display(), error = %e, "could not remove scratch file");
        }

        if let Err(e) = extracted {
            let _ = std::fs::remove_dir_all(&version_dir);
            return Err(e);
        }

        tracing::info!(version, dir = %version_dir.display(), "version extracted");
        Ok(())
    }

    fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
        let tar_gz = File::open(archive_path)?;
        let mut archive = Archive::new(GzDecoder::new(tar_gz));
        archive
            .unpack(dest_dir)
            .map_err(|e| MocvError::ExtractionFailed(e.to_string()))
    }

    /// Versions present in the cache, sorted by name
    pub fn list_cached(&self) -> Result<Vec<String>> {
        let mut cached = Vec::new();

        if !self.config.versions_dir.exists() {
            return Ok(cached);
        }

        for entry in std::fs::read_dir(&self.config.versions_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name != CURRENT_DIR_NAME && !name.starts_with('.') && self.is_cached(name) {
                    cached.push(name.to_string());
                }
            }
        }

        cached.sort();
        Ok(cached)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::REQUIRED_BINARIES;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    /// Gzipped tarball holding the required binaries plus a readme
    pub(crate) fn moc_archive(version: &str) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for name in REQUIRED_BINARIES.iter().chain(["README.md"].iter()) {
            let body = format!("{name} {version}");
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, name, body.as_bytes())
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Lay out a fully cached version without touching the network
    pub(crate) fn seed_cached(config: &Config, version: &str) {
        let dir = config.version_dir(version);
        std::fs::create_dir_all(&dir).unwrap();
        for name in REQUIRED_BINARIES {
            std::fs::write(dir.join(name), format!("{name} {version}")).unwrap();
        }
    }

    pub(crate) fn archive_path(platform: Platform, version: &str) -> String {
        format!("/dfinity/motoko/releases/download/{version}/motoko-{platform}-{version}.tar.gz")
    }

    fn setup(server: &mockito::Server) -> (TempDir, Config) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::load_from(temp_dir.path()).unwrap();
        config.download_base = server.url();
        (temp_dir, config)
    }

    #[test]
    fn test_download_url() {
        let config = Config::for_root("/tmp/mocv");
        let installer = Installer::new(config, Platform::Macos);
        assert_eq!(
            installer.download_url("0.9.0"),
            "https://github.com/dfinity/motoko/releases/download/0.9.0/motoko-macos-0.9.0.tar.gz"
        );
    }

    #[test]
    fn test_is_cached_requires_all_binaries() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(temp_dir.path()).unwrap();
        let installer = Installer::new(config.clone(), Platform::Linux64);

        let dir = config.version_dir("0.9.0");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("moc"), "").unwrap();
        std::fs::write(dir.join("mo-doc"), "").unwrap();
        assert!(!installer.is_cached("0.9.0"));

        std::fs::write(dir.join("mo-ide"), "").unwrap();
        assert!(installer.is_cached("0.9.0"));
        assert!(!installer.is_cached("0.8.4"));
    }

    #[tokio::test]
    async fn test_ensure_downloaded_extracts_archive() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", archive_path(Platform::Linux64, "0.9.0").as_str())
            .with_status(200)
            .with_body(moc_archive("0.9.0"))
            .create_async()
            .await;
        let (_temp, config) = setup(&server);
        let installer = Installer::new(config.clone(), Platform::Linux64);

        installer.ensure_downloaded("0.9.0", true).await.unwrap();

        mock.assert_async().await;
        assert!(installer.is_cached("0.9.0"));
        assert_eq!(
            std::fs::read_to_string(config.version_dir("0.9.0").join("moc")).unwrap(),
            "moc 0.9.0"
        );
        assert_eq!(std::fs::read_dir(&config.tmp_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cached_version_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let (_temp, config) = setup(&server);
        seed_cached(&config, "0.8.4");
        let marker = config.version_dir("0.8.4").join("untouched");
        std::fs::write(&marker, "keep").unwrap();

        let installer = Installer::new(config.clone(), Platform::Linux64);
        installer.ensure_downloaded("0.8.4", false).await.unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read_to_string(marker).unwrap(), "keep");
    }

    #[tokio::test]
    async fn test_missing_version_leaves_no_directory() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", archive_path(Platform::Linux64, "9.9.9").as_str())
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;
        let (_temp, config) = setup(&server);
        let installer = Installer::new(config.clone(), Platform::Linux64);

        let err = installer.ensure_downloaded("9.9.9", true).await.unwrap_err();

        assert!(matches!(err, MocvError::VersionNotFound { status: 404, .. }));
        assert!(err.to_string().contains("moc version '9.9.9' not found"));
        assert!(!config.version_dir("9.9.9").exists());
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_cleaned_up() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", archive_path(Platform::Linux64, "0.7.0").as_str())
            .with_status(200)
            .with_body("definitely not gzip")
            .create_async()
            .await;
        let (_temp, config) = setup(&server);
        let installer = Installer::new(config.clone(), Platform::Linux64);

        let err = installer.ensure_downloaded("0.7.0", true).await.unwrap_err();

        assert!(matches!(err, MocvError::ExtractionFailed(_)));
        assert!(!config.version_dir("0.7.0").exists());
        assert_eq!(std::fs::read_dir(&config.tmp_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_identifier_rejected_before_download() {
        let server = mockito::Server::new_async().await;
        let (_temp, config) = setup(&server);
        let installer = Installer::new(config, Platform::Linux64);

        let err = installer.ensure_downloaded("../escape", true).await.unwrap_err();
        assert!(matches!(err, MocvError::InvalidVersion(_)));
    }

    #[test]
    fn test_list_cached_skips_current_and_partial() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(temp_dir.path()).unwrap();
        seed_cached(&config, "0.9.0");
        seed_cached(&config, "0.8.4");
        std::fs::create_dir_all(config.version_dir("0.7.0")).unwrap();
        std::fs::create_dir_all(config.current_dir()).unwrap();

        let installer = Installer::new(config, Platform::Linux64);
        assert_eq!(installer.list_cached().unwrap(), ["0.8.4", "0.9.0"]);
    }
}
