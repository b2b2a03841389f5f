use thiserror::Error;

#[derive(Error, Debug)]
pub enum MocvError {
    #[error("Failed to fetch releases from {url}: {source}")]
    NetworkError {
        url: String,
        source: reqwest::Error,
    },

    #[error("Releases fetch error: {url} responded with HTTP {status}")]
    ApiError { url: String, status: u16 },

    #[error("moc version '{version}' not found (HTTP {status} {url})")]
    VersionNotFound {
        version: String,
        url: String,
        status: u16,
    },

    #[error("moc version '{0}' is not downloaded")]
    NotCached(String),

    #[error("Failed to download from {url}: {source}")]
    DownloadFailed {
        url: String,
        source: reqwest::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("{path} not found")]
    ShellRcNotFound { path: String },

    #[error("Invalid version identifier: '{0}'")]
    InvalidVersion(String),

    #[error("No releases returned by {0}")]
    EmptyCatalog(String),

    #[error("Failed to extract archive: {0}")]
    ExtractionFailed(String),

    #[error("Windows is not supported. Please use WSL")]
    WindowsUnsupported,

    #[error("{os} is not supported")]
    UnsupportedPlatform { os: String },

    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MocvError>;
