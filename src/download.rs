use crate::error::{MocvError, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Outcome of a download attempt that reached the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Completed { bytes: u64 },
    Rejected(StatusCode),
}

pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Stream `url` into `dest`, drawing a progress bar unless `silent`.
    ///
    /// `dest` is only created once the server has answered with a success
    /// status.
    pub async fn download<P: AsRef<Path>>(
        &self,
        url: &str,
        dest: P,
        silent: bool,
    ) -> Result<DownloadStatus> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MocvError::DownloadFailed {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(%url, %status, "download rejected");
            return Ok(DownloadStatus::Rejected(status));
        }

        let total_size = response.content_length().unwrap_or(0);

        let pb = if silent {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total_size)
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(format!(
            "Downloading {}",
            url.rsplit('/').next().unwrap_or("archive")
        ));

        let mut file = File::create(dest.as_ref()).await?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| MocvError::DownloadFailed {
                url: url.to_string(),
                source: e,
            })?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }
        file.flush().await?;

        pb.finish_and_clear();
        tracing::debug!(%url, bytes = downloaded, "download complete");
        Ok(DownloadStatus::Completed { bytes: downloaded })
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}
