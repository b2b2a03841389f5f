use crate::config::Config;
use crate::error::{MocvError, Result};
use crate::models::Release;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::cmp::Reverse;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Reads the list of published moc releases
pub struct ReleasesApi {
    client: Client,
    releases_url: String,
    per_page: u8,
}

impl ReleasesApi {
    pub fn new(config: &Config) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self {
            client,
            releases_url: format!(
                "{}/repos/{}/releases",
                config.api_base.trim_end_matches('/'),
                config.repository
            ),
            per_page: config.releases_per_page,
        }
    }

    /// Most recent releases, newest first
    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        tracing::debug!(url = %self.releases_url, per_page = self.per_page, "fetching releases");

        let response = self
            .client
            .get(&self.releases_url)
            .query(&[("per_page", self.per_page)])
            .send()
            .await
            .map_err(|e| MocvError::NetworkError {
                url: self.releases_url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MocvError::ApiError {
                url: self.releases_url.clone(),
                status: status.as_u16(),
            });
        }

        let mut releases: Vec<Release> =
            response.json().await.map_err(|e| MocvError::NetworkError {
                url: self.releases_url.clone(),
                source: e,
            })?;

        // Stable sort: equal or missing timestamps keep catalog order
        releases.sort_by_key(|r| Reverse(r.published_at));

        tracing::debug!(count = releases.len(), "releases fetched");
        Ok(releases)
    }

    /// Tag of the newest release
    pub async fn latest_version(&self) -> Result<String> {
        self.list_releases()
            .await?
            .into_iter()
            .next()
            .map(|r| r.tag_name)
            .ok_or_else(|| MocvError::EmptyCatalog(self.releases_url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const RELEASES_PATH: &str = "/repos/dfinity/motoko/releases";

    fn config_for(server: &mockito::Server) -> Config {
        let mut config = Config::for_root("/nonexistent/mocv");
        config.api_base = server.url();
        config
    }

    #[tokio::test]
    async fn test_list_releases_sends_api_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", RELEASES_PATH)
            .match_query(Matcher::UrlEncoded("per_page".into(), "10".into()))
            .match_header("x-github-api-version", GITHUB_API_VERSION)
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"tag_name": "0.9.0", "published_at": "2024-01-01T00:00:00Z"},
                    {"tag_name": "0.8.4", "published_at": "2023-11-20T00:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let api = ReleasesApi::new(&config_for(&server));
        let releases = api.list_releases().await.unwrap();

        mock.assert_async().await;
        let tags: Vec<_> = releases.iter().map(|r| r.tag_name.as_str()).collect();
        assert_eq!(tags, ["0.9.0", "0.8.4"]);
    }

    #[tokio::test]
    async fn test_list_releases_orders_by_publish_date() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "0.8.4", "published_at": "2023-11-20T00:00:00Z"},
                    {"tag_name": "0.9.0", "published_at": "2024-01-01T00:00:00Z"},
                    {"tag_name": "draft", "published_at": null}
                ]"#,
            )
            .create_async()
            .await;

        let api = ReleasesApi::new(&config_for(&server));
        let releases = api.list_releases().await.unwrap();

        let tags: Vec<_> = releases.iter().map(|r| r.tag_name.as_str()).collect();
        assert_eq!(tags, ["0.9.0", "0.8.4", "draft"]);
    }

    #[tokio::test]
    async fn test_latest_version_is_first_release() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "0.9.0", "published_at": "2024-01-01T00:00:00Z"},
                    {"tag_name": "0.8.4", "published_at": "2023-11-20T00:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let api = ReleasesApi::new(&config_for(&server));
        assert_eq!(api.latest_version().await.unwrap(), "0.9.0");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let api = ReleasesApi::new(&config_for(&server));
        let err = api.list_releases().await.unwrap_err();
        assert!(matches!(err, MocvError::ApiError { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_network_error() {
        let mut config = Config::for_root("/nonexistent/mocv");
        config.api_base = "http://127.0.0.1:9".to_string();

        let api = ReleasesApi::new(&config);
        let err = api.list_releases().await.unwrap_err();

        assert!(matches!(err, MocvError::NetworkError { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to fetch releases from http://127.0.0.1:9/repos/dfinity/motoko/releases"));
    }

    #[tokio::test]
    async fn test_empty_catalog_has_no_latest() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", RELEASES_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let api = ReleasesApi::new(&config_for(&server));
        assert!(matches!(
            api.latest_version().await,
            Err(MocvError::EmptyCatalog(_))
        ));
    }
}
