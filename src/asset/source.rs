//! Asset retrieval: "give me the bytes for this reference, or fail".

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use super::reference::AssetLocation;

/// Retrieval failures. Always scoped to a single element.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid reference `{0}`: {1}")]
    InvalidReference(String, String),

    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("request to `{0}` failed")]
    Http(Url, #[source] reqwest::Error),
}

/// Byte retrieval capability used by the asset resolver.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, location: &AssetLocation) -> Result<Vec<u8>, FetchError>;
}

/// Reads local files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

#[async_trait]
impl AssetSource for FileSource {
    async fn fetch(&self, location: &AssetLocation) -> Result<Vec<u8>, FetchError> {
        match location {
            AssetLocation::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|err| FetchError::Io(path.clone(), err)),
            AssetLocation::Remote(url) => Err(FetchError::InvalidReference(
                url.to_string(),
                "remote references are not readable from disk".into(),
            )),
        }
    }
}

/// Downloads `http(s)` references. Non-2xx statuses are failures.
#[derive(Debug, Default, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    async fn fetch(&self, location: &AssetLocation) -> Result<Vec<u8>, FetchError> {
        let AssetLocation::Remote(url) = location else {
            return FileSource.fetch(location).await;
        };

        let http_err = |err| FetchError::Http(url.clone(), err);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_err)?;
        let bytes = response.bytes().await.map_err(http_err)?;
        Ok(bytes.to_vec())
    }
}

/// Local paths from disk, remote locators over HTTP.
#[derive(Debug, Default, Clone)]
pub struct DefaultSource {
    http: HttpSource,
}

impl DefaultSource {
    pub fn new(http: HttpSource) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AssetSource for DefaultSource {
    async fn fetch(&self, location: &AssetLocation) -> Result<Vec<u8>, FetchError> {
        match location {
            AssetLocation::Remote(_) => self.http.fetch(location).await,
            AssetLocation::Local(_) => FileSource.fetch(location).await,
        }
    }
}
