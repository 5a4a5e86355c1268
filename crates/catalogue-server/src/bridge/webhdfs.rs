//! WebHDFS gateway transport
//!
//! Uploads use the two-step protocol: `op=CREATE` against the namenode
//! answers with a redirect whose `Location` names the datanode, and the file
//! body is streamed there in a second `PUT`. Redirects are never followed
//! automatically so the first request carries no body.

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{header, redirect, Client, Response, StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use tokio_util::io::ReaderStream;

use super::{BridgeError, ByteStream, FilesystemBridge};

#[derive(Debug, Clone)]
pub struct WebHdfsBridge {
    base_url: String,
    user: String,
    client: Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListStatusResponse {
    file_statuses: FileStatuses,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FileStatuses {
    #[serde(default)]
    file_status: Vec<FileStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileStatus {
    path_suffix: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RemoteExceptionBody {
    remote_exception: RemoteException,
}

#[derive(Deserialize)]
struct RemoteException {
    message: String,
}

impl WebHdfsBridge {
    pub fn new(base_url: impl Into<String>, user: impl Into<String>) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: user.into(),
            client,
        })
    }

    fn url(&self, remote: &str) -> String {
        if remote.starts_with('/') {
            format!("{}{}", self.base_url, remote)
        } else {
            format!("{}/{}", self.base_url, remote)
        }
    }

    fn query<'a>(&'a self, op: &'a str) -> [(&'a str, &'a str); 2] {
        [("op", op), ("user.name", self.user.as_str())]
    }

    /// Target of a redirect response, resolved against the request URL
    fn redirect_target(response: &Response, remote: &str) -> Result<Url, BridgeError> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| response.url().join(location).ok())
            .ok_or_else(|| BridgeError::MissingLocation(remote.to_string()))
    }

    async fn ensure_success(response: Response, remote: &str) -> Result<Response, BridgeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(BridgeError::NotFound(remote.to_string()));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RemoteExceptionBody>(&text)
            .map(|body| body.remote_exception.message)
            .unwrap_or(text);

        Err(BridgeError::Gateway {
            status: status.as_u16(),
            path: remote.to_string(),
            message,
        })
    }
}

#[async_trait]
impl FilesystemBridge for WebHdfsBridge {
    #[tracing::instrument(skip(self, local), fields(local = %local.display()))]
    async fn put_file(&self, local: &Path, remote: &str) -> Result<(), BridgeError> {
        let response = self
            .client
            .put(self.url(remote))
            .query(&[("op", "CREATE"), ("overwrite", "true"), ("user.name", self.user.as_str())])
            .send()
            .await?;

        if !response.status().is_redirection() {
            Self::ensure_success(response, remote).await?;
            return Err(BridgeError::MissingLocation(remote.to_string()));
        }
        let location = Self::redirect_target(&response, remote)?;

        let file = tokio::fs::File::open(local).await?;
        let size = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .client
            .put(location)
            .header(header::CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await?;
        Self::ensure_success(response, remote).await?;

        tracing::debug!(size, "File copied through gateway");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_file(&self, remote: &str) -> Result<ByteStream, BridgeError> {
        let mut response = self
            .client
            .get(self.url(remote))
            .query(&self.query("OPEN"))
            .send()
            .await?;

        // The namenode hands reads off to a datanode
        if response.status().is_redirection() {
            let location = Self::redirect_target(&response, remote)?;
            response = self.client.get(location).send().await?;
        }

        let response = Self::ensure_success(response, remote).await?;
        Ok(Box::pin(response.bytes_stream().map_err(BridgeError::from)))
    }

    #[tracing::instrument(skip(self))]
    async fn list_directory(&self, remote: &str) -> Result<Vec<String>, BridgeError> {
        let response = self
            .client
            .get(self.url(remote))
            .query(&self.query("LISTSTATUS"))
            .send()
            .await?;

        let listing: ListStatusResponse = Self::ensure_success(response, remote).await?.json().await?;

        Ok(listing
            .file_statuses
            .file_status
            .into_iter()
            .map(|status| status.path_suffix)
            .collect())
    }
}
