use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};

use crate::{ApiError, FailureKind, RemoteJob, Upload};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Backend root, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Uploads carry whole videos and get a longer budget than other calls.
    pub upload_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(600),
        }
    }
}

/// The backend's REST surface as seen by the client.
///
/// Commands only report whether the backend accepted them; the queue itself is
/// learned exclusively through [`QueueApi::fetch_queue`] and the push channel.
#[async_trait::async_trait]
pub trait QueueApi: Send + Sync {
    async fn fetch_queue(&self) -> Result<Vec<RemoteJob>, ApiError>;

    async fn submit(&self, upload: Upload) -> Result<(), ApiError>;

    async fn delete(&self, job_id: &str) -> Result<(), ApiError>;

    async fn start_processing(&self, job_id: &str) -> Result<(), ApiError>;

    /// Fetch a completed job's asset from its `downloadUrl` locator.
    async fn download_result(&self, locator: &str) -> Result<Bytes, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestQueueClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestQueueClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        // Keep any path prefix when joining relative locators.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl QueueApi for ReqwestQueueClient {
    async fn fetch_queue(&self) -> Result<Vec<RemoteJob>, ApiError> {
        // Trailing empty segment keeps the `/queue/` form the backend routes on.
        let url = self.endpoint(&["queue", ""])?;
        let response = self.send(self.client.get(url)).await?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    async fn submit(&self, upload: Upload) -> Result<(), ApiError> {
        let url = self.endpoint(&["upload", ""])?;
        let Upload {
            file_name,
            bytes,
            default_minutes,
            vertical_minutes,
        } = upload;
        let form = Form::new()
            .part("file", Part::bytes(bytes.to_vec()).file_name(file_name))
            .text("defaults", join_minutes(&default_minutes))
            .text("verticals", join_minutes(&vertical_minutes));

        let request = self
            .client
            .post(url)
            .timeout(self.settings.upload_timeout)
            .multipart(form);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, job_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["queue", job_id])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn start_processing(&self, job_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["queue", job_id, "process"])?;
        self.send(self.client.post(url)).await?;
        Ok(())
    }

    async fn download_result(&self, locator: &str) -> Result<Bytes, ApiError> {
        let url = self
            .base
            .join(locator.trim_start_matches('/'))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self.send(self.client.get(url)).await?;
        response.bytes().await.map_err(map_reqwest_error)
    }
}

/// Comma-joined minutes in ascending order without duplicates.
pub(crate) fn join_minutes(minutes: &[u32]) -> String {
    let mut sorted = minutes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
