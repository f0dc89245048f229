use crate::config::{Credentials, PollConfig};
use crate::error::MonsterError;
use crate::types::{
    AddTaskRequest, AddTaskResponse, AspectRatio, GenerationRequest, JobHandle, Model,
    StatusResponse, ACCEPTED_MESSAGE,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

const DEFAULT_API_URL: &str = "https://api.monsterapi.ai/apis/";

const ADD_TASK: &str = "add-task";
const TASK_STATUS: &str = "task-status";

const X_API_KEY: &str = "x-api-key";

/// The main client for interacting with the MonsterAPI image service.
///
/// It holds the shared `reqwest::Client`, the credential headers and the
/// polling policy. It is cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct MonsterClient {
    client: reqwest::Client,
    headers: HeaderMap,
    base_url: Url,
    poll_config: PollConfig,
}

impl MonsterClient {
    /// Creates a new `MonsterClient` against the public API.
    ///
    /// When `credentials` is `None`, they are read from the `MONSTER_API_KEY`
    /// and `MONSTER_BEARER_TOKEN` environment variables.
    ///
    /// # Errors
    ///
    /// - `MonsterError::MissingCredentials` if neither source provides them.
    /// - `MonsterError::InvalidHeader` if a credential cannot be sent as a header.
    /// - `MonsterError::RequestFailed` if the internal HTTP client fails to build.
    pub fn new(credentials: Option<Credentials>) -> Result<Self, MonsterError> {
        let credentials = match credentials {
            Some(credentials) => credentials,
            None => Credentials::from_env()?,
        };
        Self::new_with_url(credentials, DEFAULT_API_URL)
    }

    /// Creates a new `MonsterClient` with a custom base URL.
    ///
    /// This is useful for testing or for connecting to a proxy.
    ///
    /// # Errors
    ///
    /// - `MonsterError::InvalidHeader` if a credential cannot be sent as a header.
    /// - `MonsterError::UrlParseFailed` if the provided `base_url` is invalid.
    pub fn new_with_url(credentials: Credentials, base_url: &str) -> Result<Self, MonsterError> {
        let mut api_key = HeaderValue::from_str(&credentials.api_key)?;
        api_key.set_sensitive(true);
        let mut bearer_token = HeaderValue::from_str(&credentials.bearer_token)?;
        bearer_token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(X_API_KEY), api_key);
        headers.insert(AUTHORIZATION, bearer_token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().build()?;

        // `Url::join` replaces the last segment unless the path ends in a slash.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self {
            client,
            headers,
            base_url,
            poll_config: PollConfig::default(),
        })
    }

    /// Replaces the polling policy used by [`MonsterClient::poll_until_complete`].
    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll_config
    }

    async fn post_json<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<String, MonsterError> {
        let url = self.base_url.join(endpoint)?;
        debug!(%url, "sending request");

        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(MonsterError::ApiError {
                message: format!("{}: {}", status, text),
            })
        }
    }

    /// Submits a text-to-image task.
    ///
    /// # Returns
    ///
    /// A [`JobHandle`] holding the `process_id` of the new task.
    ///
    /// # Errors
    ///
    /// Fails if the request fails, the response is not 2xx, the body lacks a
    /// `process_id`, or the service reports that the task was not accepted.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<JobHandle, MonsterError> {
        self.submit_task(Model::Txt2img, request).await
    }

    /// Submits a task for an arbitrary model variant.
    pub async fn submit_task(
        &self,
        model: Model,
        request: &GenerationRequest,
    ) -> Result<JobHandle, MonsterError> {
        let body = AddTaskRequest {
            model,
            data: request,
        };
        let text = self.post_json(ADD_TASK, &body).await?;
        let added: AddTaskResponse = serde_json::from_str(&text)?;

        if let Some(message) = added.message {
            if message != ACCEPTED_MESSAGE {
                return Err(MonsterError::RequestRejected { message });
            }
        }

        info!(process_id = %added.process_id, ?model, "task submitted");
        Ok(JobHandle {
            process_id: added.process_id,
        })
    }

    /// Submits an image-to-image task seeded by `init_image_url`.
    ///
    /// The task goes to the `txt2img` model with the image fields set. Use
    /// [`MonsterClient::submit_task`] with [`Model::Img2img`] to target the
    /// dedicated model instead.
    pub async fn image_to_image(
        &self,
        prompt: &str,
        init_image_url: &str,
        samples: u32,
        aspect_ratio: AspectRatio,
        strength: Option<f64>,
    ) -> Result<JobHandle, MonsterError> {
        let request = GenerationRequest::new(prompt)
            .with_samples(samples)
            .with_aspect_ratio(aspect_ratio)
            .with_init_image(init_image_url, strength);
        self.submit_task(Model::Txt2img, &request).await
    }

    /// Submits an instruction-driven edit of the image at `init_image_url`.
    pub async fn edit_image(
        &self,
        prompt: &str,
        init_image_url: &str,
        samples: u32,
        aspect_ratio: AspectRatio,
        strength: Option<f64>,
    ) -> Result<JobHandle, MonsterError> {
        let request = GenerationRequest::new(prompt)
            .with_samples(samples)
            .with_aspect_ratio(aspect_ratio)
            .with_init_image(init_image_url, strength);
        self.submit_task(Model::Pix2pix, &request).await
    }

    /// Issues a single status request for `handle`.
    ///
    /// The request body is exactly `{"process_id": "<id>"}`.
    pub async fn status(&self, handle: &JobHandle) -> Result<StatusResponse, MonsterError> {
        let text = self.post_json(TASK_STATUS, handle).await?;
        Ok(StatusResponse::from_body(text)?)
    }

    /// Polls the task until the service reports `COMPLETED`.
    ///
    /// With the default [`PollConfig`] this never gives up: it re-requests as
    /// soon as each non-terminal response arrives.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use monsterapi::{GenerationRequest, MonsterClient};
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// let client = MonsterClient::new(None)?;
    /// let handle = client.submit(&GenerationRequest::new("a lighthouse at dusk")).await?;
    /// let done = client.poll_until_complete(&handle).await?;
    /// println!("{}", done.raw);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn poll_until_complete(&self, handle: &JobHandle) -> Result<StatusResponse, MonsterError> {
        self.poll_until_complete_with(handle, &CancellationToken::new())
            .await
    }

    /// Like [`MonsterClient::poll_until_complete`], stopping early once `cancel` fires.
    ///
    /// # Errors
    ///
    /// - `MonsterError::Cancelled` if the token is cancelled first.
    /// - `MonsterError::PollLimitExceeded` once `max_attempts` requests have
    ///   been made without completion. At least one request is always made.
    /// - Any error from [`MonsterClient::status`], unrecovered.
    pub async fn poll_until_complete_with(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<StatusResponse, MonsterError> {
        let mut attempts: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(MonsterError::Cancelled);
            }

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MonsterError::Cancelled),
                response = self.status(handle) => response?,
            };
            attempts = next_attempt(attempts);
            debug!(
                process_id = %handle.process_id,
                status = ?response.status(),
                attempts,
                "polled task"
            );

            if response.is_completed() {
                info!(process_id = %handle.process_id, attempts, "task completed");
                return Ok(response);
            }

            if let Some(max_attempts) = self.poll_config.max_attempts {
                if attempts >= max_attempts {
                    return Err(MonsterError::PollLimitExceeded { attempts });
                }
            }

            if !self.poll_config.interval.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(MonsterError::Cancelled),
                    _ = sleep(self.poll_config.interval) => {}
                }
            }
        }
    }

    /// Generates images from a prompt and waits for them.
    ///
    /// # Returns
    ///
    /// The result image URLs of the completed task.
    pub async fn text_to_image(
        &self,
        prompt: &str,
        samples: u32,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<String>, MonsterError> {
        let request = GenerationRequest::new(prompt)
            .with_samples(samples)
            .with_aspect_ratio(aspect_ratio);
        let handle = self.submit(&request).await?;
        let done = self.poll_until_complete(&handle).await?;
        Ok(done.output().to_vec())
    }

    /// Downloads a single result image into `dest_dir`.
    ///
    /// The file name is the last path segment of `url`. Credentials are not
    /// sent to the image host.
    pub async fn download_image<P: AsRef<Path>>(
        &self,
        url: &str,
        dest_dir: P,
    ) -> Result<PathBuf, MonsterError> {
        let parsed_url = Url::parse(url)?;
        let file_name = file_name_from_url(&parsed_url);
        self.download_to(parsed_url, dest_dir.as_ref(), &file_name).await
    }

    /// Downloads every output image of a completed task.
    ///
    /// Each file name is prefixed with the output's index, so outputs whose
    /// URLs end in the same segment do not overwrite each other. The vector
    /// is empty if the response carries no output.
    pub async fn download_all_images<P: AsRef<Path>>(
        &self,
        response: &StatusResponse,
        dest_dir: P,
    ) -> Result<Vec<PathBuf>, MonsterError> {
        let mut downloaded_files = Vec::new();
        for (index, url) in response.output().iter().enumerate() {
            let parsed_url = Url::parse(url)?;
            let file_name = format!("{}_{}", index, file_name_from_url(&parsed_url));
            let file_path = self
                .download_to(parsed_url, dest_dir.as_ref(), &file_name)
                .await?;
            downloaded_files.push(file_path);
        }
        Ok(downloaded_files)
    }

    async fn download_to(
        &self,
        url: Url,
        dest_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, MonsterError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MonsterError::ApiError {
                message: format!("Failed to download image: status {}", response.status()),
            });
        }

        fs::create_dir_all(dest_dir).await?;

        let file_path = dest_dir.join(file_name);
        let mut file = fs::File::create(&file_path).await?;
        let content = response.bytes().await?;
        file.write_all(&content).await?;

        debug!(path = %file_path.display(), bytes = content.len(), "downloaded image");
        Ok(file_path)
    }
}

fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("downloaded_image.png")
        .to_string()
}

// Saturates so an unbounded poll never overflows the counter.
fn next_attempt(attempts: u32) -> u32 {
    attempts.saturating_add(1)
}
