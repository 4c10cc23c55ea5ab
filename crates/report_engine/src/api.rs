use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::filename::safe_download_name;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::types::SubmitBody;
use crate::{ClientError, FailureKind, FormField, FormValue, ProgressSnapshot, SubmitOutcome};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Server root; endpoints are resolved below its path.
    pub base_url: String,
    pub poll_interval: Duration,
    pub connect_timeout: Option<Duration>,
    /// `None` leaves individual requests unbounded.
    pub request_timeout: Option<Duration>,
    /// Send multipart even when no field is a file.
    pub force_multipart: bool,
    pub output_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            poll_interval: Duration::from_millis(1000),
            connect_timeout: Some(Duration::from_secs(10)),
            request_timeout: None,
            force_multipart: false,
            output_dir: PathBuf::from("downloads"),
        }
    }
}

#[async_trait::async_trait]
pub trait ProgressApi: Send + Sync {
    /// `POST /process` with the form fields.
    async fn submit(&self, fields: &[FormField]) -> Result<SubmitOutcome, ClientError>;

    /// `GET /progress/{task_id}`.
    async fn poll(&self, task_id: &str) -> Result<ProgressSnapshot, ClientError>;

    /// `GET /download/{result_file}`, saved under `dir`. Returns the written path.
    async fn download(&self, result_file: &str, dir: &Path) -> Result<PathBuf, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestProgressApi {
    settings: ClientSettings,
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestProgressApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be a base url"),
            ));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn wants_multipart(&self, fields: &[FormField]) -> bool {
        self.settings.force_multipart || fields.iter().any(FormField::is_file)
    }
}

#[async_trait::async_trait]
impl ProgressApi for ReqwestProgressApi {
    async fn submit(&self, fields: &[FormField]) -> Result<SubmitOutcome, ClientError> {
        let url = self.endpoint(&["process"])?;
        engine_info!("Submitting {} field(s) to {}", fields.len(), url);

        let request = self.client.post(url);
        let request = if self.wants_multipart(fields) {
            request.multipart(build_multipart(fields).await?)
        } else {
            let pairs: Vec<(&str, &str)> = fields
                .iter()
                .filter_map(|field| match &field.value {
                    FormValue::Text(value) => Some((field.name.as_str(), value.as_str())),
                    FormValue::File(_) => None,
                })
                .collect();
            request.form(&pairs)
        };

        let response = request.send().await.map_err(map_reqwest_error)?;
        let body: SubmitBody = decode_json(response).await?;
        Ok(body.into())
    }

    async fn poll(&self, task_id: &str) -> Result<ProgressSnapshot, ClientError> {
        let url = self.endpoint(&["progress", task_id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let snapshot: ProgressSnapshot = decode_json(response).await?;
        engine_debug!(task = task_id; "status={:?} percent={:?}", snapshot.status, snapshot.percent);
        Ok(snapshot)
    }

    async fn download(&self, result_file: &str, dir: &Path) -> Result<PathBuf, ClientError> {
        // `/` inside the name stays a path separator, matching the displayed link.
        let segments: Vec<&str> = std::iter::once("download")
            .chain(result_file.split('/'))
            .collect();
        let url = self.endpoint(&segments)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let filename = safe_download_name(result_file);
        let mut pending = AtomicFileWriter::new(dir.to_path_buf())
            .begin(&filename)
            .map_err(persist_error)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            pending.append(&chunk).map_err(persist_error)?;
        }

        let written = pending.written();
        let path = pending.commit().map_err(persist_error)?;
        engine_info!("Saved {} bytes to {:?}", written, path);
        Ok(path)
    }
}

async fn build_multipart(fields: &[FormField]) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for field in fields {
        form = match &field.value {
            FormValue::Text(value) => form.text(field.name.clone(), value.clone()),
            FormValue::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|err| {
                    ClientError::new(FailureKind::Io, format!("{}: {err}", path.display()))
                })?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| field.name.clone());
                form.part(field.name.clone(), Part::bytes(bytes).file_name(file_name))
            }
        };
    }
    Ok(form)
}

/// The server reports application errors in the JSON body, so the body is
/// decoded whatever the status. The status only matters when decoding fails.
async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ClientError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        )),
        Err(err) => Err(ClientError::new(FailureKind::Decode, err.to_string())),
    }
}

fn persist_error(err: PersistError) -> ClientError {
    ClientError::new(FailureKind::Io, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::Decode, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
