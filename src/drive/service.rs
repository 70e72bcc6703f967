// Drive transport: one method per remote verb
use crate::drive::auth::Credential;
use crate::drive::constants::{FILES_PATH, MULTIPART_BOUNDARY, UPLOAD_FILES_PATH};
use crate::drive::model::{
    CreateFileCall, FileDescriptor, FileList, FileMetadata, GetFileCall, ListFilesCall,
    UpdateFileCall,
};
use crate::error::{Error, InvalidArgumentSnafu, RemoteServiceSnafu, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use snafu::ensure;

/// Remote Drive API surface used by the operations.
///
/// Errors returned here are passed through to callers unchanged.
#[async_trait]
pub trait DriveService: Send + Sync {
    async fn create_file(
        &self,
        credential: &Credential,
        call: CreateFileCall,
    ) -> Result<FileDescriptor>;

    async fn get_file(&self, credential: &Credential, call: GetFileCall)
    -> Result<FileDescriptor>;

    async fn list_files(&self, credential: &Credential, call: ListFilesCall) -> Result<FileList>;

    async fn update_file(
        &self,
        credential: &Credential,
        call: UpdateFileCall,
    ) -> Result<FileDescriptor>;

    async fn delete_file(&self, credential: &Credential, file_id: &str) -> Result<()>;
}

/// Drive v3 REST transport.
#[derive(Clone)]
pub struct HttpDriveService {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl HttpDriveService {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn files_url(&self) -> String {
        format!("{}{FILES_PATH}", self.base_url)
    }

    /// URL of one file. The id always becomes a single percent-encoded path segment.
    fn file_url(&self, file_id: &str) -> Result<Url> {
        ensure!(
            !matches!(file_id, "" | "." | ".."),
            InvalidArgumentSnafu {
                reason: format!("invalid file id '{file_id}'"),
            }
        );
        let mut url = Url::parse(&self.files_url()).map_err(|e| Error::InvalidArgument {
            reason: format!("invalid API base URL '{}': {e}", self.base_url),
        })?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidArgument {
                reason: format!("API base URL '{}' cannot carry a path", self.base_url),
            })?
            .push(file_id);
        Ok(url)
    }

    /// Body of a `multipart/related` upload: JSON metadata followed by the raw content.
    fn multipart_body(metadata: &FileMetadata, media: &[u8]) -> Result<Vec<u8>> {
        let content_type = metadata
            .mime_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let mut body = Vec::with_capacity(media.len() + 512);
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&serde_json::to_vec(metadata)?);
        body.extend_from_slice(
            format!("\r\n--{MULTIPART_BOUNDARY}\r\nContent-Type: {content_type}\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(media);
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        Ok(body)
    }

    async fn send(request: RequestBuilder, credential: &Credential) -> Result<Response> {
        let response = request.bearer_auth(credential.access_token()).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
            _ => text,
        };
        RemoteServiceSnafu {
            status: status.as_u16(),
            message,
        }
        .fail()
    }

    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        credential: &Credential,
    ) -> Result<T> {
        let response = Self::send(request, credential).await?;
        Ok(response.json().await?)
    }
}

fn optional_query<'a>(pairs: &[(&'a str, &'a Option<String>)]) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
        .collect()
}

#[async_trait]
impl DriveService for HttpDriveService {
    async fn create_file(
        &self,
        credential: &Credential,
        call: CreateFileCall,
    ) -> Result<FileDescriptor> {
        let query = optional_query(&[("fields", &call.fields)]);
        let request = match &call.media {
            Some(media) => self
                .http
                .post(format!("{}{UPLOAD_FILES_PATH}", self.base_url))
                .query(&[("uploadType", "multipart")])
                .query(&query)
                .header(
                    CONTENT_TYPE,
                    format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(Self::multipart_body(&call.metadata, media)?),
            None => self
                .http
                .post(self.files_url())
                .query(&query)
                .json(&call.metadata),
        };
        Self::send_json(request, credential).await
    }

    async fn get_file(
        &self,
        credential: &Credential,
        call: GetFileCall,
    ) -> Result<FileDescriptor> {
        let request = self
            .http
            .get(self.file_url(&call.file_id)?)
            .query(&[("prettyPrint", "false")])
            .query(&optional_query(&[("fields", &call.fields)]));
        Self::send_json(request, credential).await
    }

    async fn list_files(&self, credential: &Credential, call: ListFilesCall) -> Result<FileList> {
        let query = optional_query(&[
            ("q", &call.q),
            ("spaces", &call.spaces),
            ("fields", &call.fields),
            ("pageToken", &call.page_token),
        ]);
        let request = self.http.get(self.files_url()).query(&query);
        Self::send_json(request, credential).await
    }

    async fn update_file(
        &self,
        credential: &Credential,
        call: UpdateFileCall,
    ) -> Result<FileDescriptor> {
        let request = self
            .http
            .patch(self.file_url(&call.file_id)?)
            .query(&optional_query(&[("fields", &call.fields)]))
            .json(&call.patch);
        Self::send_json(request, credential).await
    }

    async fn delete_file(&self, credential: &Credential, file_id: &str) -> Result<()> {
        let request = self.http.delete(self.file_url(file_id)?);
        Self::send(request, credential).await?;
        Ok(())
    }
}
