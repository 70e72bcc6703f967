// Create operation: validation of caller options and the files.create call
use crate::drive::constants::FOLDER_MIME_TYPE;
use crate::drive::executor::RequestExecutor;
use crate::drive::model::{CreateFileCall, FileDescriptor, FileMetadata};
use crate::drive::utils::fields::join_fields;
use crate::drive::utils::path::basename;
use crate::error::{Error, InvalidArgumentSnafu, LocalReadSnafu, Result};
use snafu::{ResultExt, ensure};
use std::path::PathBuf;
use tokio::fs;

/// Metadata the caller wants on the new file.
#[derive(Debug, Clone, Default)]
pub struct FileResource {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Ignored for folders.
    pub mime_type: Option<String>,
    /// Parent folders; only their ids are sent.
    pub parents: Vec<FileDescriptor>,
}

/// Loosely typed create options, as they arrive from the command line or other
/// untyped sources. Converted into a [`CreateRequest`] before anything is sent.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub is_folder: bool,
    /// Path of a local file to upload. Mutually exclusive with `media_body`.
    pub local_file: Option<PathBuf>,
    pub media_body: Option<Vec<u8>>,
    pub resource: FileResource,
    /// Response fields to return; empty returns the service default.
    pub ret_fields: Vec<String>,
}

/// Where the content of a new file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    LocalFile(PathBuf),
    Body(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateTarget {
    Folder,
    File {
        mime_type: Option<String>,
        media: MediaSource,
    },
}

/// Validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub target: CreateTarget,
    pub name: Option<String>,
    pub description: Option<String>,
    pub parents: Vec<String>,
    pub fields: Option<String>,
}

impl TryFrom<CreateOptions> for CreateRequest {
    type Error = Error;

    fn try_from(options: CreateOptions) -> Result<Self> {
        let CreateOptions {
            is_folder,
            local_file,
            media_body,
            resource,
            ret_fields,
        } = options;
        let FileResource {
            name,
            description,
            mime_type,
            parents,
        } = resource;

        let target = if is_folder {
            ensure!(
                local_file.is_none() && media_body.is_none(),
                InvalidArgumentSnafu {
                    reason: "folders cannot carry file content",
                }
            );
            CreateTarget::Folder
        } else {
            let media = match (local_file, media_body) {
                (Some(_), Some(_)) => {
                    return InvalidArgumentSnafu {
                        reason: "Media body and local file path passed",
                    }
                    .fail();
                }
                (Some(path), None) => MediaSource::LocalFile(path),
                (None, Some(body)) => MediaSource::Body(body),
                (None, None) => {
                    return InvalidArgumentSnafu {
                        reason: "either a local file path or a media body is required",
                    }
                    .fail();
                }
            };
            CreateTarget::File { mime_type, media }
        };

        let name = name.or_else(|| match &target {
            CreateTarget::File {
                media: MediaSource::LocalFile(path),
                ..
            } => basename(path),
            _ => None,
        });

        let parents = parents
            .into_iter()
            .enumerate()
            .map(|(index, parent)| {
                parent.id.ok_or_else(|| Error::InvalidArgument {
                    reason: format!("parent at position {index} has no id"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            target,
            name,
            description,
            parents,
            fields: join_fields(&ret_fields),
        })
    }
}

/// Trait for creating files and folders in Drive.
pub trait Creator {
    /// Create a single file or folder.
    ///
    /// # Arguments
    /// * `request` - Validated request; local content is read before authorizing
    ///
    /// # Returns
    /// * `Result<FileDescriptor>` - The created file, limited to the selected fields
    async fn create(&self, request: CreateRequest) -> Result<FileDescriptor>;
}

/// Implementation of Creator on top of the request executor.
pub struct DriveCreator {
    executor: RequestExecutor,
}

impl DriveCreator {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    async fn read_media(media: MediaSource) -> Result<Vec<u8>> {
        match media {
            MediaSource::Body(body) => Ok(body),
            MediaSource::LocalFile(path) => {
                let body = fs::read(&path).await.context(LocalReadSnafu { path: &path })?;
                log::debug!("read {} bytes from {}", body.len(), path.display());
                Ok(body)
            }
        }
    }
}

impl Creator for DriveCreator {
    async fn create(&self, request: CreateRequest) -> Result<FileDescriptor> {
        let CreateRequest {
            target,
            name,
            description,
            parents,
            fields,
        } = request;

        let (mime_type, media) = match target {
            CreateTarget::Folder => (Some(FOLDER_MIME_TYPE.to_string()), None),
            CreateTarget::File { mime_type, media } => {
                (mime_type, Some(Self::read_media(media).await?))
            }
        };

        let call = CreateFileCall {
            metadata: FileMetadata {
                name,
                description,
                mime_type,
                parents,
            },
            media,
            fields,
        };
        self.executor
            .execute(move |service, credential| async move {
                service.create_file(&credential, call).await
            })
            .await
    }
}
