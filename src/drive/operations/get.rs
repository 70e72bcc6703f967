use crate::drive::executor::RequestExecutor;
use crate::drive::model::{FileDescriptor, GetFileCall};
use crate::drive::utils::fields::join_fields;
use crate::error::{InvalidArgumentSnafu, Result};
use snafu::ensure;

/// Options for fetching a single file.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub file_id: String,
    pub ret_fields: Vec<String>,
}

impl GetOptions {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            ret_fields: Vec::new(),
        }
    }
}

/// Trait for fetching file metadata from Drive.
pub trait Getter {
    /// Fetch one file by id.
    ///
    /// # Arguments
    /// * `options` - File id and optional field selection
    ///
    /// # Returns
    /// * `Result<FileDescriptor>` - The file, limited to the selected fields
    async fn get(&self, options: &GetOptions) -> Result<FileDescriptor>;
}

pub struct DriveGetter {
    executor: RequestExecutor,
}

impl DriveGetter {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }
}

impl Getter for DriveGetter {
    async fn get(&self, options: &GetOptions) -> Result<FileDescriptor> {
        ensure!(
            !options.file_id.trim().is_empty(),
            InvalidArgumentSnafu {
                reason: "a file id is required",
            }
        );

        let call = GetFileCall {
            file_id: options.file_id.clone(),
            fields: join_fields(&options.ret_fields),
        };
        self.executor
            .execute(move |service, credential| async move {
                service.get_file(&credential, call).await
            })
            .await
    }
}
