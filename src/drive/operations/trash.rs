// Batch trash/delete: sequential, stops at the first failing file
use crate::drive::constants::TRASH_RESPONSE_FIELDS;
use crate::drive::executor::RequestExecutor;
use crate::drive::model::{FileDescriptor, FilePatch, UpdateFileCall};
use crate::error::{CancelledSnafu, Result};
use crate::wrap_err;

/// What happens to each file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashMode {
    /// Move to the trash; recoverable.
    #[default]
    Trash,
    /// Remove immediately, bypassing the trash.
    Delete,
}

impl TrashMode {
    pub fn from_permanent(permanent: bool) -> Self {
        if permanent { Self::Delete } else { Self::Trash }
    }

    /// Verb used in error messages.
    pub fn action(self) -> &'static str {
        match self {
            Self::Trash => "trashing",
            Self::Delete => "deleting",
        }
    }
}

/// Ordered list of files to trash or delete.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteRequest {
    pub file_ids: Vec<String>,
    pub mode: TrashMode,
}

/// Trait for trashing or deleting a batch of files.
pub trait Trasher {
    /// Process `request.file_ids` strictly in order, one remote call at a time.
    ///
    /// # Returns
    /// * `Ok` - One entry per id, in input order: the `id,trashed` descriptor when
    ///   trashing, `None` when deleting
    /// * `Err` - The first failure; later ids were never attempted and results for
    ///   earlier ids are dropped
    async fn trash(&self, request: &BatchDeleteRequest) -> Result<Vec<Option<FileDescriptor>>>;
}

pub struct DriveTrasher {
    executor: RequestExecutor,
}

impl DriveTrasher {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    async fn trash_one(&self, file_id: &str, mode: TrashMode) -> Result<Option<FileDescriptor>> {
        match mode {
            TrashMode::Delete => {
                let file_id = file_id.to_string();
                self.executor
                    .execute(move |service, credential| async move {
                        service.delete_file(&credential, &file_id).await.map(|()| None)
                    })
                    .await
            }
            TrashMode::Trash => {
                let call = UpdateFileCall {
                    file_id: file_id.to_string(),
                    patch: FilePatch {
                        trashed: Some(true),
                    },
                    fields: Some(TRASH_RESPONSE_FIELDS.to_string()),
                };
                self.executor
                    .execute(move |service, credential| async move {
                        service.update_file(&credential, call).await.map(Some)
                    })
                    .await
            }
        }
    }
}

impl Trasher for DriveTrasher {
    async fn trash(&self, request: &BatchDeleteRequest) -> Result<Vec<Option<FileDescriptor>>> {
        let total = request.file_ids.len();
        let mut responses = Vec::with_capacity(total);

        for (index, file_id) in request.file_ids.iter().enumerate() {
            if self.executor.is_cancelled() {
                log::warn!("batch cancelled before {file_id} ({index}/{total} done)");
                return CancelledSnafu.fail();
            }

            let response = match self.trash_one(file_id, request.mode).await {
                Err(e) if e.is_batch_fatal() => return Err(e),
                outcome => wrap_err!(
                    outcome,
                    BatchStepFailed {
                        action: request.mode.action().to_string(),
                        file_id: file_id.clone()
                    }
                )
                .inspect_err(|_| {
                    log::warn!(
                        "{} {file_id} failed, aborting batch ({index}/{total} done)",
                        request.mode.action()
                    );
                })?,
            };

            log::info!("{} {file_id} ok ({}/{total})", request.mode.action(), index + 1);
            responses.push(response);
        }

        Ok(responses)
    }
}
