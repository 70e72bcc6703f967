use crate::drive::executor::RequestExecutor;
use crate::drive::model::{FileDescriptor, FileList, ListFilesCall};
use crate::drive::utils::fields::join_fields;
use crate::error::Result;

/// Search parameters for files.list. Every field is optional; an empty query lists
/// everything visible in the default space.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Drive search expression, e.g. `name contains 'report'`.
    pub query: Option<String>,
    pub spaces: Option<String>,
    pub ret_fields: Vec<String>,
    pub page_token: Option<String>,
}

impl ListQuery {
    fn to_call(&self) -> ListFilesCall {
        ListFilesCall {
            q: self.query.clone(),
            spaces: self.spaces.clone(),
            fields: join_fields(&self.ret_fields),
            page_token: self.page_token.clone(),
        }
    }
}

/// Trait for searching files in Drive.
pub trait Lister {
    /// Fetch a single page, including the continuation token.
    async fn list_page(&self, query: &ListQuery) -> Result<FileList>;

    /// Fetch a single page and return only its files.
    ///
    /// The continuation token is discarded; use [`Lister::list_all`] when results may
    /// span more than one page.
    async fn list(&self, query: &ListQuery) -> Result<Vec<FileDescriptor>> {
        Ok(self.list_page(query).await?.files)
    }

    /// Follow continuation tokens until the service reports no further pages.
    ///
    /// A field selection must include `nextPageToken` for paging to continue.
    async fn list_all(&self, query: &ListQuery) -> Result<Vec<FileDescriptor>>;
}

pub struct DriveLister {
    executor: RequestExecutor,
}

impl DriveLister {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }
}

impl Lister for DriveLister {
    async fn list_page(&self, query: &ListQuery) -> Result<FileList> {
        let call = query.to_call();
        self.executor
            .execute(move |service, credential| async move {
                service.list_files(&credential, call).await
            })
            .await
    }

    async fn list_all(&self, query: &ListQuery) -> Result<Vec<FileDescriptor>> {
        let mut files = Vec::new();
        let mut page_token = query.page_token.clone();
        loop {
            let page = self
                .list_page(&ListQuery {
                    page_token,
                    ..query.clone()
                })
                .await?;
            log::debug!(
                "list_all page files={} more={}",
                page.files.len(),
                page.next_page_token.is_some()
            );
            files.extend(page.files);
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(files),
            }
        }
    }
}
