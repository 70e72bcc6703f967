use crate::error::{MissingParameterSnafu, Result};
use snafu::OptionExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

pub mod auth;
pub mod constants;
pub mod executor;
pub mod model;
mod operations;
pub mod service;
pub mod utils;

use self::auth::{AuthSettings, Authorizer, TokenFileAuthorizer};
use self::constants::{DEFAULT_API_BASE_URL, DEFAULT_USER_ID};
use self::executor::RequestExecutor;
use self::model::{FileDescriptor, FileList};
use self::operations::create::DriveCreator;
use self::operations::get::DriveGetter;
use self::operations::list::DriveLister;
use self::operations::trash::DriveTrasher;
use self::operations::{Creator, Getter, Lister, Trasher};
use self::service::{DriveService, HttpDriveService};

pub use self::operations::create::{
    CreateOptions, CreateRequest, CreateTarget, FileResource, MediaSource,
};
pub use self::operations::get::GetOptions;
pub use self::operations::list::ListQuery;
pub use self::operations::trash::{BatchDeleteRequest, TrashMode};

/// Construction parameters for a [`DriveClient`].
///
/// `scopes`, `token_file`, `token_dir` and `client_secret_file` are required; they stay
/// optional here so that loaders can report exactly which one is missing.
#[derive(Debug, Clone, Default)]
pub struct DriveConfig {
    pub scopes: Option<Vec<String>>,
    pub token_file: Option<String>,
    pub token_dir: Option<PathBuf>,
    pub client_secret_file: Option<PathBuf>,
    /// Identity to act as; defaults to `me`.
    pub user_id: Option<String>,
    pub api_base_url: Option<String>,
}

impl DriveConfig {
    pub fn new(
        scopes: Vec<String>,
        token_file: impl Into<String>,
        token_dir: impl Into<PathBuf>,
        client_secret_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scopes: Some(scopes),
            token_file: Some(token_file.into()),
            token_dir: Some(token_dir.into()),
            client_secret_file: Some(client_secret_file.into()),
            user_id: None,
            api_base_url: None,
        }
    }

    /// Check required parameters in a fixed order and build the authorizer settings.
    pub fn auth_settings(&self) -> Result<AuthSettings> {
        let scopes = self
            .scopes
            .clone()
            .filter(|scopes| !scopes.is_empty())
            .context(MissingParameterSnafu { name: "scopes" })?;
        let token_file = self
            .token_file
            .clone()
            .context(MissingParameterSnafu { name: "token_file" })?;
        let token_dir = self
            .token_dir
            .clone()
            .context(MissingParameterSnafu { name: "token_dir" })?;
        let client_secret_file = self
            .client_secret_file
            .clone()
            .context(MissingParameterSnafu {
                name: "client_secret_file",
            })?;

        Ok(AuthSettings {
            scopes,
            token_dir,
            token_file,
            client_secret_file,
            user_id: self
                .user_id
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
        })
    }
}

/// Drive client owning its own authorizer and transport.
///
/// Cheap to clone; clones share the authorizer's token state. Operations may run
/// concurrently on the same client.
#[derive(Clone)]
pub struct DriveClient {
    executor: RequestExecutor,
    user_id: String,
}

impl DriveClient {
    pub fn new(config: DriveConfig) -> Result<Self> {
        let settings = config.auth_settings()?;
        let http = reqwest::Client::builder().build()?;
        let base_url = config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL);
        let user_id = settings.user_id.clone();

        let authorizer = Arc::new(TokenFileAuthorizer::new(settings, http.clone()));
        let service = Arc::new(HttpDriveService::new(http, base_url));
        Ok(Self {
            executor: RequestExecutor::new(authorizer, service),
            user_id,
        })
    }

    /// Build a client from any authorizer and transport.
    pub fn with_parts(authorizer: Arc<dyn Authorizer>, service: Arc<dyn DriveService>) -> Self {
        Self {
            executor: RequestExecutor::new(authorizer, service),
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }

    /// Abort in-flight and pending calls once `cancel` turns `true`.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.executor = self.executor.with_cancel(cancel);
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn create_file(&self, options: CreateOptions) -> Result<FileDescriptor> {
        log::debug!(
            "create_file user={} folder={} local_file={:?} name={:?}",
            self.user_id,
            options.is_folder,
            options.local_file,
            options.resource.name
        );
        let request = CreateRequest::try_from(options)?;
        DriveCreator::new(self.executor.clone())
            .create(request)
            .await
    }

    pub async fn get_file(&self, options: &GetOptions) -> Result<FileDescriptor> {
        log::debug!(
            "get_file user={} file_id={} fields={:?}",
            self.user_id,
            options.file_id,
            options.ret_fields
        );
        DriveGetter::new(self.executor.clone()).get(options).await
    }

    /// First page of matching files; the continuation token is dropped.
    pub async fn list_files(&self, query: &ListQuery) -> Result<Vec<FileDescriptor>> {
        log::debug!(
            "list_files user={} q={:?} spaces={:?}",
            self.user_id,
            query.query,
            query.spaces
        );
        DriveLister::new(self.executor.clone()).list(query).await
    }

    pub async fn list_files_page(&self, query: &ListQuery) -> Result<FileList> {
        log::debug!(
            "list_files_page user={} q={:?} page_token={:?}",
            self.user_id,
            query.query,
            query.page_token
        );
        DriveLister::new(self.executor.clone())
            .list_page(query)
            .await
    }

    pub async fn list_all_files(&self, query: &ListQuery) -> Result<Vec<FileDescriptor>> {
        log::debug!(
            "list_all_files user={} q={:?} spaces={:?}",
            self.user_id,
            query.query,
            query.spaces
        );
        DriveLister::new(self.executor.clone())
            .list_all(query)
            .await
    }

    /// Trash or delete `file_ids` in order, stopping at the first failure.
    pub async fn trash_files(
        &self,
        file_ids: &[String],
        mode: TrashMode,
    ) -> Result<Vec<Option<FileDescriptor>>> {
        log::debug!(
            "trash_files user={} files_count={} mode={:?}",
            self.user_id,
            file_ids.len(),
            mode
        );
        let request = BatchDeleteRequest {
            file_ids: file_ids.to_vec(),
            mode,
        };
        DriveTrasher::new(self.executor.clone())
            .trash(&request)
            .await
    }
}
