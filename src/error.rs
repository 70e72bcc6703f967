use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Gdrive Model - required parameter not set: {name}"))]
    MissingParameter { name: &'static str },

    #[snafu(display("Invalid argument: {reason}"))]
    InvalidArgument { reason: String },

    #[snafu(display("Authorization failed: {source}"))]
    AuthorizationFailed { source: Box<Error> },

    #[snafu(display("OAuth error: {reason}"))]
    OAuth { reason: String },

    #[snafu(display("Drive API returned HTTP {status}: {message}"))]
    RemoteService { status: u16, message: String },

    #[snafu(display("The Drive API returned an error when {action} file {file_id}: {source}"))]
    BatchStepFailed {
        action: String,
        file_id: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to read local file '{}': {source}", path.display()))]
    LocalRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Operation cancelled"))]
    Cancelled,

    #[snafu(display("HTTP error: {source}"))]
    Http { source: reqwest::Error },

    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

impl Error {
    /// Errors that end a batch without being attributed to the file being processed.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Error::AuthorizationFailed { .. } | Error::Cancelled)
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Http { source: error }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}
