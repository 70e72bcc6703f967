// Error conversion helpers and wrapping macro for Snafu-based errors
use crate::error::Error;

/// Convert different error types into our unified Error type.
pub trait IntoDriveError {
    fn into_error(self) -> Error;
}

impl IntoDriveError for Error {
    fn into_error(self) -> Error {
        self
    }
}

impl IntoDriveError for reqwest::Error {
    fn into_error(self) -> Error {
        self.into()
    }
}

impl IntoDriveError for std::io::Error {
    fn into_error(self) -> Error {
        self.into()
    }
}

/// Macro to wrap a Result-producing expression into a Snafu variant with `source: Box<Error>`.
/// Example:
/// wrap_err!(step.await, BatchStepFailed { action: a, file_id: id })?
#[macro_export]
macro_rules! wrap_err {
    ($expr:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        $expr.map_err(|e| {
            let src: $crate::error::Error = $crate::drive::utils::error::IntoDriveError::into_error(e);
            $crate::error::Error::$variant { $($field: $value),*, source: Box::new(src) }
        })
    }};
}
