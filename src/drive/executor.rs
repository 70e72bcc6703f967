// Authorize-then-invoke wrapper shared by every Drive operation
use crate::drive::auth::{Authorizer, Credential};
use crate::drive::service::DriveService;
use crate::error::{CancelledSnafu, Error, OAuthSnafu, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs remote calls only after a credential has been obtained.
///
/// Authorization failures come back as [`Error::AuthorizationFailed`] and the remote call
/// is never attempted. Remote results pass through untouched. An attached cancellation
/// signal aborts whichever of the two steps is in flight.
#[derive(Clone)]
pub struct RequestExecutor {
    authorizer: Arc<dyn Authorizer>,
    service: Arc<dyn DriveService>,
    cancel: Option<watch::Receiver<bool>>,
}

impl RequestExecutor {
    pub fn new(authorizer: Arc<dyn Authorizer>, service: Arc<dyn DriveService>) -> Self {
        Self {
            authorizer,
            service,
            cancel: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn DriveService>, Credential) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let credential = self
            .guard(self.authorizer.authorize())
            .await
            .and_then(|credential| {
                if credential.is_expired() {
                    OAuthSnafu {
                        reason: "authorizer returned an expired credential",
                    }
                    .fail()
                } else {
                    Ok(credential)
                }
            })
            .map_err(|e| match e {
                Error::Cancelled => e,
                other => Error::AuthorizationFailed {
                    source: Box::new(other),
                },
            })?;

        self.guard(op(self.service.clone(), credential)).await
    }

    async fn guard<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let Some(mut cancel) = self.cancel.clone() else {
            return fut.await;
        };
        if *cancel.borrow_and_update() {
            return CancelledSnafu.fail();
        }

        tokio::select! {
            result = fut => result,
            _ = wait_for_cancel(&mut cancel) => CancelledSnafu.fail(),
        }
    }
}

async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    loop {
        if cancel.changed().await.is_err() {
            // Sender gone: cancellation can no longer be requested.
            std::future::pending::<()>().await;
        }
        if *cancel.borrow() {
            return;
        }
    }
}
