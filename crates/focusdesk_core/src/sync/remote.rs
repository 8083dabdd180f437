//! Abstract remote document store contract.
//!
//! # Responsibility
//! - Define how the bridge writes to and subscribes to per-user documents,
//!   independent of any hosted backend.
//!
//! # Invariants
//! - `merge_write` touches only the fields the payload carries.
//! - Subscriptions deliver the current document on attach, then every
//!   subsequent update, until the returned guard is cancelled or dropped.

use crate::model::payload::{RemoteDocument, SyncPayload};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote-operation failure envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Stable machine-readable code, e.g. `backend_unavailable`.
    pub code: String,
    /// Human-readable description for diagnostics.
    pub message: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "remote error [{}]: {}", self.code, self.message)
    }
}

impl Error for RemoteError {}

/// Callback invoked on every remote document update. `None` means the
/// document does not exist yet.
pub type RemoteCallback = Arc<dyn Fn(Option<&RemoteDocument>) + Send + Sync>;

/// Per-user remote document store.
pub trait RemoteStore: Send + Sync {
    /// Merge-writes the payload into the user's document: the four payload
    /// fields are overwritten, any other remote fields stay untouched.
    fn merge_write(&self, user_id: &str, payload: &SyncPayload) -> RemoteResult<()>;

    /// Subscribes to the user's document. The callback fires once with the
    /// current document, then on every update, until the guard goes away.
    fn subscribe(&self, user_id: &str, on_change: RemoteCallback)
        -> RemoteResult<RemoteSubscription>;
}

/// Active subscription guard; dropping it releases the subscription.
pub struct RemoteSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl RemoteSubscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Explicitly releases the subscription (sign-out path).
    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for RemoteSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for RemoteSubscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSubscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
