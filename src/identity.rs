//! The active user identity.
//!
//! `IdentitySource` publishes the signed-in user (or `None`) over a
//! `tokio::sync::watch` channel. The scheduler follows it to decide when to
//! migrate ownerless data, start syncing and stop syncing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("User id must not be empty")]
    Empty,
}

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Observable holder of the current identity.
#[derive(Debug, Clone)]
pub struct IdentitySource {
    tx: Arc<watch::Sender<Option<UserId>>>,
}

impl IdentitySource {
    pub fn new(initial: Option<UserId>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn current(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    /// True iff `user` is still the signed-in identity.
    pub fn is_current(&self, user: &UserId) -> bool {
        self.tx.borrow().as_ref() == Some(user)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }

    /// Replace the identity. Returns false (and notifies nobody) when the
    /// value did not change.
    pub fn set(&self, next: Option<UserId>) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    pub fn sign_in(&self, user: UserId) -> bool {
        self.set(Some(user))
    }

    pub fn sign_out(&self) -> bool {
        self.set(None)
    }
}

impl Default for IdentitySource {
    fn default() -> Self {
        Self::anonymous()
    }
}
