//! Caller identity and the ownership guard used by the services.

use thiserror::Error;

/// The user a request was authenticated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    user_id: u64,
}

impl Identity {
    pub fn new(user_id: u64) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn owns(&self, owner_id: u64) -> bool {
        self.user_id == owner_id
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("user {caller} may not modify {resource} owned by user {owner}")]
pub struct NotOwner {
    pub caller: u64,
    pub owner: u64,
    pub resource: &'static str,
}

/// Fails unless `identity` is `owner_id`.
pub fn ensure_owner(
    identity: &Identity,
    resource: &'static str,
    owner_id: u64,
) -> Result<(), NotOwner> {
    if identity.owns(owner_id) {
        Ok(())
    } else {
        Err(NotOwner {
            caller: identity.user_id,
            owner: owner_id,
            resource,
        })
    }
}
