//! Ownership policy ("author or read-only").
//!
//! Reads are open to everyone; every mutation goes through one of the guards
//! below before the store is touched.

use thiserror::Error;

use yatube_blog::Authored;
use yatube_core::Entity;

use crate::Identity;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication credentials were not provided")]
    NotAuthenticated,

    #[error("you do not have permission to modify this {0}")]
    NotOwner(&'static str),
}

/// `true` iff `identity` authored `record`.
pub fn can_write<R: Authored>(identity: &Identity, record: &R) -> bool {
    identity.username() == record.author()
}

/// Reject anonymous callers.
pub fn require_authenticated(identity: Option<&Identity>) -> Result<&Identity, AuthzError> {
    identity.ok_or(AuthzError::NotAuthenticated)
}

/// Reject anonymous callers and everyone but the record's author.
pub fn require_owner<'a, R>(identity: Option<&'a Identity>, record: &R) -> Result<&'a Identity, AuthzError>
where
    R: Authored + Entity,
{
    let identity = require_authenticated(identity)?;
    if can_write(identity, record) {
        Ok(identity)
    } else {
        tracing::debug!(
            kind = R::KIND,
            user = %identity.username(),
            author = %record.author(),
            "ownership check failed"
        );
        Err(AuthzError::NotOwner(R::KIND))
    }
}
