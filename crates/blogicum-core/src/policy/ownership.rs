//! Ownership gate for edits and deletions.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Viewer;

/// Result of a mutation that only the owner may perform.
///
/// `Denied` is not an error: nothing was changed and the caller is
/// expected to send the requester back with a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome<T> {
    Done(T),
    Denied,
}

/// Only the owner may touch a resource.
pub fn is_owner(requester: Viewer, owner_id: Uuid) -> bool {
    requester.is(owner_id)
}
