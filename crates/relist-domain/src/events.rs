//! Write-path lifecycle events
//!
//! Emitted by the (external) write path whenever a listing changes. The
//! search core consumes them to invalidate derived cache data; re-indexing
//! the secondary engine stays the write path's responsibility.

use serde::{Deserialize, Serialize};

use crate::value_objects::ListingId;

/// A change to an authoritative listing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingEvent {
    Created(ListingId),
    Updated(ListingId),
    Deleted(ListingId),
}

impl ListingEvent {
    /// The listing the event refers to
    pub fn listing_id(&self) -> ListingId {
        match self {
            ListingEvent::Created(id) | ListingEvent::Updated(id) | ListingEvent::Deleted(id) => {
                *id
            }
        }
    }
}
