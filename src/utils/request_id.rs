//! Request identifier generation.
//!
//! Identifiers are random UUID v4 values in hyphenated lowercase form, e.g.
//! `3f1c2a9e-8d4b-4c6f-9a1e-2b7d5c0e4f11`.

use uuid::Uuid;

/// Header carrying the request identifier in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates a new random request identifier (UUID v4).
///
/// Backed by the operating system's CSPRNG through `uuid`, so collisions are
/// negligible at any realistic request volume.
///
/// # Examples
///
/// ```ignore
/// let id = new_req_id();
/// assert_eq!(id.len(), 36);
/// assert_eq!(&id[14..15], "4");
/// ```
pub fn new_req_id() -> String {
    Uuid::new_v4().to_string()
}
