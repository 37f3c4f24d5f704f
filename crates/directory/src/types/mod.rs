//! Shared types for the directory client.
//!
//! Errors, session events, and the request/response payloads exchanged with
//! the directory endpoints.

pub mod errors;
pub mod events;
pub mod requests;
pub mod responses;

pub use errors::{DirectoryError, DirectoryResult};
pub use events::SessionEvent;
pub use requests::*;
pub use responses::*;

/// Directory identifier of a user, class or school.
pub type DirectoryId = String;
