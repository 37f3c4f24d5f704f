//! Directory REST service.
//!
//! `DirectoryService` talks to the backend; the import and user-details
//! operations live in their own modules as further `impl` blocks. The request
//! tracker guards shared slots against stale completions.

pub mod directory_service;
pub mod import;
pub mod request_tracker;
pub mod user_details;

pub use directory_service::DirectoryService;
pub use import::{interpret_import_error, IMPORT_ALREADY_EXISTS};
pub use request_tracker::{ClassLoader, LoadOutcome, RequestTicket, RequestTracker};
