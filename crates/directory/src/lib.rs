//! # Class Admin Directory Crate
//!
//! Client-side core of the school directory administration: entities built
//! from the directory API, the REST service that loads and edits them, the
//! list filter/sort engine, and the delegates that drive one admin session.
//!
//! ## Architecture
//!
//! - **Entities**: User, ClassRoom, School, Network, Group, UserDetails
//! - **Services**: `DirectoryService` and the request tracker
//! - **Listing**: search, sort and account state of user lists
//! - **Delegates**: menu, user list, actions and the composing session
//! - **Context**: collaborator traits (preferences, notifications, translation)
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use classadmin_config::ApiConfig;
//! use classadmin_directory::{
//!     ClassAdminSession, DirectoryService, InMemoryPreferences, KeyTranslator, Operator,
//!     TracingNotifier,
//! };
//!
//! # async fn run() -> Result<(), classadmin_directory::DirectoryError> {
//! let service = DirectoryService::new(&ApiConfig::default())?;
//! let mut session = ClassAdminSession::new(
//!     service,
//!     Arc::new(InMemoryPreferences::new()),
//!     Arc::new(TracingNotifier),
//!     Arc::new(KeyTranslator),
//!     Operator::default(),
//! );
//! session.init().await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod delegates;
pub mod entities;
pub mod listing;
pub mod services;
pub mod types;
pub mod utils;

pub use context::{
    CatalogTranslator, InMemoryPreferences, KeyTranslator, Notifier, Operator, PreferenceStore,
    TracingNotifier, Translator, SELECTED_CLASS_PREFERENCE,
};
pub use delegates::{ActionsDelegate, ClassAdminSession, MenuDelegate, UserListDelegate};
pub use entities::{
    filter_groups, ClassRoom, Group, GroupType, Network, School, SchoolRef, User, UserDetails,
    UserSource, UserType,
};
pub use listing::{display_code, find_users, users_for_type, AccountState, SortColumn, UserSort};
pub use services::{ClassLoader, DirectoryService, LoadOutcome, RequestTracker};
pub use types::{
    DirectoryError, DirectoryResult, FetchClassOptions, FetchNetworkOptions, ImportRequest,
    ResetDestination, SessionEvent,
};
