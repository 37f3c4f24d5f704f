//! Stateful coordinators of the class administration screen.
//!
//! The menu holds the current classroom, the user list holds the tab, search
//! and sort, and the actions delegate answers questions about the current
//! selection. [`ClassAdminSession`] wires them to the directory service.

pub mod actions;
pub mod menu;
pub mod session;
pub mod user_list;

pub use actions::ActionsDelegate;
pub use menu::{resolve_initial_class, MenuDelegate, SELECTED_CLASS_SLOT};
pub use session::ClassAdminSession;
pub use user_list::{selected_users, UserListDelegate};
