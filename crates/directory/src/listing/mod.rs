//! List filter and sort engine.
//!
//! Pure functions deriving the visible, ordered part of a class roster from a
//! search term, a user type and a sort column.

pub mod account_state;
pub mod search;
pub mod sort;

pub use account_state::{display_code, display_code_css, AccountState};
pub use search::{find_users, matches_search};
pub use sort::{sort_users, users_for_type, SortColumn, SortDirection, UserSort};
