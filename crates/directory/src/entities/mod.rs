//! Domain entities for the directory.
//!
//! These are plain data holders built from API payloads. Updates go through
//! the explicit `update_data` patch operations so that values the caller
//! already holds are merged in place rather than replaced.

use serde::{Deserialize, Deserializer};

pub mod classroom;
pub mod group;
pub mod network;
pub mod school;
pub mod user;
pub mod user_details;

pub use classroom::{ClassRoom, ClassRoomPatch};
pub use group::{filter_groups, Group, GroupType};
pub use network::Network;
pub use school::{School, SchoolPatch, SchoolRef};
pub use user::{Hobby, Structure, User, UserPatch, UserSource, UserType, DEFAULT_MOOD};
pub use user_details::{RelativeSummary, UserDetails, UserDetailsUpdate, UserFunction, ADMIN_LOCAL};

/// Decode an explicit `null` the same way as a missing key.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
