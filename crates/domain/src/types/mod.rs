//! Remote API Management resource types

pub mod product;
pub mod subscription;
pub mod user;

use serde::{Deserialize, Serialize};

pub use product::{Product, ProductState};
pub use subscription::{
    KeyType, Subscription, SubscriptionKeys, SubscriptionOwner, SubscriptionState,
    SubscriptionUpsert,
};
pub use user::{Group, GroupType, User, UserState, UserUpsert};

/// Offset/limit hints for a bounded listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl PageRequest {
    /// Request `limit` items starting at `offset`.
    #[must_use]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset: Some(offset), limit: Some(limit) }
    }
}

/// Last segment of an ARM resource id (`/.../users/jdoe` → `jdoe`).
///
/// Plain names are returned unchanged.
pub fn resource_name(resource_id: &str) -> &str {
    resource_id.trim_end_matches('/').rsplit('/').next().unwrap_or(resource_id)
}
