//! User and group types

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Developer account registered in the API Management instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Short user id (last segment of the resource id)
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub state: UserState,
    pub note: Option<String>,
    pub registration_date: Option<String>,
}

/// Account state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Active,
    Blocked,
    Pending,
    Deleted,
}

impl_domain_status_conversions!(UserState {
    Active => "active",
    Blocked => "blocked",
    Pending => "pending",
    Deleted => "deleted",
});

/// Payload of a create-or-update user call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsert {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub note: Option<String>,
    pub state: Option<UserState>,
}

/// Group a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
    pub built_in: bool,
    pub kind: GroupType,
}

/// Origin of a group: built into the service, user-defined or external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Custom,
    System,
    External,
}

impl_domain_status_conversions!(GroupType {
    Custom => "custom",
    System => "system",
    External => "external",
});
