//! Subscription and subscription key types

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::{resource_name, Group, User};

/// Subscription granting a user access to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub display_name: Option<String>,
    /// Resource id of the owning user, absent for service-level
    /// subscriptions.
    pub owner_id: Option<String>,
    /// Resource id of the product (or API) the subscription is scoped to
    pub scope: String,
    pub state: SubscriptionState,
    pub state_comment: Option<String>,
    pub created_date: Option<String>,
}

impl Subscription {
    /// Short id of the owning user.
    pub fn owner_user_id(&self) -> Option<&str> {
        self.owner_id.as_deref().map(resource_name)
    }

    /// Short id of the product this subscription is scoped to.
    pub fn product_id(&self) -> &str {
        resource_name(&self.scope)
    }
}

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    Suspended,
    Active,
    Expired,
    Submitted,
    Rejected,
    Cancelled,
}

impl_domain_status_conversions!(SubscriptionState {
    Suspended => "suspended",
    Active => "active",
    Expired => "expired",
    Submitted => "submitted",
    Rejected => "rejected",
    Cancelled => "cancelled",
});

/// Payload of a create-or-update subscription call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpsert {
    pub owner_id: String,
    pub product_id: String,
    pub display_name: String,
    pub state: Option<SubscriptionState>,
}

/// Full secret pair of a subscription.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionKeys {
    pub primary_key: String,
    pub secondary_key: String,
}

impl std::fmt::Debug for SubscriptionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionKeys")
            .field("primary_key", &"<redacted>")
            .field("secondary_key", &"<redacted>")
            .finish()
    }
}

/// Which half of the secret pair to regenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Primary,
    Secondary,
}

impl_domain_status_conversions!(KeyType {
    Primary => "primary",
    Secondary => "secondary",
});

/// Owner of a subscription together with the owner's groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOwner {
    pub subscription: Subscription,
    pub user: User,
    pub groups: Vec<Group>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const SERVICE: &str =
        "/subscriptions/x/resourceGroups/rg/providers/Microsoft.ApiManagement/service/apim";

    fn subscription(owner_id: Option<&str>) -> Subscription {
        Subscription {
            id: "sub-1".into(),
            display_name: Some("my service".into()),
            owner_id: owner_id.map(str::to_string),
            scope: format!("{SERVICE}/products/starter"),
            state: SubscriptionState::Active,
            state_comment: None,
            created_date: None,
        }
    }

    #[test]
    fn owner_and_product_ids_are_short_names() {
        let owner = format!("{SERVICE}/users/jdoe");
        let sub = subscription(Some(&owner));
        assert_eq!(sub.owner_user_id(), Some("jdoe"));
        assert_eq!(sub.product_id(), "starter");
    }

    #[test]
    fn missing_owner_is_none() {
        assert_eq!(subscription(None).owner_user_id(), None);
    }

    #[test]
    fn key_type_round_trips_through_wire_string() {
        assert_eq!(KeyType::from_str("PRIMARY").unwrap(), KeyType::Primary);
        assert_eq!(KeyType::Secondary.to_string(), "secondary");
    }

    #[test]
    fn keys_are_redacted_in_debug_output() {
        let keys =
            SubscriptionKeys { primary_key: "p-secret".into(), secondary_key: "s-secret".into() };
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("secret"));
    }
}
