//! Resource envelopes of the Azure Resource Manager API Management surface
//!
//! Every resource arrives as `{ id, name, properties }` and every listing as
//! `{ value, nextLink }`. Only the domain types leave this module; the
//! `name` segment becomes the domain `id`.

use devportal_domain::{
    Group, GroupType, Product, ProductState, Subscription, SubscriptionState, SubscriptionUpsert,
    User, UserState, UserUpsert,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct Resource<P> {
    pub name: String,
    pub properties: P,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Collection<P> {
    #[serde(default = "Vec::new")]
    pub value: Vec<Resource<P>>,
    pub next_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Envelope<P> {
    pub properties: P,
}

/* -------------------------------------------------------------------------- */
/* Users and groups */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserProperties {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub state: UserState,
    pub note: Option<String>,
    pub registration_date: Option<String>,
}

impl From<Resource<UserProperties>> for User {
    fn from(resource: Resource<UserProperties>) -> Self {
        let p = resource.properties;
        Self {
            id: resource.name,
            email: p.email,
            first_name: p.first_name,
            last_name: p.last_name,
            state: p.state,
            note: p.note,
            registration_date: p.registration_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserWriteProperties<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<UserState>,
}

impl<'a> From<&'a UserUpsert> for Envelope<UserWriteProperties<'a>> {
    fn from(user: &'a UserUpsert) -> Self {
        Self {
            properties: UserWriteProperties {
                email: &user.email,
                first_name: &user.first_name,
                last_name: &user.last_name,
                note: user.note.as_deref(),
                state: user.state,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupProperties {
    pub display_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub built_in: bool,
    #[serde(rename = "type")]
    pub kind: GroupType,
}

impl From<Resource<GroupProperties>> for Group {
    fn from(resource: Resource<GroupProperties>) -> Self {
        let p = resource.properties;
        Self {
            id: resource.name,
            display_name: p.display_name,
            description: p.description,
            built_in: p.built_in,
            kind: p.kind,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Products */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductProperties {
    pub display_name: String,
    pub description: Option<String>,
    /// Absent for products that were never published.
    pub state: Option<ProductState>,
    pub subscription_required: Option<bool>,
}

impl From<Resource<ProductProperties>> for Product {
    fn from(resource: Resource<ProductProperties>) -> Self {
        let p = resource.properties;
        Self {
            id: resource.name,
            display_name: p.display_name,
            description: p.description,
            state: p.state.unwrap_or(ProductState::NotPublished),
            subscription_required: p.subscription_required,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Subscriptions */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionProperties {
    pub owner_id: Option<String>,
    pub scope: String,
    pub display_name: Option<String>,
    pub state: SubscriptionState,
    pub state_comment: Option<String>,
    pub created_date: Option<String>,
}

impl From<Resource<SubscriptionProperties>> for Subscription {
    fn from(resource: Resource<SubscriptionProperties>) -> Self {
        let p = resource.properties;
        Self {
            id: resource.name,
            display_name: p.display_name,
            owner_id: p.owner_id,
            scope: p.scope,
            state: p.state,
            state_comment: p.state_comment,
            created_date: p.created_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionWriteProperties<'a> {
    pub owner_id: String,
    pub scope: String,
    pub display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SubscriptionState>,
}

impl<'a> From<&'a SubscriptionUpsert> for Envelope<SubscriptionWriteProperties<'a>> {
    fn from(subscription: &'a SubscriptionUpsert) -> Self {
        Self {
            properties: SubscriptionWriteProperties {
                owner_id: relative_id("users", &subscription.owner_id),
                scope: relative_id("products", &subscription.product_id),
                display_name: &subscription.display_name,
                state: subscription.state,
            },
        }
    }
}

/// `/users/{id}` style reference; full resource ids are kept as given.
fn relative_id(collection: &str, id: &str) -> String {
    if id.starts_with('/') {
        id.to_string()
    } else {
        format!("/{collection}/{id}")
    }
}
