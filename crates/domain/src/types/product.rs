//! Product types

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Product that subscriptions are scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
    pub state: ProductState,
    pub subscription_required: Option<bool>,
}

/// Publication state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductState {
    Published,
    NotPublished,
}

impl_domain_status_conversions!(ProductState {
    Published => "published",
    NotPublished => "notPublished",
});
