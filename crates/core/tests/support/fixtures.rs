//! Resource fixtures

use devportal_domain::{
    Group, GroupType, Product, ProductState, Subscription, SubscriptionKeys, SubscriptionState,
    User, UserState,
};

const SERVICE_ID: &str =
    "/subscriptions/azure-sub/resourceGroups/rg/providers/Microsoft.ApiManagement/service/apim";

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        state: UserState::Active,
        note: None,
        registration_date: None,
    }
}

pub fn group(id: &str) -> Group {
    Group {
        id: id.to_string(),
        display_name: id.to_uppercase(),
        description: None,
        built_in: false,
        kind: GroupType::Custom,
    }
}

pub fn subscription(id: &str, owner: Option<&str>) -> Subscription {
    Subscription {
        id: id.to_string(),
        display_name: Some(format!("service {id}")),
        owner_id: owner.map(|user_id| format!("{SERVICE_ID}/users/{user_id}")),
        scope: format!("{SERVICE_ID}/products/starter"),
        state: SubscriptionState::Active,
        state_comment: None,
        created_date: None,
    }
}

pub fn product(id: &str) -> Product {
    Product {
        id: id.to_string(),
        display_name: id.to_string(),
        description: None,
        state: ProductState::Published,
        subscription_required: Some(true),
    }
}

pub fn keys(primary: &str, secondary: &str) -> SubscriptionKeys {
    SubscriptionKeys { primary_key: primary.to_string(), secondary_key: secondary.to_string() }
}
