//! In-memory `ManagementClient`
//!
//! Listings are served from fixed pages; every call and every polled page is
//! recorded so tests can assert on what the façade asked for.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use devportal_core::{ListOptions, ManagementClient, PageStream, ServiceScope};
use devportal_domain::{
    Group, Product, RestError, Subscription, SubscriptionKeys, SubscriptionUpsert, User,
    UserUpsert,
};
use futures::stream::{self, StreamExt};

/// How a scripted operation fails.
#[derive(Clone)]
pub enum Failure {
    Status(RestError),
    Opaque(String),
}

impl Failure {
    fn to_error(&self) -> anyhow::Error {
        match self {
            Self::Status(rest) => anyhow::Error::new(rest.clone()),
            Self::Opaque(message) => anyhow!(message.clone()),
        }
    }
}

#[derive(Default)]
pub struct FakeManagementClient {
    pub users: HashMap<String, User>,
    pub subscriptions: HashMap<String, Subscription>,
    pub user_pages: Vec<Vec<User>>,
    pub group_pages: Vec<Vec<Group>>,
    pub subscription_pages: Vec<Vec<Subscription>>,
    pub product_pages: Vec<Vec<Product>>,
    pub keys: Mutex<Option<SubscriptionKeys>>,
    failures: HashMap<&'static str, Failure>,
    calls: Mutex<Vec<String>>,
    options: Mutex<Vec<ListOptions>>,
    pages_polled: Arc<AtomicUsize>,
}

impl FakeManagementClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.insert(subscription.id.clone(), subscription);
        self
    }

    pub fn with_keys(self, keys: SubscriptionKeys) -> Self {
        *self.keys.lock().unwrap() = Some(keys);
        self
    }

    /// Make `operation` fail with `failure` every time it is called.
    pub fn failing(mut self, operation: &'static str, failure: Failure) -> Self {
        self.failures.insert(operation, failure);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, operation: &str) -> bool {
        self.calls().iter().any(|call| call == operation)
    }

    pub fn list_options(&self) -> Vec<ListOptions> {
        self.options.lock().unwrap().clone()
    }

    pub fn pages_polled(&self) -> usize {
        self.pages_polled.load(Ordering::SeqCst)
    }

    fn record(&self, operation: &'static str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(operation.to_string());
        match self.failures.get(operation) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn pages<T: Send + 'static>(
        &self,
        operation: &'static str,
        pages: &[Vec<T>],
        options: Option<ListOptions>,
    ) -> PageStream<T>
    where
        T: Clone,
    {
        if let Some(options) = options {
            self.options.lock().unwrap().push(options);
        }
        if let Err(err) = self.record(operation) {
            return stream::once(async move { Err(err) }).boxed();
        }

        let polled = self.pages_polled.clone();
        stream::iter(pages.to_vec())
            .map(move |page| {
                polled.fetch_add(1, Ordering::SeqCst);
                Ok(page)
            })
            .boxed()
    }

    fn not_found(kind: &str, id: &str) -> anyhow::Error {
        anyhow::Error::new(RestError::not_found(format!("{kind} {id} not found")))
    }
}

#[async_trait]
impl ManagementClient for FakeManagementClient {
    async fn get_user(&self, _scope: &ServiceScope, user_id: &str) -> anyhow::Result<User> {
        self.record("get_user")?;
        self.users.get(user_id).cloned().ok_or_else(|| Self::not_found("user", user_id))
    }

    fn list_users(&self, _scope: &ServiceScope, options: ListOptions) -> PageStream<User> {
        self.pages("list_users", &self.user_pages, Some(options))
    }

    fn list_user_groups(&self, _scope: &ServiceScope, _user_id: &str) -> PageStream<Group> {
        self.pages("list_user_groups", &self.group_pages, None)
    }

    fn list_user_subscriptions(
        &self,
        _scope: &ServiceScope,
        _user_id: &str,
        options: ListOptions,
    ) -> PageStream<Subscription> {
        self.pages("list_user_subscriptions", &self.subscription_pages, Some(options))
    }

    fn list_products(&self, _scope: &ServiceScope, options: ListOptions) -> PageStream<Product> {
        self.pages("list_products", &self.product_pages, Some(options))
    }

    async fn get_subscription(
        &self,
        _scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<Subscription> {
        self.record("get_subscription")?;
        self.subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| Self::not_found("subscription", subscription_id))
    }

    async fn list_subscription_secrets(
        &self,
        _scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<SubscriptionKeys> {
        self.record("list_subscription_secrets")?;
        self.keys
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Self::not_found("subscription", subscription_id))
    }

    async fn create_or_update_user(
        &self,
        _scope: &ServiceScope,
        user_id: &str,
        user: &UserUpsert,
    ) -> anyhow::Result<User> {
        self.record("create_or_update_user")?;
        Ok(User {
            id: user_id.to_string(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            state: user.state.unwrap_or(devportal_domain::UserState::Active),
            note: user.note.clone(),
            registration_date: None,
        })
    }

    async fn create_or_update_subscription(
        &self,
        _scope: &ServiceScope,
        subscription_id: &str,
        subscription: &SubscriptionUpsert,
    ) -> anyhow::Result<Subscription> {
        self.record("create_or_update_subscription")?;
        Ok(Subscription {
            id: subscription_id.to_string(),
            display_name: Some(subscription.display_name.clone()),
            owner_id: Some(format!("/users/{}", subscription.owner_id)),
            scope: format!("/products/{}", subscription.product_id),
            state: subscription.state.unwrap_or(devportal_domain::SubscriptionState::Active),
            state_comment: None,
            created_date: None,
        })
    }

    async fn regenerate_primary_key(
        &self,
        _scope: &ServiceScope,
        _subscription_id: &str,
    ) -> anyhow::Result<()> {
        self.record("regenerate_primary_key")?;
        if let Some(keys) = self.keys.lock().unwrap().as_mut() {
            keys.primary_key = format!("{}-rotated", keys.primary_key);
        }
        Ok(())
    }

    async fn regenerate_secondary_key(
        &self,
        _scope: &ServiceScope,
        _subscription_id: &str,
    ) -> anyhow::Result<()> {
        self.record("regenerate_secondary_key")?;
        if let Some(keys) = self.keys.lock().unwrap().as_mut() {
            keys.secondary_key = format!("{}-rotated", keys.secondary_key);
        }
        Ok(())
    }
}
