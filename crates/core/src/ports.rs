//! Port interface to the remote API Management service
//!
//! The façade in [`crate::service`] only ever talks to the service through
//! [`ManagementClient`]. Implementations must be safe to share across tasks:
//! they hold no per-call state, so one `Arc<dyn ManagementClient>` can serve
//! concurrent callers.

use async_trait::async_trait;
use devportal_domain::{
    Group, Product, Subscription, SubscriptionKeys, SubscriptionUpsert, User, UserUpsert,
};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

/// Finite, non-restartable stream of result pages.
///
/// Each poll issues at most one remote request. Dropping the stream stops
/// the listing; pages that were never polled are never fetched.
pub type PageStream<T> = BoxStream<'static, anyhow::Result<Vec<T>>>;

/// Resource group and service instance every call is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceScope {
    pub resource_group: String,
    pub service_name: String,
}

impl ServiceScope {
    #[must_use]
    pub fn new(resource_group: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self { resource_group: resource_group.into(), service_name: service_name.into() }
    }
}

/// Query options of a listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// `$filter` expression
    pub filter: Option<String>,
    /// `$top` hint
    pub top: Option<u32>,
    /// `$skip` hint
    pub skip: Option<u32>,
}

impl ListOptions {
    /// Options carrying only a `$filter` expression.
    #[must_use]
    pub fn filtered(filter: impl Into<String>) -> Self {
        Self { filter: Some(filter.into()), ..Self::default() }
    }
}

/// Remote management API.
///
/// Errors are `anyhow::Error`. A failure that carries an HTTP status must be
/// (or wrap) a [`devportal_domain::RestError`]; the façade coerces anything
/// else to a 500.
#[async_trait]
pub trait ManagementClient: Send + Sync {
    async fn get_user(&self, scope: &ServiceScope, user_id: &str) -> anyhow::Result<User>;

    fn list_users(&self, scope: &ServiceScope, options: ListOptions) -> PageStream<User>;

    fn list_user_groups(&self, scope: &ServiceScope, user_id: &str) -> PageStream<Group>;

    fn list_user_subscriptions(
        &self,
        scope: &ServiceScope,
        user_id: &str,
        options: ListOptions,
    ) -> PageStream<Subscription>;

    fn list_products(&self, scope: &ServiceScope, options: ListOptions) -> PageStream<Product>;

    async fn get_subscription(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<Subscription>;

    async fn list_subscription_secrets(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<SubscriptionKeys>;

    async fn create_or_update_user(
        &self,
        scope: &ServiceScope,
        user_id: &str,
        user: &UserUpsert,
    ) -> anyhow::Result<User>;

    async fn create_or_update_subscription(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
        subscription: &SubscriptionUpsert,
    ) -> anyhow::Result<Subscription>;

    async fn regenerate_primary_key(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<()>;

    async fn regenerate_secondary_key(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<()>;
}

/// Flatten a page stream into a lazy item stream.
///
/// A page is only requested once every item of the previous page has been
/// consumed.
pub fn items<T: Send + 'static>(pages: PageStream<T>) -> BoxStream<'static, anyhow::Result<T>> {
    pages.map_ok(|page| stream::iter(page.into_iter().map(Ok))).try_flatten().boxed()
}
