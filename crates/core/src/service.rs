//! Typed façade over the remote API Management service
//!
//! Every operation returns `Result<T, RestError>`. Remote failures that carry
//! a status code pass through unchanged; anything else becomes a 500. The
//! façade performs no retries of its own.

use std::sync::Arc;

use devportal_domain::constants::MANAGE_SUBSCRIPTION_PREFIX;
use devportal_domain::{
    Group, KeyType, PageRequest, Product, RestError, Result, Subscription, SubscriptionKeys,
    SubscriptionOwner, SubscriptionUpsert, User, UserUpsert,
};
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::filter::{exclude_prefix_filter, ids_filter, Field, FilterExpression, Operator};
use crate::ports::{items, ListOptions, ManagementClient, PageStream, ServiceScope};

/// Map any remote failure onto the façade's error shape.
///
/// A `RestError` anywhere in the error chain is returned as-is; every other
/// error is coerced to status 500 with its message preserved.
pub fn to_rest_error(err: anyhow::Error) -> RestError {
    if let Some(rest) = err.chain().find_map(|cause| cause.downcast_ref::<RestError>()) {
        return rest.clone();
    }
    RestError::internal(format!("{err:#}"))
}

/// Management façade bound to one service instance.
#[derive(Clone)]
pub struct ManagementService {
    client: Arc<dyn ManagementClient>,
    scope: ServiceScope,
}

impl ManagementService {
    /// Create a façade over an already-authenticated client.
    #[must_use]
    pub fn new(
        client: Arc<dyn ManagementClient>,
        resource_group: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self { client, scope: ServiceScope::new(resource_group, service_name) }
    }

    /// Resource group and service every call is bound to.
    #[must_use]
    pub fn scope(&self) -> &ServiceScope {
        &self.scope
    }

    /// Fetch one user by id.
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.client.get_user(&self.scope, user_id).await.map_err(to_rest_error)
    }

    /// Look a user up by email; `None` when no account matches.
    #[instrument(skip(self, email))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        // email is not part of the filter field set, so the clause is written out
        let options = ListOptions::filtered(format!("email eq '{email}'"));
        first_match(self.client.list_users(&self.scope, options)).await
    }

    /// All groups of a user, in server order.
    #[instrument(skip(self))]
    pub async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>> {
        collect_all(self.client.list_user_groups(&self.scope, user_id)).await
    }

    /// One page of a user's subscriptions.
    ///
    /// `page` is forwarded as `$skip`/`$top` hints, but only the first page
    /// the service returns is read. Results beyond that page are silently
    /// truncated, so large `limit` values may return fewer items than exist.
    #[instrument(skip(self, filter))]
    pub async fn get_user_subscriptions(
        &self,
        user_id: &str,
        page: PageRequest,
        filter: Option<String>,
    ) -> Result<Vec<Subscription>> {
        let options = ListOptions { filter, top: page.limit, skip: page.offset };
        let pages = self.client.list_user_subscriptions(&self.scope, user_id, options);
        read_first_page_only(pages).await
    }

    /// First page of a user's subscriptions whose name does not start with
    /// `prefix`.
    pub async fn get_user_subscriptions_excluding(
        &self,
        user_id: &str,
        page: PageRequest,
        prefix: &str,
    ) -> Result<Vec<Subscription>> {
        let filter = exclude_prefix_filter(Field::Name, prefix);
        self.get_user_subscriptions(user_id, page, Some(filter)).await
    }

    /// First page of a user's subscriptions, without the account-management
    /// ones.
    pub async fn get_service_subscriptions(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Subscription>> {
        self.get_user_subscriptions_excluding(user_id, page, MANAGE_SUBSCRIPTION_PREFIX).await
    }

    /// Every subscription of `user_id` whose name is one of `ids`.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_subscriptions_by_ids<S: AsRef<str> + Sync>(
        &self,
        user_id: &str,
        ids: &[S],
    ) -> Result<Vec<Subscription>> {
        let Some(filter) = ids_filter(Field::Name, ids) else {
            return Ok(Vec::new());
        };
        let options = ListOptions::filtered(filter);
        let pages = self.client.list_user_subscriptions(&self.scope, user_id, options);
        collect_all(pages).await
    }

    /// Fetch one subscription by id.
    #[instrument(skip(self))]
    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.client.get_subscription(&self.scope, subscription_id).await.map_err(to_rest_error)
    }

    /// Current primary and secondary keys of a subscription.
    #[instrument(skip(self))]
    pub async fn get_subscription_keys(&self, subscription_id: &str) -> Result<SubscriptionKeys> {
        self.client
            .list_subscription_secrets(&self.scope, subscription_id)
            .await
            .map_err(to_rest_error)
    }

    /// Look a product up by name; `None` when no product matches.
    #[instrument(skip(self))]
    pub async fn get_product_by_name(&self, product_name: &str) -> Result<Option<Product>> {
        let filter = FilterExpression::new(Field::Name, Operator::Eq, product_name).build();
        first_match(self.client.list_products(&self.scope, ListOptions::filtered(filter))).await
    }

    /// Create the user, or update it in place when it already exists.
    #[instrument(skip(self, user))]
    pub async fn create_or_update_user(&self, user_id: &str, user: &UserUpsert) -> Result<User> {
        let updated = self
            .client
            .create_or_update_user(&self.scope, user_id, user)
            .await
            .map_err(to_rest_error)?;
        info!(user_id, "user upserted");
        Ok(updated)
    }

    /// Create (or update) the subscription linking a user to a product.
    #[instrument(skip(self, subscription), fields(product_id = %subscription.product_id))]
    pub async fn add_subscription_to_product(
        &self,
        subscription_id: &str,
        subscription: &SubscriptionUpsert,
    ) -> Result<Subscription> {
        let created = self
            .client
            .create_or_update_subscription(&self.scope, subscription_id, subscription)
            .await
            .map_err(to_rest_error)?;
        info!(subscription_id, "subscription upserted");
        Ok(created)
    }

    /// Regenerate one key and return the full current key pair.
    #[instrument(skip(self))]
    pub async fn regenerate_key(
        &self,
        subscription_id: &str,
        key_type: KeyType,
    ) -> Result<SubscriptionKeys> {
        let regenerated = match key_type {
            KeyType::Primary => {
                self.client.regenerate_primary_key(&self.scope, subscription_id).await
            }
            KeyType::Secondary => {
                self.client.regenerate_secondary_key(&self.scope, subscription_id).await
            }
        };
        regenerated.map_err(to_rest_error)?;
        info!(subscription_id, %key_type, "subscription key regenerated");

        self.get_subscription_keys(subscription_id).await
    }

    /// Resolve subscription → owner → groups.
    ///
    /// Steps run strictly in order; the first failure is returned unchanged
    /// and later lookups are never issued.
    #[instrument(skip(self))]
    pub async fn get_subscription_owner(&self, subscription_id: &str) -> Result<SubscriptionOwner> {
        let subscription = self.get_subscription(subscription_id).await?;
        let owner_id = subscription.owner_user_id().map(str::to_string).ok_or_else(|| {
            RestError::not_found(format!("subscription {subscription_id} has no owner"))
        })?;
        let user = self.get_user(&owner_id).await?;
        let groups = self.get_user_groups(&user.id).await?;

        Ok(SubscriptionOwner { subscription, user, groups })
    }
}

/// First item of a listing, without pulling the rest of it.
async fn first_match<T: Send + 'static>(pages: PageStream<T>) -> Result<Option<T>> {
    items(pages).try_next().await.map_err(to_rest_error)
}

/// Whole listing, in server order.
async fn collect_all<T: Send + 'static>(pages: PageStream<T>) -> Result<Vec<T>> {
    items(pages).try_collect().await.map_err(to_rest_error)
}

/// Exactly one `next()` on the page stream, then the stream is dropped.
async fn read_first_page_only<T>(mut pages: PageStream<T>) -> Result<Vec<T>> {
    let first = pages.next().await;
    drop(pages);

    match first {
        Some(Ok(page)) => {
            debug!(items = page.len(), "read first page only");
            Ok(page)
        }
        Some(Err(err)) => Err(to_rest_error(err)),
        None => Ok(Vec::new()),
    }
}
