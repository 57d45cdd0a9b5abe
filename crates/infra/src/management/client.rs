//! REST implementation of the management port
//!
//! Talks to the Azure Resource Manager API Management endpoints through the
//! retrying transport. Resources live under
//!
//! ```text
//! {endpoint}/subscriptions/{id}/resourceGroups/{rg}
//!     /providers/Microsoft.ApiManagement/service/{name}
//! ```

use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use devportal_core::ports::{ListOptions, ManagementClient, PageStream, ServiceScope};
use devportal_domain::{
    ConfigError, Group, ManagementConfig, Product, Subscription, SubscriptionKeys,
    SubscriptionUpsert, User, UserUpsert,
};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use super::auth::AccessTokenProvider;
use super::wire::{
    Collection, Envelope, GroupProperties, ProductProperties, Resource, SubscriptionProperties,
    UserProperties,
};
use crate::errors::IntoRemoteError;
use crate::http::{RequestInit, RetryingTransport};

const PROVIDER_NAMESPACE: &str = "Microsoft.ApiManagement";

/// Management API client; cheap to clone.
#[derive(Clone)]
pub struct RestManagementClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: RetryingTransport,
    auth: Arc<dyn AccessTokenProvider>,
    endpoint: Url,
    azure_subscription_id: String,
    api_version: String,
}

impl fmt::Debug for RestManagementClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestManagementClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("azure_subscription_id", &self.inner.azure_subscription_id)
            .field("api_version", &self.inner.api_version)
            .finish_non_exhaustive()
    }
}

impl RestManagementClient {
    /// Create a client for the Azure subscription named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the endpoint is not an absolute
    /// http(s) URL.
    pub fn new(
        config: &ManagementConfig,
        transport: RetryingTransport,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ConfigError> {
        let invalid =
            |reason: String| ConfigError::InvalidValue { name: "arm_endpoint".into(), reason };

        let endpoint = Url::parse(&config.arm_endpoint).map_err(|e| invalid(e.to_string()))?;
        if endpoint.cannot_be_a_base() || !matches!(endpoint.scheme(), "http" | "https") {
            return Err(invalid(format!("{endpoint} is not an http(s) base URL")));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                auth,
                endpoint,
                azure_subscription_id: config.azure_subscription_id.clone(),
                api_version: config.api_version.clone(),
            }),
        })
    }

    /// URL of `segments` below the service resource, with `api-version` set.
    fn resource_url(&self, scope: &ServiceScope, segments: &[&str]) -> anyhow::Result<Url> {
        let inner = &self.inner;
        let mut url = inner.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("management endpoint {} cannot be a base URL", inner.endpoint))?
            .pop_if_empty()
            .extend([
                "subscriptions",
                inner.azure_subscription_id.as_str(),
                "resourceGroups",
                scope.resource_group.as_str(),
                "providers",
                PROVIDER_NAMESPACE,
                "service",
                scope.service_name.as_str(),
            ])
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", &inner.api_version);
        Ok(url)
    }

    fn list_url(
        &self,
        scope: &ServiceScope,
        segments: &[&str],
        options: &ListOptions,
    ) -> anyhow::Result<Url> {
        let mut url = self.resource_url(scope, segments)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(filter) = &options.filter {
                query.append_pair("$filter", filter);
            }
            if let Some(top) = options.top {
                query.append_pair("$top", &top.to_string());
            }
            if let Some(skip) = options.skip {
                query.append_pair("$skip", &skip.to_string());
            }
        }
        Ok(url)
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> anyhow::Result<Response> {
        let token = self
            .inner
            .auth
            .access_token()
            .await
            .context("failed to acquire management access token")?;

        let mut init = RequestInit::new()
            .method(method.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .bearer_auth(&token)
            .map_err(IntoRemoteError::into_remote)?;
        if let Some(body) = body {
            init = init.json(body).map_err(IntoRemoteError::into_remote)?;
        }

        debug!(%method, url = %url, "management API request");
        self.inner.transport.fetch(url, init).await.map_err(IntoRemoteError::into_remote)
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> anyhow::Result<T> {
        let response = self.send(method, url, body).await?;
        response.json::<T>().await.map_err(IntoRemoteError::into_remote)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> anyhow::Result<T> {
        self.send_json::<T, ()>(Method::GET, url, None).await
    }

    /// Listing that requests one page per poll, following `nextLink`.
    fn paged<P, T>(&self, first: anyhow::Result<Url>) -> PageStream<T>
    where
        P: DeserializeOwned + Send + 'static,
        T: From<Resource<P>> + Send + 'static,
    {
        let client = self.clone();
        stream::try_unfold(Some(first), move |next| {
            let client = client.clone();
            async move {
                let Some(url) = next else {
                    return Ok(None);
                };
                let page: Collection<P> = client.get_json(url?).await?;
                debug!(
                    items = page.value.len(),
                    has_next = page.next_link.is_some(),
                    "listing page"
                );

                let next = page.next_link.map(|link| {
                    Url::parse(&link).with_context(|| format!("invalid nextLink {link}"))
                });
                let items: Vec<T> = page.value.into_iter().map(T::from).collect();
                Ok::<_, anyhow::Error>(Some((items, next)))
            }
        })
        .boxed()
    }
}

#[async_trait]
impl ManagementClient for RestManagementClient {
    #[instrument(skip(self, scope))]
    async fn get_user(&self, scope: &ServiceScope, user_id: &str) -> anyhow::Result<User> {
        let url = self.resource_url(scope, &["users", user_id])?;
        let resource: Resource<UserProperties> = self.get_json(url).await?;
        Ok(resource.into())
    }

    fn list_users(&self, scope: &ServiceScope, options: ListOptions) -> PageStream<User> {
        self.paged::<UserProperties, User>(self.list_url(scope, &["users"], &options))
    }

    fn list_user_groups(&self, scope: &ServiceScope, user_id: &str) -> PageStream<Group> {
        let url = self.list_url(scope, &["users", user_id, "groups"], &ListOptions::default());
        self.paged::<GroupProperties, Group>(url)
    }

    fn list_user_subscriptions(
        &self,
        scope: &ServiceScope,
        user_id: &str,
        options: ListOptions,
    ) -> PageStream<Subscription> {
        let url = self.list_url(scope, &["users", user_id, "subscriptions"], &options);
        self.paged::<SubscriptionProperties, Subscription>(url)
    }

    fn list_products(&self, scope: &ServiceScope, options: ListOptions) -> PageStream<Product> {
        self.paged::<ProductProperties, Product>(self.list_url(scope, &["products"], &options))
    }

    #[instrument(skip(self, scope))]
    async fn get_subscription(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<Subscription> {
        let url = self.resource_url(scope, &["subscriptions", subscription_id])?;
        let resource: Resource<SubscriptionProperties> = self.get_json(url).await?;
        Ok(resource.into())
    }

    #[instrument(skip(self, scope))]
    async fn list_subscription_secrets(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<SubscriptionKeys> {
        let url = self.resource_url(scope, &["subscriptions", subscription_id, "listSecrets"])?;
        self.send_json::<SubscriptionKeys, ()>(Method::POST, url, None).await
    }

    #[instrument(skip(self, scope, user))]
    async fn create_or_update_user(
        &self,
        scope: &ServiceScope,
        user_id: &str,
        user: &UserUpsert,
    ) -> anyhow::Result<User> {
        let url = self.resource_url(scope, &["users", user_id])?;
        let resource: Resource<UserProperties> =
            self.send_json(Method::PUT, url, Some(&Envelope::from(user))).await?;
        Ok(resource.into())
    }

    #[instrument(skip(self, scope, subscription))]
    async fn create_or_update_subscription(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
        subscription: &SubscriptionUpsert,
    ) -> anyhow::Result<Subscription> {
        let url = self.resource_url(scope, &["subscriptions", subscription_id])?;
        let resource: Resource<SubscriptionProperties> =
            self.send_json(Method::PUT, url, Some(&Envelope::from(subscription))).await?;
        Ok(resource.into())
    }

    #[instrument(skip(self, scope))]
    async fn regenerate_primary_key(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<()> {
        let url =
            self.resource_url(scope, &["subscriptions", subscription_id, "regeneratePrimaryKey"])?;
        self.send::<()>(Method::POST, url, None).await?;
        Ok(())
    }

    #[instrument(skip(self, scope))]
    async fn regenerate_secondary_key(
        &self,
        scope: &ServiceScope,
        subscription_id: &str,
    ) -> anyhow::Result<()> {
        let segments = ["subscriptions", subscription_id, "regenerateSecondaryKey"];
        let url = self.resource_url(scope, &segments)?;
        self.send::<()>(Method::POST, url, None).await?;
        Ok(())
    }
}
