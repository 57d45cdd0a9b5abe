//! Keep-alive connection agents
//!
//! An [`Agent`] is a reqwest client tuned from [`AgentConfig`], bound to one
//! URL scheme. [`AgentPool::select_agent`] builds a fresh agent on every
//! call: limits and timeouts are therefore per call, and no connection is
//! reused across logical requests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use devportal_domain::AgentConfig;
use reqwest::{Client as ReqwestClient, Request, Response};
use tokio::sync::Semaphore;
use url::Url;

use super::error::FetchError;

/// Protocol scheme an agent serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// `https` (case-insensitive) selects [`Scheme::Https`]; anything else is
    /// plain HTTP.
    #[must_use]
    pub fn from_scheme_str(scheme: &str) -> Self {
        if scheme.trim_end_matches(':').eq_ignore_ascii_case("https") {
            Self::Https
        } else {
            Self::Http
        }
    }

    /// Scheme of `url`.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_scheme_str(url.scheme())
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Https => f.write_str("https"),
        }
    }
}

/// Options handed to an agent. Field values are copied from
/// [`AgentConfig`] unchanged; `None` means "unset".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    /// Always `true`.
    pub keep_alive: bool,
    pub free_socket_timeout: Option<u64>,
    pub keep_alive_msecs: Option<u64>,
    pub max_free_sockets: Option<usize>,
    pub max_sockets: Option<usize>,
    pub socket_active_ttl: Option<u64>,
    pub timeout: Option<u64>,
}

/// Map configuration onto agent options, forcing keep-alive on.
#[must_use]
pub fn select_agent_options(config: &AgentConfig) -> AgentOptions {
    AgentOptions {
        keep_alive: true,
        free_socket_timeout: config.free_socket_timeout,
        keep_alive_msecs: config.keep_alive_msecs,
        max_free_sockets: config.max_free_sockets,
        max_sockets: config.max_sockets,
        socket_active_ttl: config.socket_active_ttl,
        timeout: config.timeout,
    }
}

/// Connection agent for one scheme.
#[derive(Clone)]
pub struct Agent {
    scheme: Scheme,
    client: ReqwestClient,
    sockets: Option<Arc<Semaphore>>,
}

impl Agent {
    /// Build an agent for `scheme`.
    ///
    /// Option mapping onto the reqwest pool:
    /// - free socket timeout and socket active TTL bound the idle pool
    ///   timeout (the smaller one wins)
    /// - keep-alive interval sets TCP keep-alive probes
    /// - max free sockets caps idle connections per host
    /// - per-socket timeout becomes the read timeout
    /// - max sockets caps requests in flight through this agent
    pub fn build(scheme: Scheme, options: &AgentOptions) -> Result<Self, reqwest::Error> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if scheme == Scheme::Https {
            builder = builder.https_only(true);
        }

        let idle_timeout = match (options.free_socket_timeout, options.socket_active_ttl) {
            (Some(free), Some(ttl)) => Some(free.min(ttl)),
            (free, ttl) => free.or(ttl),
        };
        if let Some(ms) = idle_timeout {
            builder = builder.pool_idle_timeout(Duration::from_millis(ms));
        }
        if options.keep_alive {
            if let Some(ms) = options.keep_alive_msecs {
                builder = builder.tcp_keepalive(Duration::from_millis(ms));
            }
        }
        if let Some(max_free) = options.max_free_sockets {
            builder = builder.pool_max_idle_per_host(max_free);
        }
        if let Some(ms) = options.timeout {
            builder = builder.read_timeout(Duration::from_millis(ms));
        }

        // a zero cap would block every request forever
        let sockets = options.max_sockets.map(|max| Arc::new(Semaphore::new(max.max(1))));

        Ok(Self { scheme, client: builder.build()?, sockets })
    }

    /// Scheme this agent was built for.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Send one request through the agent.
    pub async fn execute(&self, request: Request) -> Result<Response, FetchError> {
        let _permit = match &self.sockets {
            Some(sockets) => Some(
                sockets
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| FetchError::InvalidRequest("agent socket limiter closed".into()))?,
            ),
            None => None,
        };

        self.client.execute(request).await.map_err(FetchError::Network)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("scheme", &self.scheme)
            .field("max_sockets", &self.sockets.as_ref().map(|s| s.available_permits()))
            .finish_non_exhaustive()
    }
}

/// Builds agents from one immutable configuration.
#[derive(Debug, Clone)]
pub struct AgentPool {
    options: AgentOptions,
}

impl AgentPool {
    /// Pool building agents from `config`.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self { options: select_agent_options(config) }
    }

    /// Options every agent of this pool is built with.
    #[must_use]
    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    /// Build a fresh agent for `scheme`. Nothing is shared with agents
    /// returned by earlier calls.
    pub fn select_agent(&self, scheme: Scheme) -> Result<Agent, reqwest::Error> {
        Agent::build(scheme, &self.options)
    }
}
