//! HTTP transport: keep-alive agents and the retrying fetch loop

pub mod agent;
pub mod error;
pub mod request;
pub mod transport;

pub use agent::{select_agent_options, Agent, AgentOptions, AgentPool, Scheme};
pub use error::FetchError;
pub use request::{FetchInput, PreparedRequest, RequestInit};
pub use transport::RetryingTransport;
