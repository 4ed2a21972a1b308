/// Notifier configuration: where reports go and how they are delivered
use url::Url;

use crate::error::NotifierError;

/// Endpoint the local receiver listens on
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/browser-data";

/// How a report is handed to the transport.
///
/// Only one policy exists: a single attempt per activation, the response
/// status is not inspected, failures are logged and the event is dropped.
/// There is no retry, no queue and no backpressure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryPolicy {
    #[default]
    FireAndForget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    pub endpoint: Url,
    pub delivery: DeliveryPolicy,
}

impl NotifierConfig {
    /// Build a config that reports to `endpoint` (must be http or https)
    pub fn with_endpoint(endpoint: &str) -> Result<NotifierConfig, NotifierError> {
        let parsed = Url::parse(endpoint).map_err(|e| NotifierError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NotifierError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        Ok(NotifierConfig {
            endpoint: parsed,
            delivery: DeliveryPolicy::FireAndForget,
        })
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        NotifierConfig {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            delivery: DeliveryPolicy::FireAndForget,
        }
    }
}
