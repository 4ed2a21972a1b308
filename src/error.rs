/// Errors raised while reporting an activated tab
use thiserror::Error;

use crate::tab_data::TabId;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("failed to look up tab {tab_id}: {reason}")]
    Lookup { tab_id: TabId, reason: String },

    #[error("failed to send report to {endpoint}: {reason}")]
    Network { endpoint: String, reason: String },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl NotifierError {
    pub fn lookup(tab_id: TabId, reason: impl Into<String>) -> NotifierError {
        NotifierError::Lookup {
            tab_id,
            reason: reason.into(),
        }
    }

    pub fn network(endpoint: impl Into<String>, reason: impl Into<String>) -> NotifierError {
        NotifierError::Network {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
