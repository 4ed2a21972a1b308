/// Seams between the notifier and the environment it runs in
use async_trait::async_trait;
use url::Url;

use crate::error::NotifierError;
use crate::tab_data::{TabActivation, TabId, TabInfo};

/// Callback invoked by the host once per activation event
pub type ActivationHandler = Box<dyn Fn(TabActivation)>;

/// Source of tab-activation events and tab metadata.
///
/// In the browser this is `chrome.tabs`; tests supply an in-memory fake.
#[async_trait(?Send)]
pub trait TabHost {
    /// Install `handler` for every future tab-activation event
    fn on_tab_activated(&self, handler: ActivationHandler);

    /// Resolve the current metadata of `tab_id`
    async fn get_tab_info(&self, tab_id: TabId) -> Result<TabInfo, NotifierError>;
}

/// Outbound channel for serialized reports
#[async_trait(?Send)]
pub trait ReportTransport {
    /// POST `body` to `endpoint` with `Content-Type: application/json`.
    /// Makes exactly one attempt.
    async fn post_json(&self, endpoint: &Url, body: String) -> Result<(), NotifierError>;
}
