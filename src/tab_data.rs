/// Data structures for Tab Reporter
use serde::{Deserialize, Serialize};

use crate::error::NotifierError;

/// Opaque identifier the browser assigns to a tab
pub type TabId = i32;

/// Payload of `chrome.tabs.onActivated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabActivation {
    pub tab_id: TabId,
    #[serde(default)]
    pub window_id: Option<i32>,
}

impl TabActivation {
    pub fn new(tab_id: TabId) -> TabActivation {
        TabActivation {
            tab_id,
            window_id: None,
        }
    }
}

/// Information about a browser tab, as returned by `chrome.tabs.get`.
///
/// `url` and `title` are absent when the extension lacks the `tabs`
/// permission for that tab; they default to empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabInfo {
    #[serde(default)]
    pub id: Option<TabId>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl TabInfo {
    pub fn new(id: TabId, url: String, title: String) -> TabInfo {
        TabInfo {
            id: Some(id),
            url,
            title,
        }
    }
}

/// Body of the POST sent for each activated tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub url: String,
    pub title: String,
}

impl ReportPayload {
    pub fn from_tab(tab: &TabInfo) -> ReportPayload {
        ReportPayload {
            url: tab.url.clone(),
            title: tab.title.clone(),
        }
    }

    /// Serialize as `{"url":...,"title":...}`
    pub fn to_json(&self) -> Result<String, NotifierError> {
        Ok(serde_json::to_string(self)?)
    }
}
