/// Native report transport over reqwest (rustls for https endpoints)
use std::error::Error as _;

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::NotifierError;
use crate::host::ReportTransport;

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl ReportTransport for HttpTransport {
    async fn post_json(&self, endpoint: &Url, body: String) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| NotifierError::network(endpoint.as_str(), describe(&e)))?;

        debug!("{} answered {}", endpoint, response.status());
        Ok(())
    }
}

/// reqwest's top-level message omits the cause; append the source chain
fn describe(e: &reqwest::Error) -> String {
    let mut reason = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}
