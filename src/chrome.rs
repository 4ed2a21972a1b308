/// Browser host: chrome.tabs for events and lookups, fetch for delivery
use async_trait::async_trait;
use log::{debug, error};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response, Window, WorkerGlobalScope};

use crate::error::NotifierError;
use crate::host::{ActivationHandler, ReportTransport, TabHost};
use crate::tab_data::{TabActivation, TabId, TabInfo};

// Import JS bridge functions
#[wasm_bindgen(module = "/background_bridge.js")]
extern "C" {
    fn addTabActivatedListener(callback: &js_sys::Function);

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: TabId) -> Result<JsValue, JsValue>;
}

pub struct ChromeTabs;

#[async_trait(?Send)]
impl TabHost for ChromeTabs {
    fn on_tab_activated(&self, handler: ActivationHandler) {
        let callback = Closure::wrap(Box::new(move |active_info: JsValue| {
            match parse_activation(active_info) {
                Ok(event) => handler(event),
                Err(e) => error!("Failed to parse activation event: {:?}", e),
            }
        }) as Box<dyn Fn(JsValue)>);

        addTabActivatedListener(callback.as_ref().unchecked_ref());
        // The listener lives as long as the service worker
        callback.forget();
    }

    async fn get_tab_info(&self, tab_id: TabId) -> Result<TabInfo, NotifierError> {
        let tab_js = getTab(tab_id)
            .await
            .map_err(|e| NotifierError::lookup(tab_id, format!("{:?}", e)))?;

        parse_tab(tab_id, tab_js)
    }
}

fn parse_activation(active_info: JsValue) -> Result<TabActivation, serde_wasm_bindgen::Error> {
    serde_wasm_bindgen::from_value(active_info)
}

fn parse_tab(tab_id: TabId, tab_js: JsValue) -> Result<TabInfo, NotifierError> {
    serde_wasm_bindgen::from_value(tab_js)
        .map_err(|e| NotifierError::lookup(tab_id, format!("Failed to parse tab: {:?}", e)))
}

pub struct FetchTransport;

#[async_trait(?Send)]
impl ReportTransport for FetchTransport {
    async fn post_json(&self, endpoint: &Url, body: String) -> Result<(), NotifierError> {
        let request = build_request(endpoint, &body)?;
        let response = JsFuture::from(fetch(&request)?)
            .await
            .map_err(|e| NotifierError::network(endpoint.as_str(), format!("{:?}", e)))?;

        if let Ok(response) = response.dyn_into::<Response>() {
            debug!("{} answered {}", endpoint, response.status());
        }
        Ok(())
    }
}

fn build_request(endpoint: &Url, body: &str) -> Result<Request, NotifierError> {
    let to_network = |e: JsValue| NotifierError::network(endpoint.as_str(), format!("{:?}", e));

    let headers = Headers::new().map_err(to_network)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(to_network)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(body));

    Request::new_with_str_and_init(endpoint.as_str(), &init).map_err(to_network)
}

/// `fetch` from either a service worker or a background page
fn fetch(request: &Request) -> Result<js_sys::Promise, NotifierError> {
    let global = js_sys::global();
    if let Some(worker) = global.dyn_ref::<WorkerGlobalScope>() {
        Ok(worker.fetch_with_request(request))
    } else if let Some(window) = global.dyn_ref::<Window>() {
        Ok(window.fetch_with_request(request))
    } else {
        Err(NotifierError::network(request.url(), "No fetch available in this context"))
    }
}
