/// Tab Reporter - Chrome Extension that reports the active tab to a local endpoint
/// Built with Rust + WASM

pub mod config;
pub mod error;
pub mod host;
pub mod notifier;
pub mod tab_data;

#[cfg(target_arch = "wasm32")]
mod chrome;

#[cfg(not(target_arch = "wasm32"))]
pub mod http;
#[cfg(not(target_arch = "wasm32"))]
pub mod receiver;

#[cfg(target_arch = "wasm32")]
pub use browser::*;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;

    use crate::chrome::{ChromeTabs, FetchTransport};
    use crate::config::NotifierConfig;
    use crate::notifier::Notifier;

    // Set up panic hook for better error messages in the browser console
    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());
    }

    /// Report every activated tab to the default endpoint
    #[wasm_bindgen]
    pub fn start_background() {
        listen(NotifierConfig::default());
    }

    /// Report every activated tab to `endpoint`
    #[wasm_bindgen]
    pub fn start_background_with_endpoint(endpoint: &str) -> Result<(), JsValue> {
        let config = NotifierConfig::with_endpoint(endpoint)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        listen(config);
        Ok(())
    }

    fn listen(config: NotifierConfig) {
        let notifier = Rc::new(Notifier::new(ChromeTabs, FetchTransport, config));
        notifier.register(spawn_local);
    }
}
