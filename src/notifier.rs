/// Tab-activity notifier: reports every activated tab to the configured endpoint
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use log::{debug, error, info};

use crate::config::{DeliveryPolicy, NotifierConfig};
use crate::error::NotifierError;
use crate::host::{ReportTransport, TabHost};
use crate::tab_data::{ReportPayload, TabActivation};

/// Result of handling one activation event
#[derive(Debug)]
pub enum ReportOutcome {
    Sent,
    Dropped(NotifierError),
}

impl ReportOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, ReportOutcome::Sent)
    }
}

pub struct Notifier<H, T> {
    host: H,
    transport: T,
    config: NotifierConfig,
}

impl<H, T> Notifier<H, T>
where
    H: TabHost,
    T: ReportTransport,
{
    pub fn new(host: H, transport: T, config: NotifierConfig) -> Self {
        Notifier {
            host,
            transport,
            config,
        }
    }

    #[cfg(test)]
    fn host(&self) -> &H {
        &self.host
    }

    #[cfg(test)]
    fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscribe to tab activations. Each event becomes its own task,
    /// handed to `spawn`; tasks share nothing mutable and may finish in
    /// any order.
    pub fn register<S>(self: Rc<Self>, spawn: S)
    where
        H: 'static,
        T: 'static,
        S: Fn(LocalBoxFuture<'static, ()>) + 'static,
    {
        let notifier = Rc::clone(&self);
        self.host.on_tab_activated(Box::new(move |event| {
            let notifier = Rc::clone(&notifier);
            spawn(Box::pin(async move {
                notifier.handle_activation(event).await;
            }));
        }));
        debug!("Listening for tab activations, reporting to {}", self.config.endpoint);
    }

    /// Look up the tab, serialize `{url, title}` and send it once.
    /// Failures are logged and the event is dropped.
    pub async fn handle_activation(&self, event: TabActivation) -> ReportOutcome {
        match self.report(event).await {
            Ok(()) => ReportOutcome::Sent,
            Err(e) => {
                error!("Error fetching tab or sending data: {}", e);
                ReportOutcome::Dropped(e)
            }
        }
    }

    async fn report(&self, event: TabActivation) -> Result<(), NotifierError> {
        let tab = self.host.get_tab_info(event.tab_id).await?;
        info!("Current tab info: {:?}", tab);

        let payload = ReportPayload::from_tab(&tab);
        let body = payload.to_json()?;
        info!("Sending URL: {}", payload.url);

        match self.config.delivery {
            DeliveryPolicy::FireAndForget => {
                self.transport.post_json(&self.config.endpoint, body).await?;
            }
        }

        debug!("Reported tab {} to {}", event.tab_id, self.config.endpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ActivationHandler;
    use crate::tab_data::{TabId, TabInfo};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use futures::future::join_all;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use url::Url;

    #[derive(Default)]
    struct FakeTabs {
        tabs: HashMap<TabId, TabInfo>,
        handlers: RefCell<Vec<ActivationHandler>>,
        lookups: Cell<usize>,
    }

    impl FakeTabs {
        fn with_tab(mut self, id: TabId, url: &str, title: &str) -> Self {
            self.tabs
                .insert(id, TabInfo::new(id, url.to_string(), title.to_string()));
            self
        }

        fn fire(&self, tab_id: TabId) {
            for handler in self.handlers.borrow().iter() {
                handler(TabActivation::new(tab_id));
            }
        }
    }

    #[async_trait(?Send)]
    impl TabHost for FakeTabs {
        fn on_tab_activated(&self, handler: ActivationHandler) {
            self.handlers.borrow_mut().push(handler);
        }

        async fn get_tab_info(&self, tab_id: TabId) -> Result<TabInfo, NotifierError> {
            self.lookups.set(self.lookups.get() + 1);
            self.tabs
                .get(&tab_id)
                .cloned()
                .ok_or_else(|| NotifierError::lookup(tab_id, "No tab with id"))
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        sent: RefCell<Vec<(Url, String)>>,
        unreachable_urls: Vec<String>,
    }

    impl FakeTransport {
        fn failing_for(url: &str) -> Self {
            FakeTransport {
                sent: RefCell::new(Vec::new()),
                unreachable_urls: vec![url.to_string()],
            }
        }

        fn payloads(&self) -> Vec<ReportPayload> {
            self.sent
                .borrow()
                .iter()
                .map(|(_, body)| serde_json::from_str(body).unwrap())
                .collect()
        }
    }

    #[async_trait(?Send)]
    impl ReportTransport for FakeTransport {
        async fn post_json(&self, endpoint: &Url, body: String) -> Result<(), NotifierError> {
            let payload: ReportPayload = serde_json::from_str(&body).unwrap();
            self.sent.borrow_mut().push((endpoint.clone(), body));
            if self.unreachable_urls.contains(&payload.url) {
                return Err(NotifierError::network(endpoint.as_str(), "Connection refused"));
            }
            Ok(())
        }
    }

    fn create_notifier(tabs: FakeTabs, transport: FakeTransport) -> Notifier<FakeTabs, FakeTransport> {
        Notifier::new(tabs, transport, NotifierConfig::default())
    }

    #[test]
    fn test_reports_resolved_tab() {
        let tabs = FakeTabs::default().with_tab(42, "https://example.com", "Example");
        let notifier = create_notifier(tabs, FakeTransport::default());

        let outcome = block_on(notifier.handle_activation(TabActivation::new(42)));

        assert!(outcome.is_sent());
        let sent = notifier.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.as_str(), "http://127.0.0.1:5000/browser-data");
        assert_eq!(sent[0].1, r#"{"url":"https://example.com","title":"Example"}"#);
    }

    #[test]
    fn test_reports_to_configured_endpoint() {
        let tabs = FakeTabs::default().with_tab(1, "https://github.com", "GitHub");
        let config = NotifierConfig::with_endpoint("http://localhost:9000/tabs").unwrap();
        let notifier = Notifier::new(tabs, FakeTransport::default(), config);

        block_on(notifier.handle_activation(TabActivation::new(1)));

        let sent = notifier.transport().sent.borrow();
        assert_eq!(sent[0].0.as_str(), "http://localhost:9000/tabs");
    }

    #[test]
    fn test_same_tab_serializes_identically() {
        let tabs = FakeTabs::default().with_tab(5, "https://www.google.com/search?q=rust", "rust - Google Search");
        let notifier = create_notifier(tabs, FakeTransport::default());

        block_on(notifier.handle_activation(TabActivation::new(5)));
        block_on(notifier.handle_activation(TabActivation::new(5)));

        let sent = notifier.transport().sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1.as_bytes(), sent[1].1.as_bytes());
    }

    #[test]
    fn test_lookup_failure_skips_send() {
        let notifier = create_notifier(FakeTabs::default(), FakeTransport::default());

        let outcome = block_on(notifier.handle_activation(TabActivation::new(99)));

        assert!(matches!(
            outcome,
            ReportOutcome::Dropped(NotifierError::Lookup { tab_id: 99, .. })
        ));
        assert_eq!(notifier.host().lookups.get(), 1);
        assert!(notifier.transport().sent.borrow().is_empty());
    }

    #[test]
    fn test_network_failure_is_not_retried() {
        let tabs = FakeTabs::default().with_tab(42, "https://example.com", "Example");
        let notifier = create_notifier(tabs, FakeTransport::failing_for("https://example.com"));

        let outcome = block_on(notifier.handle_activation(TabActivation::new(42)));

        assert!(matches!(outcome, ReportOutcome::Dropped(NotifierError::Network { .. })));
        assert_eq!(notifier.transport().sent.borrow().len(), 1);
    }

    #[test]
    fn test_each_event_looks_up_fresh() {
        let tabs = FakeTabs::default().with_tab(3, "https://docs.rs", "Docs.rs");
        let notifier = create_notifier(tabs, FakeTransport::default());

        block_on(notifier.handle_activation(TabActivation::new(3)));
        block_on(notifier.handle_activation(TabActivation::new(3)));

        assert_eq!(notifier.host().lookups.get(), 2);
    }

    fn register_collecting(
        notifier: &Rc<Notifier<FakeTabs, FakeTransport>>,
    ) -> Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>> {
        let tasks = Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&tasks);
        Rc::clone(notifier).register(move |task| queue.borrow_mut().push(task));
        tasks
    }

    #[test]
    fn test_registered_handler_spawns_one_task_per_event() {
        let tabs = FakeTabs::default()
            .with_tab(1, "https://github.com/rust-lang/rust", "Rust")
            .with_tab(2, "https://crates.io", "crates.io");
        let notifier = Rc::new(create_notifier(tabs, FakeTransport::default()));
        let tasks = register_collecting(&notifier);

        notifier.host().fire(1);
        notifier.host().fire(2);

        assert_eq!(tasks.borrow().len(), 2);
        let pending: Vec<_> = tasks.borrow_mut().drain(..).collect();
        block_on(join_all(pending));

        let payloads = notifier.transport().payloads();
        assert_eq!(payloads.len(), 2);
        assert!(payloads.contains(&ReportPayload {
            url: "https://github.com/rust-lang/rust".to_string(),
            title: "Rust".to_string(),
        }));
        assert!(payloads.contains(&ReportPayload {
            url: "https://crates.io".to_string(),
            title: "crates.io".to_string(),
        }));
    }

    #[test]
    fn test_failed_lookup_does_not_affect_concurrent_event() {
        let tabs = FakeTabs::default().with_tab(2, "https://crates.io", "crates.io");
        let notifier = Rc::new(create_notifier(tabs, FakeTransport::default()));
        let tasks = register_collecting(&notifier);

        notifier.host().fire(1);
        notifier.host().fire(2);

        let pending: Vec<_> = tasks.borrow_mut().drain(..).collect();
        block_on(join_all(pending));

        let payloads = notifier.transport().payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].url, "https://crates.io");
    }

    #[test]
    fn test_failed_send_does_not_affect_concurrent_event() {
        let tabs = FakeTabs::default()
            .with_tab(1, "https://down.example", "Down")
            .with_tab(2, "https://up.example", "Up");
        let notifier = Rc::new(create_notifier(tabs, FakeTransport::failing_for("https://down.example")));
        let tasks = register_collecting(&notifier);

        notifier.host().fire(1);
        notifier.host().fire(2);
        let pending: Vec<_> = tasks.borrow_mut().drain(..).collect();
        block_on(join_all(pending));

        // One attempt each, the failure is not retried
        let payloads = notifier.transport().payloads();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads.iter().filter(|p| p.title == "Up").count(), 1);
        assert_eq!(payloads.iter().filter(|p| p.title == "Down").count(), 1);

        // Handler survives failures
        notifier.host().fire(2);
        assert_eq!(tasks.borrow().len(), 1);
    }
}
