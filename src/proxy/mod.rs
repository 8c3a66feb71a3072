//! Forwarding orchestration.
//!
//! # Data Flow
//! ```text
//! forward(request)          binds the request, nothing else
//!     → to(target)
//!         → request chain   (registration order, stop at first error)
//!         → Adapter::send   (the only I/O)
//!         → response chain  (registration order, stop at first error)
//!     → ProxyResponse
//! ```
//!
//! # Design Decisions
//! - `to` takes `&mut self`: one forward in flight per proxy
//! - The bound request survives a successful `to`, so the same request can be
//!   sent to several targets; each `to` runs the request chain again
//! - No recovery: any stage error is returned as is and later stages never run

pub mod chain;
pub mod error;
pub mod filter;

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;

use crate::adapter::Adapter;

pub use chain::FilterChain;
pub use error::{FilterError, ProxyError};
pub use filter::{FnFilter, RequestFilter, ResponseFilter};

/// A fully buffered request as seen by filters and adapters.
pub type ProxyRequest = axum::http::Request<Bytes>;

/// A fully buffered response as produced by adapters.
pub type ProxyResponse = axum::http::Response<Bytes>;

/// Drives a bound request through the filter chains and the adapter.
pub struct Proxy {
    adapter: Arc<dyn Adapter>,
    request: Option<ProxyRequest>,
    request_filters: FilterChain<dyn RequestFilter>,
    response_filters: FilterChain<dyn ResponseFilter>,
}

impl Proxy {
    /// Create a proxy around an adapter with empty filter chains.
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            adapter,
            request: None,
            request_filters: FilterChain::new(),
            response_filters: FilterChain::new(),
        }
    }

    /// Bind a request for the next [`to`](Self::to), replacing any previous one.
    pub fn forward(&mut self, request: ProxyRequest) -> &mut Self {
        self.request = Some(request);
        self
    }

    /// Filter the bound request, send it to `target` and filter the response.
    pub async fn to(&mut self, target: &str) -> Result<ProxyResponse, ProxyError> {
        let request = self.request.as_mut().ok_or(ProxyError::MissingRequest)?;

        for (index, filter) in self.request_filters.iter().enumerate() {
            if let Err(source) = filter.filter(request) {
                tracing::debug!(index, filter = filter.name(), error = %source, "Request filter failed");
                return Err(ProxyError::RequestFilter {
                    index,
                    filter: filter.name().to_string(),
                    source,
                });
            }
        }

        tracing::debug!(
            method = %request.method(),
            upstream = %target,
            "Sending request through adapter"
        );

        let mut response = self.adapter.send(request, target).await?;

        for (index, filter) in self.response_filters.iter().enumerate() {
            if let Err(source) = filter.filter(&mut response) {
                tracing::debug!(index, filter = filter.name(), error = %source, "Response filter failed");
                return Err(ProxyError::ResponseFilter {
                    index,
                    filter: filter.name().to_string(),
                    source,
                });
            }
        }

        Ok(response)
    }

    /// The currently bound request, if any.
    pub fn request(&self) -> Option<&ProxyRequest> {
        self.request.as_ref()
    }

    /// Unbind and return the current request.
    pub fn reset(&mut self) -> Option<ProxyRequest> {
        self.request.take()
    }

    /// Replace the request chain.
    pub fn set_request_filter<I>(&mut self, filters: I)
    where
        I: IntoIterator<Item = Arc<dyn RequestFilter>>,
    {
        self.request_filters.replace(filters);
    }

    /// Append a filter to the request chain.
    pub fn add_request_filter<F>(&mut self, filter: F)
    where
        F: RequestFilter + 'static,
    {
        self.request_filters.push(Arc::new(filter));
    }

    /// Replace the response chain.
    pub fn set_response_filter<I>(&mut self, filters: I)
    where
        I: IntoIterator<Item = Arc<dyn ResponseFilter>>,
    {
        self.response_filters.replace(filters);
    }

    /// Append a filter to the response chain.
    pub fn add_response_filter<F>(&mut self, filter: F)
    where
        F: ResponseFilter + 'static,
    {
        self.response_filters.push(Arc::new(filter));
    }

    pub fn request_filters(&self) -> &FilterChain<dyn RequestFilter> {
        &self.request_filters
    }

    pub fn response_filters(&self) -> &FilterChain<dyn ResponseFilter> {
        &self.response_filters
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("bound", &self.request.is_some())
            .field("request_filters", &self.request_filters.len())
            .field("response_filters", &self.response_filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterError;
    use async_trait::async_trait;
    use axum::http::{HeaderValue, Request, Response, StatusCode};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Returns a fixed 200 "ok" and remembers every request it saw.
    #[derive(Default)]
    struct RecordingAdapter {
        seen: Mutex<Vec<(ProxyRequest, String)>>,
        fail: bool,
    }

    impl RecordingAdapter {
        fn failing() -> Self {
            Self { fail: true, ..Default::default() }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Adapter for RecordingAdapter {
        async fn send(&self, request: &ProxyRequest, target: &str) -> Result<ProxyResponse, AdapterError> {
            let mut copy = Request::new(request.body().clone());
            *copy.headers_mut() = request.headers().clone();
            self.seen.lock().unwrap().push((copy, target.to_string()));
            if self.fail {
                return Err(AdapterError::other("connection refused"));
            }
            Ok(Response::builder()
                .status(StatusCode::OK)
                .body(Bytes::from_static(b"ok"))
                .unwrap())
        }
    }

    /// Appends its label to a shared log.
    struct Marker {
        label: &'static str,
        log: Log,
    }

    impl RequestFilter for Marker {
        fn filter(&self, _request: &mut ProxyRequest) -> Result<(), FilterError> {
            self.log.lock().unwrap().push(self.label.to_string());
            Ok(())
        }
    }

    impl ResponseFilter for Marker {
        fn filter(&self, _response: &mut ProxyResponse) -> Result<(), FilterError> {
            self.log.lock().unwrap().push(self.label.to_string());
            Ok(())
        }
    }

    struct Failing;

    impl RequestFilter for Failing {
        fn filter(&self, _request: &mut ProxyRequest) -> Result<(), FilterError> {
            Err(FilterError::rejected("nope"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    impl ResponseFilter for Failing {
        fn filter(&self, _response: &mut ProxyResponse) -> Result<(), FilterError> {
            Err(FilterError::rejected("nope"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Clone, Default)]
    struct Spy {
        calls: Arc<AtomicUsize>,
    }

    impl RequestFilter for Spy {
        fn filter(&self, _request: &mut ProxyRequest) -> Result<(), FilterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl ResponseFilter for Spy {
        fn filter(&self, _response: &mut ProxyResponse) -> Result<(), FilterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn marker(label: &'static str, log: &Log) -> Marker {
        Marker { label, log: log.clone() }
    }

    fn get(uri: &str) -> ProxyRequest {
        Request::builder().uri(uri).body(Bytes::new()).unwrap()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_request_filters_run_in_registration_order() {
        let log = Log::default();
        let mut proxy = Proxy::new(Arc::new(RecordingAdapter::default()));
        proxy.add_request_filter(marker("F1", &log));
        proxy.add_request_filter(marker("F2", &log));
        proxy.add_request_filter(marker("F3", &log));

        proxy.forward(get("/")).to("http://example.test").await.unwrap();

        assert_eq!(entries(&log), ["F1", "F2", "F3"]);
    }

    #[tokio::test]
    async fn test_response_filters_run_in_registration_order() {
        let log = Log::default();
        let mut proxy = Proxy::new(Arc::new(RecordingAdapter::default()));
        proxy.add_response_filter(marker("R1", &log));
        proxy.add_response_filter(marker("R2", &log));
        proxy.add_response_filter(marker("R3", &log));

        proxy.forward(get("/")).to("http://example.test").await.unwrap();

        assert_eq!(entries(&log), ["R1", "R2", "R3"]);
    }

    #[tokio::test]
    async fn test_request_filter_failure_stops_chain_and_send() {
        let adapter = Arc::new(RecordingAdapter::default());
        let spy = Spy::default();
        let response_spy = Spy::default();
        let mut proxy = Proxy::new(adapter.clone());
        proxy.add_request_filter(Failing);
        proxy.add_request_filter(spy.clone());
        proxy.add_response_filter(response_spy.clone());

        let err = proxy.forward(get("/")).to("http://example.test").await.unwrap_err();

        match err {
            ProxyError::RequestFilter { index, filter, source } => {
                assert_eq!(index, 0);
                assert_eq!(filter, "failing");
                assert!(matches!(source, FilterError::Rejected(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
        assert_eq!(response_spy.calls.load(Ordering::SeqCst), 0);
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn test_response_filter_failure_stops_chain() {
        let spy = Spy::default();
        let log = Log::default();
        let mut proxy = Proxy::new(Arc::new(RecordingAdapter::default()));
        proxy.add_response_filter(marker("R1", &log));
        proxy.add_response_filter(Failing);
        proxy.add_response_filter(spy.clone());

        let err = proxy.forward(get("/")).to("http://example.test").await.unwrap_err();

        assert!(matches!(err, ProxyError::ResponseFilter { index: 1, .. }));
        assert_eq!(entries(&log), ["R1"]);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_to_without_forward_is_missing_request() {
        let adapter = Arc::new(RecordingAdapter::default());
        let spy = Spy::default();
        let mut proxy = Proxy::new(adapter.clone());
        proxy.add_request_filter(spy.clone());

        let err = proxy.to("http://example.test").await.unwrap_err();

        assert!(matches!(err, ProxyError::MissingRequest));
        assert_eq!(adapter.calls(), 0);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_adapter_failure_skips_response_filters() {
        let spy = Spy::default();
        let mut proxy = Proxy::new(Arc::new(RecordingAdapter::failing()));
        proxy.add_response_filter(spy.clone());

        let err = proxy.forward(get("/")).to("http://example.test").await.unwrap_err();

        match err {
            ProxyError::Adapter(inner) => assert_eq!(inner.to_string(), "connection refused"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_replaces_and_add_appends() {
        let log = Log::default();
        let mut proxy = Proxy::new(Arc::new(RecordingAdapter::default()));
        proxy.set_request_filter(vec![
            Arc::new(marker("A", &log)) as Arc<dyn RequestFilter>,
            Arc::new(marker("B", &log)),
        ]);
        proxy.add_request_filter(marker("C", &log));

        proxy.forward(get("/")).to("http://example.test").await.unwrap();
        assert_eq!(entries(&log), ["A", "B", "C"]);

        log.lock().unwrap().clear();
        proxy.set_request_filter(vec![Arc::new(marker("D", &log)) as Arc<dyn RequestFilter>]);
        proxy.to("http://example.test").await.unwrap();
        assert_eq!(entries(&log), ["D"]);
        assert_eq!(proxy.request_filters().len(), 1);
    }

    #[tokio::test]
    async fn test_set_response_filter_discards_existing_chain() {
        let log = Log::default();
        let mut proxy = Proxy::new(Arc::new(RecordingAdapter::default()));
        proxy.add_response_filter(marker("R1", &log));
        proxy.add_response_filter(marker("R2", &log));

        proxy.set_response_filter(vec![Arc::new(marker("R3", &log)) as Arc<dyn ResponseFilter>]);
        proxy.add_response_filter(marker("R4", &log));
        proxy.forward(get("/")).to("http://example.test").await.unwrap();

        assert_eq!(entries(&log), ["R3", "R4"]);
        assert_eq!(proxy.response_filters().len(), 2);
    }

    #[tokio::test]
    async fn test_rebind_filters_latest_request_only() {
        let adapter = Arc::new(RecordingAdapter::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut proxy = Proxy::new(adapter.clone());
        let record = seen.clone();
        proxy.add_request_filter(FnFilter::new("record-uri", move |req: &mut ProxyRequest| {
            record.lock().unwrap().push(req.uri().to_string());
            Ok(())
        }));

        proxy.forward(get("/first"));
        proxy.forward(get("/second"));
        proxy.to("http://example.test").await.unwrap();

        assert_eq!(*seen.lock().unwrap(), ["/second"]);
        assert_eq!(proxy.request().unwrap().uri(), "/second");
    }

    #[tokio::test]
    async fn test_repeated_to_reuses_bound_request() {
        let adapter = Arc::new(RecordingAdapter::default());
        let spy = Spy::default();
        let mut proxy = Proxy::new(adapter.clone());
        proxy.add_request_filter(spy.clone());

        proxy.forward(get("/"));
        proxy.to("http://one.test").await.unwrap();
        proxy.to("http://two.test").await.unwrap();

        let targets: Vec<String> = adapter.seen.lock().unwrap().iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(targets, ["http://one.test", "http://two.test"]);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 2);
        assert!(proxy.request().is_some());
    }

    #[tokio::test]
    async fn test_reset_unbinds_request() {
        let mut proxy = Proxy::new(Arc::new(RecordingAdapter::default()));
        proxy.forward(get("/"));

        let taken = proxy.reset().unwrap();
        assert_eq!(taken.uri(), "/");
        assert!(matches!(proxy.to("http://example.test").await, Err(ProxyError::MissingRequest)));
    }

    #[tokio::test]
    async fn test_end_to_end_header_filters() {
        let adapter = Arc::new(RecordingAdapter::default());
        let mut proxy = Proxy::new(adapter.clone());
        proxy.add_request_filter(FnFilter::new("forwarded", |req: &mut ProxyRequest| {
            req.headers_mut().insert("x-forwarded", HeaderValue::from_static("true"));
            Ok(())
        }));
        proxy.add_response_filter(FnFilter::new("filtered", |res: &mut ProxyResponse| {
            res.headers_mut().insert("x-filtered", HeaderValue::from_static("true"));
            Ok(())
        }));

        let response = proxy.forward(get("/")).to("http://example.test").await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &Bytes::from_static(b"ok"));
        assert_eq!(response.headers()["x-filtered"], "true");

        let seen = adapter.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.headers()["x-forwarded"], "true");
        assert_eq!(seen[0].1, "http://example.test");
    }
}
