#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Verifies the `pwin.fetch` span around each fetch job and the structured
//! events emitted on merge, failure, mount, and shutdown. Fetches run on
//! [`InlineExecutor`] so every span and event lands on the test thread,
//! where the scoped subscriber is installed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pwin_core::{Direction, FetchError, PageNumber, Record};
use pwin_runtime::{InlineExecutor, PaginatedLoader, WindowConfig, WindowCoordinator};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
    span: Option<String>,
}

/// A tracing Layer that records spans and events.
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn event(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.message == message)
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message").unwrap_or_default();
        let span = ctx
            .event_span(event)
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
            span,
        });
    }
}

fn with_captured<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: Arc::clone(&spans),
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

fn pn(n: u32) -> PageNumber {
    PageNumber::new(n).unwrap()
}

fn ok_source(page: PageNumber, size: usize) -> Result<Vec<Record>, FetchError> {
    Ok((0..size)
        .map(|i| Record::new(format!("{page}-{i}"), 1, 1, ""))
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn fetch_span_carries_page_and_direction() {
    let handle = with_captured(|| {
        let mut loader = PaginatedLoader::new(ok_source, 2).with_executor(InlineExecutor);
        loader.request_page(pn(4), Direction::Prepend);
        loader.poll();
    });

    let spans = handle.spans();
    let fetch: Vec<_> = spans.iter().filter(|s| s.name == "pwin.fetch").collect();
    assert_eq!(fetch.len(), 1, "spans: {spans:?}");
    assert_eq!(fetch[0].fields.get("page").map(String::as_str), Some("4"));
    assert_eq!(
        fetch[0].fields.get("direction").map(String::as_str),
        Some("prepend")
    );
}

#[test]
fn merge_and_dispatch_are_logged() {
    let handle = with_captured(|| {
        let mut loader = PaginatedLoader::new(ok_source, 3).with_executor(InlineExecutor);
        loader.request_page(pn(1), Direction::Append);
        loader.poll();
    });

    let dispatched = handle.event("page fetch dispatched").expect("dispatch event");
    assert_eq!(dispatched.level, tracing::Level::DEBUG);
    assert_eq!(dispatched.fields.get("page").map(String::as_str), Some("1"));

    let merged = handle.event("page merged").expect("merge event");
    assert_eq!(merged.fields.get("len").map(String::as_str), Some("3"));
    assert_eq!(merged.fields.get("total").map(String::as_str), Some("3"));
}

#[test]
fn failure_is_warned_with_page_and_error() {
    let handle = with_captured(|| {
        let source = |page: PageNumber, _: usize| -> Result<Vec<Record>, FetchError> {
            Err(FetchError::status(page, 429))
        };
        let mut loader = PaginatedLoader::new(source, 3).with_executor(InlineExecutor);
        loader.request_page(pn(2), Direction::Append);
        loader.poll();
    });

    let warned = handle.event("page fetch failed").expect("failure event");
    assert_eq!(warned.level, tracing::Level::WARN);
    assert_eq!(warned.fields.get("page").map(String::as_str), Some("2"));
    assert_eq!(
        warned.fields.get("error").map(String::as_str),
        Some("Failed to fetch photos: 429")
    );
}

#[test]
fn fetch_events_nest_under_fetch_span() {
    let handle = with_captured(|| {
        let source = |page: PageNumber, _: usize| -> Result<Vec<Record>, FetchError> {
            tracing::trace!(page = page.get(), "inside source");
            Ok(Vec::new())
        };
        let mut loader = PaginatedLoader::new(source, 1).with_executor(InlineExecutor);
        loader.request_page(pn(1), Direction::Append);
    });

    let inside = handle.event("inside source").expect("source event");
    assert_eq!(inside.span.as_deref(), Some("pwin.fetch"));
}

#[test]
fn mount_and_teardown_are_info() {
    let handle = with_captured(|| {
        let loader = PaginatedLoader::new(ok_source, 5).with_executor(InlineExecutor);
        let mut c = WindowCoordinator::with_loader(loader, WindowConfig::default());
        c.mount();
        c.poll();
        c.teardown();
    });

    let mounted = handle.event("window mounted").expect("mount event");
    assert_eq!(mounted.level, tracing::Level::INFO);
    assert_eq!(
        mounted.fields.get("initial_pages").map(String::as_str),
        Some("2")
    );
    let shut = handle.event("loader shut down").expect("shutdown event");
    assert_eq!(shut.level, tracing::Level::INFO);
    assert!(handle.event("window torn down").is_some());
}
