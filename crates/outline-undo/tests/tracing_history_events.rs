#![forbid(unsafe_code)]

//! Every run/undo/redo emits a debug event naming the command and outcome.
//!
//! Run:
//!   cargo test -p outline-undo --test tracing_history_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use outline_undo::{BlockCommand, CommandManager, HistoryConfig};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn set(value: i32) -> BlockCommand<i32> {
    BlockCommand::new(
        format!("Set {value}"),
        move |v: &mut i32| {
            if *v == value {
                return false;
            }
            *v = value;
            true
        },
        |v: &mut i32| {
            *v = 0;
            true
        },
    )
}

fn find<'a>(events: &'a [CapturedEvent], message: &str, command: &str) -> Vec<&'a CapturedEvent> {
    events
        .iter()
        .filter(|e| e.message == message && e.fields.get("command").map(String::as_str) == Some(command))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn run_undo_redo_emit_debug_events() {
    let events = with_captured_events(|| {
        let mut history = CommandManager::new(HistoryConfig::unlimited());
        let mut value = 0;
        history.run_action(set(4), &mut value);
        history.undo(&mut value);
        history.redo(&mut value);
    });

    for message in ["run", "undo", "redo"] {
        let matching = find(&events, message, "Set 4");
        assert_eq!(matching.len(), 1, "expected one {message} event: {events:?}");
        assert_eq!(matching[0].level, tracing::Level::DEBUG);
        assert_eq!(matching[0].fields.get("outcome").map(String::as_str), Some("done"));
    }
}

#[test]
fn failed_run_reports_failed_outcome() {
    let events = with_captured_events(|| {
        let mut history = CommandManager::new(HistoryConfig::unlimited());
        let mut value = 3;
        history.run_action(set(3), &mut value);
    });

    let matching = find(&events, "run", "Set 3");
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].fields.get("outcome").map(String::as_str), Some("failed"));
}

#[test]
fn group_open_and_close_are_logged() {
    let events = with_captured_events(|| {
        let mut history = CommandManager::new(HistoryConfig::unlimited());
        let mut value = 0;
        history.begin_group("Pair");
        history.run_action(set(1), &mut value);
        history.run_action(set(2), &mut value);
        history.end_group();
    });

    let grouped = find(&events, "run", "Set 2");
    assert_eq!(grouped[0].fields.get("outcome").map(String::as_str), Some("grouped"));

    let opened = events.iter().any(|e| {
        e.message == "group opened" && e.fields.get("group").map(String::as_str) == Some("Pair")
    });
    let closed = events.iter().any(|e| {
        e.message == "group closed" && e.fields.get("outcome").map(String::as_str) == Some("done")
    });
    assert!(opened && closed, "missing group events: {events:?}");
}
