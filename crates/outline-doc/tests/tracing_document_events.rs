#![forbid(unsafe_code)]

//! Tree mutations, rejected commands, and rejected loads are logged.
//!
//! Run:
//!   cargo test -p outline-doc --test tracing_document_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use outline_doc::{Document, Editor, EditorConfig, ElementTree, LinkRegistry};
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

fn messages(events: &[CapturedEvent]) -> Vec<&str> {
    events.iter().map(|e| e.message.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn tree_mutations_emit_trace_events() {
    let events = with_captured_events(|| {
        let mut doc = Document::new();
        let tree = ElementTree::new("a");
        let id = tree.id;
        doc.insert(doc.root(), tree, 0).unwrap();
        doc.remove_child(doc.root(), id).unwrap();
    });
    let traced: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::TRACE)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(traced, vec!["inserted", "removed"]);
    assert!(events.iter().all(|e| e.fields.contains_key("element")));
}

#[test]
fn rejected_loads_warn() {
    let events = with_captured_events(|| {
        assert!(Document::from_json("{not json").is_err());

        let dup = ElementTree::new("dup");
        let root = ElementTree::new("").with_children([dup.clone(), dup]);
        let json = serde_json::to_string(&root).unwrap();
        assert!(Document::from_json(&json).is_err());
    });
    let warnings: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    let warned: Vec<_> = warnings.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(warned, vec!["rejected document JSON", "rejected document tree"]);
    assert!(warnings.iter().all(|e| e.fields.contains_key("error")));
}

#[test]
fn rejected_move_is_logged_by_command_and_history() {
    let child = ElementTree::new("child");
    let parent = ElementTree::new("parent").with_children([child]);
    let (p, c) = (parent.id, parent.children[0].id);
    let document = Document::from_tree(ElementTree::new("").with_children([parent])).unwrap();
    let mut editor = Editor::with_document(document, EditorConfig::default());

    let events = with_captured_events(|| {
        assert!(!editor.run_action(outline_doc::commands::ReparentElement::new(p, c, 0)));
    });
    let msgs = messages(&events);
    assert!(msgs.contains(&"reparent rejected"));
    let run = events
        .iter()
        .find(|e| e.message == "run")
        .expect("history logs the run");
    assert_eq!(run.fields.get("command").map(String::as_str), Some("Move Element"));
    assert_eq!(run.fields.get("outcome").map(String::as_str), Some("failed"));
}

#[test]
fn unknown_link_title_is_logged() {
    let a = ElementTree::new("see notes");
    let id = a.id;
    let document = Document::from_tree(ElementTree::new("").with_children([a])).unwrap();
    let mut editor = Editor::with_document(document, EditorConfig::default());
    assert!(editor.select(id, 4..9));
    let links = LinkRegistry::new();

    let events = with_captured_events(|| {
        assert!(!editor.link_selection("Missing", &links));
    });
    let event = events
        .iter()
        .find(|e| e.message == "link target not found")
        .expect("lookup failure is logged");
    assert_eq!(event.fields.get("title").map(String::as_str), Some("Missing"));
}
