#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use manuscriptor_client_core::view::{COLLAPSED_GLYPH, EXPANDED_GLYPH, FILTER_HEADER_LABELS};
use manuscriptor_client_core::{
    Diagnostic, DispatchOutcome, Dispatcher, ListTarget, ListView, ResponseHandler, ViewRow,
};
use serde_json::{Value, json};

#[derive(Default)]
struct RecordingHandler {
    views: Vec<ListView>,
    diagnostics: Vec<Diagnostic>,
}

impl ResponseHandler for RecordingHandler {
    fn render(&mut self, view: ListView) {
        self.views.push(view);
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

fn frame(message_type: &str, payload: &Value) -> String {
    json!({
        "client_id": "Ab3dE5f",
        "message_type": message_type,
        "payload": payload.to_string(),
        "error": ""
    })
    .to_string()
}

fn dispatch(raw: &str) -> (DispatchOutcome, RecordingHandler) {
    let mut handler = RecordingHandler::default();
    let outcome = Dispatcher::new().dispatch(raw, &mut handler);
    (outcome, handler)
}

#[test]
fn keep_alive_is_silent() {
    let raw = json!({"client_id": "Ab3dE5f", "message_type": "keep_alive", "payload": ""})
        .to_string();
    let (outcome, handler) = dispatch(&raw);
    assert_eq!(outcome, DispatchOutcome::Ignored);
    assert!(handler.views.is_empty());
    assert!(handler.diagnostics.is_empty());
}

#[test]
fn unknown_type_logs_exactly_once() {
    let (outcome, handler) = dispatch(&frame("bogus", &json!({})));
    assert_eq!(outcome, DispatchOutcome::Logged);
    assert!(handler.views.is_empty());
    assert_eq!(
        handler.diagnostics,
        vec![Diagnostic::UnknownMessage {
            message_type: "bogus".to_string()
        }]
    );
}

#[test]
fn malformed_frames_are_logged_and_dispatch_continues() {
    let dispatcher = Dispatcher::new();
    let mut handler = RecordingHandler::default();

    let first = dispatcher.dispatch("{not json", &mut handler);
    let second = dispatcher.dispatch(
        &json!({"message_type": "scripts", "payload": "[{oops"}).to_string(),
        &mut handler,
    );
    let third = dispatcher.dispatch(&frame("filters", &json!(["a"])), &mut handler);

    assert_eq!(first, DispatchOutcome::Logged);
    assert_eq!(second, DispatchOutcome::Logged);
    assert_eq!(third, DispatchOutcome::Rendered(ListTarget::Filters));
    assert!(matches!(
        handler.diagnostics.as_slice(),
        [
            Diagnostic::MalformedEnvelope { .. },
            Diagnostic::MalformedPayload { .. }
        ]
    ));
    assert_eq!(handler.views.len(), 1);
}

#[test]
fn filters_render_header_rows_then_payload() {
    let (outcome, handler) = dispatch(&frame("filters", &json!(["a", "b"])));
    assert_eq!(outcome, DispatchOutcome::Rendered(ListTarget::Filters));
    let view = &handler.views[0];
    assert_eq!(view.target.container_id(), "filters");
    assert_eq!(view.dom_row_count(), 4);
    let labels: Vec<&str> = view
        .rows
        .iter()
        .map(|row| match row {
            ViewRow::Field { label } => label.as_str(),
            other => panic!("filter rows are editable fields, got {other:?}"),
        })
        .collect();
    assert_eq!(labels, vec![FILTER_HEADER_LABELS[0], FILTER_HEADER_LABELS[1], "a", "b"]);
    assert_eq!(labels[0], "Target size");
    assert_eq!(labels[1], "Output batch name");
}

#[test]
fn scripts_render_summary_and_hidden_detail() {
    let item = json!({"options": {"script_name": "s1"}, "output_size": 10, "timestamp": "t1"});
    let (outcome, mut handler) = dispatch(&frame("scripts", &json!([item.clone()])));
    assert_eq!(outcome, DispatchOutcome::Rendered(ListTarget::Scripts));

    let view = &mut handler.views[0];
    assert_eq!(view.dom_row_count(), 2);
    let row = &mut view.rows[0];
    let ViewRow::Expandable {
        cells,
        detail,
        expanded,
    } = row.clone()
    else {
        panic!("script rows are expandable");
    };
    assert_eq!(cells, vec!["s1", "10", "t1"]);
    assert!(!expanded);
    let detail: Value = serde_json::from_str(&detail).expect("detail holds the item");
    assert_eq!(detail, item);

    assert_eq!(row.glyph(), Some(COLLAPSED_GLYPH));
    assert!(row.toggle());
    assert_eq!(row.glyph(), Some(EXPANDED_GLYPH));
    assert!(!row.toggle());
    assert_eq!(row.glyph(), Some(COLLAPSED_GLYPH));
}

#[test]
fn batches_render_name_size_timestamp() {
    let payload = json!([
        {"batch_name": "b1", "output_size": 200, "timestamp": "2020-02-02", "opts": []},
        {"batch_name": "b2", "output_size": 0, "timestamp": "2020-02-03"}
    ]);
    let (outcome, handler) = dispatch(&frame("batches", &payload));
    assert_eq!(outcome, DispatchOutcome::Rendered(ListTarget::Batches));
    let view = &handler.views[0];
    assert_eq!(view.dom_row_count(), 4);
    assert!(matches!(
        &view.rows[1],
        ViewRow::Expandable { cells, .. } if cells == &vec!["b2", "0", "2020-02-03"]
    ));
}

#[test]
fn stats_render_one_row_per_key() {
    let payload = json!({"chunks": 10, "sources": 2, "word_forms": 77});
    let (outcome, handler) = dispatch(&frame("db_stats", &payload));
    assert_eq!(outcome, DispatchOutcome::Rendered(ListTarget::Stats));
    let view = &handler.views[0];
    assert_eq!(view.target.container_id(), "db_stats");
    assert_eq!(view.dom_row_count(), 3);
    assert!(view.rows.contains(&ViewRow::Pair {
        key: "sources".to_string(),
        value: "2".to_string()
    }));
}
