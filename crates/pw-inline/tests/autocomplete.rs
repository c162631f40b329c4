//! Overlapping autocomplete searches

use pretty_assertions::assert_eq;
use pw_inline::{ApplyOutcome, EditableFieldRegistry, EditorConfig};
use pw_model::RefValue;
use pw_test_utils::{reviewer_field, test_context, user_candidates, ScriptedTransport};
use serde_json::json;

fn registry(transport: &ScriptedTransport) -> EditableFieldRegistry {
    let mut registry =
        EditableFieldRegistry::new(EditorConfig::default(), test_context(), transport.as_transport());
    registry.register([reviewer_field()]).unwrap();
    registry.begin_edit("reviewer").unwrap();
    registry
}

fn labels(fields: &EditableFieldRegistry) -> Vec<String> {
    fields
        .field("reviewer")
        .unwrap()
        .binding()
        .unwrap()
        .candidates()
        .iter()
        .map(RefValue::display_label)
        .collect()
}

#[tokio::test]
async fn late_response_for_older_query_is_dropped() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);

    let slow_gate = transport.push_gated();
    let fast_gate = transport.push_gated();

    let slow = fields.begin_query("reviewer", "ali").unwrap().unwrap();
    let fast = fields.begin_query("reviewer", "alici").unwrap().unwrap();
    let config = fields
        .field("reviewer")
        .unwrap()
        .descriptor()
        .kind()
        .autocomplete()
        .unwrap()
        .clone();

    let source = fields.source();
    let (slow_result, fast_result, ()) = tokio::join!(
        source.search(&config, slow.query()),
        source.search(&config, fast.query()),
        async move {
            // the later query answers first
            fast_gate.open_json(200, json!([{"pk": 8, "name": "Alicia"}]));
            tokio::task::yield_now().await;
            slow_gate.open_json(200, user_candidates());
        }
    );

    assert_eq!(
        fields.complete_query("reviewer", &fast, fast_result).unwrap(),
        ApplyOutcome::Applied(1)
    );
    assert_eq!(
        fields.complete_query("reviewer", &slow, slow_result).unwrap(),
        ApplyOutcome::Stale
    );
    assert_eq!(labels(&fields), vec!["Alicia".to_string()]);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn response_after_cancel_is_ignored() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);

    let ticket = fields.begin_query("reviewer", "ali").unwrap().unwrap();
    fields.cancel("reviewer").unwrap();

    let outcome = fields
        .complete_query("reviewer", &ticket, Ok(vec![RefValue::new(7, "Alice")]))
        .unwrap();
    assert_eq!(outcome, ApplyOutcome::Stale);
    assert!(fields.field("reviewer").unwrap().binding().is_none());
    assert!(fields.diagnostics().is_empty());
}

#[tokio::test]
async fn response_from_previous_session_is_ignored() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);

    let old = fields.begin_query("reviewer", "ali").unwrap().unwrap();
    fields.cancel("reviewer").unwrap();
    fields.begin_edit("reviewer").unwrap();
    fields.begin_query("reviewer", "ali").unwrap().unwrap();

    let outcome = fields
        .complete_query("reviewer", &old, Ok(vec![RefValue::new(7, "Alice")]))
        .unwrap();
    assert_eq!(outcome, ApplyOutcome::Stale);
    assert!(labels(&fields).is_empty());
}

#[tokio::test]
async fn candidates_are_filtered_on_search_attributes() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);

    transport.push_json(
        200,
        json!([
            {"pk": 7, "name": "Alice", "email": "alice@example.org"},
            {"pk": 9, "name": "Bob", "email": "bob@example.org"},
            {"name": "no identifier"},
        ]),
    );
    let outcome = fields.search("reviewer", "ALI").await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Applied(1));
    assert_eq!(labels(&fields), vec!["Alice".to_string()]);
}
