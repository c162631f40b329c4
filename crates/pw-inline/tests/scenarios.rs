//! End-to-end field scenarios against a scripted server

use pretty_assertions::assert_eq;
use pw_inline::{
    Affordance, ApplyOutcome, ConfirmOutcome, DiagnosticKind, EditableFieldRegistry, EditorConfig,
    FieldState, FieldView,
};
use pw_model::{FieldDescriptor, FieldValue, RefValue};
use pw_remote::{HttpMethod, PatchError, RemoteConfig};
use pw_test_utils::{
    alice, reviewer_field, reviewer_field_with, series_record, test_context, user_candidates,
    ScriptedTransport,
};
use serde_json::{json, Value};

fn registry_with(transport: &ScriptedTransport, config: EditorConfig) -> EditableFieldRegistry {
    let mut registry = EditableFieldRegistry::new(config, test_context(), transport.as_transport());
    registry
        .register([
            reviewer_field(),
            FieldDescriptor::date("submitted")
                .with_value(FieldValue::Scalar(json!("2015-08-21T14:02:11.123"))),
            FieldDescriptor::date("last_updated")
                .with_value(FieldValue::Scalar(json!("2015-08-21T14:02:11.123"))),
        ])
        .unwrap();
    registry
}

fn registry(transport: &ScriptedTransport) -> EditableFieldRegistry {
    registry_with(transport, EditorConfig::default())
}

fn saved_record(reviewer: Value, label: Option<&str>) -> Value {
    let mut record = series_record(reviewer);
    if let Some(label) = label {
        record["reviewer__name"] = json!(label);
    }
    record
}

#[tokio::test]
async fn assign_reviewer_from_placeholder() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    assert_eq!(fields.display_text("reviewer").as_deref(), Some("None"));
    assert_eq!(fields.display_text("submitted").as_deref(), Some("2015-08-21"));

    fields.trigger("reviewer", Affordance::Edit).await.unwrap();

    transport.push_json(200, user_candidates());
    let outcome = fields.search("reviewer", "ali").await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied(2));

    let search = transport.last_request().unwrap();
    assert_eq!(search.method, HttpMethod::Get);
    assert_eq!(search.url.path(), "/complete_user/");
    assert_eq!(search.query_param("q").as_deref(), Some("ali"));
    assert_eq!(search.query_param("l").as_deref(), Some("10"));

    let chosen = fields.field("reviewer").unwrap().binding().unwrap().candidates()[0].clone();
    assert_eq!(chosen.label.as_deref(), Some("Alice"));
    assert!(fields.select("reviewer", chosen).unwrap());

    transport.push_json(200, saved_record(json!(7), Some("Alice")));
    let outcome = fields.trigger("reviewer", Affordance::Save).await.unwrap();
    assert_eq!(outcome, Some(ConfirmOutcome::Saved));

    let patch = transport.last_request().unwrap();
    assert_eq!(patch.method, HttpMethod::Post);
    assert_eq!(patch.url.as_str(), "http://127.0.0.1:8000/records/42/");
    assert_eq!(patch.header("X-HTTP-Method-Override"), Some("PATCH"));
    assert_eq!(patch.header("X-CSRFToken"), Some("csrf-token"));
    assert_eq!(patch.body, Some(json!({"reviewer": 7})));

    let reviewer = fields.field("reviewer").unwrap();
    assert_eq!(reviewer.state(), FieldState::Display);
    assert!(reviewer.session().is_none());
    assert_eq!(fields.display_text("reviewer").as_deref(), Some("Alice"));

    // the saved record is authoritative for the other attributes too
    assert_eq!(fields.display_text("last_updated").as_deref(), Some("2015-08-22"));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn cancel_leaves_value_and_server_untouched() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.register([reviewer_field_with(7, "Alice")]).unwrap();

    fields.begin_edit("reviewer").unwrap();
    fields.select("reviewer", RefValue::new(8, "Alicia")).unwrap();
    fields.cancel("reviewer").unwrap();

    assert_eq!(transport.request_count(), 0);
    assert_eq!(fields.display_text("reviewer").as_deref(), Some("Alice"));
    assert!(fields.field("reviewer").unwrap().binding().is_none());
}

#[tokio::test]
async fn short_queries_never_reach_the_server() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.begin_edit("reviewer").unwrap();

    assert_eq!(fields.search("reviewer", "a").await.unwrap(), ApplyOutcome::Skipped);
    assert_eq!(fields.search("reviewer", "al").await.unwrap(), ApplyOutcome::Skipped);
    assert_eq!(transport.request_count(), 0);

    transport.push_json(200, user_candidates());
    fields.search("reviewer", "ali").await.unwrap();
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn server_value_wins_over_submitted_candidate() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.begin_edit("reviewer").unwrap();
    fields.select("reviewer", alice()).unwrap();

    transport.push_json(200, series_record(json!({"pk": 8, "name": "Alicia"})));
    fields.confirm("reviewer").await.unwrap();

    assert_eq!(fields.display_text("reviewer").as_deref(), Some("Alicia"));
    assert_eq!(
        fields.field("reviewer").unwrap().descriptor().current().and_then(FieldValue::as_reference).map(|r| r.id),
        Some(8)
    );
}

#[tokio::test]
async fn rejected_save_keeps_editor_open() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.begin_edit("reviewer").unwrap();
    fields.select("reviewer", alice()).unwrap();

    transport.push_status(403, "{\"detail\": \"forbidden\"}");
    let outcome = fields.confirm("reviewer").await.unwrap();
    let ConfirmOutcome::Rejected(err) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(err.status(), Some(403));
    assert!(err.is_client_error());

    let reviewer = fields.field("reviewer").unwrap();
    assert_eq!(reviewer.state(), FieldState::Error);
    assert_eq!(reviewer.binding().unwrap().selected(), Some(&alice()));
    assert_eq!(reviewer.descriptor().current(), None);
    assert!(matches!(reviewer.last_error(), Some(PatchError::Status { status: 403, .. })));

    let Some(FieldView::Editor(view)) = fields.view("reviewer") else {
        panic!("expected editor view");
    };
    assert_eq!(view.selection_label.as_deref(), Some("Alice"));
    assert!(view.error.is_some());

    let journal = fields.diagnostics().of_kind(DiagnosticKind::PatchFailure);
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].field, "reviewer");

    // re-enter and retry with the same selection
    fields.begin_edit("reviewer").unwrap();
    transport.push_json(200, saved_record(json!(7), Some("Alice")));
    assert!(fields.confirm("reviewer").await.unwrap().is_saved());
    assert_eq!(transport.requests()[1].body, Some(json!({"reviewer": 7})));
    assert!(fields.field("reviewer").unwrap().last_error().is_none());
}

#[tokio::test]
async fn clearing_sends_null_and_shows_placeholder() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.register([reviewer_field_with(7, "Alice")]).unwrap();

    fields.begin_edit("reviewer").unwrap();
    assert!(fields.clear_selection("reviewer").unwrap());

    transport.push_json(200, series_record(Value::Null));
    fields.confirm("reviewer").await.unwrap();

    assert_eq!(transport.last_request().unwrap().body, Some(json!({"reviewer": null})));
    assert_eq!(fields.display_text("reviewer").as_deref(), Some("None"));
}

#[tokio::test]
async fn non_numeric_raw_input_is_sent_as_null() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.register([reviewer_field_with(7, "Alice")]).unwrap();

    fields.begin_edit("reviewer").unwrap();
    fields.select_raw("reviewer", "alice").unwrap();

    transport.push_json(200, series_record(Value::Null));
    fields.confirm("reviewer").await.unwrap();
    assert_eq!(transport.last_request().unwrap().body, Some(json!({"reviewer": null})));
}

#[tokio::test]
async fn failed_search_empties_candidates() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.begin_edit("reviewer").unwrap();

    transport.push_json(200, user_candidates());
    fields.search("reviewer", "ali").await.unwrap();

    transport.push_status(500, "boom");
    let outcome = fields.search("reviewer", "alic").await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::Failed(_)));
    assert!(fields.field("reviewer").unwrap().binding().unwrap().candidates().is_empty());
    assert_eq!(fields.diagnostics().of_kind(DiagnosticKind::SearchFailure).len(), 1);
    assert_eq!(fields.field("reviewer").unwrap().state(), FieldState::Editing);
}

#[tokio::test]
async fn cached_queries_are_served_locally() {
    let transport = ScriptedTransport::new();
    let config = EditorConfig::default()
        .with_remote(RemoteConfig::default().with_search_cache(16, 60));
    let mut fields = registry_with(&transport, config);
    fields.begin_edit("reviewer").unwrap();

    transport.push_json(200, user_candidates());
    fields.search("reviewer", "ali").await.unwrap();
    let miss = fields.search("reviewer", "alic").await.unwrap();
    assert!(matches!(miss, ApplyOutcome::Failed(_)));
    let outcome = fields.search("reviewer", "ali").await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Applied(2));
    // "ali" once, "alic" once (unscripted, failed); the repeat hit the cache
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn save_while_saving_is_rejected() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.begin_edit("reviewer").unwrap();
    let ticket = fields.begin_confirm("reviewer").unwrap();

    assert!(fields.trigger("reviewer", Affordance::Save).await.unwrap_err().is_invalid_transition());
    assert!(fields.trigger("reviewer", Affordance::Cancel).await.unwrap_err().is_invalid_transition());
    assert_eq!(transport.request_count(), 0);

    let record = pw_model::Record::from_value(series_record(Value::Null)).unwrap();
    assert!(fields.complete_confirm(&ticket, Ok(record)).unwrap().is_saved());
}

#[tokio::test]
async fn save_after_failure_resubmits_pending_selection() {
    let transport = ScriptedTransport::new();
    let mut fields = registry(&transport);
    fields.trigger("reviewer", Affordance::Edit).await.unwrap();
    fields.select("reviewer", alice()).unwrap();

    transport.push_error(pw_remote::TransportError::Timeout);
    let outcome = fields.trigger("reviewer", Affordance::Save).await.unwrap();
    assert!(matches!(outcome, Some(ConfirmOutcome::Rejected(_))));
    assert_eq!(fields.field("reviewer").unwrap().state(), FieldState::Error);

    transport.push_json(200, saved_record(json!(7), Some("Alice")));
    let outcome = fields.trigger("reviewer", Affordance::Save).await.unwrap();
    assert_eq!(outcome, Some(ConfirmOutcome::Saved));
    assert_eq!(transport.requests()[1].body, Some(json!({"reviewer": 7})));
    assert_eq!(fields.display_text("reviewer").as_deref(), Some("Alice"));
}
