use std::sync::Once;

use pretty_assertions::assert_eq;
use report_core::{
    update, AppState, Effect, FormField, Msg, Phase, SubmitReply, BUSY_LABEL, DEFAULT_MESSAGE,
    GENERATE_LABEL,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn submitted(fields: Vec<FormField>) -> AppState {
    let (state, _) = update(AppState::new(), Msg::FieldsReplaced(fields));
    let (state, _) = update(state, Msg::SubmitClicked);
    state
}

#[test]
fn submit_disables_control_and_emits_form() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FieldChanged {
            name: "board".to_string(),
            value: "q3".to_string(),
        },
    );
    let (mut state, effects) = update(state, Msg::SubmitClicked);
    let view = state.view();

    assert_eq!(view.phase, Phase::Submitting);
    assert!(!view.submit.enabled);
    assert!(view.submit.busy);
    assert_eq!(view.submit.label, BUSY_LABEL);
    assert!(view.overlay_visible);
    assert_eq!(view.attempt, 1);
    assert!(state.consume_dirty());
    assert_eq!(
        effects,
        vec![Effect::SubmitForm {
            fields: vec![FormField::text("board", "q3")],
        }]
    );
}

#[test]
fn field_changed_replaces_existing_value() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FieldChanged {
            name: "board".to_string(),
            value: "a".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::FieldChanged {
            name: "board".to_string(),
            value: "b".to_string(),
        },
    );

    assert_eq!(state.fields(), &[FormField::text("board", "b")]);
}

#[test]
fn second_click_while_submitting_is_ignored() {
    init_logging();
    let state = submitted(Vec::new());
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().attempt, 1);
}

#[test]
fn reply_with_task_id_starts_polling() {
    init_logging();
    let state = submitted(vec![FormField::text("k", "v")]);
    let (state, effects) = update(
        state,
        Msg::SubmitResponded(SubmitReply {
            error: None,
            task_id: Some("abc-123".to_string()),
        }),
    );

    assert_eq!(state.phase(), Phase::Polling);
    assert_eq!(state.task_id(), Some("abc-123"));
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            task_id: "abc-123".to_string()
        }]
    );
}

#[test]
fn reply_with_error_never_polls_and_restores_control() {
    init_logging();
    let state = submitted(Vec::new());
    let (state, effects) = update(
        state,
        Msg::SubmitResponded(SubmitReply {
            error: Some("No file uploaded".to_string()),
            task_id: Some("ignored".to_string()),
        }),
    );
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(view.phase, Phase::Failed);
    assert_eq!(view.task_id, None);
    assert_eq!(view.message, "Error: No file uploaded");
    assert!(view.submit.enabled);
    assert!(!view.submit.busy);
    assert_eq!(view.submit.label, GENERATE_LABEL);
}

#[test]
fn reply_without_task_id_is_a_submit_error() {
    init_logging();
    let state = submitted(Vec::new());
    let (state, effects) = update(state, Msg::SubmitResponded(SubmitReply::default()));

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.view().message, "Error: missing task_id");
}

#[test]
fn transport_failure_on_submit_restores_control() {
    init_logging();
    let state = submitted(Vec::new());
    let (state, effects) = update(state, Msg::SubmitFailed("connection refused".to_string()));
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(view.phase, Phase::Failed);
    assert_eq!(view.message, "Error: connection refused");
    assert!(view.submit.enabled);
}

#[test]
fn late_submit_reply_is_ignored_outside_submitting() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SubmitResponded(SubmitReply {
            error: None,
            task_id: Some("t".to_string()),
        }),
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
}

#[test]
fn retry_after_submit_error_starts_fresh_run() {
    init_logging();
    let state = submitted(vec![FormField::text("k", "v")]);
    let (state, _) = update(state, Msg::SubmitFailed("boom".to_string()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    let view = state.view();

    assert_eq!(view.phase, Phase::Submitting);
    assert_eq!(view.attempt, 2);
    assert_eq!(view.message, DEFAULT_MESSAGE);
    assert_eq!(
        effects,
        vec![Effect::SubmitForm {
            fields: vec![FormField::text("k", "v")],
        }]
    );
}

#[test]
fn form_edits_are_ignored_while_in_flight() {
    init_logging();
    let state = submitted(vec![FormField::text("k", "v")]);
    let (state, _) = update(
        state,
        Msg::FieldChanged {
            name: "k".to_string(),
            value: "changed".to_string(),
        },
    );

    assert_eq!(state.fields(), &[FormField::text("k", "v")]);
}
