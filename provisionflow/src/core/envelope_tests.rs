use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_in_progress_envelope() {
    let state = CallbackState::new().with_forced_delay();
    let envelope = ProgressEnvelope::in_progress("model", state.clone(), 20);

    assert_eq!(envelope.status, OperationStatus::InProgress);
    assert_eq!(envelope.callback_state, Some(state));
    assert_eq!(envelope.callback_delay_seconds, 20);
    assert!(!envelope.is_terminal());
    assert!(envelope.invariant_violations().is_empty());
}

#[test]
fn test_in_progress_zero_delay_is_raised() {
    let envelope = ProgressEnvelope::in_progress("model", CallbackState::new(), 0);
    assert_eq!(envelope.callback_delay_seconds, 1);
    assert!(envelope.invariant_violations().is_empty());
}

#[test]
fn test_success_envelope() {
    let envelope = ProgressEnvelope::success("model");

    assert!(envelope.is_success());
    assert!(envelope.callback_state.is_none());
    assert_eq!(envelope.callback_delay_seconds, 0);
    assert!(envelope.error_code.is_none());
    assert!(envelope.message.is_none());
    assert!(envelope.invariant_violations().is_empty());
}

#[test]
fn test_success_list_envelope() {
    let envelope = ProgressEnvelope::success_list(vec!["a", "b"], Some("page-2".to_string()));

    assert!(envelope.resource_model.is_none());
    assert_eq!(envelope.resource_models, Some(vec!["a", "b"]));
    assert_eq!(envelope.next_token.as_deref(), Some("page-2"));
    assert!(envelope.invariant_violations().is_empty());
}

#[test]
fn test_failed_envelope() {
    let envelope: ProgressEnvelope<&str> =
        ProgressEnvelope::failed(None, OutcomeCode::NotFound, "gone");

    assert!(envelope.is_failed());
    assert_eq!(envelope.error_code, Some(OutcomeCode::NotFound));
    assert_eq!(envelope.message.as_deref(), Some("gone"));
    assert!(envelope.callback_state.is_none());
    assert!(envelope.invariant_violations().is_empty());
}

#[test]
fn test_invariant_violations_detected() {
    let mut envelope = ProgressEnvelope::success("model");
    envelope.callback_state = Some(CallbackState::new());
    envelope.callback_delay_seconds = 5;
    envelope.message = Some("oops".to_string());

    let violations = envelope.invariant_violations();
    assert_eq!(violations.len(), 3);

    let mut envelope: ProgressEnvelope<&str> =
        ProgressEnvelope::failed(None, OutcomeCode::Throttling, "slow");
    envelope.error_code = None;
    assert_eq!(
        envelope.invariant_violations(),
        vec!["FAILED without an outcome code"]
    );
}

#[test]
fn test_wire_shape() {
    let envelope = ProgressEnvelope::in_progress(
        serde_json::json!({"Name": "ap"}),
        CallbackState::new().with_stabilized(),
        20,
    );
    let json = serde_json::to_value(&envelope).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "status": "IN_PROGRESS",
            "resourceModel": {"Name": "ap"},
            "callbackState": {
                "propagated": false,
                "forcedDelayCount": 0,
                "stabilized": true,
                "stabilizationCount": 0
            },
            "callbackDelaySeconds": 20
        })
    );
}

#[test]
fn test_deserialize_envelope() {
    let json = r#"{"status":"FAILED","errorCode":"AccessDenied","message":"no"}"#;
    let envelope: ProgressEnvelope<serde_json::Value> = serde_json::from_str(json).unwrap();

    assert_eq!(envelope.error_code, Some(OutcomeCode::AccessDenied));
    assert_eq!(envelope.callback_delay_seconds, 0);
    assert!(envelope.invariant_violations().is_empty());
}
