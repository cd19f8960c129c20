//! Test assertions for progress envelopes.

use crate::core::{OperationStatus, OutcomeCode, ProgressEnvelope};
use std::fmt::Debug;

/// Asserts that the envelope satisfies every status invariant.
pub fn assert_envelope_valid<M: Debug>(envelope: &ProgressEnvelope<M>) {
    let violations = envelope.invariant_violations();
    assert!(
        violations.is_empty(),
        "Envelope violates invariants {violations:?}: {envelope:?}"
    );
}

/// Asserts that the envelope reports success.
pub fn assert_envelope_succeeded<M: Debug>(envelope: &ProgressEnvelope<M>) {
    assert_envelope_valid(envelope);
    assert_eq!(
        envelope.status,
        OperationStatus::Success,
        "Expected success, got {envelope:?}"
    );
}

/// Asserts that the envelope reports the given failure.
pub fn assert_envelope_failed<M: Debug>(envelope: &ProgressEnvelope<M>, expected: OutcomeCode) {
    assert_envelope_valid(envelope);
    assert_eq!(
        envelope.status,
        OperationStatus::Failed,
        "Expected failure, got {envelope:?}"
    );
    assert_eq!(
        envelope.error_code,
        Some(expected),
        "Expected outcome {expected}, got {:?}",
        envelope.error_code
    );
}

/// Asserts that the envelope asks to be re-invoked after the given delay.
pub fn assert_envelope_in_progress<M: Debug>(envelope: &ProgressEnvelope<M>, delay_seconds: u32) {
    assert_envelope_valid(envelope);
    assert_eq!(
        envelope.status,
        OperationStatus::InProgress,
        "Expected in progress, got {envelope:?}"
    );
    assert_eq!(
        envelope.callback_delay_seconds, delay_seconds,
        "Expected delay {delay_seconds}, got {}",
        envelope.callback_delay_seconds
    );
}
