//! Integration tests for the permission gate

mod mocks;

use livecast_core::permission::{
    Permission, PermissionGate, PermissionOutcome, PermissionPolicy, PolicyPrompt,
};
use mocks::ScriptedPrompt;
use std::cell::Cell;
use std::sync::Arc;

/// Which continuation fired
#[derive(Debug, PartialEq)]
enum Fired {
    Granted,
    Rationale(Option<String>),
    Denied,
}

async fn fire(gate: &PermissionGate, permission: Permission) -> (Fired, usize) {
    let calls = Cell::new(0);
    let fired = gate
        .request_with(
            permission,
            || {
                calls.set(calls.get() + 1);
                Fired::Granted
            },
            |rationale| {
                calls.set(calls.get() + 1);
                Fired::Rationale(rationale)
            },
            || {
                calls.set(calls.get() + 1);
                Fired::Denied
            },
        )
        .await;
    (fired, calls.get())
}

#[tokio::test]
async fn test_exactly_one_continuation_fires() {
    let cases = [
        (PermissionOutcome::Granted, Fired::Granted),
        (
            PermissionOutcome::NeedsRationale {
                rationale: Some("show your face".into()),
            },
            Fired::Rationale(Some("show your face".into())),
        ),
        (PermissionOutcome::Denied, Fired::Denied),
    ];

    for (outcome, expected) in cases {
        let prompt = ScriptedPrompt::granting().answer(Permission::Camera, outcome);
        let gate = PermissionGate::new(Arc::new(prompt));

        let (fired, calls) = fire(&gate, Permission::Camera).await;
        assert_eq!(fired, expected);
        assert_eq!(calls, 1);
    }
}

#[tokio::test]
async fn test_platform_failure_fires_denied() {
    let gate = PermissionGate::new(Arc::new(ScriptedPrompt::broken()));

    let (fired, calls) = fire(&gate, Permission::RecordAudio).await;

    assert_eq!(fired, Fired::Denied);
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn test_gate_keeps_no_state_between_calls() {
    let prompt = Arc::new(
        ScriptedPrompt::granting().answer(Permission::RecordAudio, PermissionOutcome::Denied),
    );
    let gate = PermissionGate::new(prompt.clone());

    for _ in 0..3 {
        assert!(gate.require(Permission::Camera).await.is_ok());
        assert!(gate.require(Permission::RecordAudio).await.is_err());
    }

    assert_eq!(prompt.requests().len(), 6);
}

#[tokio::test]
async fn test_require_denied_is_security_error() {
    let prompt = ScriptedPrompt::granting().answer(Permission::Camera, PermissionOutcome::Denied);
    let gate = PermissionGate::new(Arc::new(prompt));

    let err = gate.require(Permission::Camera).await.unwrap_err();

    assert!(err.is_security());
    assert_eq!(err.rationale(), None);
    assert_eq!(err.to_string(), "Missing permission CAMERA");
}

#[tokio::test]
async fn test_policy_prompt_answers_each_permission() {
    let prompt = PolicyPrompt::new(PermissionPolicy::Deny, PermissionPolicy::Grant);
    let gate = PermissionGate::new(Arc::new(prompt));

    assert_eq!(gate.request(Permission::Camera).await, PermissionOutcome::Denied);
    assert_eq!(
        gate.request(Permission::RecordAudio).await,
        PermissionOutcome::Granted
    );
}

#[tokio::test]
async fn test_allow_all_grants_everything() {
    let gate = PermissionGate::new(Arc::new(PolicyPrompt::allow_all()));

    assert!(gate.request(Permission::Camera).await.is_granted());
    assert!(gate.request(Permission::RecordAudio).await.is_granted());
}
