use super::*;
use std::time::Duration;

use async_trait::async_trait;
use luccibot_core::{CancellationToken, HubReceivers};
use luccibot_protocols::{EventKind, Signer};

use crate::coordinator::SigningCoordinator;

struct EchoSigner;

#[async_trait]
impl Signer for EchoSigner {
    fn id(&self) -> &str {
        "echo"
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SigningError> {
        Ok([b"sig(".as_slice(), payload, b")"].concat())
    }
}

struct RefusingSigner;

#[async_trait]
impl Signer for RefusingSigner {
    fn id(&self) -> &str {
        "refusing"
    }

    async fn sign(&self, _payload: &[u8]) -> Result<Vec<u8>, SigningError> {
        Err(SigningError::Failed("key locked".to_string()))
    }
}

struct Fixture {
    hub: Arc<Hub>,
    outbound: BusReceiver<Event>,
    signing: Option<BusReceiver<SigningRequest>>,
    dispatch: Option<BusReceiver<DispatchRequest>>,
    cancel: CancellationToken,
    runner: SkillRunner,
    _dir: tempfile::TempDir,
}

fn fixture(scripts: &[(&str, &str)]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in scripts {
        std::fs::write(dir.path().join(name), body).unwrap();
    }
    let cancel = CancellationToken::new();
    let (hub, rx) = Hub::new(8, cancel.clone());
    let HubReceivers {
        outbound,
        signing,
        dispatch,
        ..
    } = rx;
    let runner = SkillRunner::new(dir.path()).with_runner("sh");
    Fixture {
        hub,
        outbound,
        signing: Some(signing),
        dispatch: Some(dispatch),
        cancel,
        runner,
        _dir: dir,
    }
}

fn serve_signing(fx: &mut Fixture, signer: Arc<dyn Signer>) {
    let signing = fx.signing.take().unwrap();
    let coordinator = SigningCoordinator::new(signer, fx.cancel.clone());
    tokio::spawn(coordinator.run(signing));
}

const SWAP_SKILL: &str = "printf '{\"amount\":\"%s\",\"asset\":\"%s\"}' \"$1\" \"$2\"\n";

#[tokio::test]
async fn test_success_publishes_log_then_signed() {
    let mut fx = fixture(&[("swap", SWAP_SKILL)]);
    serve_signing(&mut fx, Arc::new(EchoSigner));

    let request = DispatchRequest::new("swap").with_arguments(["1", "eth"]);
    let outcome = SkillExecutor::handle_request(&fx.hub, &fx.runner, request).await;
    assert_eq!(outcome, RequestOutcome::Signed);

    let payload = r#"{"amount":"1","asset":"eth"}"#;
    assert_eq!(
        fx.outbound.recv().await.unwrap(),
        Event::log(format!("Transaction signed successfully. Signature: sig({})", payload))
    );
    match fx.outbound.recv().await.unwrap() {
        Event::Signed(signed) => {
            assert_eq!(signed.skill_name, "swap");
            assert_eq!(signed.artifact_text(), payload);
            assert_eq!(signed.signature_text(), format!("sig({})", payload));
        }
        other => panic!("expected signed event, got {:?}", other),
    }
    assert!(fx.outbound.is_empty());
}

#[tokio::test]
async fn test_skill_failure_publishes_error_and_skips_signing() {
    let mut fx = fixture(&[("fail", "echo 'no route' >&2\nexit 1\n")]);

    let outcome =
        SkillExecutor::handle_request(&fx.hub, &fx.runner, DispatchRequest::new("fail")).await;
    assert_eq!(outcome, RequestOutcome::SkillFailed);

    let event = fx.outbound.recv().await.unwrap();
    let text = event.text().unwrap().to_string();
    assert_eq!(event.kind(), EventKind::Error);
    assert!(text.starts_with("Failed to execute skill fail:"), "{}", text);
    assert!(text.contains("no route"));
    assert!(fx.signing.as_mut().unwrap().try_recv().is_none());
}

#[tokio::test]
async fn test_invalid_skill_name_is_reported() {
    let mut fx = fixture(&[]);

    let outcome =
        SkillExecutor::handle_request(&fx.hub, &fx.runner, DispatchRequest::new("../swap")).await;
    assert_eq!(outcome, RequestOutcome::SkillFailed);
    let event = fx.outbound.recv().await.unwrap();
    assert!(event.text().unwrap().starts_with("Failed to execute skill ../swap:"));
}

#[tokio::test]
async fn test_signer_error_is_reported() {
    let mut fx = fixture(&[("swap", SWAP_SKILL)]);
    serve_signing(&mut fx, Arc::new(RefusingSigner));

    let request = DispatchRequest::new("swap").with_arguments(["1", "eth"]);
    let outcome = SkillExecutor::handle_request(&fx.hub, &fx.runner, request).await;
    assert_eq!(outcome, RequestOutcome::SigningFailed);
    assert_eq!(
        fx.outbound.recv().await.unwrap(),
        Event::error("Signing failed: Signer failed: key locked")
    );
}

#[tokio::test]
async fn test_dropped_reply_is_reported() {
    let mut fx = fixture(&[("swap", SWAP_SKILL)]);
    let mut signing = fx.signing.take().unwrap();
    tokio::spawn(async move {
        let request = signing.recv().await;
        drop(request);
    });

    let outcome =
        SkillExecutor::handle_request(&fx.hub, &fx.runner, DispatchRequest::new("swap")).await;
    assert_eq!(outcome, RequestOutcome::SigningFailed);
    assert_eq!(
        fx.outbound.recv().await.unwrap(),
        Event::error("Signing failed: Signer dropped the request")
    );
}

#[tokio::test]
async fn test_cancel_while_waiting_for_signature() {
    let mut fx = fixture(&[("swap", SWAP_SKILL)]);
    let hub = fx.hub.clone();
    let runner = fx.runner.clone();

    let task = tokio::spawn(async move {
        SkillExecutor::handle_request(&hub, &runner, DispatchRequest::new("swap")).await
    });

    // Nobody serves the signing channel; wait until the request is queued.
    let queued = fx.signing.as_mut().unwrap().recv().await;
    assert!(queued.is_some());
    fx.cancel.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("request must stop after cancellation")
        .unwrap();
    assert_eq!(outcome, RequestOutcome::Cancelled);
}

#[tokio::test]
async fn test_run_spawns_tracked_tasks() {
    let mut fx = fixture(&[("swap", SWAP_SKILL)]);
    serve_signing(&mut fx, Arc::new(EchoSigner));

    let spawner = TaskSpawner::new(fx.cancel.clone());
    let executor = SkillExecutor::new(fx.hub.clone(), fx.runner.clone(), spawner.clone(), 2);
    let dispatch = fx.dispatch.take().unwrap();
    let task = tokio::spawn(executor.run(dispatch));

    fx.hub
        .publish_dispatch(DispatchRequest::new("swap").with_arguments(["1", "eth"]))
        .await
        .unwrap();

    let mut kinds = Vec::new();
    for _ in 0..2 {
        kinds.push(fx.outbound.recv().await.unwrap().kind());
    }
    assert_eq!(
        kinds,
        vec![EventKind::Log, EventKind::Signed]
    );

    fx.cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("executor loop must exit")
        .unwrap();
    assert!(result.is_ok());

    assert_eq!(spawner.shutdown(Duration::from_secs(1)).await, 0);
    assert_eq!(spawner.metrics().total_spawned, 1);
}
