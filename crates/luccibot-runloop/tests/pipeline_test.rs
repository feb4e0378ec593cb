//! End-to-end tests of the interpreter, executor and coordinator wired
//! through one hub under a supervisor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use luccibot_core::{BusReceiver, Hub, HubReceivers, Supervisor};
use luccibot_protocols::{Event, EventKind, SignedArtifact, Signer, SigningError};
use luccibot_runloop::{
    InterpreterLoop, SigningCoordinator, SkillExecutor, SkillRunner, GREETING, NOT_UNDERSTOOD,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Signer returning `sig(<payload>)` and counting its calls.
struct TaggingSigner {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Signer for TaggingSigner {
    fn id(&self) -> &str {
        "tagging"
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok([b"sig(".as_slice(), payload, b")"].concat())
    }
}

struct Pipeline {
    hub: Arc<Hub>,
    outbound: BusReceiver<Event>,
    supervisor: Supervisor,
    signer_calls: Arc<AtomicUsize>,
    _skills: tempfile::TempDir,
}

fn start(capacity: usize, skills: &[(&str, &str)]) -> Pipeline {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in skills {
        std::fs::write(dir.path().join(name), body).unwrap();
    }

    let mut supervisor = Supervisor::new(Duration::from_secs(1));
    let (hub, rx) = Hub::new(capacity, supervisor.cancellation_token());
    let HubReceivers {
        inbound,
        outbound,
        dispatch,
        signing,
    } = rx;

    let signer_calls = Arc::new(AtomicUsize::new(0));
    let signer = Arc::new(TaggingSigner {
        calls: signer_calls.clone(),
    });

    let runner = SkillRunner::new(dir.path())
        .with_runner("sh")
        .with_timeout(Some(Duration::from_secs(10)));
    let executor = SkillExecutor::new(hub.clone(), runner, supervisor.spawner(), 4);
    let coordinator = SigningCoordinator::new(signer, supervisor.cancellation_token());
    let interpreter = InterpreterLoop::new(hub.clone());

    supervisor.spawn_component("interpreter", interpreter.run(inbound));
    supervisor.spawn_component("executor", executor.run(dispatch));
    supervisor.spawn_component("coordinator", coordinator.run(signing));

    Pipeline {
        hub,
        outbound,
        supervisor,
        signer_calls,
        _skills: dir,
    }
}

async fn next_event(outbound: &mut BusReceiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), outbound.recv())
        .await
        .expect("timed out waiting for an outbound event")
        .expect("outbound channel closed")
}

/// Collect events until `count` signed artifacts have arrived.
async fn collect_signed(outbound: &mut BusReceiver<Event>, count: usize) -> (Vec<Event>, Vec<SignedArtifact>) {
    let mut events = Vec::new();
    let mut signed = Vec::new();
    while signed.len() < count {
        match next_event(outbound).await {
            Event::Signed(artifact) => signed.push(artifact),
            other => events.push(other),
        }
    }
    (events, signed)
}

async fn stop(pipeline: Pipeline) {
    pipeline.supervisor.shutdown();
    let report = tokio::time::timeout(Duration::from_secs(5), pipeline.supervisor.wait())
        .await
        .expect("components must stop after shutdown")
        .unwrap();
    assert_eq!(report.exits.len(), 3);
}

const SWAP_SKILL: &str = "printf '{\"amount\":\"%s\",\"asset\":\"%s\"}' \"$1\" \"$2\"\n";

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_swap_round_trip() {
    let mut pipeline = start(10, &[("swap", SWAP_SKILL)]);

    pipeline
        .hub
        .publish_inbound(Event::user_message("swap 1 eth"))
        .await
        .unwrap();

    let (events, signed) = collect_signed(&mut pipeline.outbound, 1).await;
    let payload = r#"{"amount":"1","asset":"eth"}"#;

    assert_eq!(
        events,
        vec![
            Event::log("Agent started. Waiting for input..."),
            Event::log("Processing: swap 1 eth"),
            Event::log(r#"Identified intent: swap ["1", "eth"]"#),
            Event::log(format!(
                "Transaction signed successfully. Signature: sig({})",
                payload
            )),
        ]
    );
    assert_eq!(signed[0].skill_name, "swap");
    assert_eq!(signed[0].artifact_text(), payload);
    assert_eq!(signed[0].signature_text(), format!("sig({})", payload));
    assert_eq!(pipeline.signer_calls.load(Ordering::SeqCst), 1);

    stop(pipeline).await;
}

#[tokio::test]
async fn test_concurrent_requests_get_their_own_signatures() {
    let tagged = "sleep 0.2\nprintf '{\"tag\":\"%s\"}' \"$1\"\n";
    let mut pipeline = start(10, &[("swap", tagged)]);

    for text in ["swap alpha", "swap beta"] {
        pipeline
            .hub
            .publish_inbound(Event::user_message(text))
            .await
            .unwrap();
    }

    let (_, signed) = collect_signed(&mut pipeline.outbound, 2).await;
    let mut tags: Vec<String> = signed.iter().map(|s| s.artifact_text()).collect();
    tags.sort();
    assert_eq!(tags, vec![r#"{"tag":"alpha"}"#, r#"{"tag":"beta"}"#]);

    for artifact in &signed {
        assert_eq!(
            artifact.signature_text(),
            format!("sig({})", artifact.artifact_text())
        );
    }
    assert_eq!(pipeline.signer_calls.load(Ordering::SeqCst), 2);

    stop(pipeline).await;
}

#[tokio::test]
async fn test_empty_skill_output_never_reaches_signer() {
    let mut pipeline = start(10, &[("swap", "exit 0\n")]);

    pipeline
        .hub
        .publish_inbound(Event::user_message("swap 1 eth"))
        .await
        .unwrap();

    loop {
        let event = next_event(&mut pipeline.outbound).await;
        if event.kind() == EventKind::Error {
            assert_eq!(event, Event::error("Signing failed: Transaction data is empty"));
            break;
        }
        assert_ne!(event.kind(), EventKind::Signed);
    }
    assert_eq!(pipeline.signer_calls.load(Ordering::SeqCst), 0);

    stop(pipeline).await;
}

#[tokio::test]
async fn test_missing_skill_reports_error() {
    let mut pipeline = start(10, &[]);

    pipeline
        .hub
        .publish_inbound(Event::user_message("swap 1 eth"))
        .await
        .unwrap();

    loop {
        let event = next_event(&mut pipeline.outbound).await;
        if event.kind() == EventKind::Error {
            assert!(event
                .text()
                .unwrap()
                .starts_with("Failed to execute skill swap:"));
            break;
        }
    }
    assert_eq!(pipeline.signer_calls.load(Ordering::SeqCst), 0);

    stop(pipeline).await;
}

#[tokio::test]
async fn test_replies_in_input_order() {
    let mut pipeline = start(10, &[]);

    for text in ["", "xyz", "   ", "hello"] {
        pipeline
            .hub
            .publish_inbound(Event::user_message(text))
            .await
            .unwrap();
    }

    let mut events = Vec::new();
    for _ in 0..5 {
        events.push(next_event(&mut pipeline.outbound).await);
    }
    assert_eq!(
        events,
        vec![
            Event::log("Agent started. Waiting for input..."),
            Event::log("Processing: xyz"),
            Event::response(NOT_UNDERSTOOD),
            Event::log("Processing: hello"),
            Event::response(GREETING),
        ]
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(pipeline.outbound.is_empty());
    assert_eq!(pipeline.signer_calls.load(Ordering::SeqCst), 0);

    stop(pipeline).await;
}

#[tokio::test]
async fn test_shutdown_unblocks_components_on_full_channels() {
    let pipeline = start(1, &[("swap", SWAP_SKILL)]);

    // Nobody drains outbound: the interpreter blocks after its first event.
    for text in ["hello", "swap 1 eth"] {
        let _ = tokio::time::timeout(
            Duration::from_millis(200),
            pipeline.hub.publish_inbound(Event::user_message(text)),
        )
        .await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    stop(pipeline).await;
}
