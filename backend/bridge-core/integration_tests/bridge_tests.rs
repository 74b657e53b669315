use crate::helpers::{
    acknowledge_handshake, initialize_with_context, new_bridge, respond, settle,
};

use bridge_core::HANDSHAKE_FUNC;
use bridge_core::error::bridge::BridgeError;

use common::FrameContext;

use serde_json::json;

const ANY_CONTEXT: &[FrameContext] = &[];
const CONTENT_ONLY: &[FrameContext] = &[FrameContext::Content];

/// **VALUE**: Verifies the gate fires before initialization and that no
/// envelope leaves the bridge.
///
/// **BUG THIS CATCHES**: A call leaking to the host before the handshake
/// would reach it unauthorized and uncorrelatable.
#[tokio::test]
async fn given_uninitialized_bridge_when_calling_then_not_initialized_and_nothing_sent() {
    let (bridge, host) = new_bridge();

    let result = bridge.call("files.getCloudStorageFolders", vec![], CONTENT_ONLY).await;
    let error = result.err().expect("call before initialize must fail");
    assert!(matches!(error, BridgeError::NotInitialized { .. }));
    assert!(
        error
            .to_string()
            .starts_with("The library has not yet been initialized")
    );
    assert_eq!(host.message_count(), 0);
}

/// **VALUE**: Verifies context gating after the handshake, with no envelope
/// sent for the rejected call.
#[tokio::test]
async fn given_settings_context_when_calling_content_op_then_context_violation() {
    let (bridge, host) = new_bridge();
    initialize_with_context(&bridge, "settings").await;

    let sent_before = host.message_count();
    let result = bridge.call("content.op", vec![], CONTENT_ONLY).await;
    assert!(matches!(
        result.err(),
        Some(BridgeError::ContextViolation {
            context: FrameContext::Settings,
            ..
        })
    ));
    assert_eq!(host.message_count(), sent_before);
}

/// **VALUE**: The canonical single-shot round trip: envelope carries id 0
/// (the handshake does not consume a counter id), the host replies, and the
/// caller sees the exact positional args exactly once.
#[tokio::test]
async fn given_ready_bridge_when_calling_then_envelope_sent_and_response_delivered() {
    let (bridge, host) = new_bridge();
    let context = initialize_with_context(&bridge, "content").await;
    assert_eq!(context, FrameContext::Content);

    let call = bridge
        .call("A", vec![json!(1), json!(2)], ANY_CONTEXT)
        .await
        .expect("call after ready succeeds");

    let envelope = host.find_message_by_func("A").expect("envelope for A sent");
    assert_eq!(envelope.id, 0);
    assert_eq!(envelope.args, vec![json!(1), json!(2)]);

    respond(&bridge, 0, json!([null, "ok"]));
    let args = call.await.expect("response delivered");
    assert_eq!(args, vec![json!(null), json!("ok")]);
}

/// **VALUE**: Verifies queue-then-flush ordering: calls issued while
/// `Initializing` reach the transport exactly once, in issue order, ahead
/// of anything issued after `Ready`.
///
/// **BUG THIS CATCHES**: A queue that flushes out of order, twice, or late
/// would reorder positional protocols on the host side.
#[tokio::test]
async fn given_calls_during_initializing_when_handshake_resolves_then_flushed_in_order() {
    let (bridge, host) = new_bridge();
    let ready = bridge.initialize();

    let call_b = bridge.call("B", vec![], ANY_CONTEXT).await.expect("B queues");
    let call_c = bridge.call("C", vec![], ANY_CONTEXT).await.expect("C queues");

    // Nothing but the handshake has left the bridge yet.
    assert_eq!(host.message_count(), 1);
    assert_eq!(host.messages()[0].func, HANDSHAKE_FUNC);

    acknowledge_handshake(&bridge, "content", None);
    ready.await.expect("handshake resolves");

    let call_d = bridge.call("D", vec![], ANY_CONTEXT).await.expect("D sends");

    let funcs: Vec<String> = host.messages().into_iter().map(|m| m.func).collect();
    assert_eq!(funcs, [HANDSHAKE_FUNC, "B", "C", "D"]);

    // Ids follow creation order, seq follows dispatch order.
    let messages = host.messages();
    assert_eq!(call_b.id(), 0);
    assert_eq!(call_c.id(), 1);
    assert_eq!(call_d.id(), 2);
    assert_eq!(messages[0].seq, Some(0));
    assert_eq!(messages[1].seq, Some(1));
    assert_eq!(messages[3].seq, Some(3));
}

/// **VALUE**: Verifies initialize is idempotent: a second call joins the
/// in-flight handshake instead of sending another envelope.
#[tokio::test]
async fn given_initializing_bridge_when_initialize_again_then_single_handshake() {
    let (bridge, host) = new_bridge();
    let first = bridge.initialize();
    let second = bridge.initialize();
    settle().await;

    assert_eq!(host.message_count(), 1);

    acknowledge_handshake(&bridge, "task", None);
    assert_eq!(first.await.expect("first resolves"), FrameContext::Task);
    assert_eq!(second.await.expect("second resolves"), FrameContext::Task);

    // And from `Ready`, initialize resolves immediately with no new envelope.
    let third = bridge.initialize();
    assert_eq!(third.await.expect("third resolves"), FrameContext::Task);
    assert_eq!(host.message_count(), 1);
}

/// **VALUE**: Duplicate and unknown-id responses are dropped without
/// disturbing the dispatcher or later traffic.
#[tokio::test]
async fn given_duplicate_and_unknown_responses_when_delivered_then_dropped() {
    let (bridge, _host) = new_bridge();
    initialize_with_context(&bridge, "content").await;

    let call = bridge.call("A", vec![], ANY_CONTEXT).await.expect("call");
    respond(&bridge, call.id(), json!([null, "first"]));
    respond(&bridge, call.id(), json!([null, "second"]));
    respond(&bridge, 999, json!([null, "nobody asked"]));

    let args = call.await.expect("first response wins");
    assert_eq!(args, vec![json!(null), json!("first")]);
    settle().await;

    // The dispatcher survived; a fresh call still round-trips.
    let next = bridge.call("B", vec![], ANY_CONTEXT).await.expect("call");
    respond(&bridge, next.id(), json!([null]));
    next.await.expect("later call unaffected");
}

/// **VALUE**: Malformed inbound envelopes (junk, missing id, bad args) are
/// dropped silently and never crash the dispatch task.
#[tokio::test]
async fn given_malformed_inbound_when_delivered_then_bridge_survives() {
    let (bridge, _host) = new_bridge();
    initialize_with_context(&bridge, "content").await;

    bridge.deliver(json!(42));
    bridge.deliver(json!({ "args": [null] }));
    bridge.deliver(json!({ "id": "zero", "args": [] }));
    bridge.deliver(json!({ "id": 0, "args": "not an array" }));
    settle().await;

    let call = bridge.call("A", vec![], ANY_CONTEXT).await.expect("call");
    respond(&bridge, call.id(), json!([null]));
    call.await.expect("bridge still dispatching");
}

/// **VALUE**: Teardown discards pending calls silently: the waiting future
/// observes `Discarded`, and a response arriving afterwards goes nowhere.
#[tokio::test]
async fn given_teardown_with_pending_call_when_late_response_arrives_then_no_delivery() {
    let (bridge, _host) = new_bridge();
    initialize_with_context(&bridge, "content").await;

    let call = bridge.call("slow.op", vec![], ANY_CONTEXT).await.expect("call");
    let id = call.id();

    bridge.teardown().await;
    assert!(matches!(call.await, Err(BridgeError::Discarded { .. })));
    assert_eq!(bridge.current_context().await, None);

    respond(&bridge, id, json!([null, "too late"]));
    settle().await;

    // Back to square one: the gate is closed again.
    let result = bridge.call("A", vec![], ANY_CONTEXT).await;
    assert!(matches!(result.err(), Some(BridgeError::NotInitialized { .. })));
}

/// **VALUE**: The id counter survives teardown/re-initialize, so a response
/// straggling across a bridge generation can never hit a fresh call.
#[tokio::test]
async fn given_reinitialized_bridge_when_calling_then_ids_never_reused() {
    let (bridge, _host) = new_bridge();
    initialize_with_context(&bridge, "content").await;
    let first = bridge.call("A", vec![], ANY_CONTEXT).await.expect("call");
    assert_eq!(first.id(), 0);

    bridge.teardown().await;
    initialize_with_context(&bridge, "content").await;

    let second = bridge.call("A", vec![], ANY_CONTEXT).await.expect("call");
    assert_eq!(second.id(), 1);
}

/// **VALUE**: Multi-shot semantics end to end: one request, responses
/// delivered in arrival order with the stream flag stripped, stream closed
/// by the terminal response, further responses dropped.
#[tokio::test]
async fn given_subscription_when_stream_responses_arrive_then_in_order_until_terminal() {
    let (bridge, host) = new_bridge();
    initialize_with_context(&bridge, "content").await;

    let mut subscription = bridge
        .subscribe("progress.watch", vec![json!("job-1")], ANY_CONTEXT)
        .await
        .expect("subscribe");
    let id = subscription.id();
    assert!(host.find_message_by_func("progress.watch").is_some());

    respond(&bridge, id, json!([true, "a"]));
    respond(&bridge, id, json!([true, "b"]));
    respond(&bridge, id, json!([false, "c"]));

    let first = subscription.recv().await.expect("first response");
    assert_eq!(first.args, vec![json!("a")]);
    assert!(!first.terminal);

    let second = subscription.recv().await.expect("second response");
    assert_eq!(second.args, vec![json!("b")]);

    let last = subscription.recv().await.expect("terminal response");
    assert_eq!(last.args, vec![json!("c")]);
    assert!(last.terminal);

    assert!(subscription.recv().await.is_none(), "stream ends after terminal");

    respond(&bridge, id, json!([true, "ghost"]));
    settle().await;
}

/// **VALUE**: Explicit unregistration ends a stream even without a terminal
/// response from the host.
#[tokio::test]
async fn given_subscription_when_unsubscribed_then_later_responses_dropped() {
    let (bridge, _host) = new_bridge();
    initialize_with_context(&bridge, "content").await;

    let mut subscription = bridge
        .subscribe("progress.watch", vec![], ANY_CONTEXT)
        .await
        .expect("subscribe");

    bridge.unsubscribe(subscription.id());
    settle().await;

    respond(&bridge, subscription.id(), json!([true, "dropped"]));
    settle().await;
    assert!(subscription.recv().await.is_none());
}

/// **VALUE**: Fire-and-forget sends an envelope but registers nothing: a
/// host reply to its id is treated as unknown.
#[tokio::test]
async fn given_notify_when_host_replies_then_reply_dropped() {
    let (bridge, host) = new_bridge();
    initialize_with_context(&bridge, "content").await;

    bridge
        .notify("ui.chrome", vec![json!("hide")], ANY_CONTEXT)
        .await
        .expect("notify");

    let envelope = host.find_message_by_func("ui.chrome").expect("envelope sent");
    respond(&bridge, envelope.id, json!([null, "unexpected"]));
    settle().await;

    let call = bridge.call("A", vec![], ANY_CONTEXT).await.expect("call");
    assert_eq!(call.id(), envelope.id + 1, "notify consumed an id");
    respond(&bridge, call.id(), json!([null]));
    call.await.expect("dispatcher unaffected");
}

/// **VALUE**: Capability flags on the handshake acknowledgment are stored
/// and readable once `Ready`, and cleared by teardown.
#[tokio::test]
async fn given_handshake_with_capabilities_when_ready_then_flags_readable() {
    let (bridge, _host) = new_bridge();

    let ready = bridge.initialize();
    acknowledge_handshake(&bridge, "content", Some(json!({ "supportsStreaming": true })));
    ready.await.expect("handshake resolves");

    let capabilities = bridge.capabilities().await.expect("capabilities stored");
    assert_eq!(capabilities.get("supportsStreaming"), Some(&json!(true)));

    bridge.teardown().await;
    assert!(bridge.capabilities().await.is_none());
}

/// **VALUE**: A handshake acknowledgment with an unknown context tag is
/// dropped; the bridge stays `Initializing` and a later valid one wins.
#[tokio::test]
async fn given_unknown_context_tag_when_acknowledged_then_handshake_still_pending() {
    let (bridge, _host) = new_bridge();
    let ready = bridge.initialize();

    acknowledge_handshake(&bridge, "holodeck", None);
    settle().await;
    assert_eq!(bridge.current_context().await, None);

    acknowledge_handshake(&bridge, "sidePanel", None);
    assert_eq!(ready.await.expect("valid ack resolves"), FrameContext::SidePanel);
}

/// **VALUE**: A dead transport at handshake time leaves the bridge down
/// rather than stuck in `Initializing`; the caller can retry initialize.
#[tokio::test]
async fn given_failing_transport_when_sending_then_calls_discarded_not_wedged() {
    let (bridge, host) = new_bridge();

    host.fail_sends();
    let _ready = bridge.initialize();
    settle().await;

    // Handshake never left, so the gate still reports uninitialized.
    let result = bridge.call("A", vec![], ANY_CONTEXT).await;
    assert!(matches!(result.err(), Some(BridgeError::NotInitialized { .. })));
}
