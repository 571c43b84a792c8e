//! Invocations against local TCP listeners through the real transports.

use std::time::Duration;

use super::helpers::{Loopback, TestRegistry, manifest, registry};
use agentmesh::agent::domain::Protocol;
use agentmesh::gateway::domain::{GatewayError, InvocationRequest};
use agentmesh::registry::domain::RegistryError;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn silent_endpoint_times_out(registry: TestRegistry) {
    let endpoint = Loopback::silent().await.expect("bind loopback");
    let id = registry
        .register(manifest("a1", Protocol::Http, &endpoint.http_url(), &[]))
        .await
        .expect("register");

    let outcome = registry
        .invoke(
            &id,
            &InvocationRequest::default().with_timeout(Duration::from_millis(200)),
        )
        .await;

    assert!(matches!(
        outcome,
        Err(RegistryError::Gateway(GatewayError::Timeout { .. }))
    ));
    let stats = registry.agent_stats(&id).expect("agent exists");
    assert_eq!(stats.metrics.errors, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn http_agent_answers_through_reqwest(registry: TestRegistry) {
    let endpoint = Loopback::responding("200 OK", r#"{"echo":"hello"}"#)
        .await
        .expect("bind loopback");
    let id = registry
        .register(manifest("a1", Protocol::Http, &endpoint.http_url(), &[]))
        .await
        .expect("register");

    let result = registry
        .invoke(
            &id,
            &InvocationRequest::new(json!({"text": "hello"})).with_path("/invoke"),
        )
        .await
        .expect("invocation should succeed");

    assert_eq!(result.status, 200);
    assert_eq!(result.response, json!({"echo": "hello"}));
    assert_eq!(
        result.response_headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    let stats = registry.agent_stats(&id).expect("agent exists");
    assert_eq!(stats.metrics.invocations, 1);
    assert_eq!(stats.metrics.errors, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remote_failure_preserves_the_body(registry: TestRegistry) {
    let endpoint = Loopback::responding("503 Service Unavailable", r#"{"error":"busy"}"#)
        .await
        .expect("bind loopback");
    let id = registry
        .register(manifest("a1", Protocol::Http, &endpoint.http_url(), &[]))
        .await
        .expect("register");

    let outcome = registry.invoke(&id, &InvocationRequest::default()).await;

    match outcome {
        Err(RegistryError::Gateway(GatewayError::RemoteError { status, body, .. })) => {
            assert_eq!(status, 503);
            assert_eq!(body, r#"{"error":"busy"}"#);
        }
        other => panic!("expected a remote error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_header_never_reaches_a_live_agent(registry: TestRegistry) {
    let endpoint = Loopback::responding("200 OK", r#"{"ok":true}"#)
        .await
        .expect("bind loopback");
    let id = registry
        .register(manifest("a1", Protocol::Http, &endpoint.http_url(), &[]))
        .await
        .expect("register");

    let outcome = registry
        .invoke(
            &id,
            &InvocationRequest::default().with_header("X-Bad", "line\nbreak"),
        )
        .await;

    assert!(matches!(
        outcome,
        Err(RegistryError::Gateway(GatewayError::InvalidRequest(_)))
    ));
    let stats = registry.agent_stats(&id).expect("agent exists");
    assert_eq!(stats.metrics.errors, 0);
    let trust = stats.trust.expect("agent should be tracked");
    assert!(!trust.penalized);
    assert!(
        registry
            .trust_history(&id, 10)
            .expect("agent exists")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_port_is_unreachable(registry: TestRegistry) {
    let addr = Loopback::closed_addr().await.expect("reserve a port");
    let id = registry
        .register(manifest("a1", Protocol::Http, &format!("http://{addr}/"), &[]))
        .await
        .expect("register");

    let outcome = registry.invoke(&id, &InvocationRequest::default()).await;

    assert!(matches!(
        outcome,
        Err(RegistryError::Gateway(GatewayError::TargetUnreachable { .. }))
    ));
    let trust = registry
        .agent_stats(&id)
        .expect("agent exists")
        .trust
        .expect("agent should be tracked");
    assert!(trust.breakdown.reliability < 0.5);
}

#[cfg(feature = "websocket")]
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn websocket_agent_gets_one_reply(registry: TestRegistry) {
    use futures::{SinkExt, StreamExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local address").to_string();
    let task = tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let Ok(mut stream) = tokio_tungstenite::accept_async(socket).await else {
                continue;
            };
            if let Some(Ok(message)) = stream.next().await {
                let _echoed = stream.send(message).await;
            }
        }
    });
    let _server = Loopback::from_task(addr.clone(), task);
    let id = registry
        .register(manifest("w1", Protocol::Websocket, &format!("ws://{addr}/"), &[]))
        .await
        .expect("register");

    let result = registry
        .invoke(
            &id,
            &InvocationRequest::new(json!({"text": "hi"})).with_skill("echo"),
        )
        .await
        .expect("websocket exchange should succeed");

    assert_eq!(
        result.response,
        json!({"agent_id": "w1", "skill": "echo", "payload": {"text": "hi"}})
    );
}
