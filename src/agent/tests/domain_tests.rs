//! Unit tests for agent domain validation and mutation.

use chrono::Duration;
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::json;

use crate::agent::domain::{
    AgentDomainError, AgentId, AgentManifest, AgentRecord, AgentUpdate, Endpoint, HealthStatus,
    ManifestSignature, Protocol, SkillManifest,
};
use crate::test_support::{ManualClock, echo_manifest};

#[fixture]
fn clock() -> ManualClock {
    ManualClock::new()
}

#[fixture]
fn record(clock: ManualClock) -> (AgentRecord, ManualClock) {
    let created =
        AgentRecord::from_manifest(echo_manifest("echo-1"), &clock).expect("manifest should be valid");
    (created, clock)
}

// ── Identifiers ─────────────────────────────────────────────────────

#[rstest]
#[case("echo-1")]
#[case("did:agent:3f9a0c")]
#[case("Weather_Bot")]
fn agent_id_accepts_permitted_characters(#[case] raw: &str) {
    let id = AgentId::new(raw).expect("id should be valid");
    assert_eq!(id.as_str(), raw);
}

#[rstest]
#[case("has space")]
#[case("slash/agent")]
#[case("emoji-🤖")]
fn agent_id_rejects_other_characters(#[case] raw: &str) {
    assert_eq!(
        AgentId::new(raw),
        Err(AgentDomainError::InvalidAgentId(raw.to_owned()))
    );
}

#[rstest]
fn agent_id_rejects_blank_and_overlong_values() {
    assert_eq!(AgentId::new("   "), Err(AgentDomainError::EmptyAgentId));
    let long = "a".repeat(101);
    assert_eq!(
        AgentId::new(long.clone()),
        Err(AgentDomainError::AgentIdTooLong(long))
    );
}

#[rstest]
fn agent_id_deserialization_validates() {
    let parsed: Result<AgentId, _> = serde_json::from_value(json!("bad id"));
    assert!(parsed.is_err());
}

// ── Endpoints ───────────────────────────────────────────────────────

#[rstest]
#[case("http://agent.local/api", Protocol::Http)]
#[case("https://agent.local", Protocol::Mcp)]
#[case("ws://agent.local/socket", Protocol::Websocket)]
#[case("agent.local:50051", Protocol::Grpc)]
fn endpoint_accepts_protocol_schemes(#[case] raw: &str, #[case] protocol: Protocol) {
    let endpoint = Endpoint::new(raw, protocol).expect("endpoint should be valid");
    assert_eq!(endpoint.as_str(), raw);
}

#[rstest]
#[case("ws://agent.local", Protocol::Http)]
#[case("agent.local:50051", Protocol::A2a)]
#[case("http://agent .local", Protocol::Http)]
#[case("agent.local", Protocol::Grpc)]
fn endpoint_rejects_mismatched_schemes(#[case] raw: &str, #[case] protocol: Protocol) {
    assert!(matches!(
        Endpoint::new(raw, protocol),
        Err(AgentDomainError::InvalidEndpoint { .. })
    ));
}

// ── Registration ────────────────────────────────────────────────────

#[rstest]
fn from_manifest_normalizes_fields(clock: ManualClock) {
    let created = AgentRecord::from_manifest(echo_manifest("echo-1"), &clock)
        .expect("manifest should be valid");

    assert_eq!(created.id().as_str(), "echo-1");
    assert_eq!(created.name(), "Echo agent");
    assert_eq!(created.protocol(), Protocol::Http);
    assert_eq!(created.health_status(), HealthStatus::Unknown);
    assert!(created.last_heartbeat().is_none());
    assert_eq!(created.created_at(), created.updated_at());
    let tags: Vec<&str> = created.tags().iter().map(String::as_str).collect();
    assert_eq!(tags, ["testing", "utility"]);
    assert!(created.skill("echo").is_some());
}

#[rstest]
fn from_manifest_requires_skills(clock: ManualClock) {
    let manifest = AgentManifest::new("a", "A", "1.0", "http://a.local", Protocol::Http);
    assert_eq!(
        AgentRecord::from_manifest(manifest, &clock),
        Err(AgentDomainError::NoSkills)
    );
}

#[rstest]
fn from_manifest_rejects_duplicate_skill_names(clock: ManualClock) {
    let manifest = echo_manifest("echo-1").with_skill(" echo ", "Another echo");
    assert_eq!(
        AgentRecord::from_manifest(manifest, &clock),
        Err(AgentDomainError::DuplicateSkillName("echo".to_owned()))
    );
}

#[rstest]
fn from_manifest_requires_endpoint(clock: ManualClock) {
    let mut manifest = echo_manifest("echo-1");
    manifest.endpoint = "  ".to_owned();
    assert_eq!(
        AgentRecord::from_manifest(manifest, &clock),
        Err(AgentDomainError::MissingEndpoint)
    );
}

#[rstest]
fn from_manifest_keeps_skill_schemas(clock: ManualClock) {
    let mut manifest = AgentManifest::new("calc", "Calc", "0.1.0", "http://calc.local", Protocol::Http);
    manifest.skills.push(SkillManifest {
        input_schema: Some(json!({ "type": "object" })),
        ..SkillManifest::new("add", "Adds two numbers")
    });

    let created = AgentRecord::from_manifest(manifest, &clock).expect("manifest should be valid");
    let skill = created.skill("add").expect("skill should exist");
    assert_eq!(skill.input_schema(), Some(&json!({ "type": "object" })));
    assert!(skill.output_schema().is_none());
}

#[rstest]
fn manifest_rejects_unknown_fields_when_parsed() {
    let parsed: Result<AgentManifest, _> = serde_json::from_value(json!({
        "id": "a",
        "name": "A",
        "version": "1",
        "protocol": "http",
        "owner": "someone"
    }));
    assert!(parsed.is_err());
}

#[rstest]
fn signing_payload_ignores_tag_order_and_case() {
    let first = echo_manifest("echo-1").with_tags(["b", "A"]);
    let second = echo_manifest("echo-1").with_tags(["a", " B "]);
    assert_eq!(first.signing_payload(), second.signing_payload());

    let renamed = echo_manifest("echo-1").with_tags(["a", "b"]);
    let mut changed = renamed.clone();
    changed.name = "Other".to_owned();
    assert_ne!(renamed.signing_payload(), changed.signing_payload());
}

// ── Updates ─────────────────────────────────────────────────────────

#[rstest]
fn apply_update_reports_changes_and_bumps_timestamp(record: (AgentRecord, ManualClock)) {
    let (mut current, clock) = record;
    let before = current.updated_at();
    clock.advance(Duration::seconds(5));

    let update = AgentUpdate::new()
        .with_name("Loud echo")
        .with_tags(["Loud"]);
    let changes = current
        .apply_update(&update, &clock)
        .expect("update should apply");

    assert_eq!(current.name(), "Loud echo");
    assert_eq!(changes.get("name"), Some(&json!("Loud echo")));
    assert_eq!(changes.get("tags"), Some(&json!(["loud"])));
    assert!(!changes.contains_key("description"));
    assert_eq!(current.updated_at(), before + Duration::seconds(5));
}

#[rstest]
fn apply_update_is_all_or_nothing(record: (AgentRecord, ManualClock)) {
    let (mut current, clock) = record;
    let snapshot = current.clone();

    let update = AgentUpdate::new()
        .with_name("Renamed")
        .with_endpoint("not a url");
    let result = current.apply_update(&update, &clock);

    assert!(matches!(result, Err(AgentDomainError::InvalidEndpoint { .. })));
    assert_eq!(current, snapshot);
}

fn signed_record(clock: &ManualClock) -> AgentRecord {
    let manifest = echo_manifest("echo-1").with_signature(ManifestSignature::new("c2ln", "a2V5"));
    AgentRecord::from_manifest(manifest, clock).expect("manifest should be valid")
}

#[rstest]
#[case::name(AgentUpdate::new().with_name("Renamed"))]
#[case::description(AgentUpdate::new().with_description("Different"))]
#[case::endpoint(AgentUpdate::new().with_endpoint("http://10.0.0.2:8080/"))]
#[case::tags(AgentUpdate::new().with_tags(["moved"]))]
fn signed_field_updates_drop_the_signature(clock: ManualClock, #[case] update: AgentUpdate) {
    let mut current = signed_record(&clock);

    let changes = current
        .apply_update(&update, &clock)
        .expect("update should apply");

    assert!(current.signature().is_none());
    assert_eq!(changes.get("signature"), Some(&serde_json::Value::Null));
}

#[rstest]
fn health_updates_keep_the_signature(clock: ManualClock) {
    let mut current = signed_record(&clock);

    let changes = current
        .apply_update(
            &AgentUpdate::new().with_health_status(HealthStatus::Healthy),
            &clock,
        )
        .expect("update should apply");

    assert!(current.signature().is_some());
    assert!(!changes.contains_key("signature"));
}

#[rstest]
fn apply_update_rejects_empty_updates(record: (AgentRecord, ManualClock)) {
    let (mut current, clock) = record;
    assert_eq!(
        current.apply_update(&AgentUpdate::new(), &clock),
        Err(AgentDomainError::EmptyUpdate)
    );
}

#[rstest]
fn update_from_json_rejects_unknown_fields() {
    let result = AgentUpdate::from_json(&json!({ "name": "x", "version": "2.0", "id": "y" }));
    assert_eq!(
        result,
        Err(AgentDomainError::UnknownUpdateField("id".to_owned()))
    );
}

#[rstest]
#[case(json!(["name"]))]
#[case(json!({ "tags": "not-a-list" }))]
#[case(json!({ "health_status": "sleepy" }))]
fn update_from_json_rejects_malformed_payloads(#[case] payload: serde_json::Value) {
    assert!(matches!(
        AgentUpdate::from_json(&payload),
        Err(AgentDomainError::InvalidUpdate(_))
    ));
}

#[rstest]
fn update_from_json_parses_permitted_fields() {
    let update = AgentUpdate::from_json(&json!({ "health_status": "healthy", "tags": ["x"] }))
        .expect("update should parse");
    assert_eq!(update.health_status, Some(HealthStatus::Healthy));
    assert_eq!(update.tags, Some(vec!["x".to_owned()]));
}

// ── Heartbeats ──────────────────────────────────────────────────────

#[rstest]
fn record_heartbeat_never_moves_backwards(record: (AgentRecord, ManualClock)) {
    let (mut current, clock) = record;
    let later = clock.utc() + Duration::seconds(30);
    let earlier = clock.utc() - Duration::seconds(30);

    current.record_heartbeat(HealthStatus::Healthy, later, &clock);
    current.record_heartbeat(HealthStatus::Unhealthy, earlier, &clock);

    assert_eq!(current.last_heartbeat(), Some(later));
    assert_eq!(current.health_status(), HealthStatus::Unhealthy);
}

#[rstest]
fn protocol_parses_case_insensitively() {
    assert_eq!(Protocol::try_from(" A2A "), Ok(Protocol::A2a));
    assert!(Protocol::try_from("smtp").is_err());
}
