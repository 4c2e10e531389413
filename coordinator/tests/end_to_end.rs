//! End-to-end scenarios driven through the Axum router (for the RPC/HTTP
//! surface) and directly against the registry (for circuit-breaker
//! transitions the surface does not expose as RPC methods), all under a
//! `FixedClock` so timing-sensitive assertions are deterministic.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use coordinator_primitives::{AgentId, Clock, FixedClock};
use coordinator_registry::{AgentRegistry, AgentStatus, HeartbeatInput, RegisterInput, RegistryConfig};
use coordinator_scheduler::Scheduler;
use coordinator_signing::SigningAuthority;
use coordinator_surface::{build_router, AppState, CoordinatorConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn registration(id: &str, total_vram_mb: i64, max_jobs: i32, models: &[&str]) -> RegisterInput {
    RegisterInput {
        id: AgentId::new(id).unwrap(),
        endpoint: format!("http://{id}.local:9000"),
        total_vram_mb,
        total_ram_mb: 32768,
        max_jobs,
        supported_models: models.iter().map(|m| m.to_string()).collect(),
        capabilities: std::collections::HashMap::new(),
    }
}

fn heartbeat(free_vram_mb: i64, running_jobs: i32, cpu_percent: f64, rtt_ms: f64) -> HeartbeatInput {
    HeartbeatInput {
        free_vram_mb,
        free_ram_mb: 16000,
        running_jobs,
        queued_jobs: 0,
        cpu_percent,
        rtt_ms,
    }
}

struct Harness {
    registry: AgentRegistry,
    router: axum::Router,
    clock: Arc<FixedClock>,
}

fn build_harness(token_ttl: Duration) -> Harness {
    let fixed = Arc::new(FixedClock::new());
    let clock: Arc<dyn Clock> = fixed.clone();
    let registry = AgentRegistry::new(Arc::clone(&clock), RegistryConfig::default());
    let scheduler = Arc::new(Scheduler::new(registry.clone()));
    let signing = Arc::new(SigningAuthority::generate(token_ttl).unwrap());
    let config = CoordinatorConfig {
        token_ttl,
        ..CoordinatorConfig::default()
    };
    let state = AppState::new(registry.clone(), scheduler, signing, config, clock);
    let router = build_router(state);
    Harness {
        registry,
        router,
        clock: fixed,
    }
}

async fn request_inference(router: &axum::Router, client_id: &str, model: &str) -> (StatusCode, Value) {
    let body = json!({
        "client_id": client_id,
        "model": model,
        "prompt": "hello there",
    });
    let request = Request::builder()
        .method("POST")
        .uri("/rpc/request-inference")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn single_agent_happy_path() {
    let harness = build_harness(Duration::from_secs(120));
    harness
        .registry
        .register(registration("A1", 8192, 4, &["llama3:7b"]))
        .await
        .unwrap();
    harness
        .registry
        .update_health(&AgentId::new("A1").unwrap(), heartbeat(7000, 1, 20.0, 5.0))
        .await
        .unwrap();

    let (status, body) = request_inference(&harness.router, "c1", "llama3:7b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_id"], "A1");
    let expires_at = body["expires_at"].as_i64().unwrap();
    let now = chrono::Utc::now().timestamp();
    assert!((expires_at - now - 120).abs() <= 2);
}

#[tokio::test]
async fn mcda_prefers_lower_load() {
    let harness = build_harness(Duration::from_secs(60));
    harness.registry.register(registration("A1", 8192, 4, &[])).await.unwrap();
    harness.registry.register(registration("A2", 8192, 4, &[])).await.unwrap();
    harness
        .registry
        .update_health(&AgentId::new("A1").unwrap(), heartbeat(7000, 3, 10.0, 10.0))
        .await
        .unwrap();
    harness
        .registry
        .update_health(&AgentId::new("A2").unwrap(), heartbeat(7000, 0, 10.0, 10.0))
        .await
        .unwrap();

    let (status, body) = request_inference(&harness.router, "c1", "llama3:7b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_id"], "A2");
}

#[tokio::test]
async fn degraded_penalty_prefers_healthy_lower_raw_score() {
    let harness = build_harness(Duration::from_secs(60));
    harness.registry.register(registration("A1", 8192, 4, &[])).await.unwrap();
    harness.registry.register(registration("A2", 8192, 4, &[])).await.unwrap();
    harness
        .registry
        .update_health(&AgentId::new("A1").unwrap(), heartbeat(6000, 1, 5.0, 50.0))
        .await
        .unwrap();
    harness
        .registry
        .update_health(&AgentId::new("A2").unwrap(), heartbeat(7900, 0, 95.0, 5.0))
        .await
        .unwrap();
    assert_eq!(
        harness.registry.get_agent(&AgentId::new("A2").unwrap()).await.unwrap().status,
        AgentStatus::Degraded
    );

    let (status, body) = request_inference(&harness.router, "c1", "llama3:7b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_id"], "A1");
}

#[tokio::test]
async fn circuit_opens_after_threshold_and_then_blocks_scheduling() {
    let harness = build_harness(Duration::from_secs(60));
    let id = AgentId::new("A1").unwrap();
    harness.registry.register(registration("A1", 8192, 4, &[])).await.unwrap();

    harness.registry.record_failure(&id).await.unwrap();
    harness.registry.record_failure(&id).await.unwrap();
    assert_eq!(
        harness.registry.circuit_state(&id).await.unwrap(),
        AgentStatus::Healthy
    );
    harness.registry.record_failure(&id).await.unwrap();
    assert_eq!(
        harness.registry.circuit_state(&id).await.unwrap(),
        AgentStatus::Offline
    );

    let (status, body) = request_inference(&harness.router, "c1", "anything").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "UNAVAILABLE");
}

#[tokio::test]
async fn half_open_recovers_to_healthy_with_zeroed_failure_count() {
    let harness = build_harness(Duration::from_secs(60));
    let id = AgentId::new("A1").unwrap();
    harness.registry.register(registration("A1", 8192, 4, &[])).await.unwrap();
    harness.registry.record_failure(&id).await.unwrap();
    harness.registry.record_failure(&id).await.unwrap();
    harness.registry.record_failure(&id).await.unwrap();
    assert_eq!(harness.registry.circuit_state(&id).await.unwrap(), AgentStatus::Offline);

    harness.clock.advance(Duration::from_secs(31));
    harness.registry.run_cleanup_tick().await;
    assert_eq!(harness.registry.circuit_state(&id).await.unwrap(), AgentStatus::HalfOpen);

    harness.registry.record_success(&id).await.unwrap();
    harness.registry.record_success(&id).await.unwrap();

    let record = harness.registry.get_agent(&id).await.unwrap();
    assert_eq!(record.status, AgentStatus::Healthy);
    assert_eq!(record.failure_count, 0);
}

#[tokio::test]
async fn heartbeat_death_removes_agent_and_scheduling_then_fails() {
    let harness = build_harness(Duration::from_secs(60));
    harness.registry.register(registration("A1", 8192, 4, &[])).await.unwrap();

    harness
        .clock
        .advance(RegistryConfig::default().heartbeat_timeout + RegistryConfig::default().cleanup_interval);
    harness.registry.run_cleanup_tick().await;
    assert!(harness.registry.list_all_agents().await.is_empty());

    let (status, body) = request_inference(&harness.router, "c1", "anything").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "UNAVAILABLE");
}

#[tokio::test]
async fn invalid_argument_rejects_empty_prompt() {
    let harness = build_harness(Duration::from_secs(60));
    let body = json!({"client_id": "c1", "model": "x", "prompt": ""});
    let request = Request::builder()
        .method("POST")
        .uri("/rpc/request-inference")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = harness.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_status_endpoints_respond() {
    let harness = build_harness(Duration::from_secs(60));
    harness.registry.register(registration("A1", 8192, 4, &[])).await.unwrap();

    let health_request = Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap();
    let health_response = harness.router.clone().oneshot(health_request).await.unwrap();
    assert_eq!(health_response.status(), StatusCode::OK);

    let status_request = Request::builder()
        .uri("/api/v1/status?include_agents=true")
        .body(Body::empty())
        .unwrap();
    let status_response = harness.router.clone().oneshot(status_request).await.unwrap();
    assert_eq!(status_response.status(), StatusCode::OK);
    let bytes = to_bytes(status_response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total_agents"], 1);
    assert_eq!(body["agents"].as_array().unwrap().len(), 1);
}
