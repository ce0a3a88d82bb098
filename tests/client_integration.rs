//! Purpose: End-to-end tests for the blocking client against a stub control plane.
//! Exports: None (integration test module).
//! Role: Validate routes, auth header, body decoding, and error mapping across TCP.
//! Invariants: Stub server binds loopback port 0 and shuts down on drop.
//! Invariants: Timeouts use short bounded waits to keep tests fast.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use feldera_client::api::{Client, ClientConfig, ErrorKind, Pipeline, Record, ServiceFilter};
use feldera_client::models::{
    KafkaService, NewServiceRequest, ServiceConfig, UpdateServiceRequest,
};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

const TOKEN: &str = "secret-token";
const SLOW_PIPELINE: u64 = 999;

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl StubState {
    fn record(&self, method: &Method, uri: &Uri) {
        let line = format!("{method} {uri}");
        self.requests
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(line);
    }

    fn record_body(&self, body: Value) {
        self.bodies
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(body);
    }
}

struct StubServer {
    base_url: String,
    state: StubState,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl StubServer {
    fn start() -> TestResult<Self> {
        init_tracing();
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let state = StubState::default();
        let app = router(state.clone());
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let thread = std::thread::spawn(move || {
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).with_timeout(Duration::from_secs(5))
    }

    fn client(&self) -> TestResult<Client> {
        Ok(Client::new(self.config())?)
    }

    fn client_with_token(&self) -> TestResult<Client> {
        Ok(Client::new(self.config().with_token(TOKEN))?)
    }

    fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    fn bodies(&self) -> Vec<Value> {
        self.state
            .bodies
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn router(state: StubState) -> Router {
    Router::new()
        .route("/v0/pipelines/:id", delete(pipeline_delete))
        .route("/v0/pipelines/:id/start", post(pipeline_action))
        .route("/v0/pipelines/:id/pause", post(pipeline_action))
        .route("/v0/pipelines/:id/shutdown", post(pipeline_action))
        .route("/v0/pipelines/:id/status", get(pipeline_status))
        .route("/v0/pipelines/:id/metadata", get(pipeline_metadata))
        .route("/v0/services", get(list_services).post(create_service))
        .route(
            "/v0/services/:name",
            get(get_service).patch(update_service).delete(delete_service),
        )
        .with_state(state)
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({"message": message, "error_code": code, "details": {}});
    (status, Json(body)).into_response()
}

fn unknown_pipeline(id: u64) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "UnknownPipeline",
        &format!("Unknown pipeline id '{id}'"),
    )
}

async fn pipeline_action(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<u64>,
) -> Response {
    state.record(&method, &uri);
    if id == 404 {
        return unknown_pipeline(id);
    }
    if uri.path().ends_with("/start") {
        return StatusCode::ACCEPTED.into_response();
    }
    Json(json!({})).into_response()
}

async fn pipeline_delete(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<u64>,
) -> Response {
    state.record(&method, &uri);
    if id == 404 {
        return unknown_pipeline(id);
    }
    Json(json!("Pipeline successfully deleted.")).into_response()
}

async fn pipeline_status(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<u64>,
) -> Response {
    state.record(&method, &uri);
    if id == SLOW_PIPELINE {
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }
    Json(json!({
        "global_metrics": {"total_input_records": 5, "pipeline_complete": false},
        "inputs": [],
        "outputs": []
    }))
    .into_response()
}

async fn pipeline_metadata(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(id): Path<u64>,
) -> Response {
    state.record(&method, &uri);
    if id == 500 {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({"pipeline_id": id, "program_id": "p1", "config": {"workers": 4}})).into_response()
}

fn events_service() -> Value {
    json!({
        "service_id": "0a1b",
        "name": "events",
        "description": "event bus",
        "config": {"kafka": {"bootstrap_servers": ["broker:9092"], "options": {}}},
        "created_by": "admin"
    })
}

fn orders_service() -> Value {
    json!({
        "service_id": "0c2d",
        "name": "orders",
        "description": "orders db",
        "config": {"mysql": {"hostname": "db", "port": 3306, "user": "cdc", "password": "pw"}}
    })
}

async fn list_services(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(&method, &uri);
    let services: Vec<Value> = [events_service(), orders_service()]
        .into_iter()
        .filter(|service| {
            params
                .get("name")
                .is_none_or(|name| service["name"] == json!(name))
        })
        .filter(|service| {
            params.get("config_type").is_none_or(|config_type| {
                service["config"].get(config_type.as_str()).is_some()
            })
        })
        .collect();
    Json(Value::Array(services)).into_response()
}

async fn create_service(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&method, &uri);
    let expected = format!("Bearer {TOKEN}");
    let authorized = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized", "missing bearer token");
    }
    if body["name"] == json!("events") {
        return error_response(
            StatusCode::CONFLICT,
            "DuplicateName",
            "A service with this name already exists",
        );
    }
    state.record_body(body);
    Json(json!({"service_id": "0e3f"})).into_response()
}

async fn get_service(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Path(name): Path<String>,
) -> Response {
    state.record(&method, &uri);
    match name.as_str() {
        "events" => Json(events_service()).into_response(),
        "orders" => Json(orders_service()).into_response(),
        _ => error_response(
            StatusCode::NOT_FOUND,
            "UnknownServiceName",
            &format!("Unknown service name '{name}'"),
        ),
    }
}

async fn update_service(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    state.record(&method, &uri);
    state.record_body(body);
    Json(json!({})).into_response()
}

async fn delete_service(State(state): State<StubState>, method: Method, uri: Uri) -> Response {
    state.record(&method, &uri);
    StatusCode::OK.into_response()
}

#[test]
fn pipeline_lifecycle_hits_expected_routes() -> TestResult<()> {
    let server = StubServer::start()?;
    let pipeline = Pipeline::launch(server.client()?, 7)?;
    pipeline.pause()?;
    pipeline.start()?;
    pipeline.shutdown()?;

    let status = pipeline.status()?;
    assert_eq!(
        status.extensions().get("global_metrics")?["total_input_records"],
        json!(5)
    );
    let metadata = pipeline.metadata()?;
    assert_eq!(metadata.into_map()["program_id"], json!("p1"));
    pipeline.delete()?;

    assert_eq!(
        server.requests(),
        vec![
            "POST /v0/pipelines/7/start",
            "POST /v0/pipelines/7/pause",
            "POST /v0/pipelines/7/start",
            "POST /v0/pipelines/7/shutdown",
            "GET /v0/pipelines/7/status",
            "GET /v0/pipelines/7/metadata",
            "DELETE /v0/pipelines/7",
        ]
    );
    Ok(())
}

#[test]
fn unknown_pipeline_is_server_reported_not_found() -> TestResult<()> {
    let server = StubServer::start()?;
    let err = server.client()?.pipeline(404).pause().expect_err("unknown pipeline");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.is_server_reported());
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.error_code(), Some("UnknownPipeline"));
    assert_eq!(err.message(), Some("Unknown pipeline id '404'"));
    assert_eq!(err.context(), Some("failed to pause pipeline"));

    let err = Pipeline::launch(server.client()?, 404).expect_err("launch unknown");
    assert_eq!(err.context(), Some("failed to start pipeline"));
    Ok(())
}

#[test]
fn non_json_error_body_keeps_status_and_text() -> TestResult<()> {
    let server = StubServer::start()?;
    let err = server.client()?.pipeline(500).metadata().expect_err("server error");
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), Some("boom"));
    assert_eq!(err.error_code(), None);
    assert_eq!(err.context(), Some("failed to retrieve pipeline metadata"));
    Ok(())
}

#[test]
fn slow_response_times_out() -> TestResult<()> {
    let server = StubServer::start()?;
    let client = Client::new(server.config().with_timeout(Duration::from_millis(200)))?;
    let err = client.pipeline(SLOW_PIPELINE).status().expect_err("timeout");
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(!err.is_server_reported());
    assert_eq!(err.context(), Some("failed to retrieve pipeline status"));
    Ok(())
}

#[test]
fn refused_connection_is_transport_failure() -> TestResult<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    let client = Client::new(ClientConfig::new(format!("http://{addr}")))?;
    let err = client.services().get("events").expect_err("refused");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!err.is_server_reported());
    Ok(())
}

#[test]
fn services_list_and_get_decode_union_configs() -> TestResult<()> {
    let server = StubServer::start()?;
    let services = server.client()?.services();

    let all = services.list(&ServiceFilter::default())?;
    assert_eq!(all.len(), 2);
    assert!(matches!(all[0].config(), ServiceConfig::Kafka(_)));
    assert!(matches!(all[1].config(), ServiceConfig::Mysql(_)));
    assert_eq!(all[0].to_value(), events_service());

    let filter = ServiceFilter {
        config_type: Some("mysql".to_string()),
        ..ServiceFilter::default()
    };
    let mysql_only = services.list(&filter)?;
    assert_eq!(mysql_only.len(), 1);
    assert_eq!(mysql_only[0].name(), "orders");

    let events = services.get("events")?;
    assert_eq!(events.service_id(), "0a1b");
    assert_eq!(events.extensions().get("created_by")?, &json!("admin"));

    let err = services.get("missing").expect_err("unknown service");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.error_code(), Some("UnknownServiceName"));

    assert_eq!(
        server.requests(),
        vec![
            "GET /v0/services",
            "GET /v0/services?config_type=mysql",
            "GET /v0/services/events",
            "GET /v0/services/missing",
        ]
    );
    Ok(())
}

#[test]
fn services_create_update_delete() -> TestResult<()> {
    let server = StubServer::start()?;
    let mut options = BTreeMap::new();
    options.insert("acks".to_string(), "all".to_string());
    let request = NewServiceRequest::new(
        "clicks",
        "click stream",
        KafkaService::new(vec!["broker:9092".to_string()], options).into(),
    );

    let err = server
        .client()?
        .services()
        .create(&request)
        .expect_err("no token");
    assert_eq!(err.kind(), ErrorKind::Permission);
    assert_eq!(err.status(), Some(401));

    let services = server.client_with_token()?.services();
    let created = services.create(&request)?;
    assert_eq!(created.service_id(), "0e3f");

    let duplicate = NewServiceRequest::new("events", "dup", request.config().clone());
    let err = services.create(&duplicate).expect_err("duplicate");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.context(), Some("failed to create service"));

    let update = UpdateServiceRequest::new().with_description("clicks v2");
    let updated = services.update("clicks", &update)?;
    assert!(updated.extensions().is_empty());
    services.delete("clicks")?;

    assert_eq!(
        server.bodies(),
        vec![request.to_value(), json!({"description": "clicks v2"})]
    );
    assert_eq!(
        server.requests(),
        vec![
            "POST /v0/services",
            "POST /v0/services",
            "POST /v0/services",
            "PATCH /v0/services/clicks",
            "DELETE /v0/services/clicks",
        ]
    );
    Ok(())
}
