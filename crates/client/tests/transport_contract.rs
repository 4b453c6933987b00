mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockBackend, Reply};
use eden_console::config::ApiConfig;
use eden_console::error::{MSG_FORBIDDEN, MSG_NOT_FOUND, MSG_SERVER_ERROR};
use eden_console::notify::RecordingNotifier;
use eden_console::protocol::ResponseEnvelope;
use eden_console::{ApiRequest, Credential, ErrorKind, RequestError, Transport};
use serde_json::{json, Value};

fn transport(config: &ApiConfig) -> (Transport, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let transport = Transport::new(config, notifier.clone()).unwrap();
    (transport, notifier)
}

async fn send(
    transport: &Transport,
    path: &str,
    credential: Option<&Credential>,
) -> Result<ResponseEnvelope<Value>, RequestError> {
    transport.send(&ApiRequest::get(path), credential).await
}

#[tokio::test]
async fn test_authorization_header_follows_credential() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/api/v1/menus/tree", Reply::ok(json!([])));
    let (transport, _) = transport(&backend.config().api);

    send(&transport, "/api/v1/menus/tree", None).await.unwrap();
    assert!(backend.last_hit().authorization.is_empty());

    let credential = Credential::new("abc").unwrap();
    send(&transport, "/api/v1/menus/tree", Some(&credential))
        .await
        .unwrap();
    assert_eq!(backend.last_hit().authorization, vec!["Bearer abc"]);
}

#[tokio::test]
async fn test_success_envelope_is_returned() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/legacy", Reply::Json(200, json!({ "code": 0, "message": "success", "data": { "n": 1 } })));
    backend.on("GET", "/current", Reply::ok(json!({ "n": 2 })));
    let (transport, notifier) = transport(&backend.config().api);

    let legacy = send(&transport, "/legacy", None).await.unwrap();
    assert_eq!(legacy.code, 0);
    assert_eq!(legacy.data, Some(json!({ "n": 1 })));

    let current = send(&transport, "/current", None).await.unwrap();
    assert_eq!(current.message, "ok");
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_custom_success_codes() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/legacy", Reply::Json(200, json!({ "code": 0, "message": "success" })));
    let mut config = backend.config().api;
    config.success_codes = vec![200];
    let (transport, _) = transport(&config);

    let err = send(&transport, "/legacy", None).await.unwrap_err();
    assert!(matches!(err, RequestError::Application { code: 0, .. }));
}

#[tokio::test]
async fn test_application_error_keeps_server_message() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/api/v1/roles/9", Reply::app_error(-1, "角色不存在"));
    let (transport, notifier) = transport(&backend.config().api);

    let err = send(&transport, "/api/v1/roles/9", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ApplicationError);
    assert_eq!(err.to_string(), "角色不存在");
    assert_eq!(notifier.entries(), vec![(ErrorKind::ApplicationError, "角色不存在".to_string())]);
}

#[tokio::test]
async fn test_status_table() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/forbidden", Reply::status(403, "no"));
    backend.on("GET", "/broken", Reply::status(500, "panic: nil map"));
    backend.on("GET", "/denied", Reply::status(401, "expired"));
    let (transport, notifier) = transport(&backend.config().api);

    let err = send(&transport, "/forbidden", None).await.unwrap_err();
    assert_eq!((err.status(), err.to_string()), (Some(403), MSG_FORBIDDEN.to_string()));

    // No canned reply: the mock answers 404
    let err = send(&transport, "/missing", None).await.unwrap_err();
    assert_eq!((err.status(), err.to_string()), (Some(404), MSG_NOT_FOUND.to_string()));

    let err = send(&transport, "/broken", None).await.unwrap_err();
    assert_eq!((err.status(), err.to_string()), (Some(500), MSG_SERVER_ERROR.to_string()));

    let err = send(&transport, "/denied", None).await.unwrap_err();
    assert!(matches!(err, RequestError::Unauthenticated { .. }));

    assert_eq!(notifier.len(), 4);
}

#[tokio::test]
async fn test_unlisted_status_messages() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/bad", Reply::status(400, "name is required"));
    backend.on("GET", "/history", Reply::Json(400, json!({ "error": "invalid config id" })));
    backend.on("GET", "/gateway", Reply::Text(502, "<html>bad gateway</html>".to_string()));
    let (transport, _) = transport(&backend.config().api);

    let err = send(&transport, "/bad", None).await.unwrap_err();
    assert_eq!(err.to_string(), "name is required");

    let err = send(&transport, "/history", None).await.unwrap_err();
    assert_eq!(err.to_string(), "invalid config id");

    let err = send(&transport, "/gateway", None).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "Request failed with status code 502");
}

#[tokio::test]
async fn test_unparsable_body_is_decode_error() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/html", Reply::Text(200, "<html></html>".to_string()));
    backend.on("GET", "/shape", Reply::ok(json!("not a number")));
    let (transport, notifier) = transport(&backend.config().api);

    let err = send(&transport, "/html", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeError);

    let err = transport
        .send::<u64>(&ApiRequest::get("/shape"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeError);
    assert_eq!(notifier.len(), 2);
}

#[tokio::test]
async fn test_failure_envelope_with_odd_payload_is_application_error() {
    let backend = MockBackend::start().await;
    backend.on(
        "GET",
        "/odd",
        Reply::Json(200, json!({ "code": 500, "message": "sync failed", "data": {} })),
    );
    let (transport, _) = transport(&backend.config().api);

    let err = transport
        .send::<Vec<u64>>(&ApiRequest::get("/odd"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Application { code: 500, .. }));
}

#[tokio::test]
async fn test_null_query_values_are_omitted() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/api/v1/k8s-pods", Reply::ok(json!({ "list": [], "total": 0 })));
    let (transport, _) = transport(&backend.config().api);

    let request = ApiRequest::get("/api/v1/k8s-pods")
        .query(&json!({ "page": 1, "pageSize": 10, "namespace": null, "configId": 3 }))
        .unwrap();
    transport.send::<Value>(&request, None).await.unwrap();

    let hit = backend.last_hit();
    assert_eq!(hit.param("configId").as_deref(), Some("3"));
    assert_eq!(hit.param("pageSize").as_deref(), Some("10"));
    assert_eq!(hit.param("namespace"), None);
}

#[tokio::test]
async fn test_no_response_is_network_error() {
    // Grab a free port, then release it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiConfig {
        base_url: format!("http://{addr}"),
        ..ApiConfig::default()
    };
    let (transport, notifier) = transport(&config);

    let err = send(&transport, "/api/v1/users/info", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkError);
    assert_eq!(notifier.entries()[0].0, ErrorKind::NetworkError);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let backend = MockBackend::start().await;
    backend.on(
        "GET",
        "/slow",
        Reply::Slow(Duration::from_secs(5), Box::new(Reply::ok(json!(null)))),
    );
    let mut config = backend.config().api;
    config.timeout_secs = 1;
    let (transport, _) = transport(&config);

    let err = send(&transport, "/slow", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkError);
}

#[tokio::test]
async fn test_identical_calls_are_not_cached() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/api/v1/menus/tree", Reply::ok(json!([])));
    let (transport, _) = transport(&backend.config().api);

    send(&transport, "/api/v1/menus/tree", None).await.unwrap();
    send(&transport, "/api/v1/menus/tree", None).await.unwrap();
    assert_eq!(backend.hits_to("/api/v1/menus/tree").len(), 2);
}
