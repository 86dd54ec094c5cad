use crate::{create_app, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use dockgate_engine::bollard::models::ContainerStateStatusEnum::{EXITED, RUNNING};
use dockgate_engine::mock::{EngineCall, MockEngine, MockFailure, MockLogFrame};
use dockgate_gateway::LifecycleGateway;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

#[cfg(test)]
mod gateway_tests {
    use super::*;

    fn sample_engine() -> Arc<MockEngine> {
        Arc::new(
            MockEngine::new()
                .with_container("web", RUNNING)
                .with_container("db", RUNNING)
                .with_container("job", EXITED)
                .with_logs(
                    "web",
                    vec![
                        MockLogFrame::Stdout("GET / 200\n".to_string()),
                        MockLogFrame::Stderr("slow query\n".to_string()),
                    ],
                ),
        )
    }

    fn create_test_app(engine: &Arc<MockEngine>) -> Router {
        create_app(AppState::new(LifecycleGateway::new(engine.clone())))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let engine = sample_engine();
        let response = send(create_test_app(&engine), "GET", "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "healthy");
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_list_all() {
        let engine = sample_engine();
        let response = send(create_test_app(&engine), "GET", "/containers", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["Id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["web", "db", "job"]);
    }

    #[tokio::test]
    async fn test_list_with_status_filter() {
        let engine = sample_engine();

        let response = send(create_test_app(&engine), "GET", "/containers?status=inactive", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["Id"], "job");

        let response = send(create_test_app(&engine), "GET", "/containers?status=Active", None).await;
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

        let response = send(create_test_app(&engine), "GET", "/containers?status=", None).await;
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_invalid_status_is_bad_request() {
        let engine = sample_engine();
        let response = send(
            create_test_app(&engine),
            "GET",
            "/containers?status=wrong-status",
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "invalid container status");
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_list_engine_failure_is_internal_error() {
        let engine = Arc::new(MockEngine::new().with_list_failure(MockFailure::Server(500)));
        let response = send(create_test_app(&engine), "GET", "/containers", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_inspect() {
        let engine = sample_engine();

        let response = send(create_test_app(&engine), "GET", "/containers/inspect/db", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["Id"], "db");
        assert_eq!(json["State"]["Running"], true);

        let response = send(create_test_app(&engine), "GET", "/containers/inspect/ghost", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "No such container: ghost");
    }

    #[tokio::test]
    async fn test_logs() {
        let engine = sample_engine();

        let response = send(create_test_app(&engine), "GET", "/containers/logs/web", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(body_text(response).await, "GET / 200\nslow query\n");

        let response = send(create_test_app(&engine), "GET", "/containers/logs/ghost", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(engine.released_streams(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let engine = sample_engine();

        let response = send(create_test_app(&engine), "DELETE", "/containers/job", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(create_test_app(&engine), "DELETE", "/containers/job", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_container_named_like_an_action() {
        let engine = Arc::new(
            MockEngine::new()
                .with_container("stop", EXITED)
                .with_container("restart", EXITED),
        );

        for name in ["stop", "restart"] {
            let uri = format!("/containers/{name}");
            let response = send(create_test_app(&engine), "DELETE", &uri, None).await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT, "{name}");
        }

        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Remove("stop".to_string()),
                EngineCall::Remove("restart".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_action_is_not_found() {
        let engine = sample_engine();
        let response = send(create_test_app(&engine), "PUT", "/containers/pause", Some(json!(["web"]))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Unknown action: pause");
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_actions() {
        let engine = sample_engine();

        for action in ["start", "stop", "kill", "restart"] {
            let uri = format!("/containers/{action}");
            let response = send(create_test_app(&engine), "PUT", &uri, Some(json!(["job"]))).await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT, "{action}");
        }

        let grace = Duration::from_secs(5);
        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Start("job".to_string()),
                EngineCall::Stop("job".to_string(), grace),
                EngineCall::Kill("job".to_string()),
                EngineCall::Restart("job".to_string(), grace),
            ]
        );
    }

    #[tokio::test]
    async fn test_bulk_fail_fast_reports_failing_id() {
        let engine = Arc::new(
            MockEngine::new()
                .with_container("c1", RUNNING)
                .with_container("c2", RUNNING)
                .with_container("c4", RUNNING),
        );

        let response = send(
            create_test_app(&engine),
            "PUT",
            "/containers/stop",
            Some(json!(["c1", "c2", "c3", "c4"])),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_text(response).await,
            "stop failed for container c3: No such container: c3"
        );
        assert_eq!(engine.call_count(), 3);
    }

    #[tokio::test]
    async fn test_bulk_engine_failure_is_internal_error() {
        let engine = Arc::new(
            MockEngine::new()
                .with_container("c1", RUNNING)
                .with_failure("c1", MockFailure::Timeout),
        );

        let response = send(create_test_app(&engine), "PUT", "/containers/kill", Some(json!(["c1"]))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_bulk_rejects_bad_bodies_before_touching_engine() {
        let engine = sample_engine();

        for body in [json!(["web", "  "]), json!({"ids": ["web"]}), json!([42])] {
            let response = send(create_test_app(&engine), "PUT", "/containers/start", Some(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_empty_batch_is_no_content() {
        let engine = sample_engine();
        let response = send(create_test_app(&engine), "PUT", "/containers/restart", Some(json!([]))).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(engine.call_count(), 0);
    }
}
