//! Prometheus metrics endpoint

use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::error::ApiError;
use crate::state::AppState;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Create metrics routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(get_metrics))
}

/// GET /metrics - collects fresh rate limits, then renders them
async fn get_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.collector.scrape().await?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}

#[cfg(test)]
mod tests {
    use crate::{AppState, create_router};
    use async_trait::async_trait;
    use axum::{
        Json, Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::IntoResponse,
        routing::{get, head},
    };
    use dockerhub_client::{
        ClientError, DockerHubClient, DockerHubClientConfig, LimitSource, RateLimitSample,
    };
    use dockerhub_core::LimitCollector;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    struct FailingSource;

    #[async_trait]
    impl LimitSource for FailingSource {
        async fn collect(&self) -> Result<RateLimitSample, ClientError> {
            Err(ClientError::Auth("token service returned status 401".to_string()))
        }
    }

    async fn spawn_upstream(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}", addr)
    }

    async fn mock_docker_hub(registry_status: StatusCode) -> (String, String) {
        let auth = spawn_upstream(Router::new().route(
            "/token",
            get(|| async { Json(json!({"token": "t1"})) }),
        ))
        .await;

        let registry = spawn_upstream(Router::new().route(
            "/v2/library/alpine/manifests/latest",
            head(move || async move {
                (
                    registry_status,
                    [
                        ("RateLimit-Limit", "200;w=21600"),
                        ("RateLimit-Remaining", "150;w=21600"),
                    ],
                )
                    .into_response()
            }),
        ))
        .await;

        (auth, registry)
    }

    fn app_for(auth: &str, registry: &str) -> Router {
        let client = DockerHubClient::new(DockerHubClientConfig {
            auth_url: auth.to_string(),
            registry_url: registry.to_string(),
            ..DockerHubClientConfig::new("library/alpine")
        })
        .unwrap();

        let collector = Arc::new(LimitCollector::new(Arc::new(client)));
        create_router(AppState::new(collector))
    }

    async fn scrape(app: Router) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_scrape_reports_docker_hub_limits() {
        let (auth, registry) = mock_docker_hub(StatusCode::OK).await;

        let (status, body) = scrape(app_for(&auth, &registry)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(
            "dockerhub_limit_max_requests_total{limit=\"max_requests_total\"} 200"
        ));
        assert!(body.contains(
            "dockerhub_limit_remaining_requests_total{limit=\"remaining_requests_total\"} 150"
        ));
    }

    #[tokio::test]
    async fn test_registry_error_fails_scrape() {
        let (auth, registry) = mock_docker_hub(StatusCode::TOO_MANY_REQUESTS).await;

        let (status, body) = scrape(app_for(&auth, &registry)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("dockerhub_limit_max_requests_total"));
        assert!(body.contains("429"));
    }

    #[tokio::test]
    async fn test_token_error_fails_scrape() {
        let collector = Arc::new(LimitCollector::new(Arc::new(FailingSource)));
        let app = create_router(AppState::new(collector));

        let (status, body) = scrape(app).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("dockerhub_limit_remaining_requests_total"));
    }

    #[tokio::test]
    async fn test_health_does_not_collect() {
        let collector = Arc::new(LimitCollector::new(Arc::new(FailingSource)));
        let app = create_router(AppState::new(collector));

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "healthy");
    }
}
