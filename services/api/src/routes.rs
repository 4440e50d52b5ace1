use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use fleet_safety::workflows::inspection::{
    inspection_router, AuditSink, Authorizer, InspectionService, InspectionStore,
};

pub(crate) fn with_inspection_routes<S, Z, A>(
    service: Arc<InspectionService<S, Z, A>>,
) -> axum::Router
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    inspection_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::infra::{EnvAuthorizer, InMemoryInspectionStore, TracingAuditSink};

    fn router() -> axum::Router {
        let service = Arc::new(InspectionService::new(
            Arc::new(InMemoryInspectionStore::default()),
            Arc::new(EnvAuthorizer::from_env()),
            Arc::new(TracingAuditSink),
        ));
        with_inspection_routes(service)
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("status"), Some(&serde_json::json!("ok")));
    }

    #[tokio::test]
    async fn inspection_routes_are_mounted() {
        let details = serde_json::json!({
            "driver": "driver-01",
            "vehicle": "ABZ-4521",
            "supervisor": "supervisor-01",
            "inspection_date": "2025-06-10",
            "route": "Lusaka - Ndola",
            "approved_driving_hours": "6 hrs 50 mins",
            "approved_rest_stops": 2,
        });
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/inspections")
                    .header("content-type", "application/json")
                    .body(Body::from(details.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
