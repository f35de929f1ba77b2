use crate::infra::{AppState, UticalcReport};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use pathway_router::error::AppError;
use pathway_router::scoring::{compute_centor_score, CentorInput, CentorScore, PretestInput};
use pathway_router::{
    generate_assessment, route_patient, Assessment, AssessmentRequest, PathwayRouter,
    PatientProfile, RouteResult,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Engine and scorer endpoints bound to a shared, read-only router.
pub(crate) fn pathway_router_routes(router: Arc<PathwayRouter>) -> axum::Router {
    axum::Router::new()
        .route("/api/v1/route", post(route_endpoint))
        .route("/api/v1/assessment", post(assessment_endpoint))
        .route("/api/v1/scores/centor", post(centor_endpoint))
        .route("/api/v1/scores/uticalc", post(uticalc_endpoint))
        .with_state(router)
}

pub(crate) fn with_service_routes(router: Arc<PathwayRouter>) -> axum::Router {
    pathway_router_routes(router)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
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

pub(crate) async fn route_endpoint(
    State(router): State<Arc<PathwayRouter>>,
    Json(profile): Json<PatientProfile>,
) -> Result<Json<RouteResult>, AppError> {
    let result = route_patient(&router, &profile)?;
    info!(
        age_days = profile.age_days,
        pathways = result.pathways.len(),
        critical = result.critical_flags.any(),
        "route request served"
    );
    Ok(Json(result))
}

pub(crate) async fn assessment_endpoint(
    Json(request): Json<AssessmentRequest>,
) -> Json<Assessment> {
    Json(generate_assessment(&request))
}

pub(crate) async fn centor_endpoint(Json(input): Json<CentorInput>) -> Json<CentorScore> {
    Json(compute_centor_score(&input))
}

pub(crate) async fn uticalc_endpoint(
    Json(input): Json<PretestInput>,
) -> Result<Json<UticalcReport>, AppError> {
    Ok(Json(UticalcReport::compute(&input)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use pathway_router::engine::UticalcFindings;
    use pathway_router::{Priority, Status};
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn router() -> Arc<PathwayRouter> {
        Arc::new(PathwayRouter::bundled().expect("bundled configuration validates"))
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn route_endpoint_ranks_critical_sepsis_first() {
        let Json(result) = route_endpoint(
            State(router()),
            Json(PatientProfile {
                age_days: 8 * 365,
                ill_appearing: true,
                hypoxia: true,
                ..Default::default()
            }),
        )
        .await
        .expect("profile routes");

        let first = &result.pathways[0];
        assert_eq!(first.id, "sepsis");
        assert_eq!(first.status, Status::Active);
        assert_eq!(first.priority, Priority::Critical);
        assert!(result.critical_flags.hypoxia);
    }

    #[tokio::test]
    async fn route_endpoint_rejects_incomplete_uticalc_with_422() {
        let err = route_endpoint(
            State(router()),
            Json(PatientProfile {
                age_days: 300,
                uticalc: Some(UticalcFindings {
                    sex: Some("male".to_string()),
                    tmax_c: Some(39.4),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        )
        .await
        .expect_err("circumcision status required");

        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn route_path_accepts_profile_json() {
        let response = pathway_router_routes(router())
            .oneshot(post_json(
                "/api/v1/route",
                json!({ "age_days": 2555, "dysuria": true }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        let pathways = payload["pathways"].as_array().expect("pathways array");
        assert!(pathways.iter().any(|entry| entry["id"] == "uti"));
        assert_eq!(payload["rule_trace"].as_array().map(Vec::len), Some(20));
    }

    #[tokio::test]
    async fn route_path_rejects_unknown_profile_fields() {
        let response = pathway_router_routes(router())
            .oneshot(post_json(
                "/api/v1/route",
                json!({ "age_days": 2555, "dysurea": true }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn centor_path_returns_breakdown() {
        let response = pathway_router_routes(router())
            .oneshot(post_json(
                "/api/v1/scores/centor",
                json!({
                    "age_years": 8.0,
                    "tonsillar_exudate_or_swelling": true,
                    "tender_anterior_cervical_nodes": true,
                    "fever_gt_38": true,
                    "cough_absent": true
                }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["score"], 5);
        assert_eq!(payload["breakdown"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn uticalc_endpoint_flags_testing_threshold() {
        let Json(report) = uticalc_endpoint(Json(PretestInput {
            age_months: 18.0,
            sex: "female".to_string(),
            circumcised: None,
            other_source: false,
            tmax_ge_39: Some(true),
            tmax_c: None,
        }))
        .await
        .expect("scores");

        assert!(report.age_in_range);
        assert!(report.testing_recommended);
    }

    #[tokio::test]
    async fn assessment_endpoint_returns_buckets() {
        let Json(assessment) = assessment_endpoint(Json(AssessmentRequest {
            age_months: 1.0,
            fever_days: 1,
            fever_without_source: true,
            ..Default::default()
        }))
        .await;

        assert!(!assessment.cannot_miss.is_empty());
        assert!(!assessment.recommended_workup.is_empty());
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(recorder.handle()),
        };

        let response = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state
            .readiness
            .store(true, std::sync::atomic::Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
