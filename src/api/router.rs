//! API router.
//!
//! Returns a composable `Router` with all routes under `/api/`.
//!
//! Layers (outermost → innermost):
//! 1. CORS → 2. `Cache-Control: no-store` → 3. Access log

use std::sync::Arc;

use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/doctors",
            get(endpoints::doctors::list).post(endpoints::doctors::create),
        )
        .route(
            "/doctors/:id",
            get(endpoints::doctors::detail)
                .put(endpoints::doctors::update)
                .delete(endpoints::doctors::remove),
        )
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::remove),
        )
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route("/appointments/check", post(endpoints::appointments::check))
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail)
                .put(endpoints::appointments::update)
                .delete(endpoints::appointments::remove),
        )
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::scheduling::SchedulingRules;

    /// Router over a fresh database file. Keep the guard alive for the test.
    fn test_app() -> (Router, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = Arc::new(CoreState::new(
            tmp.path().join("carebook.db"),
            SchedulingRules::default(),
        ));
        core.initialize().unwrap();
        (api_router(core), tmp)
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    async fn create_doctor(app: &Router, name: &str) -> i64 {
        let (status, json) = send(
            app,
            request(
                "POST",
                "/api/doctors",
                Some(json!({"name": name, "specialization": "Cardiology"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_i64().unwrap()
    }

    async fn create_patient(app: &Router, name: &str) -> i64 {
        let (status, json) = send(
            app,
            request("POST", "/api/patients", Some(json!({"name": name}))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_i64().unwrap()
    }

    async fn book(app: &Router, date: &str, doctor: i64, patient: i64) -> (StatusCode, Value) {
        send(
            app,
            request(
                "POST",
                "/api/appointments",
                Some(json!({"date": date, "doctorId": doctor, "patientId": patient})),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn health_reports_database_ok() {
        let (app, _tmp) = test_app();
        let response = app
            .clone()
            .oneshot(request("GET", "/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");

        let (_, json) = send(&app, request("GET", "/api/health", None)).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "ok");
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_reports_unreachable_database() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let core = Arc::new(CoreState::new(
            blocker.join("carebook.db"),
            SchedulingRules::default(),
        ));
        let app = api_router(core);

        let (status, json) = send(&app, request("GET", "/api/health", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["database"], "unavailable");
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (app, _tmp) = test_app();
        let response = app
            .oneshot(request("GET", "/api/nonexistent", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn doctor_crud_round() {
        let (app, _tmp) = test_app();
        let id = create_doctor(&app, "Dr. Chen").await;

        let (status, json) = send(&app, request("GET", &format!("/api/doctors/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Dr. Chen");
        assert_eq!(json["specialization"], "Cardiology");

        let (status, json) = send(
            &app,
            request(
                "PUT",
                &format!("/api/doctors/{id}"),
                Some(json!({"id": id, "name": "Dr. Moreau", "specialization": "Oncology"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Dr. Moreau");

        let (_, json) = send(&app, request("GET", "/api/doctors", None)).await;
        assert_eq!(json["doctors"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, request("DELETE", &format!("/api/doctors/{id}"), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, json) = send(&app, request("GET", &format!("/api/doctors/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn put_with_mismatched_id_is_bad_request() {
        let (app, _tmp) = test_app();
        let id = create_patient(&app, "Ada").await;
        let (status, _) = send(
            &app,
            request(
                "PUT",
                &format!("/api/patients/{id}"),
                Some(json!({"id": id + 1, "name": "Ada L."})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_name_is_bad_request() {
        let (app, _tmp) = test_app();
        let (status, json) = send(
            &app,
            request("POST", "/api/patients", Some(json!({"name": "  "}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "name is required");
    }

    #[tokio::test]
    async fn appointment_lifecycle() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let patient = create_patient(&app, "Ada").await;

        let (status, created) = book(&app, "2024-06-01T10:00:00", doctor, patient).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["doctorId"], doctor);
        assert_eq!(created["version"], 1);
        let id = created["id"].as_i64().unwrap();

        let (status, moved) = send(
            &app,
            request(
                "PUT",
                &format!("/api/appointments/{id}"),
                Some(json!({
                    "id": id,
                    "date": "2024-06-01T15:00:00",
                    "doctorId": doctor,
                    "patientId": patient,
                    "version": 1
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["date"], "2024-06-01T15:00:00");
        assert_eq!(moved["version"], 2);

        let (_, listed) = send(&app, request("GET", "/api/appointments?date=2024-06-01", None)).await;
        assert_eq!(listed["appointments"].as_array().unwrap().len(), 1);
        let (_, listed) = send(&app, request("GET", "/api/appointments?date=2024-06-02", None)).await;
        assert!(listed["appointments"].as_array().unwrap().is_empty());

        let (status, _) =
            send(&app, request("DELETE", &format!("/api/appointments/{id}"), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) =
            send(&app, request("DELETE", &format!("/api/appointments/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejection_lists_all_violations() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let patient = create_patient(&app, "Ada").await;
        for i in 0..5 {
            let other = create_patient(&app, &format!("P{i}")).await;
            let (status, _) =
                book(&app, &format!("2024-06-01T1{i}:00:00"), doctor, other).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let other_doctor = create_doctor(&app, "Dr. Moreau").await;
        let (status, _) = book(&app, "2024-06-01T12:30:00", other_doctor, patient).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = book(&app, "2024-06-01T09:00:00", doctor, patient).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "SCHEDULING_REJECTED");
        let codes: Vec<&str> = json["error"]["violations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["code"].as_str().unwrap())
            .collect();
        assert_eq!(
            codes,
            vec!["patient_double_booked", "doctor_at_capacity", "outside_operating_hours"]
        );
    }

    #[tokio::test]
    async fn check_endpoint_does_not_write() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let patient = create_patient(&app, "Ada").await;

        let (status, json) = send(
            &app,
            request(
                "POST",
                "/api/appointments/check",
                Some(json!({"date": "2024-06-01T15:01:00", "doctorId": doctor, "patientId": patient})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["accepted"], false);
        assert_eq!(json["violations"][0]["code"], "outside_operating_hours");

        let (_, listed) = send(&app, request("GET", "/api/appointments", None)).await;
        assert!(listed["appointments"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let (status, json) = send(
            &app,
            request(
                "POST",
                "/api/appointments",
                Some(json!({"date": "2024-06-01T11:00:00", "doctorId": doctor})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "patientId is required");
    }

    #[tokio::test]
    async fn unknown_doctor_is_bad_request() {
        let (app, _tmp) = test_app();
        let patient = create_patient(&app, "Ada").await;
        let (status, _) = book(&app, "2024-06-01T11:00:00", 4242, patient).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unparseable_bodies_are_bad_request_not_rejection() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let patient = create_patient(&app, "Ada").await;
        let (_, created) = book(&app, "2024-06-01T11:00:00", doctor, patient).await;
        let id = created["id"].as_i64().unwrap();

        let bodies = [
            json!({"date": "not-a-date", "doctorId": doctor, "patientId": patient}),
            json!({"date": "2024-06-01T11:00:00Z", "doctorId": doctor, "patientId": patient}),
            json!({"date": "2024-06-01T11:00:00", "doctorId": "abc", "patientId": patient}),
        ];
        let update_uri = format!("/api/appointments/{id}");
        let targets = [
            ("POST", "/api/appointments"),
            ("POST", "/api/appointments/check"),
            ("PUT", update_uri.as_str()),
        ];
        for body in &bodies {
            for (method, uri) in targets {
                let (status, json) = send(&app, request(method, uri, Some(body.clone()))).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri} {body}");
                assert_eq!(json["error"]["code"], "BAD_REQUEST");
                assert!(json["error"].get("violations").is_none());
            }
        }
    }

    #[tokio::test]
    async fn five_digit_year_is_bad_request() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let patient = create_patient(&app, "Ada").await;

        for date in ["+10000-06-01T11:00:00", "+10000-06-01T12:00:00"] {
            let (status, json) = book(&app, date, doctor, patient).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                json["error"]["message"],
                "appointment year must be between 0 and 9999, got 10000"
            );
        }
        let (_, listed) = send(&app, request("GET", "/api/appointments", None)).await;
        assert!(listed["appointments"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_version_is_409() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let patient = create_patient(&app, "Ada").await;
        let (_, created) = book(&app, "2024-06-01T11:00:00", doctor, patient).await;
        let id = created["id"].as_i64().unwrap();

        let body = |date: &str| {
            json!({"date": date, "doctorId": doctor, "patientId": patient, "version": 1})
        };
        let (status, _) = send(
            &app,
            request("PUT", &format!("/api/appointments/{id}"), Some(body("2024-06-01T12:00:00"))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            &app,
            request("PUT", &format!("/api/appointments/{id}"), Some(body("2024-06-01T13:00:00"))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONCURRENCY_CONFLICT");
    }

    #[tokio::test]
    async fn deleting_booked_patient_is_conflict() {
        let (app, _tmp) = test_app();
        let doctor = create_doctor(&app, "Dr. Chen").await;
        let patient = create_patient(&app, "Ada").await;
        book(&app, "2024-06-01T11:00:00", doctor, patient).await;

        let (status, json) =
            send(&app, request("DELETE", &format!("/api/patients/{patient}"), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
    }
}
