// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{classrooms, fallback, health, homework, metrics, session, stats};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler))

        // Session end (requires the session it ends)
        .route("/session/logout", post(session::logout_handler))

        // Classroom pages (require a session credential)
        .route(
            "/classrooms",
            get(classrooms::list_classrooms_handler).post(classrooms::create_classroom_handler),
        )
        .route("/classrooms/{slug}", get(classrooms::classroom_handler))
        .route(
            "/classrooms/{slug}/view",
            get(classrooms::view_handler).delete(classrooms::close_view_handler),
        )
        .route("/classrooms/{slug}/students", post(classrooms::add_student_handler))
        .route("/classrooms/{slug}/stats", get(stats::classroom_stats_handler))
        .route(
            "/classrooms/{slug}/students/{user_id}/stats",
            get(stats::student_stats_handler),
        )

        // Homework authoring
        .route("/homework", post(homework::create_homework_handler))
        .route("/homework/{game}/levels", get(homework::levels_handler))
        .route("/levels/{level_id}/questions", get(homework::questions_handler))
        .route("/assignment-cache", get(homework::assignment_cache_handler))

        // 404 fallback for all unmatched routes
        .fallback(fallback::fallback_handler)

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{services_config, spawn_upstream, test_services};
    use crate::core::config::{Config, LoggingConfig, ServerConfig, StorageConfig};
    use crate::metrics::collector::MetricsSnapshot;
    use crate::models::assignment::WellKnownGame;
    use crate::pipeline::credential::Credential;
    use crate::stores::assignment_cache::AssignmentIdCache;
    use axum::body::Body;
    use axum::extract::Path as UpstreamPath;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::{get as upstream_get, post as upstream_post};
    use axum::Json;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const COOKIE: &str = "token=tok; user_id=teacher-1";

    /// Cache scope of the session behind `COOKIE`.
    fn scope() -> String {
        format!("teacher-1:{}", Credential::new("tok").unwrap().fingerprint())
    }

    fn create_test_config(base: &str) -> Config {
        Config {
            server: ServerConfig {
                port: Some(8081),
                unix_socket: None,
                num_threads: 2,
            },
            services: services_config(base),
            storage: StorageConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                console: false,
            },
        }
    }

    /// One mock standing in for all three services.
    fn upstream(assignments_ok: bool, roster_ok: bool) -> axum::Router {
        axum::Router::new()
            .route(
                "/dev/classrooms/teacher",
                upstream_get(|| async {
                    Json(json!([
                        { "classroom_id": "c1", "name": "Historia 2A", "students": ["u1"] },
                        { "classroom_id": "c2", "name": "Matemáticas 3B", "students": ["u1", "u2"] },
                    ]))
                }),
            )
            .route(
                "/dev/classrooms/{id}/students",
                upstream_get(move || async move {
                    if roster_ok {
                        (
                            StatusCode::OK,
                            Json(json!([
                                { "user_id": "u1", "name": "Ana", "lastName": "Pérez" },
                                { "user_id": "u2", "name": "Luis", "lastName": "Gómez" },
                            ])),
                        )
                    } else {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({ "error": "Roster service restarting" })),
                        )
                    }
                }),
            )
            .route(
                "/dev/assignments/classroom/{id}",
                upstream_get(move |UpstreamPath(id): UpstreamPath<String>| async move {
                    if assignments_ok {
                        (
                            StatusCode::OK,
                            Json(json!([
                                { "assignment_id": "a1", "game_name": "GameJump", "classroom_id": id },
                                { "assignment_id": "b1", "game_name": "QJ_1-1", "classroom_id": id },
                            ])),
                        )
                    } else {
                        (
                            StatusCode::SERVICE_UNAVAILABLE,
                            Json(json!({ "error": "Assignments offline" })),
                        )
                    }
                }),
            )
            .route(
                "/dev/auth/create-student",
                upstream_post(|Json(body): Json<Value>| async move {
                    Json(json!({ "user_id": "u3", "name": body["name"], "lastName": body["lastName"] }))
                }),
            )
            .route(
                "/dev/topics/errors/{id}",
                upstream_get(|| async { Json(json!([{ "topic": "fractions", "errorRate": 0.4 }])) }),
            )
            .route(
                "/dev/classroom/stats/{id}",
                upstream_get(|| async {
                    Json(json!({
                        "total_questions_answered": 10,
                        "average_time_spent_per_student": 120.0,
                        "average_correct_rate": 0.6,
                        "progress_by_day": [{
                            "date": "2024-01-01",
                            "total_time_spent": 120,
                            "total_questions_answered": 10,
                            "average_correct_rate": 0.6
                        }]
                    }))
                }),
            )
            .route(
                "/dev/stats/{id}",
                upstream_get(|| async {
                    Json(json!({ "students_stats": [{ "user_id": "u1", "questions_answered": 4 }] }))
                }),
            )
    }

    async fn create_test_state(assignments_ok: bool) -> Arc<AppState> {
        create_test_state_with(upstream(assignments_ok, true)).await
    }

    async fn create_test_state_with(router: axum::Router) -> Arc<AppState> {
        let base = spawn_upstream(router).await;
        Arc::new(AppState::new(
            create_test_config(&base),
            test_services(&base),
            AssignmentIdCache::in_memory(),
        ))
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        request_with_cookie(method, uri, COOKIE, body)
    }

    fn request_with_cookie(method: &str, uri: &str, cookie: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie);

        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (parts.status, value)
    }

    #[tokio::test]
    async fn test_classroom_page_refreshes_cache() {
        let state = create_test_state(true).await;

        let (status, page) = send(&state, request("GET", "/classrooms/matematicas-3b", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["classroom_id"], "c2");
        assert_eq!(page["slug"], "matematicas-3b");
        let mut keys: Vec<_> = page.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["assignments", "assignments_status", "classroom_id", "name", "slug", "students"]
        );
        assert_eq!(page["students"].as_array().unwrap().len(), 2);
        assert_eq!(page["assignments_status"]["status"], "fresh");
        assert_eq!(
            state.assignment_cache.get(&scope(), WellKnownGame::RioSplash).as_deref(),
            Some("b1")
        );

        let (status, view) = send(&state, request("GET", "/classrooms/matematicas-3b/view", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["classroom_id"], "c2");
        assert_eq!(view["students"].as_array().unwrap().len(), 2);

        let (status, slots) = send(&state, request("GET", "/assignment-cache", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(slots["GameJump"], "a1");
        assert_eq!(slots["QJ_1-1"], "b1");
    }

    #[tokio::test]
    async fn test_classroom_page_degrades_without_assignments() {
        let state = create_test_state(false).await;

        let (status, page) = send(&state, request("GET", "/classrooms/historia-2a", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["assignments"], json!([]));
        assert_eq!(page["assignments_status"]["status"], "unavailable");
        assert!(state.assignment_cache.entries(&scope()).is_empty());

        let (_, metrics) = send(&state, request("GET", "/metrics", None)).await;
        let snapshot: MetricsSnapshot = serde_json::from_value(metrics).unwrap();
        assert_eq!(snapshot.classroom_loads, 1);
        assert_eq!(snapshot.degraded_loads, 1);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404() {
        let state = create_test_state(true).await;

        let (status, body) = send(&state, request("GET", "/classrooms/quimica", None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Class 'Quimica' not found");
        assert_eq!(state.metrics.get_snapshot(&state.assignment_cache, &state.views).resolution_misses, 1);
    }

    #[tokio::test]
    async fn test_missing_credential_is_401() {
        let state = create_test_state(true).await;
        let req = Request::builder()
            .uri("/classrooms")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&state, req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "No authentication token found");
    }

    #[tokio::test]
    async fn test_add_student_patches_open_view() {
        let state = create_test_state(true).await;
        send(&state, request("GET", "/classrooms/matematicas-3b", None)).await;

        let (status, body) = send(
            &state,
            request(
                "POST",
                "/classrooms/matematicas-3b/students",
                Some(json!({ "name": "Eva", "lastName": "Ruiz", "dni": "9", "email": "eva@example.com" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["roster_status"]["status"], "patched");
        assert_eq!(body["student"]["user_id"], "u3");
        assert_eq!(body["students"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_add_student_without_view_refetches_roster() {
        let state = create_test_state(true).await;

        let (status, body) = send(
            &state,
            request(
                "POST",
                "/classrooms/matematicas-3b/students",
                Some(json!({ "name": "Eva", "lastName": "Ruiz", "dni": "9", "email": "eva@example.com" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["roster_status"]["status"], "refetched");
        assert_eq!(body["students"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_student_survives_failed_roster_refetch() {
        let state = create_test_state_with(upstream(true, false)).await;

        let (status, body) = send(
            &state,
            request(
                "POST",
                "/classrooms/matematicas-3b/students",
                Some(json!({ "name": "Eva", "lastName": "Ruiz", "dni": "9", "email": "eva@example.com" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["student"]["user_id"], "u3");
        assert_eq!(body["students"], json!([]));
        assert_eq!(body["roster_status"]["status"], "unavailable");
        assert_eq!(body["roster_status"]["reason"], "Roster service restarting");
        assert_eq!(
            state.metrics.get_snapshot(&state.assignment_cache, &state.views).upstream_failures,
            1
        );
    }

    #[tokio::test]
    async fn test_close_view() {
        let state = create_test_state(true).await;
        send(&state, request("GET", "/classrooms/historia-2a", None)).await;

        let (status, body) = send(&state, request("DELETE", "/classrooms/historia-2a/view", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["closed"], true);
        assert!(state.views.is_empty());

        let (status, body) = send(&state, request("GET", "/classrooms/historia-2a/view", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No open view for class 'Historia 2A'");
    }

    #[tokio::test]
    async fn test_stats_routes() {
        let state = create_test_state(true).await;

        let (status, stats) = send(&state, request("GET", "/classrooms/historia-2a/stats", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["topics"][0]["errorRate"], 0.4);
        assert_eq!(stats["progress"]["progress_by_day"][0]["date"], "2024-01-01");

        let (status, stat) = send(
            &state,
            request("GET", "/classrooms/historia-2a/students/u1/stats", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stat["questions_answered"], 4);

        let (status, _) = send(
            &state,
            request("GET", "/classrooms/historia-2a/students/u9/stats", None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_levels_for_unknown_game_is_400() {
        let state = create_test_state(true).await;

        let (status, _) = send(&state, request("GET", "/homework/Tetris/levels", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_clears_scope_and_cookies() {
        let state = create_test_state(true).await;
        send(&state, request("GET", "/classrooms/historia-2a", None)).await;
        assert_eq!(state.assignment_cache.scope_count(), 1);

        let response = build_router(state.clone())
            .oneshot(request("POST", "/session/logout", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("token=;")));
        assert!(cookies.iter().any(|c| c.starts_with("user_id=;")));
        assert_eq!(state.assignment_cache.scope_count(), 0);
        assert!(state.views.is_empty());
    }

    #[tokio::test]
    async fn test_session_without_user_id_is_401() {
        let state = create_test_state(true).await;

        let (status, _) = send(&state, request_with_cookie("GET", "/classrooms", "token=tok", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&state, request_with_cookie("POST", "/session/logout", "user_id=teacher-1", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sessions_with_same_user_cookie_do_not_share_slots() {
        let state = create_test_state(true).await;
        send(&state, request("GET", "/classrooms/historia-2a", None)).await;

        let (status, slots) = send(
            &state,
            request_with_cookie("GET", "/assignment-cache", "token=other-tok; user_id=teacher-1", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(slots, json!({ "GameJump": null, "QJ_1-1": null }));

        let (status, _) = send(
            &state,
            request_with_cookie("GET", "/homework/GameJump/levels", "token=other-tok; user_id=teacher-1", None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, own) = send(&state, request("GET", "/assignment-cache", None)).await;
        assert_eq!(own["GameJump"], "a1");
    }

    #[tokio::test]
    async fn test_health_route() {
        let state = create_test_state(true).await;

        let (status, body) = send(&state, request_with_cookie("GET", "/health", "", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["upstreams"]["stage"], "dev");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let state = create_test_state(true).await;

        let (status, body) = send(&state, request("GET", "/gradebook", None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
