use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info_span, warn, Instrument};

use sequencer_engine::{Outcome, Sequencer};

#[derive(Clone)]
pub struct AppState {
    sequencer: Sequencer,
}

/// Inbound automation event. Only `data.id` is read.
#[derive(Deserialize)]
pub struct WebhookEvent {
    data: Option<EventData>,
}

#[derive(Deserialize)]
struct EventData {
    id: Option<String>,
}

impl WebhookEvent {
    fn record_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Serialize)]
struct SuccessBody {
    success: bool,
    #[serde(flatten)]
    outcome: Outcome,
}

pub fn build_router(sequencer: Sequencer) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(AppState { sequencer })
        // Logging layer: method + path + status + latency
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

async fn health() -> &'static str {
    "ok"
}

async fn webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookEvent>, JsonRejection>,
) -> Response {
    let event = match payload {
        Ok(Json(event)) => event,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected webhook body");
            return bad_request("invalid JSON body");
        }
    };
    let Some(record_id) = event.record_id() else {
        warn!("Webhook event without data.id");
        return bad_request("missing data.id");
    };

    let result = state
        .sequencer
        .sequence(record_id)
        .instrument(info_span!("sequence", record_id))
        .await;

    match result {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SuccessBody {
                success: true,
                outcome,
            }),
        )
            .into_response(),
        Err(e) if e.is_client_error() => bad_request("missing data.id"),
        Err(e) => {
            error!(record_id, error = %e, "Sequencing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "internal error"})),
            )
                .into_response()
        }
    }
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": message})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use sequencer_common::Record;
    use sequencer_engine::testing::MemoryStore;

    use super::*;

    fn meeting(id: &str, month: u32) -> Record {
        Record::new(id, Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap())
    }

    fn app(store: &Arc<MemoryStore>) -> Router {
        build_router(Sequencer::new(store.clone()))
    }

    async fn post_webhook(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn titled_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_records([
            meeting("R1", 1).with_title("Standup"),
            meeting("R2", 2).with_title("Standup"),
            meeting("R3", 3).with_title("Standup"),
        ]))
    }

    #[tokio::test]
    async fn linked_outcome_is_200_with_pointers() {
        let store = titled_store();

        let (status, body) = post_webhook(app(&store), r#"{"data": {"id": "R2"}}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["outcome"], "linked");
        assert_eq!(body["previous"], "R1");
        assert_eq!(body["next"], "R3");
        assert_eq!(store.updates().len(), 1);
    }

    #[tokio::test]
    async fn unclassifiable_is_still_success() {
        let store = Arc::new(
            MemoryStore::new().with_record(meeting("R1", 1).with_participants(["a", "b"])),
        );

        let (status, body) = post_webhook(app(&store), r#"{"data": {"id": "R1"}}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["outcome"], "unclassifiable");
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn trigger_missing_from_cohort_is_200_without_write() {
        let store = Arc::new(
            MemoryStore::new()
                .with_records([
                    meeting("R1", 1).with_title("Standup"),
                    meeting("R2", 2).with_title("Standup"),
                ])
                .hiding_from_queries("R2"),
        );

        let (status, body) = post_webhook(app(&store), r#"{"data": {"id": "R2"}}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["outcome"], "not_in_cohort");
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn missing_id_is_400_without_store_access() {
        let store = titled_store();

        for payload in [r#"{}"#, r#"{"data": {}}"#, r#"{"data": {"id": "  "}}"#] {
            let (status, body) = post_webhook(app(&store), payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
            assert_eq!(body["success"], false);
        }
        assert!(store.queries().is_empty());
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn non_json_body_is_400() {
        let store = titled_store();
        let (status, _) = post_webhook(app(&store), "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_is_generic_500() {
        let store = Arc::new(
            MemoryStore::new()
                .with_record(meeting("R1", 1).with_title("Standup"))
                .failing_updates(),
        );

        let (status, body) = post_webhook(app(&store), r#"{"data": {"id": "R1"}}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "internal error"}));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let store = titled_store();
        let response = app(&store)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
