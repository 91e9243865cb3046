use crate::app_state::AppState;
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::error;

/// Liveness of the service and its store
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = Object, example = json!({
            "status": "healthy",
            "backend": "mysql",
            "timestamp": "2026-01-05T08:00:00Z"
        })),
        (status = 503, description = "Store unreachable")
    ),
    tag = "Health"
)]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let backend = state.backend.as_ref();
    let timestamp = state.clock.now();

    match state.records.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "backend": backend,
            "timestamp": timestamp
        })),
        Err(e) => {
            error!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "backend": backend,
                "timestamp": timestamp
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{context, test_app, with_peer};
    use actix_web::test::{self, TestRequest};
    use serde_json::Value;

    #[actix_web::test]
    async fn reports_backend_without_a_token() {
        let ctx = context();
        let app = test_app!(ctx);

        let req = with_peer(TestRequest::get().uri("/health")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "memory");
    }
}
