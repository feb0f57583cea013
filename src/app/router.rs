use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::app::state::AppState;
use crate::domain::model::{
    AvailabilityReport, AvailabilityRequest, DashboardView, ReservationDetail,
};
use crate::utils::error::LinkError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard-data", get(dashboard_data))
        .route("/availability", post(availability))
        .route("/reservations/{id}/detail", get(reservation_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe polled by the registry's health checker.
async fn health() -> StatusCode {
    StatusCode::OK
}

async fn dashboard_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardView>, LinkError> {
    let view = state.dashboard.dashboard(bearer(&headers)).await?;
    Ok(Json(view))
}

async fn availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityReport>, LinkError> {
    let report = state.availability.check(request, bearer(&headers)).await?;
    Ok(Json(report))
}

async fn reservation_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ReservationDetail>, LinkError> {
    let detail = state.detail.reservation_detail(id, bearer(&headers)).await?;
    Ok(Json(detail))
}

/// Raw Authorization header value, handed to siblings unchanged.
fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_reads_the_raw_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer seat-42".parse().unwrap());
        assert_eq!(bearer(&headers), Some("Bearer seat-42"));
    }

    #[test]
    fn bearer_is_none_without_header() {
        assert_eq!(bearer(&HeaderMap::new()), None);
    }
}
