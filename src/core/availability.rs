use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::adapters::http::SiblingCaller;
use crate::domain::model::{
    AvailabilityReport, AvailabilityRequest, BookingStatus, BookingWindow, CallOutcome,
};
use crate::domain::services;
use crate::utils::error::{LinkError, Result};

/// Decides which vehicles are free over a requested window.
///
/// Unlike the dashboard there is nothing to degrade to here: without
/// the reservation data the answer would be a guess, so any failure
/// on that single dependency propagates.
pub struct AvailabilityChecker {
    caller: Arc<SiblingCaller>,
}

impl AvailabilityChecker {
    pub fn new(caller: Arc<SiblingCaller>) -> Self {
        AvailabilityChecker { caller }
    }

    pub async fn check(
        &self,
        request: AvailabilityRequest,
        auth: Option<&str>,
    ) -> Result<AvailabilityReport> {
        // Window validation comes before any network traffic.
        let window = BookingWindow::new(request.start, request.end)?;

        let candidates = dedup_preserving_order(&request.vehicle_ids);
        if candidates.is_empty() {
            return Ok(AvailabilityReport {
                available: Vec::new(),
                window,
            });
        }

        let ids_csv = candidates
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("/reservations?vehicle_ids={}", ids_csv);

        let outcome = self.caller.get(services::RESERVATIONS, &path, auth).await?;
        let bookings = bookings_from(outcome)?;

        let available = free_vehicles(candidates, &bookings, &window);
        tracing::debug!(
            "🚗 {} of {} candidate vehicles free over {}..{}",
            available.len(),
            request.vehicle_ids.len(),
            window.start,
            window.end
        );

        Ok(AvailabilityReport { available, window })
    }
}

#[derive(Debug, Deserialize)]
struct Booking {
    #[serde(alias = "vehicleId")]
    vehicle_id: i64,
    #[serde(alias = "start_date", alias = "startDate", alias = "date_debut")]
    start: NaiveDate,
    #[serde(alias = "end_date", alias = "endDate", alias = "date_fin")]
    end: NaiveDate,
    #[serde(default)]
    status: String,
}

fn bookings_from(outcome: CallOutcome) -> Result<Vec<Booking>> {
    match outcome {
        CallOutcome::Ok(value) => {
            serde_json::from_value(value).map_err(|e| LinkError::Unavailable {
                service: services::RESERVATIONS.to_string(),
                detail: format!("unexpected payload shape: {}", e),
            })
        }
        CallOutcome::NotFound => Err(LinkError::Unavailable {
            service: services::RESERVATIONS.to_string(),
            detail: "listing endpoint answered 404".to_string(),
        }),
        CallOutcome::Unavailable { detail } => Err(LinkError::Unavailable {
            service: services::RESERVATIONS.to_string(),
            detail,
        }),
        CallOutcome::Invalid { status, detail } => Err(LinkError::UpstreamInvalid {
            service: services::RESERVATIONS.to_string(),
            status,
            detail,
        }),
    }
}

fn dedup_preserving_order(ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

/// A vehicle stays available unless some booking on it is in a
/// blocking state and shares at least one day with the window.
fn free_vehicles(candidates: Vec<i64>, bookings: &[Booking], window: &BookingWindow) -> Vec<i64> {
    candidates
        .into_iter()
        .filter(|id| {
            !bookings.iter().any(|b| {
                b.vehicle_id == *id
                    && BookingStatus::parse(&b.status).blocks_availability()
                    && window.intersects(b.start, b.end)
            })
        })
        .collect()
}
