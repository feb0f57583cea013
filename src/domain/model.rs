use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::{LinkError, Result};

/// One healthy instance of a sibling service, as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    pub address: String,
    pub port: u16,
}

impl ServiceInstance {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

/// Registration descriptor advertised to the registry at startup.
///
/// The id embeds port and pid so several instances of the same service
/// can coexist on one host without clobbering each other.
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    pub id: String,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub check_url: String,
    pub check_interval_secs: u64,
}

impl ServiceRegistration {
    pub fn new(name: &str, address: &str, port: u16, check_interval_secs: u64) -> Self {
        ServiceRegistration {
            id: format!("{}-{}-{}", name, port, std::process::id()),
            name: name.to_string(),
            address: address.to_string(),
            port,
            check_url: format!("http://{}:{}/health", address, port),
            check_interval_secs,
        }
    }
}

/// Outcome of one call to a sibling service, classified by HTTP status.
///
/// Resolution failures (registry down, no healthy instance) are not
/// outcomes; they surface as errors before any request is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// 2xx with a parsed JSON body (Null when the body was empty).
    Ok(serde_json::Value),
    /// 404 from the sibling.
    NotFound,
    /// Transport failure, timeout, or 5xx.
    Unavailable { detail: String },
    /// 4xx other than 404; the request itself was rejected.
    Invalid { status: u16, detail: String },
}

/// Reservation lifecycle states as found in sibling payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Confirmed,
    Active,
    Cancelled,
    Completed,
    Unknown,
}

impl BookingStatus {
    /// Case-insensitive parse. Anything unrecognized maps to Unknown,
    /// which still blocks availability: an odd status is treated as a
    /// live booking rather than silently freeing the vehicle.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "confirmed" => BookingStatus::Confirmed,
            "active" => BookingStatus::Active,
            "cancelled" | "canceled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            _ => BookingStatus::Unknown,
        }
    }

    pub fn blocks_availability(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

/// A closed date interval. Both endpoints are rental days, so a booking
/// ending on the same day another starts still counts as an overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BookingWindow {
    /// Rejects inverted and zero-length windows before any network call.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(LinkError::InvalidRange { start, end });
        }
        Ok(BookingWindow { start, end })
    }

    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRequest {
    #[serde(alias = "vehicleIds", alias = "resourceIds")]
    pub vehicle_ids: Vec<i64>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub available: Vec<i64>,
    pub window: BookingWindow,
}

/// Vehicles grouped under the branch that holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchFleet {
    pub branch: String,
    pub vehicles: u64,
}

/// One row of the "most reserved" ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleRank {
    pub vehicle: String,
    pub reservations: u64,
}

/// Composed dashboard payload. Every section has a default so a dead
/// sibling degrades that section instead of the whole response; the
/// sections that were defaulted are listed in `degraded`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub vehicle_count: u64,
    pub reservation_count: u64,
    pub client_count: u64,
    pub fleet_by_branch: Vec<BranchFleet>,
    pub top_vehicles: Vec<VehicleRank>,
    pub degraded: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// A reservation enriched with its related records. Nested lookups that
/// fail are left as None; only the reservation itself is mandatory.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetail {
    pub reservation: serde_json::Value,
    pub vehicle: Option<serde_json::Value>,
    pub client: Option<serde_json::Value>,
    pub branch: Option<serde_json::Value>,
    pub taxes: Option<serde_json::Value>,
}
