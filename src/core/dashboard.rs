use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::adapters::http::SiblingCaller;
use crate::core::fanout::FanoutReport;
use crate::domain::model::{BranchFleet, DashboardView, VehicleRank};
use crate::domain::services;
use crate::utils::error::Result;

const TOP_VEHICLES: usize = 3;

/// Composes the dashboard payload from four sibling services.
///
/// All four calls run concurrently; a dead sibling costs only its own
/// section. The response is built fresh on every request, nothing is
/// cached between calls.
pub struct DashboardAggregator {
    caller: Arc<SiblingCaller>,
}

impl DashboardAggregator {
    pub fn new(caller: Arc<SiblingCaller>) -> Self {
        DashboardAggregator { caller }
    }

    pub async fn dashboard(&self, auth: Option<&str>) -> Result<DashboardView> {
        let (vehicles, reservations, clients, branches) = tokio::join!(
            self.caller.get(services::VEHICLES, "/vehicles", auth),
            self.caller.get(services::RESERVATIONS, "/reservations", auth),
            self.caller.get(services::CLIENTS, "/clients", auth),
            self.caller.get(services::BRANCHES, "/branches", auth),
        );

        let mut report = FanoutReport::new();
        let vehicles: Vec<VehicleSummary> = report.absorb("vehicles", vehicles, Vec::new());
        let reservations: Vec<ReservationSummary> =
            report.absorb("reservations", reservations, Vec::new());
        let clients: Vec<serde_json::Value> = report.absorb("clients", clients, Vec::new());
        let branches: Vec<BranchSummary> = report.absorb("branches", branches, Vec::new());
        let degraded = report.finish()?;

        if !degraded.is_empty() {
            tracing::info!("📊 dashboard degraded sections: {:?}", degraded);
        }

        Ok(DashboardView {
            vehicle_count: vehicles.len() as u64,
            reservation_count: reservations.len() as u64,
            client_count: clients.len() as u64,
            fleet_by_branch: fleet_by_branch(&vehicles, &branches),
            top_vehicles: top_vehicles(&vehicles, &reservations),
            degraded,
            generated_at: Utc::now(),
        })
    }
}

/// The few vehicle fields the dashboard reads. Older services ship
/// French column names, hence the aliases.
#[derive(Debug, Deserialize)]
struct VehicleSummary {
    id: i64,
    #[serde(default, alias = "name")]
    model: Option<String>,
    #[serde(
        default,
        alias = "branchId",
        alias = "succursale_id",
        alias = "succursaleId"
    )]
    branch_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ReservationSummary {
    #[serde(default, alias = "vehicleId")]
    vehicle_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BranchSummary {
    id: i64,
    #[serde(default, alias = "nom")]
    name: Option<String>,
}

/// Groups the fleet under branch labels, in first-seen vehicle order.
/// Vehicles whose branch cannot be resolved land under a fallback
/// label instead of being dropped.
fn fleet_by_branch(vehicles: &[VehicleSummary], branches: &[BranchSummary]) -> Vec<BranchFleet> {
    let mut fleets: Vec<BranchFleet> = Vec::new();

    for vehicle in vehicles {
        let label = vehicle
            .branch_id
            .and_then(|id| branches.iter().find(|b| b.id == id))
            .and_then(|b| b.name.as_deref())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Unknown branch".to_string());

        match fleets.iter_mut().find(|f| f.branch == label) {
            Some(fleet) => fleet.vehicles += 1,
            None => fleets.push(BranchFleet {
                branch: label,
                vehicles: 1,
            }),
        }
    }

    fleets
}

/// Top vehicles by reservation count, descending. The sort is stable,
/// so ties keep first-seen reservation order.
fn top_vehicles(
    vehicles: &[VehicleSummary],
    reservations: &[ReservationSummary],
) -> Vec<VehicleRank> {
    let mut counts: Vec<(i64, u64)> = Vec::new();

    for reservation in reservations {
        if let Some(vehicle_id) = reservation.vehicle_id {
            match counts.iter_mut().find(|(id, _)| *id == vehicle_id) {
                Some((_, count)) => *count += 1,
                None => counts.push((vehicle_id, 1)),
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_VEHICLES);

    counts
        .into_iter()
        .map(|(vehicle_id, count)| VehicleRank {
            vehicle: vehicles
                .iter()
                .find(|v| v.id == vehicle_id)
                .and_then(|v| v.model.clone())
                .unwrap_or_else(|| format!("Vehicle #{}", vehicle_id)),
            reservations: count,
        })
        .collect()
}
