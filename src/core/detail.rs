use std::sync::Arc;

use serde_json::Value;

use crate::adapters::http::SiblingCaller;
use crate::core::fanout::FanoutReport;
use crate::domain::model::{CallOutcome, ReservationDetail};
use crate::domain::services;
use crate::utils::error::{LinkError, Result};

const VEHICLE_KEYS: &[&str] = &["vehicle_id", "vehicleId"];
const CLIENT_KEYS: &[&str] = &["client_id", "clientId"];
const BRANCH_KEYS: &[&str] = &["branch_id", "branchId", "succursale_id", "succursaleId"];

/// Assembles one reservation with its vehicle, client, branch and tax
/// records. The reservation itself is mandatory; each nested lookup
/// degrades to `null` on failure.
pub struct DetailAssembler {
    caller: Arc<SiblingCaller>,
}

impl DetailAssembler {
    pub fn new(caller: Arc<SiblingCaller>) -> Self {
        DetailAssembler { caller }
    }

    pub async fn reservation_detail(
        &self,
        id: i64,
        auth: Option<&str>,
    ) -> Result<ReservationDetail> {
        let path = format!("/reservations/{}", id);
        let outcome = self.caller.get(services::RESERVATIONS, &path, auth).await?;
        let reservation = primary_record(outcome, id)?;

        let vehicle_id = ref_id(&reservation, VEHICLE_KEYS);
        let client_id = ref_id(&reservation, CLIENT_KEYS);
        let branch_id = ref_id(&reservation, BRANCH_KEYS);

        let (vehicle, client, branch, taxes) = tokio::join!(
            self.fetch_ref(services::VEHICLES, "/vehicles", vehicle_id, auth),
            self.fetch_ref(services::CLIENTS, "/clients", client_id, auth),
            self.fetch_ref(services::BRANCHES, "/branches", branch_id, auth),
            self.fetch_taxes(branch_id, auth),
        );

        // Nested lookups degrade independently; the report is only
        // used for uniform default handling, a reservation with every
        // side record missing is still a valid answer.
        let mut report = FanoutReport::new();
        let vehicle: Option<Value> = report.absorb("vehicle", vehicle, None);
        let client: Option<Value> = report.absorb("client", client, None);
        let branch: Option<Value> = report.absorb("branch", branch, None);
        let taxes: Option<Value> = report.absorb("taxes", taxes, None);

        Ok(ReservationDetail {
            reservation,
            vehicle,
            client,
            branch,
            taxes,
        })
    }

    /// Follows one reference. An absent id is a clean `null`, not a
    /// degradation.
    async fn fetch_ref(
        &self,
        service: &str,
        prefix: &str,
        id: Option<i64>,
        auth: Option<&str>,
    ) -> Result<CallOutcome> {
        match id {
            Some(id) => {
                self.caller
                    .get(service, &format!("{}/{}", prefix, id), auth)
                    .await
            }
            None => Ok(CallOutcome::Ok(Value::Null)),
        }
    }

    async fn fetch_taxes(&self, branch_id: Option<i64>, auth: Option<&str>) -> Result<CallOutcome> {
        match branch_id {
            Some(id) => {
                self.caller
                    .get(services::TAXES, &format!("/taxes?branch_id={}", id), auth)
                    .await
            }
            None => Ok(CallOutcome::Ok(Value::Null)),
        }
    }
}

/// The primary record must exist; everything short of a parsed body is
/// an error mapped for the end client.
fn primary_record(outcome: CallOutcome, id: i64) -> Result<Value> {
    match outcome {
        CallOutcome::Ok(value) if !value.is_null() => Ok(value),
        CallOutcome::Ok(_) | CallOutcome::NotFound => Err(LinkError::NotFound {
            what: format!("reservation {}", id),
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

/// First matching key wins. Ids sometimes arrive as JSON strings from
/// the older services, so both forms are accepted.
fn ref_id(record: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(found) = record.get(key) {
            if let Some(id) = found.as_i64() {
                return Some(id);
            }
            if let Some(id) = found.as_str().and_then(|s| s.parse::<i64>().ok()) {
                return Some(id);
            }
        }
    }
    None
}
