//! Registry names of every service in the fleet. Callers resolve by
//! these names; typos here would only surface at runtime, so keep them
//! in one place.

pub const AUTH: &str = "auth-service";
pub const VEHICLES: &str = "vehicle-service";
pub const RESERVATIONS: &str = "reservation-service";
pub const CLIENTS: &str = "client-service";
pub const BRANCHES: &str = "branch-service";
pub const CONTRACTS: &str = "contract-service";
pub const TAXES: &str = "tax-service";
pub const PAYMENTS: &str = "payment-service";
pub const INSPECTIONS: &str = "inspection-service";
