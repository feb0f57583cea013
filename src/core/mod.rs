pub mod availability;
pub mod dashboard;
pub mod detail;
pub mod fanout;

pub use crate::domain::model::{CallOutcome, ServiceInstance, ServiceRegistration};
pub use crate::domain::ports::Discovery;
pub use crate::utils::error::Result;
