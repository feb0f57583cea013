pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::consul::ConsulDiscovery;
pub use crate::adapters::http::SiblingCaller;
pub use crate::app::registrar::{serve_with_registration, shutdown_signal, Registrar};
pub use crate::app::router::router;
pub use crate::app::state::AppState;
pub use crate::config::{CliConfig, ServiceConfig};
pub use crate::core::availability::AvailabilityChecker;
pub use crate::core::dashboard::DashboardAggregator;
pub use crate::core::detail::DetailAssembler;
pub use crate::domain::model::{CallOutcome, ServiceInstance, ServiceRegistration};
pub use crate::domain::ports::Discovery;
pub use crate::domain::services;
pub use crate::utils::error::{LinkError, Result};
