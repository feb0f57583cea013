use crate::domain::model::{ServiceInstance, ServiceRegistration};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Access to the service registry. Implementations must not cache
/// resolutions: every call reflects the registry's current view, so a
/// restarted instance is picked up on the very next resolve.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Returns one healthy instance of the named service.
    async fn resolve(&self, service: &str) -> Result<ServiceInstance>;

    /// Advertises this process. Re-registering the same id overwrites
    /// the previous registration, so retries are safe.
    async fn register(&self, registration: &ServiceRegistration) -> Result<()>;

    async fn deregister(&self, id: &str) -> Result<()>;
}
