use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::model::{ServiceInstance, ServiceRegistration};
use crate::domain::ports::Discovery;
use crate::utils::error::{LinkError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 2;
const DEREGISTER_CRITICAL_AFTER: &str = "1m";

/// Consul-backed implementation of [`Discovery`].
///
/// Every resolve hits the agent's health API with `passing=true`, so
/// only instances whose check currently succeeds are returned. Nothing
/// is cached; topology changes are visible on the next call.
pub struct ConsulDiscovery {
    base_url: String,
    client: Client,
    timeout: Duration,
    cursor: AtomicUsize,
}

impl ConsulDiscovery {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        ConsulDiscovery {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            timeout,
            cursor: AtomicUsize::new(0),
        }
    }

    fn registry_error(&self, e: reqwest::Error) -> LinkError {
        let detail = if e.is_timeout() {
            format!("no answer within {:?}", self.timeout)
        } else {
            e.to_string()
        };
        LinkError::RegistryUnavailable { detail }
    }
}

#[async_trait]
impl Discovery for ConsulDiscovery {
    async fn resolve(&self, service: &str) -> Result<ServiceInstance> {
        let url = format!(
            "{}/v1/health/service/{}?passing=true",
            self.base_url, service
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.registry_error(e))?;

        if !response.status().is_success() {
            return Err(LinkError::RegistryUnavailable {
                detail: format!("health query returned {}", response.status()),
            });
        }

        let entries: Vec<HealthEntry> =
            response.json().await.map_err(|e| self.registry_error(e))?;

        if entries.is_empty() {
            return Err(LinkError::ServiceUnavailable {
                service: service.to_string(),
            });
        }

        // Round-robin over the healthy set. Relaxed is enough: the
        // cursor only spreads load, it carries no synchronization.
        let picked = self.cursor.fetch_add(1, Ordering::Relaxed) % entries.len();
        let instance = entries[picked].instance();

        tracing::debug!(
            "📡 resolved {} -> {}:{} ({} healthy)",
            service,
            instance.address,
            instance.port,
            entries.len()
        );

        Ok(instance)
    }

    async fn register(&self, registration: &ServiceRegistration) -> Result<()> {
        let url = format!("{}/v1/agent/service/register", self.base_url);
        let body = RegisterBody {
            id: &registration.id,
            name: &registration.name,
            address: &registration.address,
            port: registration.port,
            check: CheckBody {
                http: registration.check_url.clone(),
                interval: format!("{}s", registration.check_interval_secs),
                deregister_critical_service_after: DEREGISTER_CRITICAL_AFTER.to_string(),
            },
        };

        let response = self
            .client
            .put(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.registry_error(e))?;

        if !response.status().is_success() {
            return Err(LinkError::RegistryUnavailable {
                detail: format!("registration returned {}", response.status()),
            });
        }

        Ok(())
    }

    async fn deregister(&self, id: &str) -> Result<()> {
        let url = format!("{}/v1/agent/service/deregister/{}", self.base_url, id);

        let response = self
            .client
            .put(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.registry_error(e))?;

        if !response.status().is_success() {
            return Err(LinkError::RegistryUnavailable {
                detail: format!("deregistration returned {}", response.status()),
            });
        }

        Ok(())
    }
}

/// One element of the `/v1/health/service/<name>` response. Only the
/// addressing fields are kept; checks and metadata are ignored.
#[derive(Debug, Deserialize)]
struct HealthEntry {
    #[serde(rename = "Node", default)]
    node: NodeInfo,
    #[serde(rename = "Service")]
    service: AgentService,
}

impl HealthEntry {
    /// Consul leaves `Service.Address` empty when the service did not
    /// advertise one; the node address applies then.
    fn instance(&self) -> ServiceInstance {
        let address = if self.service.address.is_empty() {
            self.node.address.clone()
        } else {
            self.service.address.clone()
        };
        ServiceInstance {
            address,
            port: self.service.port,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct NodeInfo {
    #[serde(rename = "Address", default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct AgentService {
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "Port")]
    port: u16,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Address")]
    address: &'a str,
    #[serde(rename = "Port")]
    port: u16,
    #[serde(rename = "Check")]
    check: CheckBody,
}

#[derive(Debug, Serialize)]
struct CheckBody {
    #[serde(rename = "HTTP")]
    http: String,
    #[serde(rename = "Interval")]
    interval: String,
    #[serde(rename = "DeregisterCriticalServiceAfter")]
    deregister_critical_service_after: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_entry_prefers_service_address() {
        let raw = r#"[{
            "Node": {"Address": "10.0.0.1"},
            "Service": {"ID": "veh-1", "Service": "vehicle-service", "Address": "10.0.0.9", "Port": 4001}
        }]"#;
        let entries: Vec<HealthEntry> = serde_json::from_str(raw).unwrap();
        let instance = entries[0].instance();
        assert_eq!(instance.address, "10.0.0.9");
        assert_eq!(instance.port, 4001);
    }

    #[test]
    fn health_entry_falls_back_to_node_address() {
        let raw = r#"[{
            "Node": {"Address": "10.0.0.1"},
            "Service": {"Address": "", "Port": 4002}
        }]"#;
        let entries: Vec<HealthEntry> = serde_json::from_str(raw).unwrap();
        let instance = entries[0].instance();
        assert_eq!(instance.address, "10.0.0.1");
        assert_eq!(instance.port, 4002);
    }

    #[test]
    fn register_body_uses_consul_field_names() {
        let body = RegisterBody {
            id: "vehicle-service-4001-77",
            name: "vehicle-service",
            address: "127.0.0.1",
            port: 4001,
            check: CheckBody {
                http: "http://127.0.0.1:4001/health".to_string(),
                interval: "10s".to_string(),
                deregister_critical_service_after: "1m".to_string(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ID"], "vehicle-service-4001-77");
        assert_eq!(json["Check"]["HTTP"], "http://127.0.0.1:4001/health");
        assert_eq!(json["Check"]["Interval"], "10s");
        assert_eq!(json["Check"]["DeregisterCriticalServiceAfter"], "1m");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let discovery = ConsulDiscovery::new("http://127.0.0.1:8500/");
        assert_eq!(discovery.base_url, "http://127.0.0.1:8500");
    }
}
