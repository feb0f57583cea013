use serde::de::DeserializeOwned;

use crate::domain::model::CallOutcome;
use crate::utils::error::{LinkError, Result};

/// Collects the outcomes of one fan-out round.
///
/// Each branch is absorbed into either its parsed payload or the
/// section default, so one dead sibling never sinks the whole
/// response. The only fatal combination is every branch failing at
/// the discovery layer, which means the registry itself is gone.
pub struct FanoutReport {
    branches: usize,
    discovery_down: usize,
    degraded: Vec<&'static str>,
}

impl FanoutReport {
    pub fn new() -> Self {
        FanoutReport {
            branches: 0,
            discovery_down: 0,
            degraded: Vec::new(),
        }
    }

    /// Settles one branch: a parseable success yields its payload,
    /// anything else yields `default` and records the section as
    /// degraded.
    pub fn absorb<T: DeserializeOwned>(
        &mut self,
        section: &'static str,
        outcome: Result<CallOutcome>,
        default: T,
    ) -> T {
        self.branches += 1;

        let reason = match outcome {
            Ok(CallOutcome::Ok(value)) => match serde_json::from_value(value) {
                Ok(parsed) => return parsed,
                Err(e) => format!("unexpected payload shape: {}", e),
            },
            Ok(CallOutcome::NotFound) => "not found".to_string(),
            Ok(CallOutcome::Unavailable { detail }) => detail,
            Ok(CallOutcome::Invalid { status, detail }) => {
                format!("rejected with {}: {}", status, detail)
            }
            Err(LinkError::RegistryUnavailable { detail }) => {
                self.discovery_down += 1;
                format!("registry unreachable: {}", detail)
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!("🔶 section '{}' degraded: {}", section, reason);
        self.degraded.push(section);
        default
    }

    /// Errs only when every absorbed branch died at the discovery
    /// layer; partial loss is reported through the degraded list.
    pub fn finish(self) -> Result<Vec<String>> {
        if self.branches > 0 && self.discovery_down == self.branches {
            return Err(LinkError::RegistryUnavailable {
                detail: "every lookup failed".to_string(),
            });
        }
        Ok(self.degraded.into_iter().map(String::from).collect())
    }
}

impl Default for FanoutReport {
    fn default() -> Self {
        Self::new()
    }
}
