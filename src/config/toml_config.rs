use crate::config::CliConfig;
use crate::domain::model::ServiceRegistration;
use crate::utils::error::{LinkError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service: ServiceSection,
    pub registry: RegistrySection,
    #[serde(default)]
    pub calls: CallsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    pub name: String,
    #[serde(default = "default_address")]
    pub address: String,
    pub port: u16,
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    pub url: String,
    #[serde(default = "default_registry_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallsSection {
    #[serde(default = "default_call_timeout")]
    pub timeout_secs: u64,
}

impl Default for CallsSection {
    fn default() -> Self {
        CallsSection {
            timeout_secs: default_call_timeout(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_health_interval() -> u64 {
    10
}

fn default_registry_timeout() -> u64 {
    2
}

fn default_call_timeout() -> u64 {
    3
}

impl ServiceConfig {
    /// A TOML file replaces the flag values wholesale; without one the
    /// flags stand on their own.
    pub fn load(cli: &CliConfig) -> Result<Self> {
        match &cli.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_cli(cli)),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LinkError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LinkError::ConfigError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn from_cli(cli: &CliConfig) -> Self {
        ServiceConfig {
            service: ServiceSection {
                name: cli.name.clone(),
                address: cli.address.clone(),
                port: cli.port,
                health_interval_secs: cli.health_interval_secs,
            },
            registry: RegistrySection {
                url: cli.registry_url.clone(),
                timeout_secs: cli.registry_timeout_secs,
            },
            calls: CallsSection {
                timeout_secs: cli.call_timeout_secs,
            },
        }
    }

    /// Substitute `${VAR_NAME}` references with environment values.
    /// Unresolved references are left in place.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("service.name", &self.service.name)?;
        validate_non_empty_string("service.address", &self.service.address)?;
        validate_positive_number("service.port", self.service.port as usize, 1)?;
        validate_range(
            "service.health_interval_secs",
            self.service.health_interval_secs,
            1,
            300,
        )?;

        validate_url("registry.url", &self.registry.url)?;
        validate_range("registry.timeout_secs", self.registry.timeout_secs, 1, 60)?;
        validate_range("calls.timeout_secs", self.calls.timeout_secs, 1, 120)?;

        Ok(())
    }

    pub fn registration(&self) -> ServiceRegistration {
        ServiceRegistration::new(
            &self.service.name,
            &self.service.address,
            self.service.port,
            self.service.health_interval_secs,
        )
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry.timeout_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.calls.timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service.address, self.service.port)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
