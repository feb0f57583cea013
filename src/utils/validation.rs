use crate::utils::error::{LinkError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LinkError::ConfigError {
            field: field_name.to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LinkError::ConfigError {
                field: field_name.to_string(),
                message: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LinkError::ConfigError {
            field: field_name.to_string(),
            message: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LinkError::ConfigError {
            field: field_name.to_string(),
            message: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(LinkError::ConfigError {
            field: field_name.to_string(),
            message: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LinkError::ConfigError {
            field: field_name.to_string(),
            message: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("registry.url", "https://example.com").is_ok());
        assert!(validate_url("registry.url", "http://127.0.0.1:8500").is_ok());
        assert!(validate_url("registry.url", "").is_err());
        assert!(validate_url("registry.url", "not-a-url").is_err());
        assert!(validate_url("registry.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("service.name", "vehicle-service").is_ok());
        assert!(validate_non_empty_string("service.name", "   ").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("service.port", 4007, 1).is_ok());
        assert!(validate_positive_number("service.port", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("calls.timeout_secs", 3u64, 1, 120).is_ok());
        assert!(validate_range("calls.timeout_secs", 0u64, 1, 120).is_err());
        assert!(validate_range("calls.timeout_secs", 600u64, 1, 120).is_err());
    }
}
