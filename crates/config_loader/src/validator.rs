//! Config validation
//!
//! Rules:
//! - endpoint is non-empty
//! - endpoint has `host:port` shape with a numeric port
//! - queue_capacity > 0

use contracts::{ContractError, SenderConfig};

/// Validate a SenderConfig
///
/// Returns the first error encountered.
pub fn validate(config: &SenderConfig) -> Result<(), ContractError> {
    validate_endpoint(&config.endpoint)?;
    validate_queue_capacity(config.queue_capacity)?;
    Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<(), ContractError> {
    if endpoint.trim().is_empty() {
        return Err(ContractError::config_validation(
            "endpoint",
            "endpoint is required",
        ));
    }

    let (host, port) = endpoint.rsplit_once(':').ok_or_else(|| {
        ContractError::config_validation(
            "endpoint",
            format!("expected host:port, got '{endpoint}'"),
        )
    })?;

    if host.is_empty() {
        return Err(ContractError::config_validation(
            "endpoint",
            format!("missing host in '{endpoint}'"),
        ));
    }

    if port.parse::<u16>().is_err() {
        return Err(ContractError::config_validation(
            "endpoint",
            format!("invalid port '{port}'"),
        ));
    }

    Ok(())
}

fn validate_queue_capacity(capacity: usize) -> Result<(), ContractError> {
    if capacity == 0 {
        return Err(ContractError::config_validation(
            "queue_capacity",
            "queue_capacity must be > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate(&SenderConfig::new("telegraf:8094")).is_ok());
        assert!(validate(&SenderConfig::new("[::1]:8094")).is_ok());
    }

    #[test]
    fn test_empty_endpoint() {
        let err = validate(&SenderConfig::new("  ")).unwrap_err();
        assert!(err.to_string().contains("endpoint is required"));
    }

    #[test]
    fn test_missing_port() {
        let err = validate(&SenderConfig::new("telegraf")).unwrap_err();
        assert!(err.to_string().contains("host:port"));
    }

    #[test]
    fn test_invalid_port() {
        let err = validate(&SenderConfig::new("telegraf:http")).unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }

    #[test]
    fn test_missing_host() {
        assert!(validate(&SenderConfig::new(":8094")).is_err());
    }

    #[test]
    fn test_zero_queue_capacity() {
        let config = SenderConfig::new("telegraf:8094").with_queue_capacity(0);
        let err = validate(&config).unwrap_err();
        assert!(matches!(
            err,
            ContractError::ConfigValidation { ref field, .. } if field == "queue_capacity"
        ));
    }
}
