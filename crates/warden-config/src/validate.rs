//! Post-merge configuration validation.

use globset::Glob;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound on the context TTL. Anything longer defeats the point of a
/// short-lived cache on the permission query path.
const MAX_CACHE_TTL_MS: u64 = 60_000;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_admission(config)?;
    validate_context(config)?;
    validate_check(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_admission(config: &Config) -> ConfigResult<()> {
    if config.admission.startup_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "admission.startup_timeout_secs".to_owned(),
            message: "must be greater than zero".to_owned(),
        });
    }
    Ok(())
}

fn validate_context(config: &Config) -> ConfigResult<()> {
    let ctx = &config.context;

    if ctx.cache_ttl_ms == 0 || ctx.cache_ttl_ms > MAX_CACHE_TTL_MS {
        return Err(ConfigError::ValidationError {
            field: "context.cache_ttl_ms".to_owned(),
            message: format!(
                "{} is out of range; must be between 1 and {MAX_CACHE_TTL_MS}",
                ctx.cache_ttl_ms
            ),
        });
    }

    for pattern in &ctx.disabled_calculators {
        Glob::new(pattern).map_err(|e| ConfigError::ValidationError {
            field: "context.disabled_calculators".to_owned(),
            message: format!("invalid glob '{pattern}': {e}"),
        })?;
    }

    for (from, to) in &ctx.location_rewrites {
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "context.location_rewrites".to_owned(),
                message: "rewrite entries must not be blank".to_owned(),
            });
        }
    }

    Ok(())
}

fn validate_check(config: &Config) -> ConfigResult<()> {
    if config.check.audit_capacity == 0 {
        return Err(ConfigError::ValidationError {
            field: "check.audit_capacity".to_owned(),
            message: "must be greater than zero".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let log = &config.logging;

    if !matches!(
        log.level.to_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unknown level '{}'; expected one of: trace, debug, info, warn, error",
                log.level
            ),
        });
    }

    if !matches!(log.format.as_str(), "pretty" | "compact" | "json") {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unknown format '{}'; expected one of: pretty, compact, json",
                log.format
            ),
        });
    }

    Ok(())
}
