use crate::config::types::{Settings, MAX_PAGE_TIMEOUT, MIN_PAGE_TIMEOUT};
use crate::url::is_valid;
use crate::ConfigError;
use url::Url;

/// Validates the entire settings structure
///
/// Out-of-range page timeouts are not an error; they are clamped when the
/// per-run configuration is built and only reported here.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_limits(settings)?;
    validate_chunking(settings)?;
    validate_schedule(settings)?;
    validate_extra_roots(settings)?;
    validate_ingest(settings)?;

    if !(MIN_PAGE_TIMEOUT..=MAX_PAGE_TIMEOUT).contains(&settings.page_timeout) {
        tracing::warn!(
            "page-timeout {}s is outside [{}, {}], using {}s",
            settings.page_timeout,
            MIN_PAGE_TIMEOUT,
            MAX_PAGE_TIMEOUT,
            settings.clamped_page_timeout()
        );
    }

    Ok(())
}

/// Validates crawl bounds and concurrency
fn validate_limits(settings: &Settings) -> Result<(), ConfigError> {
    if settings.max_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be >= 1, got {}",
            settings.max_workers
        )));
    }

    if settings.max_depth < -1 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be -1 (unlimited) or >= 0, got {}",
            settings.max_depth
        )));
    }

    if settings.max_pages < -1 || settings.max_pages == 0 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be -1 (unlimited) or >= 1, got {}",
            settings.max_pages
        )));
    }

    if settings.stall_timeout == 0 {
        return Err(ConfigError::Validation(
            "stall-timeout must be at least 1 second".to_string(),
        ));
    }

    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates ingestion chunking parameters
fn validate_chunking(settings: &Settings) -> Result<(), ConfigError> {
    if settings.chunk_size == 0 {
        return Err(ConfigError::Validation(
            "chunk-size must be >= 1".to_string(),
        ));
    }

    if settings.chunk_overlap >= settings.chunk_size {
        return Err(ConfigError::Validation(format!(
            "chunk-overlap ({}) must be smaller than chunk-size ({})",
            settings.chunk_overlap, settings.chunk_size
        )));
    }

    Ok(())
}

/// Validates the scheduled run time
fn validate_schedule(settings: &Settings) -> Result<(), ConfigError> {
    if settings.schedule_hour > 23 {
        return Err(ConfigError::Validation(format!(
            "schedule-hour must be between 0 and 23, got {}",
            settings.schedule_hour
        )));
    }

    if settings.schedule_minute > 59 {
        return Err(ConfigError::Validation(format!(
            "schedule-minute must be between 0 and 59, got {}",
            settings.schedule_minute
        )));
    }

    Ok(())
}

/// Validates the extra root domain list
fn validate_extra_roots(settings: &Settings) -> Result<(), ConfigError> {
    for root in settings.extra_roots() {
        if !is_valid(&root) {
            return Err(ConfigError::InvalidUrl(format!(
                "Invalid entry in allowed-extra-roots: '{}'",
                root
            )));
        }
    }
    Ok(())
}

/// Validates the ingestion endpoint
fn validate_ingest(settings: &Settings) -> Result<(), ConfigError> {
    if let Some(endpoint) = &settings.ingest.endpoint {
        let url = Url::parse(endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid ingest endpoint: {}", e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Ingest endpoint '{}' must use HTTP or HTTPS",
                endpoint
            )));
        }
    }
    Ok(())
}
