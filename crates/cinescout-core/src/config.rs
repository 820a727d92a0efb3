use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_TMDB_API_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Blank values for required variables count as missing: an empty project or
/// collection identifier would only fail later, on the first store call.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let tmdb_api_key = require("TMDB_API_KEY")?;
    let appwrite_endpoint = require("APPWRITE_ENDPOINT")?;
    let appwrite_project_id = require("APPWRITE_PROJECT_ID")?;
    let appwrite_database_id = require("APPWRITE_DATABASE_ID")?;
    let appwrite_collection_id = require("APPWRITE_COLLECTION_ID")?;

    let env = parse_environment(&or_default("CINESCOUT_ENV", "development"))?;
    let log_level = or_default("CINESCOUT_LOG_LEVEL", "info");

    let tmdb_api_base_url = or_default("TMDB_API_BASE_URL", DEFAULT_TMDB_API_BASE_URL);
    let tmdb_image_base_url = or_default("TMDB_IMAGE_BASE_URL", DEFAULT_TMDB_IMAGE_BASE_URL);
    let tmdb_request_timeout_secs = parse_u64("TMDB_REQUEST_TIMEOUT_SECS", "10")?;
    let tmdb_max_retries = parse_u32("TMDB_MAX_RETRIES", "2")?;
    let tmdb_retry_backoff_base_ms = parse_u64("TMDB_RETRY_BACKOFF_BASE_MS", "250")?;

    let appwrite_request_timeout_secs = parse_u64("APPWRITE_REQUEST_TIMEOUT_SECS", "10")?;

    let search_debounce_ms = parse_u64("CINESCOUT_SEARCH_DEBOUNCE_MS", "500")?;
    let trending_limit = parse_usize("CINESCOUT_TRENDING_LIMIT", "5")?;

    Ok(AppConfig {
        env,
        log_level,
        tmdb_api_key,
        tmdb_api_base_url,
        tmdb_image_base_url,
        tmdb_request_timeout_secs,
        tmdb_max_retries,
        tmdb_retry_backoff_base_ms,
        appwrite_endpoint,
        appwrite_project_id,
        appwrite_database_id,
        appwrite_collection_id,
        appwrite_request_timeout_secs,
        search_debounce_ms,
        trending_limit,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CINESCOUT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
