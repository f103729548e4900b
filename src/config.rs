//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before any code is
//! issued.
//!
//! ## Optional Variables
//!
//! - `CODE_ALPHANUMERIC_LENGTH` - Alphanumeric characters at the start of a code (default: 0)
//! - `CODE_ALPHA_LENGTH` - Alpha characters after them (default: 2)
//! - `CODE_NUMERIC_LENGTH` - Digits at the end (default: 4)
//! - `CODE_RANDOMIZED` - `true` for random digits, `false` for sequential (default: true)
//! - `BANNED_PATTERNS` - Extra comma-separated banned substrings (default: none)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//!
//! ```bash
//! export CODE_ALPHA_LENGTH=1
//! export CODE_NUMERIC_LENGTH=3
//! export CODE_RANDOMIZED=false
//! export BANNED_PATTERNS="420,K9"
//! ```

use anyhow::{Context, Result};
use std::env;

use crate::domain::banned_patterns::{BannedPatterns, default_banned_patterns};
use crate::domain::entities::CodeShape;

/// Shapes with fewer possible codes than this get a warning at startup.
const SMALL_CAPACITY_WARNING: u128 = 1_000;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shape used when a caller does not ask for a specific one.
    pub default_shape: CodeShape,
    /// Banned substrings in addition to the built-in list.
    pub extra_banned_patterns: Vec<String>,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let default_shape = CodeShape::new(
            parse_var("CODE_ALPHANUMERIC_LENGTH", 0)?,
            parse_var("CODE_ALPHA_LENGTH", 2)?,
            parse_var("CODE_NUMERIC_LENGTH", 4)?,
            parse_bool_var("CODE_RANDOMIZED", true)?,
        );

        let extra_banned_patterns = env::var("BANNED_PATTERNS")
            .map(|v| split_patterns(&v))
            .unwrap_or_default();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            default_shape,
            extra_banned_patterns,
            log_level,
            log_format,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the default shape is empty or its numeric segment is too long
    /// - `log_format` is not `text` or `json`
    pub fn validate(&self) -> Result<()> {
        self.default_shape
            .validate()
            .context("Invalid CODE_* configuration")?;

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        Ok(())
    }

    /// Built-in banned patterns plus the configured extras.
    pub fn banned_patterns(&self) -> BannedPatterns {
        let mut banned = default_banned_patterns();
        banned.extend(&self.extra_banned_patterns);
        banned
    }

    /// Returns true when the default shape offers few enough codes to run out on a busy day.
    pub fn is_small_code_space(&self) -> bool {
        self.default_shape
            .capacity()
            .is_some_and(|c| c < SMALL_CAPACITY_WARNING)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        let shape = &self.default_shape;
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Code shape: {} alphanumeric + {} alpha + {} numeric ({})",
            shape.alphanumeric_length,
            shape.alpha_length,
            shape.numeric_length,
            if shape.randomized { "random" } else { "sequential" }
        );
        tracing::info!("  Extra banned patterns: {}", self.extra_banned_patterns.len());
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);

        if self.is_small_code_space() {
            tracing::warn!(
                "  Code shape allows only {} codes per day; check-in may run out",
                shape.capacity().unwrap_or_default()
            );
        }
    }
}

fn parse_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a non-negative integer, got '{v}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bool_var(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Ok(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Ok(v) => anyhow::bail!("{name} must be 'true' or 'false', got '{v}'"),
        Err(_) => Ok(default),
    }
}

fn split_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
