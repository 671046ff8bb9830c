//! SQL hardening for synthesized profiling queries.
//!
//! Every table and column name that reaches a query passes through
//! [`SqlSecurity`], and every numeric literal through [`InputValidator`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ProfilerError, Result};

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and escapes a column identifier.
    ///
    /// Column names coming from source catalogs may contain spaces, dashes or
    /// mixed case, so they are always emitted double-quoted. Embedded double
    /// quotes are rejected rather than escaped.
    ///
    /// # Examples
    /// ```rust
    /// use profiler_engine::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("amount").unwrap(), "\"amount\"");
    /// assert_eq!(SqlSecurity::escape_identifier("Created At").unwrap(), "\"Created At\"");
    /// assert!(SqlSecurity::escape_identifier("id\"; DROP TABLE users--").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        Ok(format!("\"{identifier}\""))
    }

    /// Validates a column identifier without escaping it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.is_empty() || identifier.trim().is_empty() {
            return Err(ProfilerError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > 128 {
            return Err(ProfilerError::SecurityError(
                "SQL identifier too long (max 128 characters)".to_string(),
            ));
        }

        static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| {
            #[allow(clippy::expect_used)]
            Regex::new(r"[\x00-\x1f\x7f]").expect("Hard-coded regex pattern should be valid")
        });
        if CONTROL_CHARS.is_match(identifier) {
            return Err(ProfilerError::SecurityError(
                "SQL identifier cannot contain control characters".to_string(),
            ));
        }

        Self::check_dangerous_patterns(identifier)
    }

    /// Validates and escapes a possibly schema-qualified table name.
    ///
    /// Each dot-separated part is quoted separately, so `sales.orders`
    /// becomes `"sales"."orders"`.
    pub fn escape_table_name(name: &str) -> Result<String> {
        static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| {
            #[allow(clippy::expect_used)]
            Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$")
                .expect("Hard-coded regex pattern should be valid")
        });

        if name.len() > 256 {
            return Err(ProfilerError::SecurityError(
                "Table name too long (max 256 characters)".to_string(),
            ));
        }

        if !QUALIFIED_NAME.is_match(name) {
            return Err(ProfilerError::SecurityError(format!(
                "Invalid table name format: '{name}'. Each part must start with a letter or underscore and contain only letters, numbers and underscores"
            )));
        }

        Ok(name
            .split('.')
            .map(|part| format!("\"{part}\""))
            .collect::<Vec<_>>()
            .join("."))
    }

    /// Checks for tokens that could break out of a quoted identifier.
    fn check_dangerous_patterns(identifier: &str) -> Result<()> {
        let dangerous_patterns = &["\"", ";", "--", "/*", "*/"];

        for pattern in dangerous_patterns {
            if identifier.contains(pattern) {
                return Err(ProfilerError::SecurityError(format!(
                    "SQL identifier contains dangerous pattern: '{pattern}'"
                )));
            }
        }

        Ok(())
    }
}

/// Input validation utilities for values spliced into SQL text.
pub struct InputValidator;

impl InputValidator {
    /// Validates that a numeric literal is finite.
    pub fn validate_finite(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() {
            return Err(ProfilerError::SecurityError(format!(
                "Invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        Ok(())
    }

    /// Validates a user-supplied sample query before it is wrapped as a
    /// subquery.
    pub fn validate_sample_query(query: &str) -> Result<()> {
        if sample_query_statement(query).is_empty() {
            return Err(ProfilerError::invalid_config("sample_query must not be empty"));
        }
        Ok(())
    }

    /// Validates a strictly positive size parameter.
    pub fn validate_positive(value: usize, name: &str) -> Result<()> {
        if value == 0 {
            return Err(ProfilerError::invalid_config(format!(
                "{name} must be greater than zero"
            )));
        }
        Ok(())
    }
}

/// The statement of a sample query without surrounding whitespace or
/// trailing semicolons, ready to be placed in a subquery.
pub fn sample_query_statement(query: &str) -> &str {
    query.trim().trim_end_matches(';').trim_end()
}
