//! Validation errors for desired-state specs

use thiserror::Error;

/// Errors raised while checking a desired-state spec, always before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value outside the enumerated set accepted for a field
    #[error("invalid value {value:?} for {field}, expected one of: {}", .allowed.join(", "))]
    InvalidValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// `protocol` is https but no https block was given
    #[error("domain {domain}: when protocol is 'https', the https block must be set")]
    MissingHttpsConfig { domain: String },

    /// Required field is empty
    #[error("{field} must not be empty ({context})")]
    EmptyField { field: &'static str, context: String },

    /// Cache control time unit outside 0..=6
    #[error("invalid cache timeunit {0}, expected 0..=6")]
    InvalidTimeUnit(u8),

    /// PEM material that does not look like PEM
    #[error("{field} is not PEM encoded ({context})")]
    InvalidPem { field: &'static str, context: String },
}
