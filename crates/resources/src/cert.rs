//! SSL certificate spec
//!
//! Every field is fixed at creation: the provider offers no update call for
//! certificates, so any change means uploading a new one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CertSpec {
    /// Display name shown in the provider console
    pub name: String,

    /// PEM encoded private key
    pub private_key: String,

    /// PEM encoded certificate chain, leaf first
    pub cert_chain: String,
}

impl CertSpec {
    /// # Errors
    ///
    /// Returns an error when the name is blank or the key material is not PEM.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "name",
                context: "certificate".to_string(),
            });
        }
        check_pem("privateKey", &self.private_key, &self.name)?;
        check_pem("certChain", &self.cert_chain, &self.name)
    }
}

fn check_pem(field: &'static str, value: &str, name: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim_start();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField {
            field,
            context: name.to_string(),
        });
    }
    if !trimmed.starts_with("-----BEGIN ") {
        return Err(ValidationError::InvalidPem {
            field,
            context: name.to_string(),
        });
    }
    Ok(())
}
