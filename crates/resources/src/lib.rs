//! CDN desired-state definitions
//!
//! Typed specs for the resources the CDN controller manages on Qiniu:
//! CDN domains and SSL certificates, plus the region identifiers used by
//! the read-only bucket listing. Enumerated fields are closed sets checked
//! at deserialization, and `validate()` covers the structural rules that
//! serde alone cannot express.

#[macro_use]
mod macros;

pub mod cert;
pub mod domain;
pub mod error;
pub mod region;

pub use cert::*;
pub use domain::*;
pub use error::ValidationError;
pub use region::*;
