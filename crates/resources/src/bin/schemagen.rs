//! Print the JSON Schemas of the manifest resource specs to stdout.

use cdn_resources::{CertSpec, DomainSpec};

fn main() -> Result<(), serde_json::Error> {
    let schemas = serde_json::json!({
        "domain": schemars::schema_for!(DomainSpec),
        "certificate": schemars::schema_for!(CertSpec),
    });
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}
