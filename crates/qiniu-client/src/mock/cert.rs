//! SSL certificate operations for MockQiniuClient

use super::{MockQiniuClient, lock};
use crate::error::QiniuError;
use crate::models::*;

pub fn list_certs(client: &MockQiniuClient) -> Result<Vec<CertInfo>, QiniuError> {
    client.record("list_certs", "", None)?;
    let mut certs: Vec<CertInfo> = lock(&client.certs).values().cloned().collect();
    certs.sort_by(|a, b| a.cert_id.cmp(&b.cert_id));
    Ok(certs)
}

pub fn get_cert(client: &MockQiniuClient, id: &str) -> Result<CertInfo, QiniuError> {
    client.record("get_cert", id, None)?;
    lock(&client.certs)
        .get(id)
        .cloned()
        .ok_or_else(|| QiniuError::NotFound(format!("certificate {id}: no such entry")))
}

pub fn create_cert(client: &MockQiniuClient, body: &CertBody) -> Result<String, QiniuError> {
    client.record("create_cert", &body.name, serde_json::to_value(body).ok())?;

    let id = format!("cert-{:04}", client.next_id());
    let common_name = body.common_name.clone().unwrap_or_else(|| body.name.clone());
    let cert = CertInfo {
        cert_id: id.clone(),
        name: body.name.clone(),
        dnsnames: vec![common_name.clone()],
        common_name,
        pri: body.pri.clone(),
        ca: body.ca.clone(),
        not_before: None,
        not_after: None,
    };
    lock(&client.certs).insert(id.clone(), cert);
    Ok(id)
}

pub fn delete_cert(client: &MockQiniuClient, id: &str) -> Result<(), QiniuError> {
    client.record("delete_cert", id, None)?;
    let serving = lock(&client.domains)
        .values()
        .find(|d| d.https.as_ref().is_some_and(|h| h.cert_id == id))
        .map(|d| d.name.clone());
    if let Some(domain) = serving {
        return Err(QiniuError::Api {
            status: 400,
            code: Some(400_610),
            message: format!("certificate {id} is in use by {domain}"),
        });
    }
    lock(&client.certs)
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| QiniuError::NotFound(format!("certificate {id}: no such entry")))
}
