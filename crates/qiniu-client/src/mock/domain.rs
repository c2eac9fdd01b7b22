//! CDN domain operations for MockQiniuClient

use super::{MockQiniuClient, ScriptedDescribe, lock};
use crate::error::QiniuError;
use crate::models::*;

fn no_such_domain(name: &str) -> QiniuError {
    QiniuError::NotFound(format!("{name}: no such domain"))
}

/// Apply `change` to a stored domain and remember the operation it started
fn mutate(
    client: &MockQiniuClient,
    name: &str,
    operation: OperationType,
    change: impl FnOnce(&mut DomainInfo),
) -> Result<(), QiniuError> {
    let mut domains = lock(&client.domains);
    let info = domains.get_mut(name).ok_or_else(|| no_such_domain(name))?;
    change(info);
    lock(&client.last_operation).insert(name.to_string(), operation);
    Ok(())
}

pub fn list_domains(client: &MockQiniuClient) -> Result<Vec<DomainSummary>, QiniuError> {
    client.record("list_domains", "", None)?;
    let stored = lock(&client.domains);
    let last = lock(&client.last_operation);
    let mut domains: Vec<DomainSummary> = stored
        .values()
        .map(|d| DomainSummary {
            name: d.name.clone(),
            cname: d.cname.clone(),
            domain_type: d.domain_type.to_string(),
            platform: d.platform.to_string(),
            geo_cover: d.geo_cover.to_string(),
            protocol: d.protocol.to_string(),
            operation_type: last.get(&d.name).cloned().unwrap_or_default(),
            operating_state: OperatingState::Success,
        })
        .collect();
    domains.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(domains)
}

pub fn get_domain(client: &MockQiniuClient, name: &str) -> Result<DomainInfo, QiniuError> {
    client.record("get_domain", name, None)?;
    lock(&client.domains)
        .get(name)
        .cloned()
        .ok_or_else(|| no_such_domain(name))
}

pub fn describe_domain(client: &MockQiniuClient, name: &str) -> Result<OperationDescriptor, QiniuError> {
    client.record("describe_domain", name, None)?;

    let scripted = lock(&client.describe_script)
        .get_mut(name)
        .and_then(std::collections::VecDeque::pop_front);
    match scripted {
        Some(ScriptedDescribe::Descriptor(d)) => return Ok(d),
        Some(ScriptedDescribe::NotFound) => return Err(no_such_domain(name)),
        Some(ScriptedDescribe::Error(message)) => {
            return Err(QiniuError::Api {
                status: 502,
                code: None,
                message,
            });
        }
        None => {}
    }

    if !lock(&client.domains).contains_key(name) {
        return Err(no_such_domain(name));
    }
    let operation = lock(&client.last_operation)
        .get(name)
        .cloned()
        .unwrap_or_default();
    Ok(OperationDescriptor::new(operation, OperatingState::Success))
}

pub fn create_domain(client: &MockQiniuClient, name: &str, body: &DomainInfo) -> Result<(), QiniuError> {
    client.record("create_domain", name, serde_json::to_value(body).ok())?;

    let mut domains = lock(&client.domains);
    if domains.contains_key(name) {
        return Err(QiniuError::Api {
            status: 400,
            code: Some(400_002),
            message: format!("{name}: domain already exists"),
        });
    }
    let mut info = body.clone();
    info.name = name.to_string();
    info.cname = format!("{name}.qiniudns.com");
    domains.insert(name.to_string(), info);
    lock(&client.last_operation).insert(name.to_string(), OperationType::CreateDomain);
    Ok(())
}

pub fn offline_domain(client: &MockQiniuClient, name: &str) -> Result<(), QiniuError> {
    client.record("offline_domain", name, None)?;
    mutate(client, name, OperationType::OfflineDomain, |_| {})
}

pub fn delete_domain(client: &MockQiniuClient, name: &str) -> Result<(), QiniuError> {
    client.record("delete_domain", name, None)?;
    if lock(&client.domains).remove(name).is_none() {
        return Err(QiniuError::NotFound(format!("{name}: 无此域名")));
    }
    lock(&client.last_operation).insert(name.to_string(), OperationType::DeleteDomain);
    Ok(())
}

pub fn sslize_domain(client: &MockQiniuClient, name: &str, https: &DomainHttpsInfo) -> Result<(), QiniuError> {
    client.record("sslize_domain", name, serde_json::to_value(https).ok())?;
    mutate(client, name, OperationType::Sslize, |info| {
        info.protocol = cdn_resources::Protocol::Https;
        info.https = Some(https.clone());
    })
}

pub fn unsslize_domain(client: &MockQiniuClient, name: &str) -> Result<(), QiniuError> {
    client.record("unsslize_domain", name, None)?;
    mutate(client, name, OperationType::Unsslize, |info| {
        info.protocol = cdn_resources::Protocol::Http;
        info.https = None;
    })
}

pub fn modify_domain_https_conf(
    client: &MockQiniuClient,
    name: &str,
    https: &DomainHttpsInfo,
) -> Result<(), QiniuError> {
    client.record("modify_domain_https_conf", name, serde_json::to_value(https).ok())?;
    mutate(client, name, OperationType::ModifyHttpsConf, |info| {
        info.https = Some(https.clone());
    })
}
