//! Qiniu CDN Controller binary
//!
//! Runs one subcommand against the configured account and prints the result
//! as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result, bail};
use cdn_controller::config::{Command, ControllerConfig};
use cdn_controller::{Manifest, Reconciler, apply};
use clap::Parser;
use qiniu_client::{Credentials, QiniuClient};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ControllerConfig::parse();

    info!("Starting Qiniu CDN Controller");
    info!("Configuration:");
    info!("  API host: {}", config.api_host);
    info!("  UC host: {}", config.uc_host);
    info!("  Timeouts: {:?}", config.timeouts());
    info!("  Poll backoff: {:?}", config.poll_backoff());

    let credentials = Credentials::new(&config.access_key, &config.secret_key)?;
    let client = QiniuClient::with_timeout(
        config.api_host.clone(),
        config.uc_host.clone(),
        credentials,
        config.http_timeout(),
    )
    .context("failed to build Qiniu client")?;

    let (poll_min, poll_max) = config.poll_backoff();
    let reconciler = Reconciler::new(Box::new(client))
        .with_timeouts(config.timeouts())
        .with_poll_backoff(poll_min, poll_max);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight operations");
            on_signal.cancel();
        }
    });

    match &config.command {
        Command::Apply { manifest } => {
            let manifest = Manifest::from_path(manifest)?;
            info!("Applying {} resources", manifest.resources.len());
            let report = apply(&reconciler, &manifest, &cancel).await;
            println!("{}", serde_json::to_string_pretty(&report.to_json())?);

            let failed = report.failures().count();
            if failed > 0 {
                bail!("{failed} of {} resources failed to converge", report.entries.len());
            }
        }
        Command::Domains => {
            let domains = reconciler.domains().list().await?;
            println!("{}", serde_json::to_string_pretty(&domains)?);
        }
        Command::Certs => {
            let certs: Vec<_> = reconciler
                .certificates()
                .list()
                .await?
                .into_iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "name": c.spec.name,
                        "commonName": c.common_name,
                        "dnsNames": c.dns_names,
                        "notBefore": c.not_before,
                        "notAfter": c.not_after,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&certs)?);
        }
        Command::Buckets { region } => {
            let buckets = reconciler.list_buckets(region).await?;
            println!("{}", serde_json::to_string_pretty(&buckets)?);
        }
    }

    Ok(())
}
