//! Command line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use qiniu_client::{DEFAULT_API_HOST, DEFAULT_UC_HOST};

use crate::reconciler::Timeouts;

/// Qiniu CDN controller
#[derive(Parser, Debug)]
#[command(name = "cdn-controller", version, about)]
pub struct ControllerConfig {
    /// Qiniu access key
    #[arg(long, env = "QINIU_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,

    /// Qiniu secret key
    #[arg(long, env = "QINIU_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// CDN and certificate API endpoint
    #[arg(long, env = "QINIU_API_HOST", default_value = DEFAULT_API_HOST)]
    pub api_host: String,

    /// Bucket metadata endpoint
    #[arg(long, env = "QINIU_UC_HOST", default_value = DEFAULT_UC_HOST)]
    pub uc_host: String,

    /// Deadline for domain creation, in minutes
    #[arg(long, env = "CDN_CREATE_TIMEOUT_MINUTES", default_value = "30")]
    pub create_timeout_minutes: u64,

    /// Deadline for in-place domain updates, in minutes
    #[arg(long, env = "CDN_UPDATE_TIMEOUT_MINUTES", default_value = "60")]
    pub update_timeout_minutes: u64,

    /// Deadline for domain deletion, in minutes
    #[arg(long, env = "CDN_DELETE_TIMEOUT_MINUTES", default_value = "30")]
    pub delete_timeout_minutes: u64,

    /// Initial wait between status checks, in seconds
    #[arg(long, env = "CDN_POLL_MIN_SECONDS", default_value = "1")]
    pub poll_min_seconds: u64,

    /// Longest wait between status checks, in seconds
    #[arg(long, env = "CDN_POLL_MAX_SECONDS", default_value = "10")]
    pub poll_max_seconds: u64,

    /// Per-request HTTP timeout, in seconds
    #[arg(long, env = "CDN_HTTP_TIMEOUT_SECONDS", default_value = "30")]
    pub http_timeout_seconds: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Converge every resource of a manifest
    Apply {
        /// YAML manifest
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// List CDN domains
    Domains,

    /// List SSL certificates (private keys omitted)
    Certs,

    /// List the buckets of a region
    Buckets {
        /// Region id: z0, z1, z2, na0 or as0
        #[arg(short, long)]
        region: String,
    },
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

impl ControllerConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            create: minutes(self.create_timeout_minutes),
            update: minutes(self.update_timeout_minutes),
            delete: minutes(self.delete_timeout_minutes),
        }
    }

    /// (min, max) wait between status checks
    pub fn poll_backoff(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.poll_min_seconds),
            Duration::from_secs(self.poll_max_seconds),
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}
