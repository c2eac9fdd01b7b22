//! Waits for asynchronous provider jobs.
//!
//! Mutating domain calls return before the provider has finished; the job's
//! progress is read back with `describe_domain`. [`next_state`] is the whole
//! decision table and has no I/O. [`Poller::await_completion`] feeds it
//! observations, sleeps between them and stops on the first terminal state.

use std::time::Duration;

use qiniu_client::{OperatingState, OperationDescriptor, OperationType, QiniuClientTrait, QiniuError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::FibonacciBackoff;
use crate::clock::Clock;
use crate::error::ReconcileError;

/// What a not-found answer to describe means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// The resource must exist while the job runs
    Fail,
    /// The job removes the resource, so its absence is the goal
    Success,
}

/// What the poller is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub expected: OperationType,
    pub deadline: Duration,
    pub not_found: NotFoundPolicy,
}

/// One answer to a describe call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Descriptor(OperationDescriptor),
    NotFound,
    /// Describe itself failed
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Processing,
    Success,
    Failed(String),
    DeadlineExceeded,
    Cancelled,
}

/// Classify one observation taken `elapsed` after the job started.
pub fn next_state(policy: &PollPolicy, observation: &Observation, elapsed: Duration) -> PollState {
    match observation {
        Observation::NotFound => match policy.not_found {
            NotFoundPolicy::Success => PollState::Success,
            NotFoundPolicy::Fail => PollState::Failed("resource disappeared while the operation was running".to_string()),
        },
        Observation::Error(message) => PollState::Failed(message.clone()),
        Observation::Descriptor(d) if d.operation_type != policy.expected => PollState::Failed(format!(
            "provider reports operation {}, expected {}",
            d.operation_type, policy.expected
        )),
        Observation::Descriptor(d) => match &d.operating_state {
            OperatingState::Processing if elapsed < policy.deadline => PollState::Processing,
            OperatingState::Processing => PollState::DeadlineExceeded,
            OperatingState::Success => PollState::Success,
            OperatingState::Failed if d.operating_state_desc.is_empty() => {
                PollState::Failed("provider reported failure".to_string())
            }
            OperatingState::Failed => PollState::Failed(d.operating_state_desc.clone()),
            OperatingState::Other(raw) => PollState::Failed(format!("unknown operating state {raw:?}")),
        },
    }
}

/// Outcome of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// Describe calls made
    pub attempts: u32,
    pub elapsed: Duration,
    /// `None` when the run ended on a not-found answer
    pub last_observed: Option<OperationDescriptor>,
}

/// Drives [`next_state`] against the provider
pub struct Poller<'a> {
    client: &'a dyn QiniuClientTrait,
    clock: &'a dyn Clock,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl std::fmt::Debug for Poller<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("api_host", &self.client.api_host())
            .field("clock", &self.clock)
            .field("min_backoff", &self.min_backoff)
            .field("max_backoff", &self.max_backoff)
            .finish()
    }
}

impl<'a> Poller<'a> {
    pub fn new(
        client: &'a dyn QiniuClientTrait,
        clock: &'a dyn Clock,
        min_backoff: Duration,
        max_backoff: Duration,
    ) -> Self {
        Self {
            client,
            clock,
            min_backoff,
            max_backoff,
        }
    }

    /// Poll `resource_id` until its job reaches a terminal state.
    ///
    /// Sleeps follow a Fibonacci backoff, never past the deadline, and end
    /// early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// - `OperationFailed` for a failed, unknown or unexpected job
    /// - `DeadlineExceeded` when the job is still processing at the deadline
    /// - `Cancelled` when `cancel` fires first
    /// - `Transport` when describe itself fails
    pub async fn await_completion(
        &self,
        resource_id: &str,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<PollReport, ReconcileError> {
        let started = self.clock.now();
        let mut backoff = FibonacciBackoff::new(self.min_backoff, self.max_backoff);
        let mut attempts = 0_u32;
        let mut last_observed: Option<OperationDescriptor> = None;

        let cancelled = |last_observed: Option<OperationDescriptor>| ReconcileError::Cancelled {
            resource_id: resource_id.to_string(),
            operation: policy.expected.clone(),
            last_observed,
        };

        loop {
            if cancel.is_cancelled() {
                warn!("Cancelled waiting for {} on {}", policy.expected, resource_id);
                return Err(cancelled(last_observed));
            }

            attempts += 1;
            let mut describe_error: Option<QiniuError> = None;
            let observation = match self.client.describe_domain(resource_id).await {
                Ok(descriptor) => {
                    last_observed = Some(descriptor.clone());
                    Observation::Descriptor(descriptor)
                }
                Err(e) if e.is_not_found() => Observation::NotFound,
                Err(e) => {
                    let message = e.to_string();
                    describe_error = Some(e);
                    Observation::Error(message)
                }
            };

            let elapsed = self.clock.now().saturating_duration_since(started);
            let state = next_state(policy, &observation, elapsed);
            debug!(
                "{} attempt {}: observed {:?} after {:?} -> {:?}",
                resource_id, attempts, observation, elapsed, state
            );

            match state {
                PollState::Success => {
                    info!(
                        "{} on {} finished after {:?} ({} checks)",
                        policy.expected, resource_id, elapsed, attempts
                    );
                    return Ok(PollReport {
                        attempts,
                        elapsed,
                        last_observed,
                    });
                }
                PollState::Failed(reason) => {
                    error!("{} on {} failed: {}", policy.expected, resource_id, reason);
                    return Err(match describe_error {
                        Some(source) => ReconcileError::Transport {
                            resource_id: resource_id.to_string(),
                            operation: "describe_domain",
                            source,
                        },
                        None => ReconcileError::OperationFailed {
                            resource_id: resource_id.to_string(),
                            operation: policy.expected.clone(),
                            reason,
                            last_observed,
                        },
                    });
                }
                PollState::DeadlineExceeded => {
                    error!(
                        "{} on {} still processing after {:?}",
                        policy.expected, resource_id, elapsed
                    );
                    return Err(ReconcileError::DeadlineExceeded {
                        resource_id: resource_id.to_string(),
                        operation: policy.expected.clone(),
                        deadline: policy.deadline,
                        elapsed,
                        last_observed,
                    });
                }
                PollState::Cancelled => return Err(cancelled(last_observed)),
                PollState::Processing => {
                    let remaining = policy.deadline.saturating_sub(elapsed);
                    let wait = backoff.next_backoff().min(remaining);
                    debug!("{} still processing, next check in {:?}", resource_id, wait);

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            warn!("Cancelled waiting for {} on {}", policy.expected, resource_id);
                            return Err(cancelled(last_observed));
                        }
                        () = self.clock.sleep(wait) => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(not_found: NotFoundPolicy) -> PollPolicy {
        PollPolicy {
            expected: OperationType::CreateDomain,
            deadline: Duration::from_secs(60),
            not_found,
        }
    }

    fn seen(op: OperationType, state: OperatingState) -> Observation {
        Observation::Descriptor(OperationDescriptor::new(op, state))
    }

    #[test]
    fn test_processing_before_and_at_deadline() {
        let p = policy(NotFoundPolicy::Fail);
        let obs = seen(OperationType::CreateDomain, OperatingState::Processing);
        assert_eq!(next_state(&p, &obs, Duration::from_secs(59)), PollState::Processing);
        assert_eq!(next_state(&p, &obs, Duration::from_secs(60)), PollState::DeadlineExceeded);
    }

    #[test]
    fn test_success_of_expected_operation() {
        let p = policy(NotFoundPolicy::Fail);
        let obs = seen(OperationType::CreateDomain, OperatingState::Success);
        assert_eq!(next_state(&p, &obs, Duration::ZERO), PollState::Success);
    }

    #[test]
    fn test_wrong_operation_fails_immediately() {
        let p = policy(NotFoundPolicy::Fail);
        let obs = seen(OperationType::Sslize, OperatingState::Processing);
        assert!(matches!(next_state(&p, &obs, Duration::ZERO), PollState::Failed(_)));
    }

    #[test]
    fn test_failed_state_carries_provider_reason() {
        let p = policy(NotFoundPolicy::Fail);
        let mut d = OperationDescriptor::new(OperationType::CreateDomain, OperatingState::Failed);
        d.operating_state_desc = "icp check failed".to_string();
        assert_eq!(
            next_state(&p, &Observation::Descriptor(d), Duration::ZERO),
            PollState::Failed("icp check failed".to_string())
        );
    }

    #[test]
    fn test_unknown_state_fails() {
        let p = policy(NotFoundPolicy::Fail);
        let obs = seen(OperationType::CreateDomain, OperatingState::Other("frozen".to_string()));
        assert!(matches!(next_state(&p, &obs, Duration::ZERO), PollState::Failed(r) if r.contains("frozen")));
    }

    #[test]
    fn test_not_found_depends_on_policy() {
        assert_eq!(
            next_state(&policy(NotFoundPolicy::Success), &Observation::NotFound, Duration::ZERO),
            PollState::Success
        );
        assert!(matches!(
            next_state(&policy(NotFoundPolicy::Fail), &Observation::NotFound, Duration::ZERO),
            PollState::Failed(_)
        ));
    }

    #[test]
    fn test_describe_error_fails() {
        let p = policy(NotFoundPolicy::Success);
        assert_eq!(
            next_state(&p, &Observation::Error("timeout".to_string()), Duration::ZERO),
            PollState::Failed("timeout".to_string())
        );
    }
}
