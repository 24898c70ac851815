use std::time::Duration;

use log::{info, warn};
use tokio::time::sleep;
use uuid::Uuid;

use crate::domain::deposit_status::DepositStatus;
use crate::domain::gateway::DepositStatusGateway;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Bounded, fixed-interval retry policy of the status poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub interval:     Duration,
}

impl RetryPolicy {
	pub fn new(max_attempts: u32, interval: Duration) -> Self {
		Self {
			max_attempts: max_attempts.max(1),
			interval,
		}
	}

	/// Upper bound on how long a single poll run can take.
	pub fn ceiling(&self) -> Duration {
		self.interval * self.max_attempts
	}
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
	Idle,
	Polling { attempt: u32 },
	Succeeded,
	Failed { status: String },
	TimedOut { attempts: u32 },
}

impl PollerState {
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			PollerState::Succeeded |
				PollerState::Failed { .. } |
				PollerState::TimedOut { .. }
		)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	Succeeded,
	Failed { status: String },
	TimedOut { attempts: u32 },
}

pub struct StatusPoller<G: DepositStatusGateway> {
	gateway: G,
	policy:  RetryPolicy,
}

impl<G: DepositStatusGateway> StatusPoller<G> {
	pub fn new(gateway: G, policy: RetryPolicy) -> Self {
		Self { gateway, policy }
	}

	pub fn policy(&self) -> RetryPolicy {
		self.policy
	}

	/// Polls the worker until the deposit reaches a terminal status or the
	/// attempt ceiling is hit. Transport errors are swallowed and count as
	/// an attempt.
	pub async fn poll(&self, deposit_id: Uuid) -> PollOutcome {
		let mut state = PollerState::Idle;
		info!(
			"Polling started for deposit {deposit_id}, giving up after {:?}",
			self.policy.ceiling()
		);

		while !state.is_terminal() {
			let attempt = match state {
				PollerState::Idle => 1,
				PollerState::Polling { attempt } => attempt + 1,
				_ => break,
			};
			state = PollerState::Polling { attempt };
			sleep(self.policy.interval).await;

			state = match self.gateway.fetch_status(deposit_id).await {
				Ok(raw) => match DepositStatus::from_worker(&raw) {
					DepositStatus::Succeeded => PollerState::Succeeded,
					DepositStatus::Failed(status) => PollerState::Failed { status },
					DepositStatus::InProgress(status) => {
						info!(
							"Deposit {deposit_id} attempt {attempt}/{} -> {status}",
							self.policy.max_attempts
						);
						state
					}
				},
				Err(e) => {
					warn!(
						"Status poll for deposit {deposit_id} failed on attempt \
						 {attempt}/{}: {e}",
						self.policy.max_attempts
					);
					state
				}
			};

			if !state.is_terminal() && attempt >= self.policy.max_attempts {
				state = PollerState::TimedOut { attempts: attempt };
			}
		}

		match state {
			PollerState::Succeeded => {
				info!("Deposit {deposit_id} confirmed by the payment worker");
				PollOutcome::Succeeded
			}
			PollerState::Failed { status } => {
				warn!("Deposit {deposit_id} declined with status {status}");
				PollOutcome::Failed { status }
			}
			PollerState::TimedOut { attempts } => {
				warn!("Deposit {deposit_id} not confirmed after {attempts} attempts");
				PollOutcome::TimedOut { attempts }
			}
			PollerState::Idle | PollerState::Polling { .. } => {
				PollOutcome::TimedOut { attempts: 0 }
			}
		}
	}
}
