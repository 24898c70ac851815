use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use uuid::Uuid;

use crate::domain::errors::CheckoutError;
use crate::domain::gateway::DepositStatusGateway;
use crate::domain::payment_intent::{PaymentIntent, PaymentStatus};
use crate::domain::repository::PaymentIntentRepository;
use crate::use_cases::poll_deposit_status::{PollOutcome, StatusPoller};
use crate::use_cases::settle_payment::{
	SettlementCommitter, SettlementOutcome, SettlementRequest,
};

/// Where a deposit stands in the confirmation workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ConfirmationState {
	Polling,
	Settled { earnings: f64 },
	AlreadySettled,
	Declined { status: String },
	TimedOut,
	SettlementFailed { reason: String },
	Aborted { reason: String },
}

impl ConfirmationState {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, ConfirmationState::Polling)
	}

	/// The intent may still be pending after these, so a new `start` runs
	/// the workflow again. The guarded transition keeps settlement
	/// exactly-once across runs.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			ConfirmationState::TimedOut |
				ConfirmationState::SettlementFailed { .. } |
				ConfirmationState::Aborted { .. }
		)
	}
}

/// How long a terminal state stays readable before it is dropped.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct TrackedDeposit {
	state: ConfirmationState,
	since: Instant,
}

impl TrackedDeposit {
	fn new(state: ConfirmationState) -> Self {
		Self {
			state,
			since: Instant::now(),
		}
	}
}

type Registry = Arc<Mutex<HashMap<Uuid, TrackedDeposit>>>;

/// Drives a deposit from the first return signal to settlement. Starting a
/// deposit that is being confirmed, or that already ended for good, is a
/// no-op: the interceptor and the direct start after checkout both call
/// `start` and only the first one spawns a poller.
pub struct ConfirmPaymentUseCase<R, G>
where
	R: PaymentIntentRepository + Clone,
	G: DepositStatusGateway,
{
	intent_repo:         R,
	poller:              Arc<StatusPoller<G>>,
	committer:           SettlementCommitter<R>,
	settlement_attempts: u32,
	settlement_backoff:  Duration,
	retention:           Duration,
	tracked:             Registry,
}

impl<R, G> Clone for ConfirmPaymentUseCase<R, G>
where
	R: PaymentIntentRepository + Clone,
	G: DepositStatusGateway,
{
	fn clone(&self) -> Self {
		Self {
			intent_repo:         self.intent_repo.clone(),
			poller:              self.poller.clone(),
			committer:           self.committer.clone(),
			settlement_attempts: self.settlement_attempts,
			settlement_backoff:  self.settlement_backoff,
			retention:           self.retention,
			tracked:             self.tracked.clone(),
		}
	}
}

impl<R, G> ConfirmPaymentUseCase<R, G>
where
	R: PaymentIntentRepository + Clone,
	G: DepositStatusGateway,
{
	pub fn new(
		intent_repo: R,
		poller: StatusPoller<G>,
		committer: SettlementCommitter<R>,
		settlement_attempts: u32,
	) -> Self {
		let settlement_backoff = poller.policy().interval;
		Self {
			intent_repo,
			poller: Arc::new(poller),
			committer,
			settlement_attempts: settlement_attempts.max(1),
			settlement_backoff,
			retention: DEFAULT_RETENTION,
			tracked: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	pub fn with_retention(mut self, retention: Duration) -> Self {
		self.retention = retention;
		self
	}

	pub async fn state(&self, deposit_id: Uuid) -> Option<ConfirmationState> {
		self.tracked
			.lock()
			.await
			.get(&deposit_id)
			.map(|tracked| tracked.state.clone())
	}

	/// Starts confirming the deposit. Returns `None` when the deposit is
	/// already being confirmed or ended in a final state, in which case
	/// nothing new is spawned.
	pub async fn start(
		&self,
		deposit_id: Uuid,
	) -> Result<Option<JoinHandle<ConfirmationState>>, CheckoutError> {
		{
			let mut tracked = self.tracked.lock().await;
			let retention = self.retention;
			tracked.retain(|_, t| {
				!t.state.is_terminal() || t.since.elapsed() < retention
			});

			if let Some(entry) = tracked.get(&deposit_id) {
				if !entry.state.is_retryable() {
					info!("Deposit {deposit_id} already tracked as {:?}", entry.state);
					return Ok(None);
				}
				info!(
					"Restarting confirmation of deposit {deposit_id} after {:?}",
					entry.state
				);
			}
			tracked.insert(deposit_id, TrackedDeposit::new(ConfirmationState::Polling));
		}

		let intent = match self.intent_repo.find_by_deposit_id(deposit_id).await {
			Ok(Some(intent)) => intent,
			Ok(None) => {
				self.tracked.lock().await.remove(&deposit_id);
				return Err(CheckoutError::not_found("deposits", deposit_id.to_string()));
			}
			Err(e) => {
				self.tracked.lock().await.remove(&deposit_id);
				return Err(e);
			}
		};

		let use_case = self.clone();
		let confirmation = tokio::spawn(async move { use_case.confirm(intent).await });
		let tracked = self.tracked.clone();
		Ok(Some(tokio::spawn(async move {
			let state = match confirmation.await {
				Ok(state) => state,
				Err(e) => {
					error!("Confirmation of deposit {deposit_id} aborted: {e}");
					ConfirmationState::Aborted {
						reason: e.to_string(),
					}
				}
			};
			tracked
				.lock()
				.await
				.insert(deposit_id, TrackedDeposit::new(state.clone()));
			state
		})))
	}

	async fn confirm(&self, intent: PaymentIntent) -> ConfirmationState {
		match intent.status {
			PaymentStatus::Pending => {}
			PaymentStatus::Success => return ConfirmationState::AlreadySettled,
			other => {
				return ConfirmationState::Declined {
					status: other.to_string(),
				};
			}
		}

		match self.poller.poll(intent.deposit_id).await {
			PollOutcome::Succeeded => self.settle(&intent).await,
			PollOutcome::Failed { status } => {
				if let Err(e) = self.committer.reject(intent.kind(), &intent.id).await {
					error!("Could not record failure of intent {}: {e}", intent.id);
				}
				warn!(
					"Intent {}: {}",
					intent.id,
					CheckoutError::PaymentDeclined {
						status: status.clone(),
					}
				);
				ConfirmationState::Declined { status }
			}
			PollOutcome::TimedOut { attempts } => {
				warn!(
					"Intent {} left pending for reconciliation after {attempts} polls",
					intent.id
				);
				ConfirmationState::TimedOut
			}
		}
	}

	async fn settle(&self, intent: &PaymentIntent) -> ConfirmationState {
		let mut last_error = None;
		for attempt in 1..=self.settlement_attempts {
			match self.committer.commit(SettlementRequest::from(intent)).await {
				Ok(SettlementOutcome::Committed { earnings }) => {
					return ConfirmationState::Settled { earnings };
				}
				Ok(SettlementOutcome::AlreadySettled) => {
					return ConfirmationState::AlreadySettled;
				}
				Err(e @ CheckoutError::SettlementConflict { .. }) => {
					error!("Settlement of intent {} refused: {e}", intent.id);
					return ConfirmationState::SettlementFailed {
						reason: e.to_string(),
					};
				}
				Err(e) => {
					warn!(
						"Settlement of intent {} failed on attempt {attempt}/{}: {e}",
						intent.id, self.settlement_attempts
					);
					last_error = Some(e);
				}
			}
			if attempt < self.settlement_attempts {
				sleep(self.settlement_backoff).await;
			}
		}

		let reason = last_error
			.map(|e| e.to_string())
			.unwrap_or_else(|| "settlement not attempted".to_string());
		error!("Giving up on settlement of intent {}: {reason}", intent.id);
		ConfirmationState::SettlementFailed { reason }
	}
}
