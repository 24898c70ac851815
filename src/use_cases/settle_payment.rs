use log::{info, warn};

use crate::domain::counters::{
	Collection, CounterIncrement, RAISED_FIELD, TOTAL_EARNINGS_FIELD,
	TOTAL_PURCHASES_FIELD, TOTAL_STUDENTS_FIELD,
};
use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::{IntentKind, PaymentIntent, PaymentStatus};
use crate::domain::repository::{
	PaymentIntentRepository, StatusTransition, TransitionResult,
};

/// Share of each payment kept by the platform, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeePolicy {
	pub course_fee_percent:     f64,
	pub fundraiser_fee_percent: f64,
}

impl FeePolicy {
	pub fn fee_percent(&self, kind: IntentKind) -> f64 {
		match kind {
			IntentKind::Purchase => self.course_fee_percent,
			IntentKind::Donation => self.fundraiser_fee_percent,
		}
	}

	pub fn beneficiary_earnings(&self, kind: IntentKind, amount: f64) -> f64 {
		amount * (1.0 - self.fee_percent(kind) / 100.0)
	}
}

impl Default for FeePolicy {
	fn default() -> Self {
		Self {
			course_fee_percent:     20.0,
			fundraiser_fee_percent: 5.0,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRequest {
	pub kind:           IntentKind,
	pub intent_id:      String,
	pub subject_id:     String,
	pub beneficiary_id: String,
	pub amount:         f64,
}

impl From<&PaymentIntent> for SettlementRequest {
	fn from(intent: &PaymentIntent) -> Self {
		Self {
			kind:           intent.kind(),
			intent_id:      intent.id.clone(),
			subject_id:     intent.subject_id.clone(),
			beneficiary_id: intent.beneficiary_id.clone(),
			amount:         intent.amount,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettlementOutcome {
	Committed { earnings: f64 },
	AlreadySettled,
}

/// The only place monetary state changes. Every write is a single guarded
/// transition of the store: the intent must still be pending.
#[derive(Clone)]
pub struct SettlementCommitter<R: PaymentIntentRepository> {
	intent_repo: R,
	fees:        FeePolicy,
}

impl<R: PaymentIntentRepository> SettlementCommitter<R> {
	pub fn new(intent_repo: R, fees: FeePolicy) -> Self {
		Self { intent_repo, fees }
	}

	pub async fn commit(
		&self,
		request: SettlementRequest,
	) -> Result<SettlementOutcome, CheckoutError> {
		if !request.amount.is_finite() || request.amount <= 0.0 {
			return Err(CheckoutError::validation("settled amount must be positive"));
		}

		let earnings = self.fees.beneficiary_earnings(request.kind, request.amount);
		let subject_collection = request.kind.subject_collection();
		let subject_increment = match request.kind {
			IntentKind::Purchase => CounterIncrement::count(
				subject_collection,
				&request.subject_id,
				TOTAL_PURCHASES_FIELD,
			),
			IntentKind::Donation => CounterIncrement::amount(
				subject_collection,
				&request.subject_id,
				RAISED_FIELD,
				request.amount,
			),
		};

		let result = self
			.intent_repo
			.transition(StatusTransition {
				kind:       request.kind,
				intent_id:  request.intent_id.clone(),
				from:       PaymentStatus::Pending,
				to:         PaymentStatus::Success,
				increments: vec![
					subject_increment,
					CounterIncrement::amount(
						Collection::Creators,
						&request.beneficiary_id,
						TOTAL_EARNINGS_FIELD,
						earnings,
					),
					CounterIncrement::count(
						Collection::Creators,
						&request.beneficiary_id,
						TOTAL_STUDENTS_FIELD,
					),
				],
			})
			.await?;

		match result {
			TransitionResult::Applied => {
				info!(
					"Intent {} settled: {} credited {earnings} on {}",
					request.intent_id, request.beneficiary_id, request.amount
				);
				Ok(SettlementOutcome::Committed { earnings })
			}
			TransitionResult::Rejected {
				current: PaymentStatus::Success,
			} => {
				warn!(
					"Intent {} already settled, skipping duplicate settlement",
					request.intent_id
				);
				Ok(SettlementOutcome::AlreadySettled)
			}
			TransitionResult::Rejected { current } => {
				Err(CheckoutError::SettlementConflict {
					intent_id: request.intent_id,
					current:   current.to_string(),
				})
			}
		}
	}

	/// Records a declined payment. Returns false when the intent had already
	/// left the pending status.
	pub async fn reject(
		&self,
		kind: IntentKind,
		intent_id: &str,
	) -> Result<bool, CheckoutError> {
		let result = self
			.intent_repo
			.transition(StatusTransition {
				kind,
				intent_id: intent_id.to_string(),
				from: PaymentStatus::Pending,
				to: PaymentStatus::Failed,
				increments: Vec::new(),
			})
			.await?;

		match result {
			TransitionResult::Applied => {
				info!("Intent {intent_id} marked as failed");
				Ok(true)
			}
			TransitionResult::Rejected { current } => {
				warn!("Intent {intent_id} is already {current}, not marking it failed");
				Ok(false)
			}
		}
	}
}
