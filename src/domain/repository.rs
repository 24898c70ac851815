use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::counters::{CounterIncrement, CreatorStats, SubjectCounters};
use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::{
	IntentKind, NewPaymentIntent, PaymentIntent, PaymentStatus,
};

/// A guarded status change: applied only when the stored status equals
/// `from`, together with every increment, or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
	pub kind:       IntentKind,
	pub intent_id:  String,
	pub from:       PaymentStatus,
	pub to:         PaymentStatus,
	pub increments: Vec<CounterIncrement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
	Applied,
	Rejected { current: PaymentStatus },
}

/// Published after every intent write.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentChange {
	pub kind:       IntentKind,
	pub intent_id:  String,
	pub deposit_id: Uuid,
	pub status:     PaymentStatus,
}

#[async_trait]
pub trait PaymentIntentRepository: Send + Sync + 'static {
	async fn create(
		&self,
		intent: NewPaymentIntent,
	) -> Result<PaymentIntent, CheckoutError>;
	async fn get(
		&self,
		kind: IntentKind,
		intent_id: &str,
	) -> Result<Option<PaymentIntent>, CheckoutError>;
	async fn find_by_deposit_id(
		&self,
		deposit_id: Uuid,
	) -> Result<Option<PaymentIntent>, CheckoutError>;
	async fn find_by_subject(
		&self,
		kind: IntentKind,
		subject_id: &str,
	) -> Result<Vec<PaymentIntent>, CheckoutError>;
	async fn transition(
		&self,
		transition: StatusTransition,
	) -> Result<TransitionResult, CheckoutError>;
	async fn subscribe(
		&self,
	) -> Result<BoxStream<'static, IntentChange>, CheckoutError>;
}

#[async_trait]
pub trait CounterRepository: Send + Sync + 'static {
	async fn subject_counters(
		&self,
		kind: IntentKind,
		subject_id: &str,
	) -> Result<SubjectCounters, CheckoutError>;
	async fn creator_stats(
		&self,
		creator_id: &str,
	) -> Result<CreatorStats, CheckoutError>;
}
