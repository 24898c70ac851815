use futures::stream::BoxStream;
use uuid::Uuid;

use crate::domain::counters::{CreatorStats, SubjectCounters};
use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::{IntentDetails, IntentKind, PaymentIntent};
use crate::domain::repository::{
	CounterRepository, IntentChange, PaymentIntentRepository,
};

#[derive(Clone)]
pub struct QueryIntentsUseCase<R, C>
where
	R: PaymentIntentRepository,
	C: CounterRepository,
{
	intent_repo:  R,
	counter_repo: C,
}

impl<R, C> QueryIntentsUseCase<R, C>
where
	R: PaymentIntentRepository,
	C: CounterRepository,
{
	pub fn new(intent_repo: R, counter_repo: C) -> Self {
		Self {
			intent_repo,
			counter_repo,
		}
	}

	pub async fn by_deposit_id(
		&self,
		deposit_id: Uuid,
	) -> Result<PaymentIntent, CheckoutError> {
		self.intent_repo
			.find_by_deposit_id(deposit_id)
			.await?
			.ok_or_else(|| CheckoutError::not_found("deposits", deposit_id.to_string()))
	}

	/// Newest first.
	pub async fn purchases_of_course(
		&self,
		course_id: &str,
	) -> Result<Vec<PaymentIntent>, CheckoutError> {
		let mut purchases = self
			.intent_repo
			.find_by_subject(IntentKind::Purchase, course_id)
			.await?;
		purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(purchases)
	}

	/// Public donations of a fundraiser, newest first.
	pub async fn public_donations_of(
		&self,
		fundraiser_id: &str,
	) -> Result<Vec<PaymentIntent>, CheckoutError> {
		let mut donations: Vec<PaymentIntent> = self
			.intent_repo
			.find_by_subject(IntentKind::Donation, fundraiser_id)
			.await?
			.into_iter()
			.filter(|d| {
				matches!(d.details, IntentDetails::Donation {
					is_public: true,
					..
				})
			})
			.collect();
		donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(donations)
	}

	pub async fn subject_counters(
		&self,
		kind: IntentKind,
		subject_id: &str,
	) -> Result<SubjectCounters, CheckoutError> {
		self.counter_repo.subject_counters(kind, subject_id).await
	}

	pub async fn creator_stats(
		&self,
		creator_id: &str,
	) -> Result<CreatorStats, CheckoutError> {
		self.counter_repo.creator_stats(creator_id).await
	}

	pub async fn changes(
		&self,
	) -> Result<BoxStream<'static, IntentChange>, CheckoutError> {
		self.intent_repo.subscribe().await
	}
}

#[cfg(test)]
mod tests {
	use futures::StreamExt;

	use super::*;
	use crate::domain::payment_intent::{NewPaymentIntent, PaymentStatus};
	use crate::infrastructure::persistence::in_memory_document_store::InMemoryDocumentStore;

	fn donation(is_public: bool) -> NewPaymentIntent {
		NewPaymentIntent {
			deposit_id:     Uuid::new_v4(),
			amount:         1000.0,
			currency:       "CDF".to_string(),
			subject_id:     "fund-1".to_string(),
			beneficiary_id: "creator-1".to_string(),
			payer_id:       None,
			payer_name:     "Anonymous".to_string(),
			payer_phone:    "0990000000".to_string(),
			details:        IntentDetails::Donation {
				message: None,
				is_public,
			},
		}
	}

	#[tokio::test]
	async fn test_public_donations_hide_private_ones() {
		let store = InMemoryDocumentStore::new();
		let query = QueryIntentsUseCase::new(store.clone(), store.clone());
		store.create(donation(true)).await.unwrap();
		store.create(donation(false)).await.unwrap();
		store.create(donation(true)).await.unwrap();

		let donations = query.public_donations_of("fund-1").await.unwrap();

		assert_eq!(donations.len(), 2);
	}

	#[tokio::test]
	async fn test_by_deposit_id_not_found() {
		let store = InMemoryDocumentStore::new();
		let query = QueryIntentsUseCase::new(store.clone(), store);

		let result = query.by_deposit_id(Uuid::new_v4()).await;

		assert!(matches!(result, Err(CheckoutError::NotFound { .. })));
	}

	#[tokio::test]
	async fn test_changes_stream_reports_new_intents() {
		let store = InMemoryDocumentStore::new();
		let query = QueryIntentsUseCase::new(store.clone(), store.clone());
		let mut changes = query.changes().await.unwrap();

		let intent = store.create(donation(true)).await.unwrap();

		let change = changes.next().await.unwrap();
		assert_eq!(change.deposit_id, intent.deposit_id);
		assert_eq!(change.status, PaymentStatus::Pending);
		assert_eq!(change.kind, IntentKind::Donation);
	}
}
