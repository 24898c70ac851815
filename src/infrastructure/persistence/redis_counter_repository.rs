use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::domain::counters::{Collection, CreatorStats, SubjectCounters};
use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::IntentKind;
use crate::domain::repository::CounterRepository;
use crate::infrastructure::persistence::document::{
	Document, decode_creator_stats, decode_subject_counters,
};

#[derive(Clone)]
pub struct RedisCounterRepository {
	client: Client,
}

impl RedisCounterRepository {
	pub fn new(client: Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl CounterRepository for RedisCounterRepository {
	async fn subject_counters(
		&self,
		kind: IntentKind,
		subject_id: &str,
	) -> Result<SubjectCounters, CheckoutError> {
		let mut con = self.client.get_multiplexed_async_connection().await?;

		let document: Document = con
			.hgetall(kind.subject_collection().document_key(subject_id))
			.await?;

		decode_subject_counters(kind, subject_id, &document)
	}

	async fn creator_stats(
		&self,
		creator_id: &str,
	) -> Result<CreatorStats, CheckoutError> {
		let mut con = self.client.get_multiplexed_async_connection().await?;

		let document: Document = con
			.hgetall(Collection::Creators.document_key(creator_id))
			.await?;

		decode_creator_stats(creator_id, &document)
	}
}
