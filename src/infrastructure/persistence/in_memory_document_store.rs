use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::domain::counters::{Collection, CreatorStats, Delta, SubjectCounters};
use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::{IntentKind, NewPaymentIntent, PaymentIntent};
use crate::domain::repository::{
	CounterRepository, IntentChange, PaymentIntentRepository, StatusTransition,
	TransitionResult,
};
use crate::infrastructure::persistence::document::{
	Document, decode_creator_stats, decode_subject_counters,
};

const CHANGES_CAPACITY: usize = 256;

#[derive(Default)]
struct State {
	next_id:  u64,
	intents:  HashMap<(IntentKind, String), PaymentIntent>,
	deposits: HashMap<Uuid, (IntentKind, String)>,
	counters: HashMap<String, Document>,
}

impl State {
	fn apply(&mut self, key: String, field: &str, delta: Delta) {
		let document = self.counters.entry(key).or_default();
		let current = document.get(field);
		let updated = match delta {
			Delta::Count(n) => {
				let value: i64 = current.and_then(|v| v.parse().ok()).unwrap_or(0);
				(value + n).to_string()
			}
			Delta::Amount(amount) => {
				let value: f64 = current.and_then(|v| v.parse().ok()).unwrap_or(0.0);
				(value + amount).to_string()
			}
		};
		document.insert(field.to_string(), updated);
	}
}

/// Process-local store with the same guarantees as the Redis one: a single
/// lock makes every transition all-or-nothing.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
	state:   Arc<Mutex<State>>,
	changes: broadcast::Sender<IntentChange>,
}

impl InMemoryDocumentStore {
	pub fn new() -> Self {
		let (changes, _) = broadcast::channel(CHANGES_CAPACITY);
		Self {
			state: Arc::new(Mutex::new(State::default())),
			changes,
		}
	}

	fn notify(&self, intent: &PaymentIntent) {
		// No subscribers is not an error.
		let _ = self.changes.send(IntentChange {
			kind:       intent.kind(),
			intent_id:  intent.id.clone(),
			deposit_id: intent.deposit_id,
			status:     intent.status,
		});
	}
}

impl Default for InMemoryDocumentStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl PaymentIntentRepository for InMemoryDocumentStore {
	async fn create(
		&self,
		intent: NewPaymentIntent,
	) -> Result<PaymentIntent, CheckoutError> {
		let mut state = self.state.lock().await;
		if state.deposits.contains_key(&intent.deposit_id) {
			return Err(CheckoutError::validation(format!(
				"deposit id {} was already issued",
				intent.deposit_id
			)));
		}

		state.next_id += 1;
		let intent = PaymentIntent::from_new(
			state.next_id.to_string(),
			intent,
			OffsetDateTime::now_utc(),
		);
		let key = (intent.kind(), intent.id.clone());
		state.deposits.insert(intent.deposit_id, key.clone());
		state.intents.insert(key, intent.clone());
		drop(state);

		self.notify(&intent);
		Ok(intent)
	}

	async fn get(
		&self,
		kind: IntentKind,
		intent_id: &str,
	) -> Result<Option<PaymentIntent>, CheckoutError> {
		let state = self.state.lock().await;
		Ok(state.intents.get(&(kind, intent_id.to_string())).cloned())
	}

	async fn find_by_deposit_id(
		&self,
		deposit_id: Uuid,
	) -> Result<Option<PaymentIntent>, CheckoutError> {
		let state = self.state.lock().await;
		Ok(state
			.deposits
			.get(&deposit_id)
			.and_then(|key| state.intents.get(key))
			.cloned())
	}

	async fn find_by_subject(
		&self,
		kind: IntentKind,
		subject_id: &str,
	) -> Result<Vec<PaymentIntent>, CheckoutError> {
		let state = self.state.lock().await;
		Ok(state
			.intents
			.values()
			.filter(|i| i.kind() == kind && i.subject_id == subject_id)
			.cloned()
			.collect())
	}

	async fn transition(
		&self,
		transition: StatusTransition,
	) -> Result<TransitionResult, CheckoutError> {
		let mut state = self.state.lock().await;
		let key = (transition.kind, transition.intent_id.clone());

		let intent = state.intents.get_mut(&key).ok_or_else(|| {
			CheckoutError::not_found(
				transition.kind.collection().as_str(),
				transition.intent_id.clone(),
			)
		})?;
		if intent.status != transition.from {
			return Ok(TransitionResult::Rejected {
				current: intent.status,
			});
		}
		intent.status = transition.to;
		intent.updated_at = OffsetDateTime::now_utc();
		let updated = intent.clone();

		for increment in transition.increments {
			state.apply(
				increment.collection.document_key(&increment.document_id),
				increment.field,
				increment.delta,
			);
		}
		drop(state);

		self.notify(&updated);
		Ok(TransitionResult::Applied)
	}

	async fn subscribe(
		&self,
	) -> Result<BoxStream<'static, IntentChange>, CheckoutError> {
		let receiver = self.changes.subscribe();
		let changes = stream::unfold(receiver, |mut receiver| async move {
			loop {
				match receiver.recv().await {
					Ok(change) => return Some((change, receiver)),
					Err(broadcast::error::RecvError::Lagged(_)) => continue,
					Err(broadcast::error::RecvError::Closed) => return None,
				}
			}
		});
		Ok(changes.boxed())
	}
}

#[async_trait]
impl CounterRepository for InMemoryDocumentStore {
	async fn subject_counters(
		&self,
		kind: IntentKind,
		subject_id: &str,
	) -> Result<SubjectCounters, CheckoutError> {
		let state = self.state.lock().await;
		let key = kind.subject_collection().document_key(subject_id);
		let empty = Document::new();
		decode_subject_counters(kind, subject_id, state.counters.get(&key).unwrap_or(&empty))
	}

	async fn creator_stats(
		&self,
		creator_id: &str,
	) -> Result<CreatorStats, CheckoutError> {
		let state = self.state.lock().await;
		let key = Collection::Creators.document_key(creator_id);
		let empty = Document::new();
		decode_creator_stats(creator_id, state.counters.get(&key).unwrap_or(&empty))
	}
}
