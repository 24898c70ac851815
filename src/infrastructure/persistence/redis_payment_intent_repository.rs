use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, warn};
use redis::{AsyncCommands, Client, Script};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::counters::Delta;
use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::{
	IntentKind, NewPaymentIntent, PaymentIntent, PaymentStatus,
};
use crate::domain::repository::{
	IntentChange, PaymentIntentRepository, StatusTransition, TransitionResult,
};
use crate::infrastructure::config::redis::{
	INTENT_CHANGES_CHANNEL, deposit_index_key, subject_index_key,
};
use crate::infrastructure::persistence::document::{
	Document, decode_intent, encode_intent, timestamp,
};

/// Claims the deposit id and writes the intent with its subject index entry,
/// all or nothing. Returns 0 when the deposit id was already issued.
const CREATE_LUA: &str = r#"
    local index_type = redis.call("TYPE", KEYS[3])["ok"]
    if index_type ~= "none" and index_type ~= "set" then
        return redis.error_reply("WRONGTYPE subject index " .. KEYS[3] .. " is a " .. index_type)
    end
    if not redis.call("SET", KEYS[1], KEYS[2], "NX") then
        return 0
    end

    redis.call("HSET", KEYS[2], unpack(ARGV, 2))
    redis.call("SADD", KEYS[3], ARGV[1])

    return 1
"#;

/// Compare-and-set of the intent status plus the counter increments, run
/// atomically by Redis. KEYS[1] is the intent and KEYS[2..] the counter
/// documents, one `field, kind, delta` triple in ARGV per counter key.
/// Returns "applied", the current status when it does not match the
/// expected one, or nil when the intent does not exist.
const TRANSITION_LUA: &str = r#"
    local current = redis.call("HGET", KEYS[1], "status")
    if not current then
        return nil
    end
    if current ~= ARGV[1] then
        return current
    end

    redis.call("HSET", KEYS[1], "status", ARGV[2], "updated_at", ARGV[3])

    for k = 2, #KEYS do
        local i = 4 + (k - 2) * 3
        if ARGV[i + 1] == "count" then
            redis.call("HINCRBY", KEYS[k], ARGV[i], ARGV[i + 2])
        else
            redis.call("HINCRBYFLOAT", KEYS[k], ARGV[i], ARGV[i + 2])
        end
    end

    return "applied"
"#;

#[derive(Clone)]
pub struct RedisPaymentIntentRepository {
	client: Client,
}

impl RedisPaymentIntentRepository {
	pub fn new(client: Client) -> Self {
		Self { client }
	}

	async fn connection(
		&self,
	) -> Result<redis::aio::MultiplexedConnection, CheckoutError> {
		Ok(self.client.get_multiplexed_async_connection().await?)
	}

	async fn load(
		con: &mut redis::aio::MultiplexedConnection,
		kind: IntentKind,
		intent_id: &str,
	) -> Result<Option<PaymentIntent>, CheckoutError> {
		let key = kind.collection().document_key(intent_id);
		let document: Document = con.hgetall(&key).await?;
		if document.is_empty() {
			return Ok(None);
		}
		decode_intent(kind, intent_id, &document).map(Some)
	}

	async fn publish(
		con: &mut redis::aio::MultiplexedConnection,
		change: &IntentChange,
	) {
		let published = async {
			let payload = serde_json::to_string(change)?;
			let _: () = con.publish(INTENT_CHANGES_CHANNEL, payload).await?;
			Ok::<(), CheckoutError>(())
		}
		.await;
		if let Err(e) = published {
			warn!("Failed to publish change of intent {}: {e}", change.intent_id);
		}
	}
}

/// Keys and arguments of `TRANSITION_LUA`. Counter documents travel as keys
/// so the script only touches keys it declares.
fn transition_arguments(
	transition: &StatusTransition,
	updated_at: OffsetDateTime,
) -> (Vec<String>, Vec<String>) {
	let mut keys = vec![transition.kind.collection().document_key(&transition.intent_id)];
	let mut args = vec![
		transition.from.as_str().to_string(),
		transition.to.as_str().to_string(),
		timestamp(updated_at),
	];
	for increment in &transition.increments {
		let (delta_kind, delta) = match increment.delta {
			Delta::Count(n) => ("count", n.to_string()),
			Delta::Amount(amount) => ("amount", amount.to_string()),
		};
		keys.push(increment.collection.document_key(&increment.document_id));
		args.extend([increment.field.to_string(), delta_kind.to_string(), delta]);
	}
	(keys, args)
}

/// `deposits:{uuid}` points at the intent document, e.g. `purchases:{id}`.
fn parse_document_key(value: &str) -> Option<(IntentKind, &str)> {
	let (collection, id) = value.split_once(':')?;
	let kind = match collection {
		"purchases" => IntentKind::Purchase,
		"donations" => IntentKind::Donation,
		_ => return None,
	};
	Some((kind, id))
}

#[async_trait]
impl PaymentIntentRepository for RedisPaymentIntentRepository {
	async fn create(
		&self,
		intent: NewPaymentIntent,
	) -> Result<PaymentIntent, CheckoutError> {
		let mut con = self.connection().await?;

		let intent = PaymentIntent::from_new(
			Uuid::new_v4().simple().to_string(),
			intent,
			OffsetDateTime::now_utc(),
		);
		let kind = intent.kind();
		let key = kind.collection().document_key(&intent.id);

		let script = Script::new(CREATE_LUA);
		let mut invocation = script.prepare_invoke();
		invocation
			.key(deposit_index_key(intent.deposit_id))
			.key(&key)
			.key(subject_index_key(kind, &intent.subject_id))
			.arg(&intent.id);
		for (field, value) in encode_intent(&intent) {
			invocation.arg(field).arg(value);
		}

		let created: i64 = invocation.invoke_async(&mut con).await?;
		if created == 0 {
			return Err(CheckoutError::validation(format!(
				"deposit id {} was already issued",
				intent.deposit_id
			)));
		}

		debug!("Stored intent {key}");
		Self::publish(&mut con, &IntentChange {
			kind,
			intent_id: intent.id.clone(),
			deposit_id: intent.deposit_id,
			status: intent.status,
		})
		.await;

		Ok(intent)
	}

	async fn get(
		&self,
		kind: IntentKind,
		intent_id: &str,
	) -> Result<Option<PaymentIntent>, CheckoutError> {
		let mut con = self.connection().await?;
		Self::load(&mut con, kind, intent_id).await
	}

	async fn find_by_deposit_id(
		&self,
		deposit_id: Uuid,
	) -> Result<Option<PaymentIntent>, CheckoutError> {
		let mut con = self.connection().await?;

		let document_key: Option<String> =
			con.get(deposit_index_key(deposit_id)).await?;
		let Some(document_key) = document_key else {
			return Ok(None);
		};
		let (kind, intent_id) = parse_document_key(&document_key).ok_or_else(|| {
			CheckoutError::malformed(
				"deposits",
				deposit_id.to_string(),
				format!("unknown document key '{document_key}'"),
			)
		})?;

		Self::load(&mut con, kind, intent_id).await
	}

	async fn find_by_subject(
		&self,
		kind: IntentKind,
		subject_id: &str,
	) -> Result<Vec<PaymentIntent>, CheckoutError> {
		let mut con = self.connection().await?;

		let ids: Vec<String> = con.smembers(subject_index_key(kind, subject_id)).await?;
		let mut intents = Vec::with_capacity(ids.len());
		for id in ids {
			if let Some(intent) = Self::load(&mut con, kind, &id).await? {
				intents.push(intent);
			}
		}
		Ok(intents)
	}

	async fn transition(
		&self,
		transition: StatusTransition,
	) -> Result<TransitionResult, CheckoutError> {
		let mut con = self.connection().await?;
		let (keys, args) = transition_arguments(&transition, OffsetDateTime::now_utc());

		let script = Script::new(TRANSITION_LUA);
		let mut invocation = script.prepare_invoke();
		for key in &keys {
			invocation.key(key);
		}
		for arg in &args {
			invocation.arg(arg);
		}

		let reply: Option<String> = invocation.invoke_async(&mut con).await?;
		match reply.as_deref() {
			None => Err(CheckoutError::not_found(
				transition.kind.collection().as_str(),
				transition.intent_id,
			)),
			Some("applied") => {
				// The write is committed; a failed read only costs the notification.
				match Self::load(&mut con, transition.kind, &transition.intent_id).await {
					Ok(Some(intent)) => {
						Self::publish(&mut con, &IntentChange {
							kind:       transition.kind,
							intent_id:  intent.id.clone(),
							deposit_id: intent.deposit_id,
							status:     intent.status,
						})
						.await;
					}
					Ok(None) => warn!(
						"Intent {} vanished right after its transition",
						transition.intent_id
					),
					Err(e) => warn!(
						"Transition of intent {} applied but not published: {e}",
						transition.intent_id
					),
				}
				Ok(TransitionResult::Applied)
			}
			Some(current) => {
				let current = current.parse::<PaymentStatus>().map_err(|e| {
					CheckoutError::malformed(
						transition.kind.collection().as_str(),
						transition.intent_id.clone(),
						e,
					)
				})?;
				Ok(TransitionResult::Rejected { current })
			}
		}
	}

	async fn subscribe(
		&self,
	) -> Result<BoxStream<'static, IntentChange>, CheckoutError> {
		let mut pubsub = self.client.get_async_pubsub().await?;
		pubsub.subscribe(INTENT_CHANGES_CHANNEL).await?;

		let changes = pubsub.into_on_message().filter_map(|msg| async move {
			let payload: String = match msg.get_payload() {
				Ok(payload) => payload,
				Err(e) => {
					warn!("Dropping unreadable change notification: {e}");
					return None;
				}
			};
			match serde_json::from_str::<IntentChange>(&payload) {
				Ok(change) => Some(change),
				Err(e) => {
					warn!("Dropping malformed change notification '{payload}': {e}");
					None
				}
			}
		});
		Ok(changes.boxed())
	}
}

/// Raw fields of a stored document, without decoding.
pub async fn read_document(
	client: &Client,
	key: &str,
) -> Result<HashMap<String, String>, CheckoutError> {
	let mut con = client.get_multiplexed_async_connection().await?;
	Ok(con.hgetall(key).await?)
}
