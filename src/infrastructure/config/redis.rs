use uuid::Uuid;

use crate::domain::payment_intent::IntentKind;

pub const DEPOSIT_INDEX_PREFIX: &str = "deposits";
pub const INTENT_CHANGES_CHANNEL: &str = "intents:changes";

pub fn deposit_index_key(deposit_id: Uuid) -> String {
	format!("{DEPOSIT_INDEX_PREFIX}:{deposit_id}")
}

/// Set of intent ids paid towards one subject, e.g. `courses:42:purchases`.
pub fn subject_index_key(kind: IntentKind, subject_id: &str) -> String {
	format!(
		"{}:{}",
		kind.subject_collection().document_key(subject_id),
		kind.collection()
	)
}
