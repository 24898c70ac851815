use derive_more::derive::{Display, Error};

/// Failures of the checkout and settlement workflow.
///
/// None of these are fatal to the service: every one of them is reported to
/// the caller and the process keeps serving other payments.
#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum CheckoutError {
	#[display("Invalid input: {reason}")]
	Validation { reason: String },
	#[display("Payment worker unreachable: {reason}")]
	Transport { reason: String },
	#[display("Payment declined with status {status}")]
	PaymentDeclined { status: String },
	#[display("Intent {intent_id} cannot be settled from status {current}")]
	SettlementConflict { intent_id: String, current: String },
	#[display("{collection} record {id} not found")]
	NotFound { collection: String, id: String },
	#[display("Malformed {collection} record {id}: {reason}")]
	MalformedRecord {
		collection: String,
		id:         String,
		reason:     String,
	},
	#[display("Storage failure: {reason}")]
	Storage { reason: String },
}

impl CheckoutError {
	pub fn validation(reason: impl Into<String>) -> Self {
		CheckoutError::Validation {
			reason: reason.into(),
		}
	}

	pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
		CheckoutError::NotFound {
			collection: collection.into(),
			id:         id.into(),
		}
	}

	pub fn malformed(
		collection: impl Into<String>,
		id: impl Into<String>,
		reason: impl Into<String>,
	) -> Self {
		CheckoutError::MalformedRecord {
			collection: collection.into(),
			id:         id.into(),
			reason:     reason.into(),
		}
	}
}

impl From<redis::RedisError> for CheckoutError {
	fn from(err: redis::RedisError) -> Self {
		CheckoutError::Storage {
			reason: err.to_string(),
		}
	}
}

impl From<serde_json::Error> for CheckoutError {
	fn from(err: serde_json::Error) -> Self {
		CheckoutError::Storage {
			reason: err.to_string(),
		}
	}
}

impl From<reqwest::Error> for CheckoutError {
	fn from(err: reqwest::Error) -> Self {
		CheckoutError::Transport {
			reason: err.to_string(),
		}
	}
}
