use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::counters::Collection;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
	Purchase,
	Donation,
}

impl IntentKind {
	/// Collection holding the intents of this kind.
	pub fn collection(&self) -> Collection {
		match self {
			IntentKind::Purchase => Collection::Purchases,
			IntentKind::Donation => Collection::Donations,
		}
	}

	/// Collection holding the subjects paid for by intents of this kind.
	pub fn subject_collection(&self) -> Collection {
		match self {
			IntentKind::Purchase => Collection::Courses,
			IntentKind::Donation => Collection::Fundraisers,
		}
	}
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
	Pending,
	Success,
	Failed,
	Refunded,
}

impl PaymentStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			PaymentStatus::Pending => "pending",
			PaymentStatus::Success => "success",
			PaymentStatus::Failed => "failed",
			PaymentStatus::Refunded => "refunded",
		}
	}

	/// Only a pending intent may move, and only to a terminal status.
	/// Refunds happen out of band and are never produced here.
	pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
		matches!(
			(self, next),
			(PaymentStatus::Pending, PaymentStatus::Success) |
				(PaymentStatus::Pending, PaymentStatus::Failed)
		)
	}
}

impl fmt::Display for PaymentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PaymentStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(PaymentStatus::Pending),
			"success" => Ok(PaymentStatus::Success),
			"failed" => Ok(PaymentStatus::Failed),
			"refunded" => Ok(PaymentStatus::Refunded),
			other => Err(format!("unknown payment status '{other}'")),
		}
	}
}

/// Fields that only exist on one of the two intent collections.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IntentDetails {
	#[serde(rename_all = "camelCase")]
	Purchase { course_name: String },
	#[serde(rename_all = "camelCase")]
	Donation {
		message:   Option<String>,
		is_public: bool,
	},
}

impl IntentDetails {
	pub fn kind(&self) -> IntentKind {
		match self {
			IntentDetails::Purchase { .. } => IntentKind::Purchase,
			IntentDetails::Donation { .. } => IntentKind::Donation,
		}
	}
}

/// An intent as handed to the store, before it gets an id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentIntent {
	pub deposit_id:     Uuid,
	pub amount:         f64,
	pub currency:       String,
	pub subject_id:     String,
	pub beneficiary_id: String,
	pub payer_id:       Option<String>,
	pub payer_name:     String,
	pub payer_phone:    String,
	pub details:        IntentDetails,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
	pub id:             String,
	pub deposit_id:     Uuid,
	pub amount:         f64,
	pub currency:       String,
	pub subject_id:     String,
	pub beneficiary_id: String,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub payer_id:       Option<String>,
	pub payer_name:     String,
	pub payer_phone:    String,
	pub status:         PaymentStatus,
	pub details:        IntentDetails,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at:     OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at:     OffsetDateTime,
}

impl PaymentIntent {
	/// Materializes a freshly stored intent. New intents always start pending.
	pub fn from_new(id: String, new: NewPaymentIntent, now: OffsetDateTime) -> Self {
		Self {
			id,
			deposit_id: new.deposit_id,
			amount: new.amount,
			currency: new.currency,
			subject_id: new.subject_id,
			beneficiary_id: new.beneficiary_id,
			payer_id: new.payer_id,
			payer_name: new.payer_name,
			payer_phone: new.payer_phone,
			status: PaymentStatus::Pending,
			details: new.details,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn kind(&self) -> IntentKind {
		self.details.kind()
	}
}
