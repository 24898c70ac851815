//! Strict mapping between store documents (flat string hashes) and domain
//! types. A missing or unparseable field is an error, never a default.

use std::collections::HashMap;
use std::str::FromStr;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::counters::{
	CreatorStats, RAISED_FIELD, SubjectCounters, TOTAL_EARNINGS_FIELD,
	TOTAL_PURCHASES_FIELD, TOTAL_STUDENTS_FIELD,
};
use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::{IntentDetails, IntentKind, PaymentIntent};

pub type Document = HashMap<String, String>;

pub fn encode_intent(intent: &PaymentIntent) -> Vec<(&'static str, String)> {
	let mut fields = vec![
		("deposit_id", intent.deposit_id.to_string()),
		("amount", intent.amount.to_string()),
		("currency", intent.currency.clone()),
		("subject_id", intent.subject_id.clone()),
		("beneficiary_id", intent.beneficiary_id.clone()),
		("payer_name", intent.payer_name.clone()),
		("payer_phone", intent.payer_phone.clone()),
		("status", intent.status.to_string()),
		("created_at", timestamp(intent.created_at)),
		("updated_at", timestamp(intent.updated_at)),
	];
	if let Some(payer_id) = &intent.payer_id {
		fields.push(("payer_id", payer_id.clone()));
	}
	match &intent.details {
		IntentDetails::Purchase { course_name } => {
			fields.push(("course_name", course_name.clone()));
		}
		IntentDetails::Donation { message, is_public } => {
			fields.push(("is_public", is_public.to_string()));
			if let Some(message) = message {
				fields.push(("message", message.clone()));
			}
		}
	}
	fields
}

pub fn timestamp(at: OffsetDateTime) -> String {
	at.unix_timestamp_nanos().to_string()
}

pub fn decode_intent(
	kind: IntentKind,
	id: &str,
	document: &Document,
) -> Result<PaymentIntent, CheckoutError> {
	let reader = Reader {
		collection: kind.collection().as_str(),
		id,
		document,
	};

	let details = match kind {
		IntentKind::Purchase => IntentDetails::Purchase {
			course_name: reader.string("course_name")?,
		},
		IntentKind::Donation => IntentDetails::Donation {
			message:   reader.optional("message"),
			is_public: reader.parse("is_public")?,
		},
	};

	let amount: f64 = reader.parse("amount")?;
	if !amount.is_finite() || amount <= 0.0 {
		return Err(reader.malformed(format!("amount {amount} is not positive")));
	}

	Ok(PaymentIntent {
		id: id.to_string(),
		deposit_id: reader.parse::<Uuid>("deposit_id")?,
		amount,
		currency: reader.string("currency")?,
		subject_id: reader.string("subject_id")?,
		beneficiary_id: reader.string("beneficiary_id")?,
		payer_id: reader.optional("payer_id"),
		payer_name: reader.string("payer_name")?,
		payer_phone: reader.string("payer_phone")?,
		status: reader.parse("status")?,
		details,
		created_at: reader.timestamp("created_at")?,
		updated_at: reader.timestamp("updated_at")?,
	})
}

/// Counters start at zero: the increment primitive creates them on first use.
pub fn decode_subject_counters(
	kind: IntentKind,
	id: &str,
	document: &Document,
) -> Result<SubjectCounters, CheckoutError> {
	let reader = Reader {
		collection: kind.subject_collection().as_str(),
		id,
		document,
	};
	Ok(SubjectCounters {
		total_purchases: reader.counter(TOTAL_PURCHASES_FIELD)?,
		raised:          reader.counter(RAISED_FIELD)?,
	})
}

pub fn decode_creator_stats(
	id: &str,
	document: &Document,
) -> Result<CreatorStats, CheckoutError> {
	let reader = Reader {
		collection: "creators",
		id,
		document,
	};
	Ok(CreatorStats {
		total_earnings: reader.counter(TOTAL_EARNINGS_FIELD)?,
		total_students: reader.counter(TOTAL_STUDENTS_FIELD)?,
	})
}

struct Reader<'a> {
	collection: &'a str,
	id:         &'a str,
	document:   &'a Document,
}

impl Reader<'_> {
	fn malformed(&self, reason: String) -> CheckoutError {
		CheckoutError::malformed(self.collection, self.id, reason)
	}

	fn string(&self, field: &str) -> Result<String, CheckoutError> {
		self.document
			.get(field)
			.cloned()
			.ok_or_else(|| self.malformed(format!("missing field '{field}'")))
	}

	fn optional(&self, field: &str) -> Option<String> {
		self.document.get(field).cloned()
	}

	fn parse<T>(&self, field: &str) -> Result<T, CheckoutError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let raw = self.string(field)?;
		raw.parse::<T>()
			.map_err(|e| self.malformed(format!("field '{field}' = '{raw}': {e}")))
	}

	fn counter<T>(&self, field: &str) -> Result<T, CheckoutError>
	where
		T: FromStr + Default,
		T::Err: std::fmt::Display,
	{
		match self.document.get(field) {
			Some(_) => self.parse(field),
			None => Ok(T::default()),
		}
	}

	fn timestamp(&self, field: &str) -> Result<OffsetDateTime, CheckoutError> {
		let nanos: i128 = self.parse(field)?;
		OffsetDateTime::from_unix_timestamp_nanos(nanos)
			.map_err(|e| self.malformed(format!("field '{field}': {e}")))
	}
}
