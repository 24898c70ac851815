use std::fmt;

use serde::{Deserialize, Serialize};

pub const TOTAL_PURCHASES_FIELD: &str = "total_purchases";
pub const RAISED_FIELD: &str = "raised";
pub const TOTAL_EARNINGS_FIELD: &str = "total_earnings";
pub const TOTAL_STUDENTS_FIELD: &str = "total_students";

/// Document collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
	Purchases,
	Donations,
	Courses,
	Fundraisers,
	Creators,
}

impl Collection {
	pub fn as_str(&self) -> &'static str {
		match self {
			Collection::Purchases => "purchases",
			Collection::Donations => "donations",
			Collection::Courses => "courses",
			Collection::Fundraisers => "fundraisers",
			Collection::Creators => "creators",
		}
	}

	pub fn document_key(&self, id: &str) -> String {
		format!("{}:{id}", self.as_str())
	}
}

impl fmt::Display for Collection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
	Count(i64),
	Amount(f64),
}

/// One associative increment applied as part of a settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterIncrement {
	pub collection:  Collection,
	pub document_id: String,
	pub field:       &'static str,
	pub delta:       Delta,
}

impl CounterIncrement {
	pub fn count(collection: Collection, document_id: &str, field: &'static str) -> Self {
		Self {
			collection,
			document_id: document_id.to_string(),
			field,
			delta: Delta::Count(1),
		}
	}

	pub fn amount(
		collection: Collection,
		document_id: &str,
		field: &'static str,
		amount: f64,
	) -> Self {
		Self {
			collection,
			document_id: document_id.to_string(),
			field,
			delta: Delta::Amount(amount),
		}
	}
}

/// Aggregates kept on a course or a fundraiser.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCounters {
	pub total_purchases: u64,
	pub raised:          f64,
}

/// Aggregates kept on a creator profile.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorStats {
	pub total_earnings: f64,
	pub total_students: u64,
}
