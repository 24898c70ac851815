/// Worker statuses meaning the money was captured.
pub const SUCCESS_ALIASES: [&str; 2] = ["SUCCESS", "SUCCESSFUL"];

/// Worker statuses meaning the deposit will never complete.
pub const FAILURE_ALIASES: [&str; 5] =
	["FAILED", "CANCELLED", "REJECTED", "EXPIRED", "ERROR"];

/// A deposit status reported by the payment worker, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositStatus {
	Succeeded,
	Failed(String),
	InProgress(String),
}

impl DepositStatus {
	pub fn normalize(raw: &str) -> String {
		raw.trim().to_uppercase()
	}

	pub fn from_worker(raw: &str) -> Self {
		let status = Self::normalize(raw);
		if SUCCESS_ALIASES.contains(&status.as_str()) {
			DepositStatus::Succeeded
		} else if FAILURE_ALIASES.contains(&status.as_str()) {
			DepositStatus::Failed(status)
		} else {
			DepositStatus::InProgress(status)
		}
	}

	pub fn is_terminal(&self) -> bool {
		!matches!(self, DepositStatus::InProgress(_))
	}
}
