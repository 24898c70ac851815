use log::debug;
use reqwest::Url;
use uuid::Uuid;

use crate::domain::deposit_status::DepositStatus;

pub const PAYMENT_RETURN_PATH: &str = "payment-return";

/// Completion signal extracted from a return navigation. Receiving one means
/// the embedded browser should be closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSignal {
	pub deposit_id: Uuid,
	pub status:     Option<String>,
}

impl ReturnSignal {
	pub fn reported_status(&self) -> Option<DepositStatus> {
		self.status.as_deref().map(DepositStatus::from_worker)
	}
}

/// Watches the navigation events of the embedded checkout browser.
#[derive(Clone, Debug)]
pub struct RedirectInterceptor {
	return_url: Option<Url>,
}

impl RedirectInterceptor {
	pub fn new(worker_url: &str) -> Self {
		let return_url = Url::parse(&format!(
			"{}/{PAYMENT_RETURN_PATH}",
			worker_url.trim_end_matches('/')
		))
		.ok();
		Self { return_url }
	}

	/// Pure function of the url: inspecting the same return url twice yields
	/// the same signal.
	pub fn inspect(&self, navigation_url: &str) -> Option<ReturnSignal> {
		let return_url = self.return_url.as_ref()?;
		let url = Url::parse(navigation_url).ok()?;

		if url.origin() != return_url.origin() ||
			url.path().trim_end_matches('/') != return_url.path()
		{
			return None;
		}

		let mut deposit_id = None;
		let mut status = None;
		for (key, value) in url.query_pairs() {
			match &*key {
				"depositId" => deposit_id = Uuid::parse_str(value.trim()).ok(),
				"status" if !value.trim().is_empty() => {
					status = Some(DepositStatus::normalize(&value))
				}
				_ => {}
			}
		}

		let deposit_id = deposit_id?;
		debug!("Return navigation intercepted for deposit {deposit_id}");
		Some(ReturnSignal { deposit_id, status })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const WORKER: &str = "https://worker.example.dev";
	const DEPOSIT: &str = "6f1c1f0e-3a7d-4a0b-9d7e-2f4a5b6c7d8e";

	#[test]
	fn test_extracts_deposit_id_from_return_url() {
		let interceptor = RedirectInterceptor::new(WORKER);

		let signal = interceptor
			.inspect(&format!(
				"{WORKER}/payment-return?depositId={DEPOSIT}&status=successful"
			))
			.unwrap();

		assert_eq!(signal.deposit_id, Uuid::parse_str(DEPOSIT).unwrap());
		assert_eq!(signal.status.as_deref(), Some("SUCCESSFUL"));
		assert_eq!(signal.reported_status(), Some(DepositStatus::Succeeded));
	}

	#[test]
	fn test_same_url_twice_yields_same_signal() {
		let interceptor = RedirectInterceptor::new(WORKER);
		let url = format!("{WORKER}/payment-return?depositId={DEPOSIT}");

		let first = interceptor.inspect(&url);
		let second = interceptor.inspect(&url);

		assert!(first.is_some());
		assert_eq!(first, second);
	}

	#[test]
	fn test_ignores_checkout_page_and_foreign_hosts() {
		let interceptor = RedirectInterceptor::new(WORKER);

		assert_eq!(
			interceptor.inspect(&format!("{WORKER}/payment-page?depositId={DEPOSIT}")),
			None
		);
		assert_eq!(
			interceptor.inspect(&format!(
				"https://evil.example.dev/payment-return?depositId={DEPOSIT}"
			)),
			None
		);
		assert_eq!(interceptor.inspect("about:blank"), None);
	}

	#[test]
	fn test_return_url_without_valid_deposit_id_is_ignored() {
		let interceptor = RedirectInterceptor::new(WORKER);

		assert_eq!(
			interceptor.inspect(&format!("{WORKER}/payment-return?status=SUCCESS")),
			None
		);
		assert_eq!(
			interceptor.inspect(&format!("{WORKER}/payment-return?depositId=abc")),
			None
		);
	}

	#[test]
	fn test_worker_with_path_prefix() {
		let interceptor = RedirectInterceptor::new("https://pay.example.dev/mobile/");

		assert!(
			interceptor
				.inspect(&format!(
					"https://pay.example.dev/mobile/payment-return?depositId={DEPOSIT}"
				))
				.is_some()
		);
		assert!(
			interceptor
				.inspect(&format!(
					"https://pay.example.dev/payment-return?depositId={DEPOSIT}"
				))
				.is_none()
		);
	}
}
