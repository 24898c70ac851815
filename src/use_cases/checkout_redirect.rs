use reqwest::Url;

use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::PaymentIntent;

pub const PAYMENT_PAGE_PATH: &str = "payment-page";

/// Builds the hosted checkout page address the embedded browser loads.
#[derive(Clone, Debug)]
pub struct CheckoutRedirector {
	worker_url: String,
}

impl CheckoutRedirector {
	pub fn new(worker_url: impl Into<String>) -> Self {
		Self {
			worker_url: worker_url.into(),
		}
	}

	pub fn checkout_url(&self, intent: &PaymentIntent) -> Result<Url, CheckoutError> {
		let page = format!(
			"{}/{PAYMENT_PAGE_PATH}",
			self.worker_url.trim_end_matches('/')
		);
		Url::parse_with_params(&page, &[
			("depositId", intent.deposit_id.to_string()),
			("amount", intent.amount.to_string()),
			("currency", intent.currency.clone()),
		])
		.map_err(|e| {
			CheckoutError::validation(format!("invalid worker url '{page}': {e}"))
		})
	}
}
