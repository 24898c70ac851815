use log::info;
use uuid::Uuid;

use crate::domain::errors::CheckoutError;
use crate::domain::payment_intent::{IntentDetails, NewPaymentIntent, PaymentIntent};
use crate::domain::repository::PaymentIntentRepository;
use crate::domain::session::{ANONYMOUS_DISPLAY_NAME, Session};
use crate::use_cases::dto::{
	CreateDonationCommand, CreatePurchaseCommand, IntentSettings,
};

#[derive(Clone)]
pub struct CreatePaymentIntentUseCase<R: PaymentIntentRepository> {
	intent_repo: R,
	settings:    IntentSettings,
}

impl<R: PaymentIntentRepository> CreatePaymentIntentUseCase<R> {
	pub fn new(intent_repo: R, settings: IntentSettings) -> Self {
		Self {
			intent_repo,
			settings,
		}
	}

	pub async fn create_purchase(
		&self,
		session: &Session,
		command: CreatePurchaseCommand,
	) -> Result<PaymentIntent, CheckoutError> {
		validate_amount(command.amount)?;
		let payer_phone = required("payer phone", &command.payer_phone)?;
		let course_id = required("course id", &command.course_id)?;
		let creator_id = required("creator id", &command.creator_id)?;

		let payer_name = match command.payer_name.trim() {
			"" => session.display_name.clone(),
			name => name.to_string(),
		};

		let intent = self
			.intent_repo
			.create(NewPaymentIntent {
				deposit_id: Uuid::new_v4(),
				amount: command.amount,
				currency: self.settings.currency.clone(),
				subject_id: course_id,
				beneficiary_id: creator_id,
				payer_id: session.user_id.clone(),
				payer_name,
				payer_phone,
				details: IntentDetails::Purchase {
					course_name: command.course_name.trim().to_string(),
				},
			})
			.await?;

		info!(
			"Purchase intent {} created for course {} with deposit {}",
			intent.id, intent.subject_id, intent.deposit_id
		);
		Ok(intent)
	}

	pub async fn create_donation(
		&self,
		session: &Session,
		command: CreateDonationCommand,
	) -> Result<PaymentIntent, CheckoutError> {
		validate_amount(command.amount)?;
		if command.amount < self.settings.min_donation {
			return Err(CheckoutError::validation(format!(
				"minimum donation is {} {}",
				self.settings.min_donation, self.settings.currency
			)));
		}
		if command.amount > self.settings.max_donation {
			return Err(CheckoutError::validation(format!(
				"maximum donation is {} {}",
				self.settings.max_donation, self.settings.currency
			)));
		}
		let donor_phone = required("donor phone", &command.donor_phone)?;
		let fundraiser_id = required("fundraiser id", &command.fundraiser_id)?;
		let creator_id = required("creator id", &command.creator_id)?;

		let donor_name = match command.donor_name.trim() {
			"" => ANONYMOUS_DISPLAY_NAME.to_string(),
			name => name.to_string(),
		};
		let message = command
			.message
			.map(|m| m.trim().to_string())
			.filter(|m| !m.is_empty());

		let intent = self
			.intent_repo
			.create(NewPaymentIntent {
				deposit_id: Uuid::new_v4(),
				amount: command.amount,
				currency: self.settings.currency.clone(),
				subject_id: fundraiser_id,
				beneficiary_id: creator_id,
				payer_id: session.user_id.clone(),
				payer_name: donor_name,
				payer_phone: donor_phone,
				details: IntentDetails::Donation {
					message,
					is_public: command.is_public,
				},
			})
			.await?;

		info!(
			"Donation intent {} created for fundraiser {} with deposit {}",
			intent.id, intent.subject_id, intent.deposit_id
		);
		Ok(intent)
	}
}

fn validate_amount(amount: f64) -> Result<(), CheckoutError> {
	if !amount.is_finite() || amount <= 0.0 {
		return Err(CheckoutError::validation("amount must be positive"));
	}
	Ok(())
}

fn required(field: &str, value: &str) -> Result<String, CheckoutError> {
	let value = value.trim();
	if value.is_empty() {
		return Err(CheckoutError::validation(format!("{field} is required")));
	}
	Ok(value.to_string())
}
