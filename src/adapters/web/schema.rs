use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment_intent::PaymentIntent;
use crate::use_cases::confirm_payment::ConfirmationState;
use crate::use_cases::dto::{CreateDonationCommand, CreatePurchaseCommand};

fn visible_by_default() -> bool {
	true
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
	pub course_id:   String,
	#[serde(default)]
	pub course_name: String,
	pub creator_id:  String,
	pub amount:      f64,
	#[serde(default)]
	pub payer_name:  String,
	pub payer_phone: String,
}

impl From<PurchaseRequest> for CreatePurchaseCommand {
	fn from(req: PurchaseRequest) -> Self {
		Self {
			course_id:   req.course_id,
			course_name: req.course_name,
			creator_id:  req.creator_id,
			amount:      req.amount,
			payer_name:  req.payer_name,
			payer_phone: req.payer_phone,
		}
	}
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
	pub fundraiser_id: String,
	pub creator_id:    String,
	pub amount:        f64,
	#[serde(default)]
	pub donor_name:    String,
	pub donor_phone:   String,
	#[serde(default)]
	pub message:       Option<String>,
	#[serde(default = "visible_by_default")]
	pub is_public:     bool,
}

impl From<DonationRequest> for CreateDonationCommand {
	fn from(req: DonationRequest) -> Self {
		Self {
			fundraiser_id: req.fundraiser_id,
			creator_id:    req.creator_id,
			amount:        req.amount,
			donor_name:    req.donor_name,
			donor_phone:   req.donor_phone,
			message:       req.message,
			is_public:     req.is_public,
		}
	}
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
	pub intent:       PaymentIntent,
	pub checkout_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NavigationEvent {
	pub url: String,
}

/// `close` tells the client to dismiss the embedded browser.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationResponse {
	pub close:      bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deposit_id: Option<Uuid>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tracking:   Option<bool>,
}

impl NavigationResponse {
	pub fn keep_open() -> Self {
		Self {
			close:      false,
			deposit_id: None,
			tracking:   None,
		}
	}
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationStarted {
	pub deposit_id: Uuid,
	pub started:    bool,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResponse {
	pub deposit_id:   Uuid,
	pub confirmation: ConfirmationState,
}
