use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CreatePurchaseCommand {
	pub course_id:   String,
	pub course_name: String,
	pub creator_id:  String,
	pub amount:      f64,
	pub payer_name:  String,
	pub payer_phone: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CreateDonationCommand {
	pub fundraiser_id: String,
	pub creator_id:    String,
	pub amount:        f64,
	pub donor_name:    String,
	pub donor_phone:   String,
	pub message:       Option<String>,
	pub is_public:     bool,
}

/// Deployment-wide rules applied when an intent is created.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IntentSettings {
	pub currency:     String,
	pub min_donation: f64,
	pub max_donation: f64,
}

impl Default for IntentSettings {
	fn default() -> Self {
		Self {
			currency:     "CDF".to_string(),
			min_donation: 500.0,
			max_donation: 500_000.0,
		}
	}
}
