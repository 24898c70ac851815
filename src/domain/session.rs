pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// Identity of the caller, resolved by the auth provider and passed explicitly
/// to every operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub user_id:      Option<String>,
	pub display_name: String,
}

impl Session {
	pub fn anonymous() -> Self {
		Self {
			user_id:      None,
			display_name: ANONYMOUS_DISPLAY_NAME.to_string(),
		}
	}

	pub fn signed_in(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
		Self {
			user_id:      Some(user_id.into()),
			display_name: display_name.into(),
		}
	}
}

impl Default for Session {
	fn default() -> Self {
		Self::anonymous()
	}
}
