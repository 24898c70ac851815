use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use futures::future::{Ready, ready};

use crate::domain::session::{ANONYMOUS_DISPLAY_NAME, Session};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get(name)
		.and_then(|v| v.to_str().ok())
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.map(str::to_string)
}

/// Identity forwarded by the auth proxy in front of the service.
pub fn session_from_headers(headers: &HeaderMap) -> Session {
	match header(headers, USER_ID_HEADER) {
		Some(user_id) => Session::signed_in(
			user_id,
			header(headers, USER_NAME_HEADER)
				.unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_string()),
		),
		None => Session::anonymous(),
	}
}

impl FromRequest for Session {
	type Error = actix_web::Error;
	type Future = Ready<Result<Self, Self::Error>>;

	fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
		ready(Ok(session_from_headers(req.headers())))
	}
}

#[cfg(test)]
mod tests {
	use actix_web::test::TestRequest;

	use super::*;

	#[test]
	fn test_signed_in_session_from_headers() {
		let req = TestRequest::default()
			.insert_header((USER_ID_HEADER, "user-1"))
			.insert_header((USER_NAME_HEADER, "Amani"))
			.to_http_request();

		assert_eq!(
			session_from_headers(req.headers()),
			Session::signed_in("user-1", "Amani")
		);
	}

	#[test]
	fn test_missing_or_blank_user_is_anonymous() {
		let req = TestRequest::default()
			.insert_header((USER_ID_HEADER, "  "))
			.insert_header((USER_NAME_HEADER, "Amani"))
			.to_http_request();

		assert_eq!(session_from_headers(req.headers()), Session::anonymous());
	}

	#[test]
	fn test_signed_in_without_name_uses_default_name() {
		let req = TestRequest::default()
			.insert_header((USER_ID_HEADER, "user-2"))
			.to_http_request();

		assert_eq!(
			session_from_headers(req.headers()).display_name,
			ANONYMOUS_DISPLAY_NAME
		);
	}
}
