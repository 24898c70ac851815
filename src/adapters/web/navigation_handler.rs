use actix_web::{HttpResponse, post, web};
use log::{info, warn};

use crate::adapters::web::schema::{NavigationEvent, NavigationResponse};
use crate::adapters::web::services::ConfirmPayments;
use crate::use_cases::intercept_redirect::RedirectInterceptor;

/// Receives every navigation of the embedded checkout browser. A return
/// navigation closes the browser and starts confirming the deposit; repeats
/// of the same return url only report the deposit as tracked.
#[post("/navigation")]
pub async fn navigation(
	payload: web::Json<NavigationEvent>,
	interceptor: web::Data<RedirectInterceptor>,
	confirm_payments: web::Data<ConfirmPayments>,
) -> HttpResponse {
	let Some(signal) = interceptor.inspect(&payload.url) else {
		return HttpResponse::Ok().json(NavigationResponse::keep_open());
	};

	if let Some(reported) = signal.reported_status() {
		info!(
			"Checkout for deposit {} returned reporting {reported:?}",
			signal.deposit_id
		);
	}

	let tracking = match confirm_payments.start(signal.deposit_id).await {
		Ok(_) => true,
		Err(e) => {
			warn!("Could not confirm deposit {}: {e}", signal.deposit_id);
			false
		}
	};

	HttpResponse::Ok().json(NavigationResponse {
		close:      true,
		deposit_id: Some(signal.deposit_id),
		tracking:   Some(tracking),
	})
}
