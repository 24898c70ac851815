use actix_web::{HttpResponse, get, post, web};
use uuid::Uuid;

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::schema::{ConfirmationResponse, ConfirmationStarted};
use crate::adapters::web::services::ConfirmPayments;

#[post("/confirmations/{deposit_id}")]
pub async fn start_confirmation(
	path: web::Path<Uuid>,
	confirm_payments: web::Data<ConfirmPayments>,
) -> Result<HttpResponse, ApiError> {
	let deposit_id = path.into_inner();
	let started = confirm_payments.start(deposit_id).await?.is_some();
	Ok(HttpResponse::Accepted().json(ConfirmationStarted {
		deposit_id,
		started,
	}))
}

#[get("/confirmations/{deposit_id}")]
pub async fn confirmation_state(
	path: web::Path<Uuid>,
	confirm_payments: web::Data<ConfirmPayments>,
) -> Result<HttpResponse, ApiError> {
	let deposit_id = path.into_inner();
	let confirmation = confirm_payments.state(deposit_id).await.ok_or_else(|| {
		ApiError::NotFoundError {
			resource: format!("confirmation of deposit {deposit_id}"),
		}
	})?;
	Ok(HttpResponse::Ok().json(ConfirmationResponse {
		deposit_id,
		confirmation,
	}))
}
