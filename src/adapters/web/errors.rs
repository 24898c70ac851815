use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, error};
use derive_more::derive::{Display, Error};
use serde::Serialize;

use crate::domain::errors::CheckoutError;

#[derive(Serialize)]
struct ErrorResponse {
	#[serde(rename = "statusCode")]
	status_code: u16,
	error:       String,
	message:     String,
}

#[derive(Debug, Display, Error)]
pub enum ApiError {
	#[display("Request data is invalid: {reason}")]
	BadClientDataError { reason: String },
	#[display("{resource} was not found.")]
	NotFoundError { resource: String },
	#[display("Payment worker is unavailable.")]
	WorkerUnavailableError,
	#[display("Could not perform this operation.")]
	TransactionError,
	#[display("Could not connect to the database.")]
	DatabaseConnectionError,
	#[display("Internal server error.")]
	InternalServerError,
}

impl ApiError {
	pub fn name(&self) -> String {
		match self {
			ApiError::BadClientDataError { .. } => "Bad request".to_string(),
			ApiError::NotFoundError { .. } => "Not Found".to_string(),
			ApiError::WorkerUnavailableError => "Bad Gateway".to_string(),
			ApiError::TransactionError => "Conflict".to_string(),
			ApiError::DatabaseConnectionError => "Insufficient Storage".to_string(),
			ApiError::InternalServerError => "Internal Server Error".to_string(),
		}
	}
}

impl error::ResponseError for ApiError {
	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code())
			.content_type(ContentType::json())
			.json(ErrorResponse {
				status_code: self.status_code().as_u16(),
				error:       self.to_string(),
				message:     self.name(),
			})
	}

	fn status_code(&self) -> StatusCode {
		match self {
			ApiError::BadClientDataError { .. } => StatusCode::BAD_REQUEST,
			ApiError::NotFoundError { .. } => StatusCode::NOT_FOUND,
			ApiError::WorkerUnavailableError => StatusCode::BAD_GATEWAY,
			ApiError::TransactionError => StatusCode::CONFLICT,
			ApiError::DatabaseConnectionError => StatusCode::INSUFFICIENT_STORAGE,
			ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<CheckoutError> for ApiError {
	fn from(err: CheckoutError) -> Self {
		match err {
			CheckoutError::Validation { reason } => {
				ApiError::BadClientDataError { reason }
			}
			CheckoutError::NotFound { collection, id } => ApiError::NotFoundError {
				resource: format!("{collection} {id}"),
			},
			CheckoutError::Transport { .. } => ApiError::WorkerUnavailableError,
			CheckoutError::PaymentDeclined { .. } |
			CheckoutError::SettlementConflict { .. } => ApiError::TransactionError,
			CheckoutError::Storage { .. } => ApiError::DatabaseConnectionError,
			CheckoutError::MalformedRecord { .. } => ApiError::InternalServerError,
		}
	}
}
