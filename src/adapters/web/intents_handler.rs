use actix_web::{HttpResponse, get, post, web};
use log::warn;
use uuid::Uuid;

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::schema::{CheckoutResponse, DonationRequest, PurchaseRequest};
use crate::adapters::web::services::{CreateIntents, QueryIntents};
use crate::domain::payment_intent::PaymentIntent;
use crate::domain::session::Session;
use crate::use_cases::checkout_redirect::CheckoutRedirector;

fn checkout(
	redirector: &CheckoutRedirector,
	intent: PaymentIntent,
) -> Result<HttpResponse, ApiError> {
	let checkout_url = redirector.checkout_url(&intent)?.to_string();
	Ok(HttpResponse::Created().json(CheckoutResponse {
		intent,
		checkout_url,
	}))
}

#[post("/purchases")]
pub async fn create_purchase(
	session: Session,
	payload: web::Json<PurchaseRequest>,
	create_intents: web::Data<CreateIntents>,
	redirector: web::Data<CheckoutRedirector>,
) -> Result<HttpResponse, ApiError> {
	let intent = create_intents
		.create_purchase(&session, payload.into_inner().into())
		.await
		.inspect_err(|e| warn!("Purchase rejected: {e}"))?;
	checkout(&redirector, intent)
}

#[post("/donations")]
pub async fn create_donation(
	session: Session,
	payload: web::Json<DonationRequest>,
	create_intents: web::Data<CreateIntents>,
	redirector: web::Data<CheckoutRedirector>,
) -> Result<HttpResponse, ApiError> {
	let intent = create_intents
		.create_donation(&session, payload.into_inner().into())
		.await
		.inspect_err(|e| warn!("Donation rejected: {e}"))?;
	checkout(&redirector, intent)
}

#[get("/intents/{deposit_id}")]
pub async fn get_intent(
	path: web::Path<Uuid>,
	query_intents: web::Data<QueryIntents>,
) -> Result<HttpResponse, ApiError> {
	let intent = query_intents.by_deposit_id(path.into_inner()).await?;
	Ok(HttpResponse::Ok().json(intent))
}

#[get("/courses/{course_id}/purchases")]
pub async fn course_purchases(
	path: web::Path<String>,
	query_intents: web::Data<QueryIntents>,
) -> Result<HttpResponse, ApiError> {
	let purchases = query_intents.purchases_of_course(&path).await?;
	Ok(HttpResponse::Ok().json(purchases))
}

#[get("/fundraisers/{fundraiser_id}/donations")]
pub async fn fundraiser_donations(
	path: web::Path<String>,
	query_intents: web::Data<QueryIntents>,
) -> Result<HttpResponse, ApiError> {
	let donations = query_intents.public_donations_of(&path).await?;
	Ok(HttpResponse::Ok().json(donations))
}
