use actix_web::{HttpResponse, get, web};

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::services::QueryIntents;
use crate::domain::payment_intent::IntentKind;

#[get("/courses/{course_id}/counters")]
pub async fn course_counters(
	path: web::Path<String>,
	query_intents: web::Data<QueryIntents>,
) -> Result<HttpResponse, ApiError> {
	let counters = query_intents
		.subject_counters(IntentKind::Purchase, &path)
		.await?;
	Ok(HttpResponse::Ok().json(counters))
}

#[get("/fundraisers/{fundraiser_id}/counters")]
pub async fn fundraiser_counters(
	path: web::Path<String>,
	query_intents: web::Data<QueryIntents>,
) -> Result<HttpResponse, ApiError> {
	let counters = query_intents
		.subject_counters(IntentKind::Donation, &path)
		.await?;
	Ok(HttpResponse::Ok().json(counters))
}

#[get("/creators/{creator_id}/stats")]
pub async fn creator_stats(
	path: web::Path<String>,
	query_intents: web::Data<QueryIntents>,
) -> Result<HttpResponse, ApiError> {
	let stats = query_intents.creator_stats(&path).await?;
	Ok(HttpResponse::Ok().json(stats))
}
