use actix_web::web::Bytes;
use actix_web::{HttpResponse, get, web};
use futures::StreamExt;
use log::{info, warn};

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::services::QueryIntents;
use crate::domain::repository::IntentChange;

/// One server-sent event per change, `event: <status>` then the JSON body.
pub fn sse_event(change: &IntentChange) -> Option<Bytes> {
	match serde_json::to_string(change) {
		Ok(data) => Some(Bytes::from(format!(
			"event: {}\ndata: {data}\n\n",
			change.status
		))),
		Err(e) => {
			warn!("Skipping change of intent {}: {e}", change.intent_id);
			None
		}
	}
}

#[get("/intents/changes")]
pub async fn intent_changes(
	query_intents: web::Data<QueryIntents>,
) -> Result<HttpResponse, ApiError> {
	let changes = query_intents.changes().await?;
	info!("Change feed subscriber connected");

	let events = changes.filter_map(|change| async move {
		sse_event(&change).map(Ok::<Bytes, actix_web::Error>)
	});

	Ok(HttpResponse::Ok()
		.content_type("text/event-stream")
		.insert_header(("Cache-Control", "no-cache"))
		.streaming(events))
}
