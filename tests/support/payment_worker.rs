use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpResponse, HttpServer, web};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Default)]
struct WorkerState {
	statuses: Mutex<HashMap<Uuid, VecDeque<String>>>,
	calls:    AtomicU32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusQuery {
	deposit_id: Uuid,
}

/// Answers with the scripted statuses in order, repeating the last one.
/// Unknown deposits get a 404.
async fn deposit_status(
	query: web::Query<StatusQuery>,
	state: web::Data<WorkerState>,
) -> HttpResponse {
	state.calls.fetch_add(1, Ordering::SeqCst);
	let mut statuses = state.statuses.lock().unwrap();
	let Some(script) = statuses.get_mut(&query.deposit_id) else {
		return HttpResponse::NotFound().finish();
	};
	let status = if script.len() > 1 {
		script.pop_front()
	} else {
		script.front().cloned()
	};
	match status {
		Some(status) => HttpResponse::Ok().json(json!({ "status": status })),
		None => HttpResponse::NotFound().finish(),
	}
}

/// Stand-in for the external payment worker, served on an ephemeral port.
pub struct FakePaymentWorker {
	pub url: String,
	state:   web::Data<WorkerState>,
	handle:  ServerHandle,
}

impl FakePaymentWorker {
	pub async fn start() -> Self {
		let state = web::Data::new(WorkerState::default());
		let app_state = state.clone();
		let server = HttpServer::new(move || {
			App::new()
				.app_data(app_state.clone())
				.route("/deposit-status", web::get().to(deposit_status))
		})
		.workers(1)
		.bind(("127.0.0.1", 0))
		.expect("Failed to bind fake worker");
		let port = server.addrs()[0].port();
		let server = server.run();
		let handle = server.handle();
		tokio::spawn(server);

		Self {
			url: format!("http://127.0.0.1:{port}"),
			state,
			handle,
		}
	}

	pub fn script(&self, deposit_id: Uuid, statuses: &[&str]) {
		self.state.statuses.lock().unwrap().insert(
			deposit_id,
			statuses.iter().map(|s| s.to_string()).collect(),
		);
	}

	pub fn calls(&self) -> u32 {
		self.state.calls.load(Ordering::SeqCst)
	}

	pub async fn stop(&self) {
		self.handle.stop(false).await;
	}
}
