use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use log::info;

pub mod domain {
	pub mod counters;
	pub mod deposit_status;
	pub mod errors;
	pub mod gateway;
	pub mod payment_intent;
	pub mod repository;
	pub mod session;
}

pub mod use_cases {
	pub mod checkout_redirect;
	pub mod confirm_payment;
	pub mod create_payment_intent;
	pub mod dto;
	pub mod intercept_redirect;
	pub mod poll_deposit_status;
	pub mod query_intents;
	pub mod settle_payment;
}

pub mod infrastructure {
	pub mod config {
		pub mod redis;
		pub mod settings;
	}
	pub mod gateway {
		pub mod http_deposit_status_gateway;
	}
	pub mod persistence {
		pub mod document;
		pub mod in_memory_document_store;
		pub mod redis_counter_repository;
		pub mod redis_payment_intent_repository;
	}
}

pub mod adapters {
	pub mod web {
		pub mod changes_handler;
		pub mod confirmations_handler;
		pub mod errors;
		pub mod intents_handler;
		pub mod navigation_handler;
		pub mod schema;
		pub mod services;
		pub mod session;
		pub mod stats_handler;
	}
}

use crate::adapters::web::{
	changes_handler, confirmations_handler, intents_handler, navigation_handler,
	stats_handler,
};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::gateway::http_deposit_status_gateway::HttpDepositStatusGateway;
use crate::infrastructure::persistence::redis_counter_repository::RedisCounterRepository;
use crate::infrastructure::persistence::redis_payment_intent_repository::RedisPaymentIntentRepository;
use crate::use_cases::checkout_redirect::CheckoutRedirector;
use crate::use_cases::confirm_payment::ConfirmPaymentUseCase;
use crate::use_cases::create_payment_intent::CreatePaymentIntentUseCase;
use crate::use_cases::intercept_redirect::RedirectInterceptor;
use crate::use_cases::poll_deposit_status::StatusPoller;
use crate::use_cases::query_intents::QueryIntentsUseCase;
use crate::use_cases::settle_payment::SettlementCommitter;

/// Every route of the service. `/intents/changes` is registered before
/// `/intents/{deposit_id}` so the feed is not parsed as a deposit id.
pub fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(intents_handler::create_purchase)
		.service(intents_handler::create_donation)
		.service(changes_handler::intent_changes)
		.service(intents_handler::get_intent)
		.service(intents_handler::course_purchases)
		.service(intents_handler::fundraiser_donations)
		.service(navigation_handler::navigation)
		.service(confirmations_handler::start_confirmation)
		.service(confirmations_handler::confirmation_state)
		.service(stats_handler::course_counters)
		.service(stats_handler::fundraiser_counters)
		.service(stats_handler::creator_stats);
}

pub async fn run(config: Arc<Config>) -> std::io::Result<()> {
	let _ = env_logger::try_init();

	let redis_client =
		redis::Client::open(config.redis_url.as_str()).map_err(std::io::Error::other)?;
	let http_client = reqwest::Client::builder()
		.timeout(config.status_timeout())
		.build()
		.map_err(std::io::Error::other)?;

	let intent_repo = RedisPaymentIntentRepository::new(redis_client.clone());
	let counter_repo = RedisCounterRepository::new(redis_client);
	let gateway = HttpDepositStatusGateway::new(http_client, config.worker_url.clone());

	let create_intents =
		CreatePaymentIntentUseCase::new(intent_repo.clone(), config.intent_settings());
	let confirm_payments = ConfirmPaymentUseCase::new(
		intent_repo.clone(),
		StatusPoller::new(gateway, config.retry_policy()),
		SettlementCommitter::new(intent_repo.clone(), config.fee_policy()),
		config.settlement_attempts,
	)
	.with_retention(config.confirmation_retention());
	let query_intents = QueryIntentsUseCase::new(intent_repo, counter_repo);
	let redirector = CheckoutRedirector::new(config.worker_url.clone());
	let interceptor = RedirectInterceptor::new(&config.worker_url);

	info!(
		"Starting Actix-Web server on 0.0.0.0:{} for worker {}...",
		config.server_port, config.worker_url
	);
	HttpServer::new(move || {
		App::new()
			.app_data(web::Data::new(create_intents.clone()))
			.app_data(web::Data::new(confirm_payments.clone()))
			.app_data(web::Data::new(query_intents.clone()))
			.app_data(web::Data::new(redirector.clone()))
			.app_data(web::Data::new(interceptor.clone()))
			.configure(routes)
	})
	.keep_alive(Duration::from_secs(config.server_keepalive))
	.bind(("0.0.0.0", config.server_port))?
	.run()
	.await
}
