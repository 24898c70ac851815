//! Concrete service types shared through `web::Data`.

use crate::infrastructure::gateway::http_deposit_status_gateway::HttpDepositStatusGateway;
use crate::infrastructure::persistence::redis_counter_repository::RedisCounterRepository;
use crate::infrastructure::persistence::redis_payment_intent_repository::RedisPaymentIntentRepository;
use crate::use_cases::confirm_payment::ConfirmPaymentUseCase;
use crate::use_cases::create_payment_intent::CreatePaymentIntentUseCase;
use crate::use_cases::query_intents::QueryIntentsUseCase;

pub type CreateIntents = CreatePaymentIntentUseCase<RedisPaymentIntentRepository>;

pub type ConfirmPayments =
	ConfirmPaymentUseCase<RedisPaymentIntentRepository, HttpDepositStatusGateway>;

pub type QueryIntents =
	QueryIntentsUseCase<RedisPaymentIntentRepository, RedisCounterRepository>;
