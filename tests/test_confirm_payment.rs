use std::time::Duration;

use deposit_checkout::domain::counters::{CreatorStats, SubjectCounters};
use deposit_checkout::domain::errors::CheckoutError;
use deposit_checkout::domain::payment_intent::{IntentKind, PaymentIntent, PaymentStatus};
use deposit_checkout::domain::repository::{CounterRepository, PaymentIntentRepository};
use deposit_checkout::domain::session::Session;
use deposit_checkout::infrastructure::gateway::http_deposit_status_gateway::HttpDepositStatusGateway;
use deposit_checkout::infrastructure::persistence::in_memory_document_store::InMemoryDocumentStore;
use deposit_checkout::use_cases::confirm_payment::{
	ConfirmPaymentUseCase, ConfirmationState,
};
use deposit_checkout::use_cases::create_payment_intent::CreatePaymentIntentUseCase;
use deposit_checkout::use_cases::dto::{
	CreateDonationCommand, CreatePurchaseCommand, IntentSettings,
};
use deposit_checkout::use_cases::poll_deposit_status::{RetryPolicy, StatusPoller};
use deposit_checkout::use_cases::settle_payment::{FeePolicy, SettlementCommitter};
use reqwest::Client;
use uuid::Uuid;

mod support;

use crate::support::payment_worker::FakePaymentWorker;

type Confirmations = ConfirmPaymentUseCase<InMemoryDocumentStore, HttpDepositStatusGateway>;

fn confirmations(
	store: &InMemoryDocumentStore,
	worker: &FakePaymentWorker,
	max_attempts: u32,
) -> Confirmations {
	let http_client = Client::builder()
		.timeout(Duration::from_secs(1))
		.build()
		.unwrap();
	let gateway = HttpDepositStatusGateway::new(http_client, worker.url.clone());
	ConfirmPaymentUseCase::new(
		store.clone(),
		StatusPoller::new(
			gateway,
			RetryPolicy::new(max_attempts, Duration::from_millis(20)),
		),
		SettlementCommitter::new(store.clone(), FeePolicy::default()),
		3,
	)
}

async fn purchase(store: &InMemoryDocumentStore, amount: f64) -> PaymentIntent {
	CreatePaymentIntentUseCase::new(store.clone(), IntentSettings::default())
		.create_purchase(
			&Session::signed_in("student-1", "Amani"),
			CreatePurchaseCommand {
				course_id: "course-1".to_string(),
				course_name: "Rust for payments".to_string(),
				creator_id: "creator-1".to_string(),
				amount,
				payer_name: String::new(),
				payer_phone: "0990000001".to_string(),
			},
		)
		.await
		.unwrap()
}

#[tokio::test]
async fn test_successful_deposit_is_settled_once() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let confirm = confirmations(&store, &worker, 5);
	let intent = purchase(&store, 1000.0).await;
	worker.script(intent.deposit_id, &["PROCESSING", "SUCCESSFUL"]);

	let handle = confirm.start(intent.deposit_id).await.unwrap().unwrap();
	let state = handle.await.unwrap();

	assert_eq!(state, ConfirmationState::Settled { earnings: 800.0 });
	assert_eq!(confirm.state(intent.deposit_id).await, Some(state));

	let stored = store.find_by_deposit_id(intent.deposit_id).await.unwrap().unwrap();
	assert_eq!(stored.status, PaymentStatus::Success);
	assert_eq!(
		store
			.subject_counters(IntentKind::Purchase, "course-1")
			.await
			.unwrap(),
		SubjectCounters {
			total_purchases: 1,
			..SubjectCounters::default()
		}
	);
	assert_eq!(store.creator_stats("creator-1").await.unwrap(), CreatorStats {
		total_earnings: 800.0,
		total_students: 1,
	});
	worker.stop().await;
}

#[tokio::test]
async fn test_second_start_is_a_no_op() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let confirm = confirmations(&store, &worker, 5);
	let intent = purchase(&store, 1000.0).await;
	worker.script(intent.deposit_id, &["PENDING", "PENDING", "SUCCESS"]);

	let first = confirm.start(intent.deposit_id).await.unwrap();
	let second = confirm.start(intent.deposit_id).await.unwrap();

	assert!(first.is_some());
	assert!(second.is_none());
	first.unwrap().await.unwrap();

	assert!(confirm.start(intent.deposit_id).await.unwrap().is_none());
	assert_eq!(
		store.creator_stats("creator-1").await.unwrap().total_earnings,
		800.0
	);
	worker.stop().await;
}

#[tokio::test]
async fn test_failure_alias_writes_failed_without_settlement() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let confirm = confirmations(&store, &worker, 5);
	let intent = purchase(&store, 1000.0).await;
	worker.script(intent.deposit_id, &[" cancelled "]);

	let state = confirm
		.start(intent.deposit_id)
		.await
		.unwrap()
		.unwrap()
		.await
		.unwrap();

	assert_eq!(state, ConfirmationState::Declined {
		status: "CANCELLED".to_string(),
	});
	let stored = store.find_by_deposit_id(intent.deposit_id).await.unwrap().unwrap();
	assert_eq!(stored.status, PaymentStatus::Failed);
	assert_eq!(
		store.creator_stats("creator-1").await.unwrap(),
		CreatorStats::default()
	);
	worker.stop().await;
}

#[tokio::test]
async fn test_timeout_leaves_intent_pending() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let confirm = confirmations(&store, &worker, 3);
	let intent = purchase(&store, 1000.0).await;
	worker.script(intent.deposit_id, &["PROCESSING"]);

	let state = confirm
		.start(intent.deposit_id)
		.await
		.unwrap()
		.unwrap()
		.await
		.unwrap();

	assert_eq!(state, ConfirmationState::TimedOut);
	assert_eq!(worker.calls(), 3);
	let stored = store.find_by_deposit_id(intent.deposit_id).await.unwrap().unwrap();
	assert_eq!(stored.status, PaymentStatus::Pending);
	worker.stop().await;
}

#[tokio::test]
async fn test_unreachable_status_is_retried_until_timeout() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let confirm = confirmations(&store, &worker, 2);
	let intent = purchase(&store, 1000.0).await;

	let state = confirm
		.start(intent.deposit_id)
		.await
		.unwrap()
		.unwrap()
		.await
		.unwrap();

	assert_eq!(state, ConfirmationState::TimedOut);
	worker.stop().await;
}

#[tokio::test]
async fn test_unknown_deposit_is_not_tracked() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let confirm = confirmations(&store, &worker, 2);
	let deposit_id = Uuid::new_v4();

	let result = confirm.start(deposit_id).await;

	assert!(matches!(result, Err(CheckoutError::NotFound { .. })));
	assert_eq!(confirm.state(deposit_id).await, None);
	worker.stop().await;
}

#[tokio::test]
async fn test_settled_intent_is_not_polled_again() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let intent = purchase(&store, 1000.0).await;
	worker.script(intent.deposit_id, &["SUCCESSFUL"]);
	confirmations(&store, &worker, 2)
		.start(intent.deposit_id)
		.await
		.unwrap()
		.unwrap()
		.await
		.unwrap();
	let calls = worker.calls();

	// A fresh registry, as after a restart.
	let state = confirmations(&store, &worker, 2)
		.start(intent.deposit_id)
		.await
		.unwrap()
		.unwrap()
		.await
		.unwrap();

	assert_eq!(state, ConfirmationState::AlreadySettled);
	assert_eq!(worker.calls(), calls);
	worker.stop().await;
}

#[tokio::test]
async fn test_donation_raises_fundraiser_and_credits_net_amount() {
	let worker = FakePaymentWorker::start().await;
	let store = InMemoryDocumentStore::new();
	let confirm = confirmations(&store, &worker, 3);
	let donation = CreatePaymentIntentUseCase::new(store.clone(), IntentSettings::default())
		.create_donation(&Session::anonymous(), CreateDonationCommand {
			fundraiser_id: "fund-1".to_string(),
			creator_id:    "creator-2".to_string(),
			amount:        2000.0,
			donor_name:    String::new(),
			donor_phone:   "0990000002".to_string(),
			message:       None,
			is_public:     true,
		})
		.await
		.unwrap();
	worker.script(donation.deposit_id, &["success"]);

	let state = confirm
		.start(donation.deposit_id)
		.await
		.unwrap()
		.unwrap()
		.await
		.unwrap();

	assert_eq!(state, ConfirmationState::Settled { earnings: 1900.0 });
	assert_eq!(
		store
			.subject_counters(IntentKind::Donation, "fund-1")
			.await
			.unwrap()
			.raised,
		2000.0
	);
	assert_eq!(
		store.creator_stats("creator-2").await.unwrap().total_earnings,
		1900.0
	);
	worker.stop().await;
}
