use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use circuitbreaker_rs::{BreakerError, CircuitBreaker, DefaultPolicy};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::CheckoutError;
use crate::domain::gateway::DepositStatusGateway;

const BREAKER_FAILURE_THRESHOLD: f64 = 0.5;
const BREAKER_COOLDOWN: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct StatusQueryError(pub String);

impl fmt::Display for StatusQueryError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Status query error: {}", self.0)
	}
}

impl Error for StatusQueryError {}

/// Queries `GET {worker}/deposit-status?depositId=` behind a circuit breaker.
#[derive(Clone)]
pub struct HttpDepositStatusGateway {
	http_client: Client,
	worker_url:  String,
	breaker:     CircuitBreaker<DefaultPolicy, StatusQueryError>,
}

impl HttpDepositStatusGateway {
	pub fn new(http_client: Client, worker_url: impl Into<String>) -> Self {
		Self {
			http_client,
			worker_url: worker_url.into().trim_end_matches('/').to_string(),
			breaker: CircuitBreaker::<DefaultPolicy, StatusQueryError>::builder()
				.failure_threshold(BREAKER_FAILURE_THRESHOLD)
				.cooldown(BREAKER_COOLDOWN)
				.build(),
		}
	}

	async fn query(&self, deposit_id: Uuid) -> Result<String, StatusQueryError> {
		let resp = self
			.http_client
			.get(format!("{}/deposit-status", self.worker_url))
			.query(&[("depositId", deposit_id.to_string())])
			.send()
			.await
			.map_err(|e| StatusQueryError(e.to_string()))?;

		if !resp.status().is_success() {
			return Err(StatusQueryError(format!(
				"worker answered {} for deposit {deposit_id}",
				resp.status()
			)));
		}

		let body: Value = resp
			.json()
			.await
			.map_err(|e| StatusQueryError(e.to_string()))?;

		match body.get("status") {
			Some(Value::String(status)) => Ok(status.clone()),
			Some(other) => Err(StatusQueryError(format!(
				"unexpected status value {other} for deposit {deposit_id}"
			))),
			None => Err(StatusQueryError(format!(
				"no status reported for deposit {deposit_id}"
			))),
		}
	}
}

#[async_trait]
impl DepositStatusGateway for HttpDepositStatusGateway {
	async fn fetch_status(&self, deposit_id: Uuid) -> Result<String, CheckoutError> {
		let result: Result<String, BreakerError<StatusQueryError>> = self
			.breaker
			.call_async(|| async { self.query(deposit_id).await })
			.await;

		match result {
			Ok(status) => {
				debug!("Worker reports {status} for deposit {deposit_id}");
				Ok(status)
			}
			Err(BreakerError::Open) => Err(CheckoutError::Transport {
				reason: "circuit open towards the payment worker".to_string(),
			}),
			Err(BreakerError::Operation(e)) => {
				warn!("Status query for deposit {deposit_id} failed: {e}");
				Err(CheckoutError::Transport {
					reason: e.to_string(),
				})
			}
			Err(e) => Err(CheckoutError::Transport {
				reason: e.to_string(),
			}),
		}
	}
}
