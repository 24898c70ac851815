use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::CheckoutError;

/// Read side of the external payment worker.
#[async_trait]
pub trait DepositStatusGateway: Send + Sync + 'static {
	/// Raw status string the worker currently reports for the deposit.
	async fn fetch_status(&self, deposit_id: Uuid) -> Result<String, CheckoutError>;
}
