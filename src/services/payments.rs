use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Payment-processor boundary. Moves refunded funds back to the customer;
/// the lifecycle engine records a refund only after this call has succeeded.
/// Retry and backoff live behind this trait, not in the core.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge_refund(&self, invoice_id: Uuid, amount: i64) -> Result<()>;
}
