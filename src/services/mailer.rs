use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Outbound mail boundary. Sending an invoice is purely a side effect and
/// never touches invoice state.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_invoice_email(&self, invoice_id: Uuid, to: &str) -> Result<()>;
}
