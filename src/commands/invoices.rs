use tracing::info;
use uuid::Uuid;

use crate::error::{InvoiceError, Result};
use crate::models::{Invoice, LineItem, NewInvoice};
use crate::services::lifecycle;
use crate::services::mailer::MailSender;
use crate::services::payments::PaymentProcessor;
use crate::store::InvoiceStore;
use crate::utils::Clock;

/// Creates an invoice from the form input and links it as the customer's
/// most recent invoice.
pub fn create_invoice(store: &mut dyn InvoiceStore, new: NewInvoice) -> Result<Invoice> {
    let invoice = Invoice::create(Uuid::new_v4(), new)?;
    store.insert_invoice(invoice.clone())?;

    if let Some(mut customer) = store.customer(invoice.customer_id)? {
        customer.last_invoice_id = Some(invoice.id);
        store.upsert_customer(&customer)?;
    }

    info!(invoice = %invoice.number, "invoice created");
    Ok(invoice)
}

pub fn get_invoice(store: &dyn InvoiceStore, id: Uuid) -> Result<Invoice> {
    store.invoice(id)?.ok_or(InvoiceError::NotFound(id))
}

/// Edit flow for a pending invoice.
pub fn update_invoice(
    store: &mut dyn InvoiceStore,
    id: Uuid,
    line_items: Vec<LineItem>,
    tax_rate: Option<f64>,
) -> Result<Invoice> {
    let mut invoice = get_invoice(store, id)?;
    lifecycle::update_pending(&mut invoice, line_items, tax_rate)?;
    store.update_invoice(&invoice)?;
    Ok(invoice)
}

/// Applies the external payment confirmation.
pub fn mark_invoice_paid(
    store: &mut dyn InvoiceStore,
    id: Uuid,
    payment_reference: Option<String>,
) -> Result<Invoice> {
    let mut invoice = get_invoice(store, id)?;
    lifecycle::mark_paid(&mut invoice, payment_reference)?;
    store.update_invoice(&invoice)?;
    Ok(invoice)
}

/// Refund flow: the processor is charged first; the store only sees the
/// new state after the charge succeeded.
pub async fn refund_invoice(
    store: &mut dyn InvoiceStore,
    processor: &dyn PaymentProcessor,
    clock: &dyn Clock,
    id: Uuid,
    amount: i64,
) -> Result<Invoice> {
    let mut invoice = get_invoice(store, id)?;
    lifecycle::issue_refund(&mut invoice, amount, clock.now(), processor).await?;
    store.update_invoice(&invoice)?;
    Ok(invoice)
}

/// Sends the invoice to the given address. Pure side effect; invoice state
/// is never touched.
pub async fn email_invoice(
    store: &dyn InvoiceStore,
    mailer: &dyn MailSender,
    id: Uuid,
    to: &str,
) -> Result<()> {
    let invoice = get_invoice(store, id)?;
    mailer
        .send_invoice_email(invoice.id, to)
        .await
        .map_err(InvoiceError::CollaboratorFailure)?;
    info!(invoice = %invoice.number, to, "invoice emailed");
    Ok(())
}

/// Irreversible delete, allowed from any status.
pub fn delete_invoice(store: &mut dyn InvoiceStore, id: Uuid) -> Result<()> {
    let invoice = get_invoice(store, id)?;
    store.delete_invoice(id)?;
    info!(invoice = %invoice.number, "invoice deleted");
    Ok(())
}
