use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{InvoiceError, Result};
use crate::models::{Invoice, InvoiceStatus, LineItem};
use crate::services::payments::PaymentProcessor;

/// Records the external payment confirmation. Only a pending invoice can
/// move to paid; the lifecycle never moves backwards.
pub fn mark_paid(invoice: &mut Invoice, payment_reference: Option<String>) -> Result<()> {
    if !invoice.status.is_pending() {
        return Err(InvoiceError::InvalidTransition {
            number: invoice.number.clone(),
            from: invoice.status.as_str(),
            event: "mark-paid",
        });
    }
    invoice.status = InvoiceStatus::Paid;
    invoice.payment_reference = payment_reference;
    info!(invoice = %invoice.number, "invoice marked paid");
    Ok(())
}

/// Edits the billable content of a pending invoice, recomputing subtotal,
/// tax and total. Any other status rejects without touching the invoice.
pub fn update_pending(
    invoice: &mut Invoice,
    line_items: Vec<LineItem>,
    tax_rate: Option<f64>,
) -> Result<()> {
    if !invoice.status.is_pending() {
        return Err(InvoiceError::NotEditable {
            number: invoice.number.clone(),
            status: invoice.status.as_str(),
        });
    }
    invoice.reprice(line_items, tax_rate)
}

/// Applies a refund of `amount` cents. Check-then-apply: the guard runs
/// before any mutation, the processor is charged next, and the invoice
/// state changes only after the charge succeeded. A failed charge leaves
/// the invoice exactly as it was.
pub async fn issue_refund(
    invoice: &mut Invoice,
    amount: i64,
    now: DateTime<Utc>,
    processor: &dyn PaymentProcessor,
) -> Result<()> {
    let already_refunded = match invoice.status {
        InvoiceStatus::Pending => {
            return Err(InvoiceError::InvalidTransition {
                number: invoice.number.clone(),
                from: "pending",
                event: "issue-refund",
            });
        }
        InvoiceStatus::Paid => 0,
        InvoiceStatus::PartiallyRefunded {
            refunded_amount, ..
        }
        | InvoiceStatus::Refunded {
            refunded_amount, ..
        } => refunded_amount,
    };

    let refundable = invoice.total - already_refunded;
    if amount <= 0 || amount > refundable {
        return Err(InvoiceError::InvalidRefundAmount {
            requested: amount,
            refundable,
        });
    }

    if let Err(err) = processor.charge_refund(invoice.id, amount).await {
        warn!(invoice = %invoice.number, amount, error = %err, "refund charge failed");
        return Err(InvoiceError::CollaboratorFailure(err));
    }

    let refunded_amount = already_refunded + amount;
    invoice.status = if refunded_amount == invoice.total {
        InvoiceStatus::Refunded {
            refunded_amount,
            refund_date: now,
        }
    } else {
        InvoiceStatus::PartiallyRefunded {
            refunded_amount,
            refund_date: now,
        }
    };
    info!(invoice = %invoice.number, amount, refunded_amount, "refund recorded");
    Ok(())
}
