use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InvoiceError, Result};

/// One billable entry on an invoice. The line total is always recomputed
/// from quantity and unit price, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    /// Unit price in cents.
    pub unit_price: i64,
}

impl LineItem {
    pub fn line_total(&self) -> i64 {
        i64::from(self.quantity) * self.unit_price
    }
}

/// Invoice lifecycle status. Refund bookkeeping only exists in the
/// refunded variants, so a pending or paid invoice cannot carry a stale
/// refund amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    PartiallyRefunded {
        /// Cumulative refunded amount in cents, strictly between 0 and total.
        refunded_amount: i64,
        refund_date: DateTime<Utc>,
    },
    Refunded {
        /// Equals the invoice total once fully refunded.
        refunded_amount: i64,
        refund_date: DateTime<Utc>,
    },
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::PartiallyRefunded { .. } => "partially_refunded",
            InvoiceStatus::Refunded { .. } => "refunded",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, InvoiceStatus::Pending)
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }

    /// True once payment has been captured, regardless of later refunds.
    /// Revenue statistics count settled invoices at full total.
    pub fn is_settled(&self) -> bool {
        !matches!(self, InvoiceStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    /// Display identifier, unique within the owning business.
    pub number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub line_items: Vec<LineItem>,
    /// Sum of line totals in cents. Must match the recomputed sum at all times.
    pub subtotal: i64,
    pub tax_rate: Option<f64>,
    /// Tax in cents, zero when tax is disabled.
    pub tax_amount: i64,
    /// Original billed amount in cents, fixed at issuance. Refunds reduce
    /// the net amount owed, never this field.
    pub total: i64,
    pub currency: String,
    #[serde(flatten)]
    pub status: InvoiceStatus,
    pub payment_reference: Option<String>,
    /// Issuance timestamp, the canonical date for period aggregation.
    pub date: DateTime<Utc>,
    /// Write-once base64 image payload.
    pub signature: Option<String>,
}

/// Input for the invoice creation flow.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvoice {
    pub number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub line_items: Vec<LineItem>,
    pub tax_rate: Option<f64>,
    pub currency: Option<String>,
    pub date: DateTime<Utc>,
}

impl Invoice {
    pub fn create(id: Uuid, new: NewInvoice) -> Result<Invoice> {
        let mut invoice = Invoice {
            id,
            number: new.number,
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            line_items: Vec::new(),
            subtotal: 0,
            tax_rate: None,
            tax_amount: 0,
            total: 0,
            currency: new.currency.unwrap_or_else(|| "EUR".to_string()),
            status: InvoiceStatus::Pending,
            payment_reference: None,
            date: new.date,
            signature: None,
        };
        invoice.reprice(new.line_items, new.tax_rate)?;
        Ok(invoice)
    }

    /// Replaces the billable content and recomputes subtotal, tax and total.
    /// Callers must guard the lifecycle state; this only validates the items.
    pub fn reprice(&mut self, line_items: Vec<LineItem>, tax_rate: Option<f64>) -> Result<()> {
        for item in &line_items {
            if item.description.trim().is_empty() {
                return Err(self.malformed("line item description is empty"));
            }
            if item.quantity == 0 {
                return Err(self.malformed("line item quantity must be positive"));
            }
            if item.unit_price < 0 {
                return Err(self.malformed("line item unit price is negative"));
            }
        }
        if let Some(rate) = tax_rate {
            if !(rate >= 0.0 && rate.is_finite()) {
                return Err(self.malformed("tax rate must be a non-negative number"));
            }
        }

        let subtotal: i64 = line_items.iter().map(LineItem::line_total).sum();
        self.line_items = line_items;
        self.subtotal = subtotal;
        self.tax_rate = tax_rate;
        self.tax_amount = tax_amount_for(subtotal, tax_rate);
        self.total = self.subtotal + self.tax_amount;
        Ok(())
    }

    /// Cumulative refunded amount in cents; zero unless refunded.
    pub fn refunded_amount(&self) -> i64 {
        match self.status {
            InvoiceStatus::PartiallyRefunded {
                refunded_amount, ..
            }
            | InvoiceStatus::Refunded {
                refunded_amount, ..
            } => refunded_amount,
            _ => 0,
        }
    }

    pub fn refund_date(&self) -> Option<DateTime<Utc>> {
        match self.status {
            InvoiceStatus::PartiallyRefunded { refund_date, .. }
            | InvoiceStatus::Refunded { refund_date, .. } => Some(refund_date),
            _ => None,
        }
    }

    /// Amount still eligible to be refunded.
    pub fn refundable_balance(&self) -> i64 {
        self.total - self.refunded_amount()
    }

    /// Attaches the signature image, base64-encoded. Write-once.
    pub fn set_signature(&mut self, image: &[u8]) -> Result<()> {
        if self.signature.is_some() {
            return Err(InvoiceError::SignatureAlreadySet(self.number.clone()));
        }
        self.signature = Some(general_purpose::STANDARD.encode(image));
        Ok(())
    }

    /// Re-checks the monetary and status invariants. Records handed in from
    /// the store boundary are validated with this before aggregation; a
    /// violation marks the record as corrupt rather than being patched over.
    pub fn validate(&self) -> Result<()> {
        for item in &self.line_items {
            if item.description.trim().is_empty() {
                return Err(self.malformed("line item description is empty"));
            }
            if item.quantity == 0 {
                return Err(self.malformed("line item quantity must be positive"));
            }
            if item.unit_price < 0 {
                return Err(self.malformed("line item unit price is negative"));
            }
        }

        let recomputed: i64 = self.line_items.iter().map(LineItem::line_total).sum();
        if self.subtotal != recomputed {
            return Err(self.malformed("subtotal does not match line items"));
        }
        if self.tax_amount < 0 {
            return Err(self.malformed("tax amount is negative"));
        }
        if self.total != self.subtotal + self.tax_amount {
            return Err(self.malformed("total does not equal subtotal plus tax"));
        }

        match self.status {
            InvoiceStatus::Pending | InvoiceStatus::Paid => Ok(()),
            InvoiceStatus::PartiallyRefunded {
                refunded_amount, ..
            } => {
                if refunded_amount <= 0 || refunded_amount >= self.total {
                    Err(self.malformed("partial refund amount out of range"))
                } else {
                    Ok(())
                }
            }
            InvoiceStatus::Refunded {
                refunded_amount, ..
            } => {
                if refunded_amount != self.total {
                    Err(self.malformed("refunded invoice must be refunded in full"))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn malformed(&self, reason: &str) -> InvoiceError {
        InvoiceError::Malformed {
            number: self.number.clone(),
            reason: reason.to_string(),
        }
    }
}

fn tax_amount_for(subtotal: i64, tax_rate: Option<f64>) -> i64 {
    match tax_rate {
        Some(rate) => (subtotal as f64 * rate).round() as i64,
        None => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Convenience link to the most recent invoice; re-derivable from the
    /// invoice collection.
    pub last_invoice_id: Option<Uuid>,
}

/// One row of an invoice list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub number: String,
    pub customer_name: String,
    pub date: DateTime<Utc>,
    pub total: i64,
    pub status: String,
}

impl From<&Invoice> for InvoiceSummary {
    fn from(invoice: &Invoice) -> Self {
        InvoiceSummary {
            id: invoice.id,
            number: invoice.number.clone(),
            customer_name: invoice.customer_name.clone(),
            date: invoice.date,
            total: invoice.total,
            status: invoice.status.as_str().to_string(),
        }
    }
}

/// Fleet-wide revenue figures, all in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesStatistics {
    pub monthly_total: i64,
    pub year_to_date_total: i64,
    pub pending_total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CustomerStatistics {
    pub total_paid: i64,
    pub total_pending: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Paid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceFilter {
    pub search_text: String,
    pub status_filter: StatusFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub monthly_total: i64,
    pub year_to_date_total: i64,
    pub pending_total: i64,
    pub recent_invoices: Vec<InvoiceSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub customer: Customer,
    pub invoices: Vec<InvoiceSummary>,
    pub total_paid: i64,
    pub total_pending: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn two_items() -> Vec<LineItem> {
        vec![
            LineItem {
                description: "Design work".to_string(),
                quantity: 2,
                unit_price: 5000,
            },
            LineItem {
                description: "Hosting".to_string(),
                quantity: 1,
                unit_price: 1500,
            },
        ]
    }

    fn new_invoice(line_items: Vec<LineItem>, tax_rate: Option<f64>) -> NewInvoice {
        NewInvoice {
            number: "INV-001".to_string(),
            customer_id: Uuid::new_v4(),
            customer_name: "Acme GmbH".to_string(),
            line_items,
            tax_rate,
            currency: None,
            date: test_date(),
        }
    }

    #[test]
    fn create_computes_subtotal_tax_and_total() {
        let invoice = Invoice::create(Uuid::new_v4(), new_invoice(two_items(), Some(0.2))).unwrap();
        assert_eq!(invoice.subtotal, 11500);
        assert_eq!(invoice.tax_amount, 2300);
        assert_eq!(invoice.total, 13800);
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.currency, "EUR");
        invoice.validate().unwrap();
    }

    #[test]
    fn create_without_tax_rate_has_zero_tax() {
        let invoice = Invoice::create(Uuid::new_v4(), new_invoice(two_items(), None)).unwrap();
        assert_eq!(invoice.tax_amount, 0);
        assert_eq!(invoice.total, invoice.subtotal);
    }

    #[test]
    fn empty_line_items_is_a_valid_draft() {
        let invoice = Invoice::create(Uuid::new_v4(), new_invoice(Vec::new(), None)).unwrap();
        assert_eq!(invoice.total, 0);
        invoice.validate().unwrap();
    }

    #[test]
    fn create_rejects_blank_description() {
        let items = vec![LineItem {
            description: "  ".to_string(),
            quantity: 1,
            unit_price: 100,
        }];
        let err = Invoice::create(Uuid::new_v4(), new_invoice(items, None)).unwrap_err();
        assert!(matches!(err, InvoiceError::Malformed { .. }));
    }

    #[test]
    fn create_rejects_zero_quantity() {
        let items = vec![LineItem {
            description: "Consulting".to_string(),
            quantity: 0,
            unit_price: 100,
        }];
        let err = Invoice::create(Uuid::new_v4(), new_invoice(items, None)).unwrap_err();
        assert!(matches!(err, InvoiceError::Malformed { .. }));
    }

    #[test]
    fn validate_catches_subtotal_drift() {
        let mut invoice =
            Invoice::create(Uuid::new_v4(), new_invoice(two_items(), None)).unwrap();
        invoice.subtotal += 1;
        let err = invoice.validate().unwrap_err();
        assert!(matches!(err, InvoiceError::Malformed { .. }));
    }

    #[test]
    fn validate_catches_refund_exceeding_total() {
        let mut invoice =
            Invoice::create(Uuid::new_v4(), new_invoice(two_items(), None)).unwrap();
        invoice.status = InvoiceStatus::PartiallyRefunded {
            refunded_amount: invoice.total + 1,
            refund_date: test_date(),
        };
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn validate_requires_full_refund_for_refunded_status() {
        let mut invoice =
            Invoice::create(Uuid::new_v4(), new_invoice(two_items(), None)).unwrap();
        invoice.status = InvoiceStatus::Refunded {
            refunded_amount: invoice.total - 1,
            refund_date: test_date(),
        };
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn signature_is_write_once() {
        let mut invoice =
            Invoice::create(Uuid::new_v4(), new_invoice(two_items(), None)).unwrap();
        invoice.set_signature(b"png-bytes").unwrap();
        let encoded = invoice.signature.clone().unwrap();
        let err = invoice.set_signature(b"other").unwrap_err();
        assert!(matches!(err, InvoiceError::SignatureAlreadySet(_)));
        assert_eq!(invoice.signature.unwrap(), encoded);
    }

    #[test]
    fn status_serializes_with_flat_snake_case_tag() {
        let mut invoice =
            Invoice::create(Uuid::new_v4(), new_invoice(two_items(), None)).unwrap();
        invoice.status = InvoiceStatus::PartiallyRefunded {
            refunded_amount: 500,
            refund_date: test_date(),
        };
        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["status"], "partially_refunded");
        assert_eq!(json["refunded_amount"], 500);

        let back: Invoice = serde_json::from_value(json).unwrap();
        assert_eq!(back.refunded_amount(), 500);
    }

    #[test]
    fn refundable_balance_tracks_status() {
        let mut invoice =
            Invoice::create(Uuid::new_v4(), new_invoice(two_items(), None)).unwrap();
        assert_eq!(invoice.refundable_balance(), invoice.total);
        invoice.status = InvoiceStatus::PartiallyRefunded {
            refunded_amount: 1500,
            refund_date: test_date(),
        };
        assert_eq!(invoice.refundable_balance(), invoice.total - 1500);
        assert_eq!(invoice.refund_date(), Some(test_date()));
    }
}
