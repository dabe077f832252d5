use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    Customer, CustomerStatistics, Invoice, InvoiceFilter, SalesStatistics, StatusFilter,
};
use crate::utils::{is_same_billing_month, is_same_billing_year};

/// Derives the dashboard figures from a snapshot of the invoice collection.
/// Pure over its input and independent of collection order. Records that
/// fail validation are excluded rather than silently repaired.
///
/// Settled invoices count at full total even after a refund; refunded
/// amounts are not subtracted from revenue figures.
pub fn compute_sales_statistics(invoices: &[Invoice], now: DateTime<Utc>) -> SalesStatistics {
    let mut stats = SalesStatistics::default();
    for invoice in invoices {
        if let Err(err) = invoice.validate() {
            warn!(invoice = %invoice.number, error = %err, "skipping malformed invoice");
            continue;
        }
        if invoice.status.is_pending() {
            stats.pending_total += invoice.total;
        } else if invoice.status.is_settled() {
            if is_same_billing_month(invoice.date, now) {
                stats.monthly_total += invoice.total;
            }
            if is_same_billing_year(invoice.date, now) {
                stats.year_to_date_total += invoice.total;
            }
        }
    }
    stats
}

/// Same summation rules as the fleet-wide statistics, scoped to one customer.
pub fn customer_statistics(invoices: &[Invoice], customer_id: Uuid) -> CustomerStatistics {
    let mut stats = CustomerStatistics::default();
    for invoice in invoices.iter().filter(|i| i.customer_id == customer_id) {
        if let Err(err) = invoice.validate() {
            warn!(invoice = %invoice.number, error = %err, "skipping malformed invoice");
            continue;
        }
        if invoice.status.is_pending() {
            stats.total_pending += invoice.total;
        } else {
            stats.total_paid += invoice.total;
        }
    }
    stats
}

/// Case-insensitive substring match against customer name and invoice
/// number, optionally narrowed by status. Preserves input order; the
/// dashboard sorts by recency separately.
pub fn filter_invoices<'a>(invoices: &'a [Invoice], filter: &InvoiceFilter) -> Vec<&'a Invoice> {
    let needle = filter.search_text.trim().to_lowercase();
    invoices
        .iter()
        .filter(|invoice| {
            let status_matches = match filter.status_filter {
                StatusFilter::All => true,
                StatusFilter::Pending => invoice.status.is_pending(),
                StatusFilter::Paid => invoice.status.is_paid(),
            };
            if !status_matches {
                return false;
            }
            if needle.is_empty() {
                return true;
            }
            invoice.customer_name.to_lowercase().contains(&needle)
                || invoice.number.to_lowercase().contains(&needle)
        })
        .collect()
}

/// All invoices of one customer, most recent first.
pub fn customer_invoices<'a>(invoices: &'a [Invoice], customer_id: Uuid) -> Vec<&'a Invoice> {
    let mut matched: Vec<&Invoice> = invoices
        .iter()
        .filter(|invoice| invoice.customer_id == customer_id)
        .collect();
    matched.sort_by(|a, b| b.date.cmp(&a.date));
    matched
}

/// Case-insensitive substring match across name, email and phone.
pub fn customer_search<'a>(customers: &'a [Customer], query: &str) -> Vec<&'a Customer> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return customers.iter().collect();
    }
    customers
        .iter()
        .filter(|customer| {
            customer.name.to_lowercase().contains(&needle)
                || customer.email.to_lowercase().contains(&needle)
                || customer
                    .phone
                    .as_deref()
                    .map(|phone| phone.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}
