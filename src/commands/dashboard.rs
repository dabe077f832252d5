use crate::error::Result;
use crate::models::{DashboardStats, Invoice, InvoiceFilter, InvoiceSummary};
use crate::services::stats::{compute_sales_statistics, filter_invoices};
use crate::store::InvoiceStore;
use crate::utils::Clock;

const RECENT_LIMIT: usize = 5;

/// Dashboard screen: revenue figures plus the most recent invoices.
pub fn get_dashboard_stats(store: &dyn InvoiceStore, clock: &dyn Clock) -> Result<DashboardStats> {
    let invoices = store.invoices()?;
    let stats = compute_sales_statistics(&invoices, clock.now());

    let mut recent: Vec<&Invoice> = invoices.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let recent_invoices = recent
        .into_iter()
        .take(RECENT_LIMIT)
        .map(InvoiceSummary::from)
        .collect();

    Ok(DashboardStats {
        monthly_total: stats.monthly_total,
        year_to_date_total: stats.year_to_date_total,
        pending_total: stats.pending_total,
        recent_invoices,
    })
}

/// Invoice list screen: filtered rows, most recent first.
pub fn list_invoices(
    store: &dyn InvoiceStore,
    filter: &InvoiceFilter,
) -> Result<Vec<InvoiceSummary>> {
    let invoices = store.invoices()?;
    let mut matched = filter_invoices(&invoices, filter);
    matched.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(matched.into_iter().map(InvoiceSummary::from).collect())
}
