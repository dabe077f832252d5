use uuid::Uuid;

use crate::error::{InvoiceError, Result};
use crate::models::{Customer, CustomerView, InvoiceSummary};
use crate::services::stats::{customer_invoices, customer_statistics};
use crate::store::InvoiceStore;

/// Customer directory, narrowed by the search box.
pub fn search_customers(store: &dyn InvoiceStore, query: &str) -> Result<Vec<Customer>> {
    let customers = store.customers()?;
    Ok(crate::services::stats::customer_search(&customers, query)
        .into_iter()
        .cloned()
        .collect())
}

/// Create/edit flow. Name and email are required.
pub fn save_customer(store: &mut dyn InvoiceStore, customer: Customer) -> Result<Customer> {
    if customer.name.trim().is_empty() {
        return Err(InvoiceError::InvalidCustomer("name is required".to_string()));
    }
    if customer.email.trim().is_empty() {
        return Err(InvoiceError::InvalidCustomer(
            "email is required".to_string(),
        ));
    }
    store.upsert_customer(&customer)?;
    Ok(customer)
}

/// Customer detail screen: the customer, their invoices most recent first,
/// and their paid/pending totals.
pub fn get_customer_view(store: &dyn InvoiceStore, id: Uuid) -> Result<CustomerView> {
    let customer = store
        .customer(id)?
        .ok_or(InvoiceError::CustomerNotFound(id))?;
    let invoices = store.invoices()?;
    let stats = customer_statistics(&invoices, id);
    let rows = customer_invoices(&invoices, id)
        .into_iter()
        .map(InvoiceSummary::from)
        .collect();

    Ok(CustomerView {
        customer,
        invoices: rows,
        total_paid: stats.total_paid,
        total_pending: stats.total_pending,
    })
}
