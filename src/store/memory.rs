use std::collections::HashMap;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::models::{Customer, Invoice};
use crate::store::InvoiceStore;

/// In-memory store. Reference implementation of the persistence boundary,
/// also used as the store double in tests.
#[derive(Default)]
pub struct MemoryStore {
    invoices: HashMap<Uuid, Invoice>,
    customers: HashMap<Uuid, Customer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvoiceStore for MemoryStore {
    fn invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self.invoices.values().cloned().collect())
    }

    fn invoice(&self, id: Uuid) -> Result<Option<Invoice>> {
        Ok(self.invoices.get(&id).cloned())
    }

    fn insert_invoice(&mut self, invoice: Invoice) -> Result<()> {
        if self.invoices.contains_key(&invoice.id) {
            return Err(anyhow!("invoice {} already exists", invoice.id));
        }
        self.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    fn update_invoice(&mut self, invoice: &Invoice) -> Result<()> {
        match self.invoices.get_mut(&invoice.id) {
            Some(stored) => {
                *stored = invoice.clone();
                Ok(())
            }
            None => Err(anyhow!("invoice {} does not exist", invoice.id)),
        }
    }

    fn delete_invoice(&mut self, id: Uuid) -> Result<()> {
        self.invoices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("invoice {} does not exist", id))
    }

    fn customers(&self) -> Result<Vec<Customer>> {
        Ok(self.customers.values().cloned().collect())
    }

    fn customer(&self, id: Uuid) -> Result<Option<Customer>> {
        Ok(self.customers.get(&id).cloned())
    }

    fn upsert_customer(&mut self, customer: &Customer) -> Result<()> {
        self.customers.insert(customer.id, customer.clone());
        Ok(())
    }
}
