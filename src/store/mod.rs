use anyhow::Result;
use uuid::Uuid;

use crate::models::{Customer, Invoice};

mod memory;

pub use memory::MemoryStore;

/// Persistence boundary. The store owns the invoice and customer
/// collections; the core reads snapshots and writes one record at a time.
/// No multi-record transactions are assumed, and the store is expected to
/// serialize writes per record id.
pub trait InvoiceStore {
    /// Snapshot of the full invoice collection, in no particular order.
    fn invoices(&self) -> Result<Vec<Invoice>>;
    fn invoice(&self, id: Uuid) -> Result<Option<Invoice>>;
    fn insert_invoice(&mut self, invoice: Invoice) -> Result<()>;
    fn update_invoice(&mut self, invoice: &Invoice) -> Result<()>;
    /// Irreversible.
    fn delete_invoice(&mut self, id: Uuid) -> Result<()>;

    fn customers(&self) -> Result<Vec<Customer>>;
    fn customer(&self, id: Uuid) -> Result<Option<Customer>>;
    fn upsert_customer(&mut self, customer: &Customer) -> Result<()>;
}
