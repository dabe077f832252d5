use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, InvoiceError>;

/// Errors produced by the invoicing core. Collaborator failures carry the
/// underlying error unchanged; the core never retries on its own.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("invalid refund amount: requested {requested}, refundable {refundable}")]
    InvalidRefundAmount { requested: i64, refundable: i64 },

    #[error("invoice {number} cannot be edited while {status}")]
    NotEditable { number: String, status: &'static str },

    #[error("invoice {number} does not accept {event} while {from}")]
    InvalidTransition {
        number: String,
        from: &'static str,
        event: &'static str,
    },

    #[error("collaborator call failed: {0}")]
    CollaboratorFailure(#[from] anyhow::Error),

    #[error("invoice {number} is malformed: {reason}")]
    Malformed { number: String, reason: String },

    #[error("signature on invoice {0} is already set")]
    SignatureAlreadySet(String),

    #[error("invalid customer: {0}")]
    InvalidCustomer(String),

    #[error("invoice {0} not found")]
    NotFound(Uuid),

    #[error("customer {0} not found")]
    CustomerNotFound(Uuid),
}
