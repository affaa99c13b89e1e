mod create_invoice;
mod invoice_status;
mod invoice_webhook;

pub use create_invoice::{CreateInvoiceUcError, CreateInvoiceUseCase};
pub use invoice_status::{InvoiceStatusUcError, InvoiceStatusUseCase};
pub use invoice_webhook::{InvoiceWebhookUseCase, WebhookOutcome, WebhookUcError};
