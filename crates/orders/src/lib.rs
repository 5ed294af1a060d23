//! `depot-orders` — order and invoice domain models.

pub mod invoice;
pub mod order;

pub use invoice::{Invoice, InvoicePatch, NewInvoice};
pub use order::{NewOrder, Order, OrderLine, OrderPatch};
